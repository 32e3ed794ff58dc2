//! Resolve a recipe and print the command without running it.

use std::path::PathBuf;
use std::sync::Arc;

use reelcut_common::config::AppConfig;
use reelcut_render_engine::{FfprobeProber, MediaEditor};

use crate::recipe::Recipe;

pub fn run(config: &AppConfig, recipe_path: PathBuf, json: bool, graph: bool) -> anyhow::Result<()> {
    let recipe = Recipe::load(&recipe_path)?;
    let prober = Arc::new(FfprobeProber::new(config.engine.ffprobe.clone()));

    let mut editor =
        MediaEditor::open(&recipe.input, prober)?.with_policy(config.defaults.clone());
    recipe.apply(&mut editor)?;

    if graph {
        let data = editor.command_data();
        if json {
            println!("{}", serde_json::to_string_pretty(&data)?);
        } else {
            println!("Inputs:");
            for (owner, input) in &data.inputs {
                println!("  {{{owner}}} {} ({})", input.path.display(), input.media_type.as_str());
            }
            println!("Fragments:");
            for fragment in &data.fragments {
                println!("  {fragment}");
            }
            println!();
        }
    }

    let output = recipe.output.resolve()?;
    let command = editor.plan(&output, recipe.options.as_ref())?;
    if json {
        println!("{}", serde_json::to_string_pretty(&command)?);
    } else {
        println!("{}", command.shell_line(&config.engine.ffmpeg.to_string_lossy()));
    }
    Ok(())
}
