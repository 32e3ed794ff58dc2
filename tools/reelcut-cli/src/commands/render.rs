//! Run a recipe.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use reelcut_common::config::AppConfig;
use reelcut_render_engine::{FfmpegRunner, FfprobeProber, MediaEditor, RenderProgress, Runner};

use crate::recipe::Recipe;

pub async fn run(
    config: AppConfig,
    recipe_path: PathBuf,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let recipe = Recipe::load(&recipe_path)?;
    let output = match output {
        Some(path) => path,
        None => recipe.output.resolve()?,
    };

    let runner = FfmpegRunner::new(config.engine.ffmpeg.clone());
    if !runner.is_available() {
        anyhow::bail!(
            "{} not found; install ffmpeg or set engine.ffmpeg in the config",
            config.engine.ffmpeg.display()
        );
    }
    let runner = runner.with_progress(Arc::new(|p: RenderProgress| {
        match p.fraction {
            Some(fraction) => print!("\r  Progress: {:.1}% ({:.1}s)  ", fraction * 100.0, p.out_time_secs),
            None => print!("\r  Progress: {:.1}s  ", p.out_time_secs),
        }
        let _ = std::io::stdout().flush();
    }));

    println!("Rendering {} -> {}", recipe.input.display(), output.display());

    let prober = Arc::new(FfprobeProber::new(config.engine.ffprobe.clone()));
    let policy = config.defaults.clone();
    let result = tokio::task::spawn_blocking(move || {
        let mut editor = MediaEditor::open(&recipe.input, prober)?.with_policy(policy);
        recipe.apply(&mut editor)?;
        editor.run(&output, recipe.options.as_ref(), &runner)
    })
    .await?;

    match result {
        Ok(command) => {
            println!("\nRender complete");
            tracing::info!(command = %command, "Render complete");
            Ok(())
        }
        Err(e) => {
            println!("\nRender failed");
            Err(e.into())
        }
    }
}
