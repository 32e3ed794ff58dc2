//! Reelcut CLI: inspect sources, plan and render edit recipes.
//!
//! Usage:
//!   reelcut info <PATH>        Probe a source and print its stream summary
//!   reelcut plan <RECIPE>      Print the ffmpeg command a recipe resolves to
//!   reelcut render <RECIPE>    Run a recipe
//!   reelcut check              Check that ffmpeg and ffprobe are available

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use reelcut_common::config::AppConfig;

mod commands;
mod recipe;

#[derive(Parser)]
#[command(
    name = "reelcut",
    about = "Declarative media editing on top of ffmpeg",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to $XDG_CONFIG_HOME/reelcut/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Probe a source and print its stream summary
    Info {
        /// Path to the media file
        path: PathBuf,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Resolve a recipe and print the command without running it
    Plan {
        /// Path to the recipe JSON
        recipe: PathBuf,

        /// Print the command structure as JSON
        #[arg(long)]
        json: bool,

        /// Also print the unresolved graph with owner placeholders
        #[arg(long)]
        graph: bool,
    },

    /// Run a recipe
    Render {
        /// Path to the recipe JSON
        recipe: PathBuf,

        /// Override the recipe's output path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Check that the configured engine binaries are available
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from(path),
        None => AppConfig::load(),
    };
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    reelcut_common::logging::init_logging(&config.logging);

    match cli.command {
        Commands::Info { path, json } => commands::info::run(&config, path, json),
        Commands::Plan {
            recipe,
            json,
            graph,
        } => commands::plan::run(&config, recipe, json, graph),
        Commands::Render { recipe, output } => commands::render::run(config, recipe, output).await,
        Commands::Check => commands::check::run(&config),
    }
}
