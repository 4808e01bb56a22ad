//! staircase CLI — inspect level tables and replay adaptive difficulty sessions.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;
mod config;

#[derive(Parser)]
#[command(
    name = "staircase",
    version,
    about = "Adaptive difficulty staircase for cognitive-training games"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show generation parameters per level
    Params {
        /// Game key (memory_digits, schulte, par_impar, twin_words or an alias)
        #[arg(long)]
        game: String,

        /// Engine: tuned or generic (default: the game's default)
        #[arg(long)]
        engine: Option<String>,

        /// Single level to show (default: every level)
        #[arg(long)]
        level: Option<u32>,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Replay a recorded trial sequence through a controller
    Replay {
        /// Game key
        #[arg(long)]
        game: String,

        /// JSON array of trials
        #[arg(long)]
        trials: PathBuf,

        /// Starting level (default from config)
        #[arg(long)]
        initial_level: Option<u32>,

        /// Engine: tuned or generic (default: config, then the game's default)
        #[arg(long)]
        engine: Option<String>,

        /// Resume from a saved snapshot instead of starting fresh
        #[arg(long)]
        resume: Option<PathBuf>,

        /// Write the final controller snapshot here
        #[arg(long)]
        save: Option<PathBuf>,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Show the state held in a saved snapshot
    Inspect {
        /// Snapshot JSON written by `replay --save`
        #[arg(long)]
        state: PathBuf,
    },

    /// Create a starter config and an example trial file
    Init,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("staircase=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Params {
            game,
            engine,
            level,
            format,
        } => commands::params::execute(game, engine, level, format),
        Commands::Replay {
            game,
            trials,
            initial_level,
            engine,
            resume,
            save,
            format,
            config,
        } => commands::replay::execute(
            game,
            trials,
            initial_level,
            engine,
            resume,
            save,
            format,
            config,
        ),
        Commands::Inspect { state } => commands::inspect::execute(state),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
