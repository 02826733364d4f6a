//! noughts CLI - train and evaluate a tabular Q-learning tic-tac-toe agent
//!
//! Log verbosity follows `RUST_LOG` (default `info`).

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "noughts")]
#[command(version, about = "Tabular Q-learning for tic-tac-toe", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train an agent by self-play and save it
    Train(Box<noughts::cli::commands::train::TrainArgs>),

    /// Evaluate a saved agent against a random opponent
    Evaluate(noughts::cli::commands::evaluate::EvaluateArgs),
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Train(args) => noughts::cli::commands::train::execute(*args),
        Commands::Evaluate(args) => noughts::cli::commands::evaluate::execute(args),
    }
}
