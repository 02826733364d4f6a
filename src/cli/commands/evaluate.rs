//! Evaluate command - play a saved agent against a random opponent

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use crate::{
    app::App,
    cli::{
        commands::Seat,
        output::{format_number, format_rate, print_kv, print_section},
    },
    pipeline::evaluate_against_random,
    tictactoe::Player,
};

#[derive(Parser, Debug)]
#[command(about = "Evaluate a trained agent against a uniform random opponent")]
pub struct EvaluateArgs {
    /// Path to a saved agent
    pub model: PathBuf,

    /// Number of evaluation games
    #[arg(long, short = 'g', default_value_t = 1000)]
    pub games: usize,

    /// Which seat the evaluated agent takes
    #[arg(long, value_enum, default_value_t = Seat::O)]
    pub agent_player: Seat,

    /// Random seed for reproducibility
    #[arg(long)]
    pub seed: Option<u64>,
}

pub fn execute(args: EvaluateArgs) -> Result<()> {
    let seat = Player::from(args.agent_player);

    println!("Loading trained agent from: {}", args.model.display());
    let mut agent = App::new()
        .load_agent(&args.model)
        .with_context(|| format!("Failed to load agent from {}", args.model.display()))?;
    if let Some(seed) = args.seed {
        agent.set_rng_seed(seed);
    }

    print_section("Loaded Agent");
    let stats = agent.stats();
    print_kv("Episodes trained", &format_number(stats.episodes));
    print_kv("Table size", &format_number(stats.table_size));
    print_kv("Epsilon", &format!("{:.4}", stats.epsilon));
    print_kv("Symmetry", &agent.use_symmetry().to_string());

    let opponent_seed = args.seed.map(|s| s.wrapping_add(1));
    let result = evaluate_against_random(&mut agent, seat, args.games, opponent_seed)
        .context("Evaluation failed")?;

    print_section(&format!("Greedy agent as {seat} vs Random"));
    print_kv("Games", &format_number(result.games));
    print_kv("Wins", &format!("{} ({})", result.wins, format_rate(result.win_rate())));
    print_kv(
        "Draws",
        &format!("{} ({})", result.draws, format_rate(result.draw_rate())),
    );
    print_kv(
        "Losses",
        &format!("{} ({})", result.losses, format_rate(result.loss_rate())),
    );
    print_kv("Non-losing", &format_rate(result.non_losing_rate()));

    Ok(())
}
