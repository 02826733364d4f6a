//! Train command - self-play training of a Q-learning agent

use std::{
    fs::File,
    path::{MAIN_SEPARATOR, Path, PathBuf},
};

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use serde::Serialize;
use serde_json::to_writer_pretty;

use crate::{
    app::{AgentConfig, App, AppConfig},
    cli::{
        commands::Seat,
        output::{format_number, format_rate, print_kv, print_section},
    },
    pipeline::{
        JsonlObserver, ProgressObserver, RewardScheme, SelfPlayTrainer, TrainingConfig,
        TrainingResult,
    },
    q_learning::Hyperparameters,
    tictactoe::Player,
};

#[derive(Debug, Serialize)]
struct TrainingSummaryFile<'a> {
    training: &'a TrainingResult,
    hyperparameters: &'a Hyperparameters,
    rewards: &'a RewardScheme,
    model_path: &'a Path,
    seed: Option<u64>,
}

/// Parse a reward schedule such as "win=1,draw=0.5,loss=-1,step=0".
/// Missing keys keep their defaults.
fn parse_reward_schedule(s: &str) -> Result<RewardScheme> {
    let mut rewards = RewardScheme::default();

    for part in s.split(',') {
        let trimmed = part.trim();
        if trimmed.is_empty() {
            continue;
        }
        let (key, value_str) = trimmed
            .split_once('=')
            .ok_or_else(|| anyhow!("Invalid reward entry '{trimmed}'. Expected key=value"))?;
        let value: f64 = value_str
            .trim()
            .parse()
            .map_err(|_| anyhow!("Invalid numeric reward '{value_str}' in '{trimmed}'"))?;
        match key.trim().to_ascii_lowercase().as_str() {
            "win" => rewards.win = value,
            "draw" => rewards.draw = value,
            "loss" => rewards.loss = value,
            "step" => rewards.step = value,
            other => {
                return Err(anyhow!(
                    "Unknown reward key '{other}'. Expected win, draw, loss, or step"
                ));
            }
        }
    }

    Ok(rewards)
}

/// Where to write the summary: a directory gets `training_summary.json`,
/// anything else is forced to a `.json` extension.
fn summary_path(raw: &Path) -> PathBuf {
    let names_a_directory = raw.is_dir()
        || raw.file_name().is_none()
        || raw.as_os_str().to_string_lossy().ends_with(MAIN_SEPARATOR);
    if names_a_directory {
        return raw.join("training_summary.json");
    }

    let has_json_extension = raw
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if has_json_extension {
        raw.to_path_buf()
    } else {
        raw.with_extension("json")
    }
}

#[derive(Parser, Debug)]
#[command(about = "Train a Q-learning agent by self-play", allow_negative_numbers = true)]
pub struct TrainArgs {
    /// Number of self-play episodes
    #[arg(long, short = 'e', default_value_t = 5000)]
    pub episodes: usize,

    /// Learning rate α (0 < α <= 1)
    #[arg(long, default_value_t = Hyperparameters::default().learning_rate)]
    pub learning_rate: f64,

    /// Discount factor γ (0 <= γ <= 1)
    #[arg(long, default_value_t = Hyperparameters::default().discount_factor)]
    pub discount: f64,

    /// Initial exploration rate
    #[arg(long, default_value_t = Hyperparameters::default().epsilon)]
    pub epsilon: f64,

    /// Multiplicative epsilon decay per episode
    #[arg(long, default_value_t = Hyperparameters::default().epsilon_decay)]
    pub epsilon_decay: f64,

    /// Exploration floor
    #[arg(long, default_value_t = Hyperparameters::default().epsilon_min)]
    pub epsilon_min: f64,

    /// Store every position separately instead of collapsing symmetric ones
    #[arg(long, default_value_t = false)]
    pub no_symmetry: bool,

    /// Reward schedule (win=1,draw=0.5,loss=-1,step=0)
    #[arg(long)]
    pub reward: Option<String>,

    /// Seat whose results are reported
    #[arg(long, value_enum, default_value_t = Seat::X)]
    pub perspective: Seat,

    /// Log a window summary every N episodes (0 disables)
    #[arg(long, default_value_t = 1000)]
    pub report_interval: usize,

    /// Random seed for reproducibility
    #[arg(long)]
    pub seed: Option<u64>,

    /// Output file for the trained agent
    #[arg(long, short = 'o', default_value = "models/q_agent.msgpack")]
    pub output: PathBuf,

    /// Optional path for writing a summary JSON file
    #[arg(long)]
    pub summary: Option<PathBuf>,

    /// Optional file for JSONL observations
    #[arg(long)]
    pub observations: Option<PathBuf>,

    /// Show progress bar
    #[arg(long, default_value_t = false)]
    pub progress: bool,
}

impl TrainArgs {
    fn hyperparameters(&self) -> Hyperparameters {
        Hyperparameters::default()
            .with_learning_rate(self.learning_rate)
            .with_discount_factor(self.discount)
            .with_epsilon(self.epsilon)
            .with_epsilon_decay(self.epsilon_decay)
            .with_epsilon_min(self.epsilon_min)
            .with_symmetry(!self.no_symmetry)
    }
}

pub fn execute(args: TrainArgs) -> Result<()> {
    let hyperparameters = args.hyperparameters();
    hyperparameters
        .validate()
        .context("Invalid hyperparameters")?;

    let rewards = match &args.reward {
        Some(schedule) => parse_reward_schedule(schedule)?,
        None => RewardScheme::default(),
    };
    let perspective = Player::from(args.perspective);

    let config = TrainingConfig {
        episodes: args.episodes,
        seed: args.seed,
        rewards,
        perspective,
        report_interval: args.report_interval,
    };

    let mut trainer = SelfPlayTrainer::new(config);
    if args.progress {
        trainer = trainer.with_observer(Box::new(ProgressObserver::new()));
    }
    if let Some(path) = &args.observations {
        let observer = JsonlObserver::new(path)
            .with_context(|| format!("Failed to open observation log {}", path.display()))?;
        trainer = trainer.with_observer(Box::new(observer));
    }

    print_section("Self-Play Training");
    print_kv("Episodes", &format_number(args.episodes));
    print_kv("Learning rate", &hyperparameters.learning_rate.to_string());
    print_kv("Discount", &hyperparameters.discount_factor.to_string());
    print_kv(
        "Epsilon",
        &format!(
            "{} (decay {}, min {})",
            hyperparameters.epsilon, hyperparameters.epsilon_decay, hyperparameters.epsilon_min
        ),
    );
    print_kv("Symmetry", &hyperparameters.use_symmetry.to_string());
    if let Some(seed) = args.seed {
        print_kv("Seed", &seed.to_string());
    }

    let app = App::with_config(AppConfig::default().with_model_path(&args.output));
    let (_agent, result) = app
        .train_and_save(AgentConfig::new(hyperparameters), trainer)
        .with_context(|| format!("Training failed (model path {})", args.output.display()))?;

    print_section("Results");
    print_kv("Episodes played", &format_number(result.total_episodes));
    print_kv("X wins", &format_number(result.x_wins));
    print_kv("O wins", &format_number(result.o_wins));
    print_kv("Draws", &format_number(result.draws));
    if result.aborted > 0 {
        print_kv("Aborted", &format_number(result.aborted));
    }
    print_kv(
        &format!("Win rate ({})", result.perspective),
        &format_rate(result.win_rate),
    );
    print_kv("Final epsilon", &format!("{:.4}", result.final_epsilon));
    print_kv("Table size", &format_number(result.table_size));
    print_kv("Saved to", &args.output.display().to_string());

    if let Some(raw) = &args.summary {
        let path = summary_path(raw);
        let summary = TrainingSummaryFile {
            training: &result,
            hyperparameters: &hyperparameters,
            rewards: &rewards,
            model_path: &args.output,
            seed: args.seed,
        };
        let file = File::create(&path)
            .with_context(|| format!("Failed to create summary file {}", path.display()))?;
        to_writer_pretty(file, &summary).context("Failed to write training summary")?;
        print_kv("Summary", &path.display().to_string());
    }

    Ok(())
}
