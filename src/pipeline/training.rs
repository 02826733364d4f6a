//! Self-play training loop

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    ports::Observer,
    q_learning::{Hyperparameters, QLearningAgent},
    tictactoe::{Board, GameOutcome, Player, PlayerResult},
    types::StateKey,
};

/// Rewards handed to each player when an episode ends
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RewardScheme {
    pub win: f64,
    pub loss: f64,
    pub draw: f64,
    /// Added to every move, terminal or not
    pub step: f64,
}

impl Default for RewardScheme {
    fn default() -> Self {
        Self {
            win: 1.0,
            loss: -1.0,
            draw: 0.5,
            step: 0.0,
        }
    }
}

impl RewardScheme {
    pub fn terminal_reward(&self, result: PlayerResult) -> f64 {
        match result {
            PlayerResult::Win => self.win,
            PlayerResult::Loss => self.loss,
            PlayerResult::Draw => self.draw,
        }
    }
}

/// Training configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Number of self-play episodes
    pub episodes: usize,

    /// Random seed for the agent's RNG
    pub seed: Option<u64>,

    pub rewards: RewardScheme,

    /// Seat whose results feed the agent statistics and the win/loss counts
    pub perspective: Player,

    /// Log a window summary every this many episodes (0 disables)
    pub report_interval: usize,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            episodes: 5000,
            seed: None,
            rewards: RewardScheme::default(),
            perspective: Player::X,
            report_interval: 1000,
        }
    }
}

/// One recorded move, ready for a Bellman update
///
/// `state`, `action` and `next_state` are in key coordinates. Every
/// transition of a finished episode is terminal: `next_state` is the final
/// position and `reward` is the outcome for the mover plus the step reward.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub player: Player,
    pub state: StateKey,
    pub action: usize,
    pub reward: f64,
    pub next_state: StateKey,
    pub terminal: bool,
}

#[derive(Debug, Clone)]
struct Step {
    player: Player,
    state: StateKey,
    action: usize,
}

/// Turn a finished episode's moves into transitions.
///
/// The outcome is credited to every move of each player: the winner's moves
/// get the win reward, the loser's moves the loss reward, and on a draw both
/// players' moves get the draw reward. Each target is the reward itself, so
/// a later move never adds its value on top of an earlier one.
fn build_trace(
    steps: &[Step],
    final_state: &StateKey,
    outcome: GameOutcome,
    rewards: &RewardScheme,
) -> Vec<Transition> {
    steps
        .iter()
        .map(|step| Transition {
            player: step.player,
            state: step.state.clone(),
            action: step.action,
            reward: rewards.step + rewards.terminal_reward(outcome.result_for(step.player)),
            next_state: final_state.clone(),
            terminal: true,
        })
        .collect()
}

/// Cooperative cancellation flag, checked between episodes
#[derive(Debug, Clone, Default)]
pub struct StopHandle {
    flag: Arc<AtomicBool>,
}

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_stop(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_stop_requested(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Result of a training run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingResult {
    /// Completed episodes
    pub total_episodes: usize,

    pub x_wins: usize,
    pub o_wins: usize,

    /// Episodes cut short because no move could be chosen
    pub aborted: usize,

    /// Seat the win/draw/loss counts are taken from
    pub perspective: Player,

    pub wins: usize,
    pub draws: usize,
    pub losses: usize,

    pub win_rate: f64,
    pub draw_rate: f64,
    pub loss_rate: f64,

    pub final_epsilon: f64,
    pub table_size: usize,

    /// Set when a stop request ended training before `episodes` ran
    pub stopped_early: bool,
}

impl TrainingResult {
    fn from_tally(
        tally: &Tally,
        perspective: Player,
        agent: &QLearningAgent,
        stopped_early: bool,
    ) -> Self {
        let (wins, losses) = match perspective {
            Player::X => (tally.x_wins, tally.o_wins),
            Player::O => (tally.o_wins, tally.x_wins),
        };
        let total_episodes = tally.x_wins + tally.o_wins + tally.draws;
        let rate = |count: usize| {
            if total_episodes > 0 {
                count as f64 / total_episodes as f64
            } else {
                0.0
            }
        };

        Self {
            total_episodes,
            x_wins: tally.x_wins,
            o_wins: tally.o_wins,
            aborted: tally.aborted,
            perspective,
            wins,
            draws: tally.draws,
            losses,
            win_rate: rate(wins),
            draw_rate: rate(tally.draws),
            loss_rate: rate(losses),
            final_epsilon: agent.epsilon(),
            table_size: agent.table().len(),
            stopped_early,
        }
    }

    /// Save result to JSON file
    pub fn save<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    /// Load result from JSON file
    pub fn load<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let result = serde_json::from_reader(file)?;
        Ok(result)
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct Tally {
    x_wins: usize,
    o_wins: usize,
    draws: usize,
    aborted: usize,
}

impl Tally {
    fn record(&mut self, outcome: GameOutcome) {
        match outcome {
            GameOutcome::Win(Player::X) => self.x_wins += 1,
            GameOutcome::Win(Player::O) => self.o_wins += 1,
            GameOutcome::Draw => self.draws += 1,
        }
    }
}

/// Self-play trainer: one agent plays both seats and learns from every move
pub struct SelfPlayTrainer {
    config: TrainingConfig,
    observers: Vec<Box<dyn Observer>>,
    stop: StopHandle,
}

impl SelfPlayTrainer {
    pub fn new(config: TrainingConfig) -> Self {
        Self {
            config,
            observers: Vec::new(),
            stop: StopHandle::new(),
        }
    }

    /// Add an observer to the trainer
    pub fn with_observer(mut self, observer: Box<dyn Observer>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Share an existing stop flag, e.g. one held by a signal handler
    pub fn with_stop_handle(mut self, stop: StopHandle) -> Self {
        self.stop = stop;
        self
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Run `config.episodes` self-play episodes, updating `agent` in place.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] for zero episodes and
    /// propagates observer failures.
    pub fn run(&mut self, agent: &mut QLearningAgent) -> Result<TrainingResult> {
        if self.config.episodes == 0 {
            return Err(Error::InvalidConfiguration {
                message: "episode count must be at least 1".to_string(),
            });
        }
        if let Some(seed) = self.config.seed {
            agent.set_rng_seed(seed);
        }

        log::info!(
            "Starting self-play training: {} episodes, epsilon {:.3}, symmetry {}",
            self.config.episodes,
            agent.epsilon(),
            agent.use_symmetry()
        );
        for observer in &mut self.observers {
            observer.on_training_start(self.config.episodes)?;
        }

        let mut tally = Tally::default();
        let mut window = Tally::default();
        let mut stopped_early = false;

        for episode in 0..self.config.episodes {
            if self.stop.is_stop_requested() {
                log::info!("Stop requested, ending training after {episode} episodes");
                stopped_early = true;
                break;
            }

            match self.play_episode(episode, agent)? {
                Some(outcome) => {
                    tally.record(outcome);
                    window.record(outcome);
                }
                None => {
                    log::warn!("Episode {episode} aborted: no valid action available");
                    tally.aborted += 1;
                    window.aborted += 1;
                }
            }

            let completed = episode + 1;
            if self.config.report_interval > 0
                && completed.is_multiple_of(self.config.report_interval)
            {
                log::info!(
                    "Episode {completed}: X wins {}, O wins {}, draws {}, epsilon {:.4}, table size {}",
                    window.x_wins,
                    window.o_wins,
                    window.draws,
                    agent.epsilon(),
                    agent.table().len()
                );
                window = Tally::default();
            }
        }

        for observer in &mut self.observers {
            observer.on_training_end()?;
        }

        let result =
            TrainingResult::from_tally(&tally, self.config.perspective, agent, stopped_early);
        log::info!(
            "Training finished: {} episodes, {} states, epsilon {:.4}",
            result.total_episodes,
            result.table_size,
            result.final_epsilon
        );
        Ok(result)
    }

    fn play_episode(
        &mut self,
        episode: usize,
        agent: &mut QLearningAgent,
    ) -> Result<Option<GameOutcome>> {
        for observer in &mut self.observers {
            observer.on_episode_start(episode)?;
        }

        let mut board = Board::new();
        let mut steps = Vec::new();

        while !board.is_terminal() {
            let player = board.current_player();
            let ctx = agent.context(&board);
            let q_values = if self.observers.is_empty() {
                Vec::new()
            } else {
                agent.q_values(&board)
            };

            let Some(action) = agent.select_action(&board, true) else {
                return Ok(None);
            };

            for observer in &mut self.observers {
                observer.on_move(episode, steps.len(), player, &board, action, &q_values)?;
            }

            if !board.apply_move(action) {
                return Ok(None);
            }
            steps.push(Step {
                player,
                state: ctx.key.clone(),
                action: ctx.map_action_to_key(action),
            });
        }

        let Some(outcome) = board.outcome() else {
            return Ok(None);
        };

        let final_state = agent.context(&board).key;
        let trace = build_trace(&steps, &final_state, outcome, &self.config.rewards);
        for transition in &trace {
            agent.update(
                &transition.state,
                transition.action,
                transition.reward,
                &transition.next_state,
                transition.terminal,
            );
        }

        agent.decay_epsilon();

        let perspective = self.config.perspective;
        let reward: f64 = trace
            .iter()
            .filter(|t| t.player == perspective)
            .map(|t| t.reward)
            .sum();
        agent.record_episode(outcome.result_for(perspective), reward);

        log::debug!("Episode {episode}: {outcome:?} in {} moves", steps.len());

        let stats = agent.stats();
        for observer in &mut self.observers {
            observer.on_episode_end(episode, outcome, &stats)?;
        }

        Ok(Some(outcome))
    }
}

/// Train a fresh agent by self-play with default training settings.
///
/// # Errors
///
/// Returns [`Error::InvalidConfiguration`] when `episode_count` is zero and
/// [`Error::InvalidHyperparameter`] for out-of-range hyperparameters.
///
/// # Examples
///
/// ```no_run
/// use noughts::{pipeline::train, q_learning::Hyperparameters};
///
/// let (agent, result) = train(1000, Hyperparameters::default())?;
/// println!("{} states after {} episodes", agent.table().len(), result.total_episodes);
/// # Ok::<(), noughts::Error>(())
/// ```
pub fn train(
    episode_count: usize,
    hyperparameters: Hyperparameters,
) -> Result<(QLearningAgent, TrainingResult)> {
    let config = TrainingConfig {
        episodes: episode_count,
        ..TrainingConfig::default()
    };
    train_with_config(config, hyperparameters)
}

/// Train a fresh agent with explicit training settings
pub fn train_with_config(
    config: TrainingConfig,
    hyperparameters: Hyperparameters,
) -> Result<(QLearningAgent, TrainingResult)> {
    let mut agent = QLearningAgent::new(hyperparameters)?;
    let result = SelfPlayTrainer::new(config).run(&mut agent)?;
    Ok((agent, result))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> StateKey {
        StateKey::parse(s).unwrap()
    }

    fn step(player: Player, state: &str, action: usize) -> Step {
        Step {
            player,
            state: key(state),
            action,
        }
    }

    #[test]
    fn test_trace_credits_outcome_to_every_move() {
        // X: 0, 1, 2 wins; O: 3, 4
        let steps = vec![
            step(Player::X, ".........", 0),
            step(Player::O, "X........", 3),
            step(Player::X, "X..O.....", 1),
            step(Player::O, "XX.O.....", 4),
            step(Player::X, "XX.OO....", 2),
        ];
        let final_state = key("XXXOO....");
        let trace = build_trace(
            &steps,
            &final_state,
            GameOutcome::Win(Player::X),
            &RewardScheme::default(),
        );

        assert_eq!(trace.len(), 5);
        assert_eq!(trace[0].reward, 1.0);
        assert_eq!(trace[2].reward, 1.0);
        assert_eq!(trace[4].reward, 1.0);
        assert_eq!(trace[1].reward, -1.0);
        assert_eq!(trace[3].reward, -1.0);
        assert!(trace.iter().all(|t| t.terminal));
        assert!(trace.iter().all(|t| t.next_state == final_state));
        assert_eq!(trace[3].action, 4);
    }

    #[test]
    fn test_one_episode_rewards_the_opening_move() {
        let params = Hyperparameters::default()
            .with_learning_rate(1.0)
            .with_discount_factor(0.0)
            .with_symmetry(false);
        let mut agent = QLearningAgent::new(params).unwrap();
        let mut trainer = SelfPlayTrainer::new(TrainingConfig {
            episodes: 1,
            seed: Some(3),
            ..TrainingConfig::default()
        });
        let result = trainer.run(&mut agent).unwrap();

        let opening = key(".........");
        let opening_values: Vec<f64> = (0..9).map(|a| agent.table().get(&opening, a)).collect();
        let credited: Vec<f64> = opening_values.into_iter().filter(|&v| v != 0.0).collect();
        assert_eq!(credited.len(), 1);

        let expected = if result.x_wins == 1 {
            1.0
        } else if result.o_wins == 1 {
            -1.0
        } else {
            0.5
        };
        assert_eq!(credited[0], expected);

        // One non-zero entry per move played
        let nonzero = agent
            .table()
            .iter()
            .flat_map(|(_, values)| values.iter())
            .filter(|&&v| v != 0.0)
            .count();
        assert_eq!(nonzero, agent.table().len());
    }

    #[test]
    fn test_draw_reward_and_step_reward() {
        let rewards = RewardScheme {
            step: -0.01,
            ..RewardScheme::default()
        };
        let steps = vec![
            step(Player::X, ".........", 4),
            step(Player::O, "....X....", 0),
        ];
        let trace = build_trace(&steps, &key("O...X...."), GameOutcome::Draw, &rewards);
        assert!((trace[0].reward - 0.49).abs() < 1e-12);
        assert!((trace[1].reward - 0.49).abs() < 1e-12);
    }

    #[test]
    fn test_zero_episodes_rejected() {
        let result = train(0, Hyperparameters::default());
        assert!(matches!(result, Err(Error::InvalidConfiguration { .. })));
    }

    #[test]
    fn test_training_counts_add_up() {
        let config = TrainingConfig {
            episodes: 50,
            seed: Some(42),
            ..TrainingConfig::default()
        };
        let (agent, result) = train_with_config(config, Hyperparameters::default()).unwrap();

        assert_eq!(result.total_episodes, 50);
        assert_eq!(result.x_wins + result.o_wins + result.draws, 50);
        assert_eq!(result.wins, result.x_wins);
        assert_eq!(result.losses, result.o_wins);
        assert!((result.win_rate - result.x_wins as f64 / 50.0).abs() < 1e-12);
        assert_eq!(result.aborted, 0);
        assert!(!result.stopped_early);
        assert_eq!(agent.stats().episodes, 50);
        assert_eq!(agent.epsilon_history().len(), 50);
        assert!(result.table_size > 0);
        assert_eq!(result.table_size, agent.table().len());
    }

    #[test]
    fn test_epsilon_decays_once_per_episode() {
        let params = Hyperparameters::default().with_epsilon_decay(0.9);
        let config = TrainingConfig {
            episodes: 3,
            seed: Some(1),
            ..TrainingConfig::default()
        };
        let (agent, _) = train_with_config(config, params).unwrap();
        assert!((agent.epsilon() - 0.729).abs() < 1e-12);
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let config = TrainingConfig {
            episodes: 30,
            seed: Some(7),
            ..TrainingConfig::default()
        };
        let (a, ra) = train_with_config(config.clone(), Hyperparameters::default()).unwrap();
        let (b, rb) = train_with_config(config, Hyperparameters::default()).unwrap();
        assert_eq!(ra, rb);
        assert_eq!(a.table(), b.table());
    }

    #[test]
    fn test_stop_before_first_episode() {
        let mut agent = QLearningAgent::new(Hyperparameters::default()).unwrap();
        let mut trainer = SelfPlayTrainer::new(TrainingConfig {
            episodes: 10,
            ..TrainingConfig::default()
        });
        trainer.stop_handle().request_stop();

        let result = trainer.run(&mut agent).unwrap();
        assert!(result.stopped_early);
        assert_eq!(result.total_episodes, 0);
        assert!(agent.table().is_empty());
    }

    #[test]
    fn test_result_json_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.json");
        let config = TrainingConfig {
            episodes: 10,
            seed: Some(4),
            perspective: Player::O,
            ..TrainingConfig::default()
        };
        let (_, result) = train_with_config(config, Hyperparameters::default()).unwrap();
        assert_eq!(result.perspective, Player::O);
        assert_eq!(result.wins, result.o_wins);
        assert_eq!(result.losses, result.x_wins);

        result.save(&path).unwrap();
        assert_eq!(TrainingResult::load(&path).unwrap(), result);
    }
}
