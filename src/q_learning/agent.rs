//! Tabular Q-learning agent

use rand::{Rng, SeedableRng, rngs::StdRng, seq::IndexedRandom};

use super::{
    hyperparameters::Hyperparameters,
    q_table::QTable,
    serialization::SavedAgent,
    stats::{AgentStats, TrainingStats},
};
use crate::{
    Result,
    ports::Policy,
    tictactoe::{Board, CanonicalContext, PlayerResult},
    types::StateKey,
};

fn build_rng(seed: Option<u64>) -> StdRng {
    if let Some(seed) = seed {
        StdRng::seed_from_u64(seed)
    } else {
        StdRng::from_rng(&mut rand::rng())
    }
}

/// Q-learning agent (off-policy TD control)
///
/// Learns Q* by always updating toward the maximum next-state value,
/// regardless of the action actually taken next. One table serves both
/// seats: piece counts in the key tell X-decision states from O-decision
/// states, and every value is from the perspective of the player to move.
///
/// # Examples
///
/// ```
/// use noughts::{q_learning::{Hyperparameters, QLearningAgent}, tictactoe::Board};
///
/// let mut agent = QLearningAgent::new(Hyperparameters::default())?.with_seed(7);
/// let board = Board::new();
/// let action = agent.select_action(&board, true).expect("empty board has moves");
/// assert!(action < 9);
/// # Ok::<(), noughts::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct QLearningAgent {
    q_table: QTable,
    hyperparameters: Hyperparameters,
    epsilon: f64,
    stats: TrainingStats,
    rng: StdRng,
    rng_seed: Option<u64>,
}

impl QLearningAgent {
    /// Create an untrained agent.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidHyperparameter`] when a parameter is out
    /// of range.
    pub fn new(hyperparameters: Hyperparameters) -> Result<Self> {
        hyperparameters.validate()?;
        Ok(Self {
            q_table: QTable::new(),
            hyperparameters,
            epsilon: hyperparameters.epsilon,
            stats: TrainingStats::default(),
            rng: build_rng(None),
            rng_seed: None,
        })
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.set_rng_seed(seed);
        self
    }

    pub fn set_rng_seed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
        self.rng_seed = Some(seed);
    }

    /// Reassemble an agent from persisted parts. The caller has validated them.
    pub(crate) fn from_parts(
        hyperparameters: Hyperparameters,
        epsilon: f64,
        q_table: QTable,
        stats: TrainingStats,
        rng_seed: Option<u64>,
    ) -> Self {
        Self {
            q_table,
            hyperparameters,
            epsilon,
            stats,
            rng: build_rng(rng_seed),
            rng_seed,
        }
    }

    pub fn hyperparameters(&self) -> &Hyperparameters {
        &self.hyperparameters
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn use_symmetry(&self) -> bool {
        self.hyperparameters.use_symmetry
    }

    pub fn rng_seed(&self) -> Option<u64> {
        self.rng_seed
    }

    pub fn table(&self) -> &QTable {
        &self.q_table
    }

    pub fn training_stats(&self) -> &TrainingStats {
        &self.stats
    }

    pub fn epsilon_history(&self) -> &[f64] {
        &self.stats.epsilon_history
    }

    pub fn table_size_history(&self) -> &[usize] {
        &self.stats.table_size_history
    }

    /// Key and coordinate transform for `board` under this agent's symmetry setting
    pub fn context(&self, board: &Board) -> CanonicalContext {
        board.canonical_context(self.hyperparameters.use_symmetry)
    }

    /// ε-greedy action selection.
    ///
    /// Returns `None` when the board has no valid actions. While `training`,
    /// explores uniformly with probability ε. The greedy branch breaks ties
    /// uniformly at random among every action sharing the maximum value so
    /// that unexplored states do not favour low cell indices.
    pub fn select_action(&mut self, board: &Board, training: bool) -> Option<usize> {
        let valid_actions = board.valid_actions();
        if valid_actions.is_empty() {
            return None;
        }

        if training && self.rng.random::<f64>() < self.epsilon {
            return valid_actions.choose(&mut self.rng).copied();
        }

        let ctx = self.context(board);
        let key_actions: Vec<usize> = valid_actions
            .iter()
            .map(|&action| ctx.map_action_to_key(action))
            .collect();
        let best = self.q_table.greedy_actions(&ctx.key, &key_actions);
        best.choose(&mut self.rng)
            .map(|&action| ctx.map_action_to_board(action))
    }

    /// One-step Bellman update on key-coordinate `action`. Returns the new value.
    ///
    /// An `action` outside `0..9` leaves the table unchanged and returns `0.0`.
    pub fn update(
        &mut self,
        state: &StateKey,
        action: usize,
        reward: f64,
        next_state: &StateKey,
        terminal: bool,
    ) -> f64 {
        self.q_table.q_learning_update(
            state,
            action,
            reward,
            next_state,
            terminal,
            self.hyperparameters.learning_rate,
            self.hyperparameters.discount_factor,
        )
    }

    /// Decay epsilon after a completed episode, floored at `epsilon_min`
    pub fn decay_epsilon(&mut self) {
        self.epsilon =
            (self.epsilon * self.hyperparameters.epsilon_decay).max(self.hyperparameters.epsilon_min);
    }

    /// Override the exploration rate, clamped to `[epsilon_min, 1]`
    pub fn set_epsilon(&mut self, epsilon: f64) {
        self.epsilon = epsilon.clamp(self.hyperparameters.epsilon_min, 1.0);
    }

    /// Current estimates for every valid action, in board coordinates
    pub fn q_values(&self, board: &Board) -> Vec<(usize, f64)> {
        let ctx = self.context(board);
        board
            .valid_actions()
            .into_iter()
            .map(|action| (action, self.q_table.get(&ctx.key, ctx.map_action_to_key(action))))
            .collect()
    }

    /// Gap between the best and second-best valid action; 1.0 when the
    /// choice is forced or there is none
    pub fn policy_strength(&self, board: &Board) -> f64 {
        let mut values: Vec<f64> = self.q_values(board).into_iter().map(|(_, q)| q).collect();
        if values.len() < 2 {
            return 1.0;
        }
        values.sort_by(|a, b| b.total_cmp(a));
        values[0] - values[1]
    }

    /// Record a finished episode from the tracked seat's perspective
    pub fn record_episode(&mut self, result: PlayerResult, reward: f64) {
        let table_size = self.q_table.len();
        self.stats.record(result, reward, self.epsilon, table_size);
    }

    pub fn reset_stats(&mut self) {
        self.stats = TrainingStats::default();
    }

    pub fn win_rate(&self) -> f64 {
        self.stats.win_rate()
    }

    pub fn stats(&self) -> AgentStats {
        AgentStats {
            episodes: self.stats.episodes,
            wins: self.stats.wins,
            losses: self.stats.losses,
            draws: self.stats.draws,
            avg_reward: self.stats.avg_reward(),
            epsilon: self.epsilon,
            table_size: self.q_table.len(),
        }
    }

    /// Encode the agent as a MessagePack snapshot
    pub fn serialize(&self) -> Result<Vec<u8>> {
        SavedAgent::from_agent(self).to_bytes()
    }

    /// Rebuild an agent from [`Self::serialize`] output.
    ///
    /// # Errors
    ///
    /// Fails with [`crate::Error::CorruptSnapshot`] on undecodable bytes and
    /// [`crate::Error::UnsupportedSnapshotVersion`] on a format mismatch.
    pub fn deserialize(bytes: &[u8]) -> Result<Self> {
        SavedAgent::from_bytes(bytes)?.to_agent()
    }

    /// Forget everything learned and restart exploration
    pub fn reset(&mut self) {
        self.q_table.clear();
        self.epsilon = self.hyperparameters.epsilon;
        self.reset_stats();
        self.rng = build_rng(self.rng_seed);
    }
}

/// Greedy play: the trained policy with exploration switched off
impl Policy for QLearningAgent {
    fn choose_action(&mut self, board: &Board) -> Option<usize> {
        self.select_action(board, false)
    }

    fn name(&self) -> &str {
        "Q-Learning"
    }
}
