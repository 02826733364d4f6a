//! Policy port - anything that can pick a move on a board
//!
//! Evaluation plays policies against each other without knowing whether a
//! side is a trained table, a uniform baseline or something else.

use rand::{SeedableRng, rngs::StdRng, seq::IndexedRandom};

use crate::tictactoe::Board;

/// Move selection without learning
///
/// # Examples
///
/// ```
/// use noughts::{ports::{Policy, RandomPolicy}, tictactoe::Board};
///
/// let mut policy = RandomPolicy::with_seed(3);
/// let board = Board::new();
/// assert!(policy.choose_action(&board).is_some());
/// ```
pub trait Policy {
    /// Pick a cell index for the player to move.
    ///
    /// Returns `None` when the board has no valid actions.
    fn choose_action(&mut self, board: &Board) -> Option<usize>;

    /// Name used in logs and reports
    fn name(&self) -> &str;
}

/// Uniform random baseline over the valid actions
#[derive(Debug, Clone)]
pub struct RandomPolicy {
    rng: StdRng,
}

impl RandomPolicy {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_rng(&mut rand::rng()),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl Policy for RandomPolicy {
    fn choose_action(&mut self, board: &Board) -> Option<usize> {
        board.valid_actions().choose(&mut self.rng).copied()
    }

    fn name(&self) -> &str {
        "Random"
    }
}
