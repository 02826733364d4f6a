//! Observer port - abstraction for training observation and data collection
//!
//! Observers receive self-play events without the trainer knowing about
//! progress bars, files or metric sinks.

use crate::{
    Result,
    q_learning::AgentStats,
    tictactoe::{Board, GameOutcome, Player},
};

/// Observer trait for monitoring training
///
/// # Event Sequence
///
/// 1. `on_training_start(total_episodes)` - once
/// 2. For each completed episode:
///    - `on_episode_start(episode)`
///    - `on_move(...)` - for each move, before it is applied
///    - `on_episode_end(episode, outcome, stats)` - after updates and decay
/// 3. `on_training_end()` - once, also after an early stop
///
/// # Examples
///
/// ```no_run
/// use noughts::{ports::Observer, q_learning::AgentStats, tictactoe::GameOutcome};
///
/// struct DrawCounter {
///     draws: usize,
/// }
///
/// impl Observer for DrawCounter {
///     fn on_episode_end(
///         &mut self,
///         _episode: usize,
///         outcome: GameOutcome,
///         _stats: &AgentStats,
///     ) -> noughts::Result<()> {
///         if outcome == GameOutcome::Draw {
///             self.draws += 1;
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait Observer: Send {
    fn on_training_start(&mut self, _total_episodes: usize) -> Result<()> {
        Ok(())
    }

    fn on_episode_start(&mut self, _episode: usize) -> Result<()> {
        Ok(())
    }

    /// Called with the board as it was before `action` was played.
    ///
    /// `q_values` are the mover's estimates for every valid action, in board
    /// coordinates, before this episode's updates.
    fn on_move(
        &mut self,
        _episode: usize,
        _step: usize,
        _player: Player,
        _board: &Board,
        _action: usize,
        _q_values: &[(usize, f64)],
    ) -> Result<()> {
        Ok(())
    }

    /// Called once the episode's updates and epsilon decay are applied.
    fn on_episode_end(
        &mut self,
        _episode: usize,
        _outcome: GameOutcome,
        _stats: &AgentStats,
    ) -> Result<()> {
        Ok(())
    }

    /// Called when training completes. Finalize outputs here.
    fn on_training_end(&mut self) -> Result<()> {
        Ok(())
    }
}
