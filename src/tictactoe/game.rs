//! Game status and outcome types

use serde::{Deserialize, Serialize};

use super::board::Player;

/// Status of a board as reported by [`super::Board::check_winner`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameStatus {
    InProgress,
    Won(Player),
    Draw,
}

impl GameStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, GameStatus::InProgress)
    }

    /// The finished-game summary, `None` while the game is still running
    pub fn outcome(self) -> Option<GameOutcome> {
        match self {
            GameStatus::InProgress => None,
            GameStatus::Won(player) => Some(GameOutcome::Win(player)),
            GameStatus::Draw => Some(GameOutcome::Draw),
        }
    }
}

/// Outcome of a finished game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameOutcome {
    Win(Player),
    Draw,
}

/// A finished game seen from one player's seat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerResult {
    Win,
    Loss,
    Draw,
}

impl GameOutcome {
    pub fn result_for(self, player: Player) -> PlayerResult {
        match self {
            GameOutcome::Win(winner) if winner == player => PlayerResult::Win,
            GameOutcome::Win(_) => PlayerResult::Loss,
            GameOutcome::Draw => PlayerResult::Draw,
        }
    }
}
