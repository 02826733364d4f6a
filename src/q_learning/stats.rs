//! Episode statistics kept alongside the value table

use serde::{Deserialize, Serialize};

use crate::tictactoe::PlayerResult;

/// Running counters over completed episodes. Observability only; learning
/// never reads them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingStats {
    pub episodes: usize,
    pub wins: usize,
    pub losses: usize,
    pub draws: usize,
    pub total_reward: f64,
    /// Epsilon after each episode's decay
    pub epsilon_history: Vec<f64>,
    /// Number of table states after each episode
    pub table_size_history: Vec<usize>,
}

impl TrainingStats {
    pub fn record(&mut self, result: PlayerResult, reward: f64, epsilon: f64, table_size: usize) {
        self.episodes += 1;
        self.total_reward += reward;
        match result {
            PlayerResult::Win => self.wins += 1,
            PlayerResult::Loss => self.losses += 1,
            PlayerResult::Draw => self.draws += 1,
        }
        self.epsilon_history.push(epsilon);
        self.table_size_history.push(table_size);
    }

    pub fn avg_reward(&self) -> f64 {
        if self.episodes == 0 {
            0.0
        } else {
            self.total_reward / self.episodes as f64
        }
    }

    pub fn win_rate(&self) -> f64 {
        rate(self.wins, self.episodes)
    }

    pub fn loss_rate(&self) -> f64 {
        rate(self.losses, self.episodes)
    }

    pub fn draw_rate(&self) -> f64 {
        rate(self.draws, self.episodes)
    }
}

fn rate(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64
    }
}

/// Snapshot returned by [`super::QLearningAgent::stats`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgentStats {
    pub episodes: usize,
    pub wins: usize,
    pub losses: usize,
    pub draws: usize,
    pub avg_reward: f64,
    pub epsilon: f64,
    pub table_size: usize,
}
