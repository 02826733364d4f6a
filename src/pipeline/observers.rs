//! Observer implementations for self-play training
//!
//! Observers allow composable data collection during training without coupling
//! the trainer to specific output formats.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};

use crate::{
    Result,
    ports::Observer,
    q_learning::AgentStats,
    tictactoe::{Board, GameOutcome, Player},
};

/// Observation of a single move during an episode
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepObservation {
    pub step: usize,
    pub player: Player,
    /// Board before the move, row-major `.XO`
    pub board: String,
    pub action: usize,
    /// Mover's value estimates before the episode's updates
    pub q_values: Vec<(usize, f64)>,
}

/// Complete observation of one self-play episode
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Observation {
    pub episode: usize,
    pub outcome: String,
    pub steps: Vec<StepObservation>,
    pub total_moves: usize,
    /// Epsilon after this episode's decay
    pub epsilon: f64,
    pub table_size: usize,
}

/// Progress bar observer - shows training progress
#[derive(Default)]
pub struct ProgressObserver {
    progress_bar: Option<ProgressBar>,
    x_wins: usize,
    o_wins: usize,
    draws: usize,
}

impl ProgressObserver {
    pub fn new() -> Self {
        Self::default()
    }

    fn message(&self) -> String {
        format!("{} O:{} D:{}", self.x_wins, self.o_wins, self.draws)
    }
}

impl Observer for ProgressObserver {
    fn on_training_start(&mut self, total_episodes: usize) -> Result<()> {
        let pb = ProgressBar::new(total_episodes as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} episodes (X:{msg})")
                .map_err(|e| crate::Error::ProgressBarTemplate {
                    message: e.to_string(),
                })?
                .progress_chars("=>-"),
        );
        self.progress_bar = Some(pb);
        Ok(())
    }

    fn on_episode_end(
        &mut self,
        episode: usize,
        outcome: GameOutcome,
        _stats: &AgentStats,
    ) -> Result<()> {
        match outcome {
            GameOutcome::Win(Player::X) => self.x_wins += 1,
            GameOutcome::Win(Player::O) => self.o_wins += 1,
            GameOutcome::Draw => self.draws += 1,
        }

        if let Some(pb) = &self.progress_bar {
            pb.set_position(episode as u64 + 1);
            pb.set_message(self.message());
        }
        Ok(())
    }

    fn on_training_end(&mut self) -> Result<()> {
        if let Some(pb) = &self.progress_bar {
            pb.finish_with_message(self.message());
        }
        Ok(())
    }
}

/// Metrics observer - tracks outcome rates, game length and exploration
#[derive(Debug, Default)]
pub struct MetricsObserver {
    x_wins: usize,
    o_wins: usize,
    draws: usize,
    total_episodes: usize,
    move_counts: Vec<usize>,
    epsilon_curve: Vec<f64>,
    final_table_size: usize,
}

impl MetricsObserver {
    pub fn new() -> Self {
        Self::default()
    }

    fn rate(&self, count: usize) -> f64 {
        if self.total_episodes == 0 {
            0.0
        } else {
            count as f64 / self.total_episodes as f64
        }
    }

    pub fn x_win_rate(&self) -> f64 {
        self.rate(self.x_wins)
    }

    pub fn o_win_rate(&self) -> f64 {
        self.rate(self.o_wins)
    }

    pub fn draw_rate(&self) -> f64 {
        self.rate(self.draws)
    }

    /// Get average game length in moves
    pub fn avg_game_length(&self) -> f64 {
        if self.move_counts.is_empty() {
            0.0
        } else {
            self.move_counts.iter().sum::<usize>() as f64 / self.move_counts.len() as f64
        }
    }

    /// Epsilon after each observed episode
    pub fn epsilon_curve(&self) -> &[f64] {
        &self.epsilon_curve
    }

    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            total_episodes: self.total_episodes,
            x_wins: self.x_wins,
            o_wins: self.o_wins,
            draws: self.draws,
            x_win_rate: self.x_win_rate(),
            o_win_rate: self.o_win_rate(),
            draw_rate: self.draw_rate(),
            avg_game_length: self.avg_game_length(),
            final_table_size: self.final_table_size,
        }
    }
}

/// Summary of training metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSummary {
    pub total_episodes: usize,
    pub x_wins: usize,
    pub o_wins: usize,
    pub draws: usize,
    pub x_win_rate: f64,
    pub o_win_rate: f64,
    pub draw_rate: f64,
    pub avg_game_length: f64,
    pub final_table_size: usize,
}

impl Observer for MetricsObserver {
    fn on_episode_start(&mut self, _episode: usize) -> Result<()> {
        self.move_counts.push(0);
        Ok(())
    }

    fn on_move(
        &mut self,
        _episode: usize,
        _step: usize,
        _player: Player,
        _board: &Board,
        _action: usize,
        _q_values: &[(usize, f64)],
    ) -> Result<()> {
        if let Some(last) = self.move_counts.last_mut() {
            *last += 1;
        }
        Ok(())
    }

    fn on_episode_end(
        &mut self,
        _episode: usize,
        outcome: GameOutcome,
        stats: &AgentStats,
    ) -> Result<()> {
        self.total_episodes += 1;
        match outcome {
            GameOutcome::Win(Player::X) => self.x_wins += 1,
            GameOutcome::Win(Player::O) => self.o_wins += 1,
            GameOutcome::Draw => self.draws += 1,
        }
        self.epsilon_curve.push(stats.epsilon);
        self.final_table_size = stats.table_size;
        Ok(())
    }
}

/// JSONL observer - exports one JSON object per episode
pub struct JsonlObserver {
    writer: BufWriter<File>,
    current_steps: Vec<StepObservation>,
}

impl JsonlObserver {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| crate::Error::Io {
            operation: format!("create observation log {}", path.display()),
            source,
        })?;
        Ok(Self {
            writer: BufWriter::new(file),
            current_steps: Vec::new(),
        })
    }
}

impl Observer for JsonlObserver {
    fn on_episode_start(&mut self, _episode: usize) -> Result<()> {
        self.current_steps.clear();
        Ok(())
    }

    fn on_move(
        &mut self,
        _episode: usize,
        step: usize,
        player: Player,
        board: &Board,
        action: usize,
        q_values: &[(usize, f64)],
    ) -> Result<()> {
        self.current_steps.push(StepObservation {
            step,
            player,
            board: board.state_key(false).to_string(),
            action,
            q_values: q_values.to_vec(),
        });
        Ok(())
    }

    fn on_episode_end(
        &mut self,
        episode: usize,
        outcome: GameOutcome,
        stats: &AgentStats,
    ) -> Result<()> {
        let observation = Observation {
            episode,
            outcome: format!("{outcome:?}"),
            total_moves: self.current_steps.len(),
            steps: std::mem::take(&mut self.current_steps),
            epsilon: stats.epsilon,
            table_size: stats.table_size,
        };

        serde_json::to_writer(&mut self.writer, &observation)?;
        writeln!(&mut self.writer)?;
        Ok(())
    }

    fn on_training_end(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(epsilon: f64, table_size: usize) -> AgentStats {
        AgentStats {
            episodes: 0,
            wins: 0,
            losses: 0,
            draws: 0,
            avg_reward: 0.0,
            epsilon,
            table_size,
        }
    }

    #[test]
    fn test_metrics_observer() {
        let mut observer = MetricsObserver::new();
        assert_eq!(observer.x_win_rate(), 0.0);

        let board = Board::new();
        observer.on_episode_start(0).unwrap();
        for step in 0..5 {
            observer
                .on_move(0, step, Player::X, &board, step, &[])
                .unwrap();
        }
        observer
            .on_episode_end(0, GameOutcome::Win(Player::X), &stats(0.9, 10))
            .unwrap();
        observer.on_episode_start(1).unwrap();
        observer
            .on_episode_end(1, GameOutcome::Draw, &stats(0.8, 12))
            .unwrap();
        observer.on_episode_start(2).unwrap();
        observer
            .on_episode_end(2, GameOutcome::Win(Player::X), &stats(0.7, 15))
            .unwrap();

        let summary = observer.summary();
        assert_eq!(summary.total_episodes, 3);
        assert_eq!((summary.x_wins, summary.o_wins, summary.draws), (2, 0, 1));
        assert!((observer.x_win_rate() - 0.666).abs() < 0.01);
        assert_eq!(observer.avg_game_length(), 5.0 / 3.0);
        assert_eq!(observer.epsilon_curve(), &[0.9, 0.8, 0.7]);
        assert_eq!(summary.final_table_size, 15);
    }

    #[test]
    fn test_jsonl_observer_writes_one_line_per_episode() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("observations.jsonl");
        let mut observer = JsonlObserver::new(&path).unwrap();

        let board = Board::new();
        for episode in 0..2 {
            observer.on_episode_start(episode).unwrap();
            observer
                .on_move(episode, 0, Player::X, &board, 4, &[(4, 0.25)])
                .unwrap();
            observer
                .on_episode_end(episode, GameOutcome::Draw, &stats(0.5, 3))
                .unwrap();
        }
        observer.on_training_end().unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: Observation = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first.episode, 0);
        assert_eq!(first.total_moves, 1);
        assert_eq!(first.steps[0].board, ".........");
        assert_eq!(first.steps[0].q_values, vec![(4, 0.25)]);
        assert_eq!(first.outcome, "Draw");
    }
}
