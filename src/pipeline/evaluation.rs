//! Head-to-head evaluation of fixed policies

use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    ports::{Policy, RandomPolicy},
    tictactoe::{Board, GameOutcome, Player, PlayerResult},
};

/// Results of an evaluation run, from the evaluated seat
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub games: usize,
    pub seat: Player,
    pub wins: usize,
    pub draws: usize,
    pub losses: usize,
}

impl EvaluationResult {
    fn rate(&self, count: usize) -> f64 {
        if self.games == 0 {
            0.0
        } else {
            count as f64 / self.games as f64
        }
    }

    pub fn win_rate(&self) -> f64 {
        self.rate(self.wins)
    }

    pub fn draw_rate(&self) -> f64 {
        self.rate(self.draws)
    }

    pub fn loss_rate(&self) -> f64 {
        self.rate(self.losses)
    }

    /// Share of games won or drawn
    pub fn non_losing_rate(&self) -> f64 {
        self.rate(self.wins + self.draws)
    }
}

/// Play one game and return its outcome.
///
/// # Errors
///
/// Returns [`Error::InvalidConfiguration`] if a policy passes on a live
/// board or picks an illegal cell.
pub fn play_game(x: &mut dyn Policy, o: &mut dyn Policy) -> Result<GameOutcome> {
    let mut board = Board::new();
    loop {
        if let Some(outcome) = board.outcome() {
            return Ok(outcome);
        }
        let mover: &mut dyn Policy = match board.current_player() {
            Player::X => &mut *x,
            Player::O => &mut *o,
        };
        let action = mover
            .choose_action(&board)
            .ok_or_else(|| Error::InvalidConfiguration {
                message: format!("policy '{}' returned no move on a live board", mover.name()),
            })?;
        if !board.apply_move(action) {
            return Err(Error::InvalidConfiguration {
                message: format!("policy '{}' chose illegal cell {action}", mover.name()),
            });
        }
    }
}

/// Play `games` games of `policy` in `seat` against `opponent`
pub fn evaluate(
    policy: &mut dyn Policy,
    seat: Player,
    opponent: &mut dyn Policy,
    games: usize,
) -> Result<EvaluationResult> {
    let mut result = EvaluationResult {
        games,
        seat,
        wins: 0,
        draws: 0,
        losses: 0,
    };

    for _ in 0..games {
        let outcome = match seat {
            Player::X => play_game(policy, opponent)?,
            Player::O => play_game(opponent, policy)?,
        };
        match outcome.result_for(seat) {
            PlayerResult::Win => result.wins += 1,
            PlayerResult::Draw => result.draws += 1,
            PlayerResult::Loss => result.losses += 1,
        }
    }

    log::info!(
        "{} as {seat} vs {}: {} wins, {} draws, {} losses over {games} games",
        policy.name(),
        opponent.name(),
        result.wins,
        result.draws,
        result.losses
    );
    Ok(result)
}

/// Evaluate against a uniform random opponent
pub fn evaluate_against_random(
    policy: &mut dyn Policy,
    seat: Player,
    games: usize,
    seed: Option<u64>,
) -> Result<EvaluationResult> {
    let mut opponent = match seed {
        Some(seed) => RandomPolicy::with_seed(seed),
        None => RandomPolicy::new(),
    };
    evaluate(policy, seat, &mut opponent, games)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Always takes the lowest free cell
    struct FirstFree;

    impl Policy for FirstFree {
        fn choose_action(&mut self, board: &Board) -> Option<usize> {
            board.valid_actions().first().copied()
        }

        fn name(&self) -> &str {
            "FirstFree"
        }
    }

    #[test]
    fn test_deterministic_game() {
        // X: 0, 2, 4, 6 -> diagonal 2-4-6 wins
        let outcome = play_game(&mut FirstFree, &mut FirstFree).unwrap();
        assert_eq!(outcome, GameOutcome::Win(Player::X));
    }

    #[test]
    fn test_evaluate_counts_from_seat() {
        let result = evaluate(&mut FirstFree, Player::O, &mut FirstFree, 4).unwrap();
        assert_eq!(result.losses, 4);
        assert_eq!(result.non_losing_rate(), 0.0);
    }

    #[test]
    fn test_random_vs_random_totals() {
        let mut policy = RandomPolicy::with_seed(1);
        let result = evaluate_against_random(&mut policy, Player::X, 100, Some(2)).unwrap();
        assert_eq!(result.wins + result.draws + result.losses, 100);
        assert!((result.win_rate() + result.draw_rate() + result.loss_rate() - 1.0).abs() < 1e-12);
    }
}
