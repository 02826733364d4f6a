//! Shared helpers for the integration tests.

#![allow(dead_code)]

use noughts::tictactoe::Board;
use rand::{SeedableRng, rngs::StdRng, seq::IndexedRandom};

/// Play `moves` from the empty board, panicking on an illegal move.
pub fn play(moves: &[usize]) -> Board {
    let mut board = Board::new();
    for &m in moves {
        assert!(board.apply_move(m), "move {m} rejected on\n{board}");
    }
    board
}

/// Every position reached by `games` seeded random games, in play order.
pub fn random_positions(games: usize, seed: u64) -> Vec<Board> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut positions = Vec::new();
    for _ in 0..games {
        let mut board = Board::new();
        positions.push(board.clone());
        while let Some(&action) = board.valid_actions().choose(&mut rng) {
            board.apply_move(action);
            positions.push(board.clone());
        }
    }
    positions
}
