//! Tic-Tac-Toe rules: board, winning lines and D4 symmetry

pub mod board;
pub mod game;
pub mod lines;
pub mod symmetry;

pub use board::{Board, Cell, Player};
pub use game::{GameOutcome, GameStatus, PlayerResult};
pub use lines::WINNING_LINES;
pub use symmetry::{CanonicalContext, D4Transform};
