//! Subcommands of the `noughts` binary

use clap::ValueEnum;

use crate::tictactoe::Player;

pub mod evaluate;
pub mod train;

/// Seat selected on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Seat {
    /// First player
    #[value(aliases = ["first", "X"])]
    X,
    /// Second player
    #[value(aliases = ["second", "O"])]
    O,
}

impl From<Seat> for Player {
    fn from(seat: Seat) -> Self {
        match seat {
            Seat::X => Player::X,
            Seat::O => Player::O,
        }
    }
}
