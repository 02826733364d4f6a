//! Winning line detection

use super::board::{Cell, Player};

/// Winning line indices on the 3x3 board, in scan priority order
pub const WINNING_LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8], // rows
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8], // columns
    [0, 4, 8],
    [2, 4, 6], // diagonals
];

/// First completed line in scan order, with the player owning it
pub fn winning_line(cells: &[Cell; 9]) -> Option<(Player, [usize; 3])> {
    WINNING_LINES.iter().find_map(|&line| {
        let first = cells[line[0]].to_player()?;
        line.iter()
            .all(|&idx| cells[idx] == cells[line[0]])
            .then_some((first, line))
    })
}
