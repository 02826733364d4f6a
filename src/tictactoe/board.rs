//! Board state representation and move application

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use super::{
    game::{GameOutcome, GameStatus},
    lines,
    symmetry::CanonicalContext,
};
use crate::types::StateKey;

/// A cell on the Tic-Tac-Toe board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cell {
    Empty,
    X,
    O,
}

impl Cell {
    pub fn to_char(self) -> char {
        match self {
            Cell::Empty => '.',
            Cell::X => 'X',
            Cell::O => 'O',
        }
    }

    pub fn from_char(c: char) -> Option<Cell> {
        match c {
            '.' | ' ' => Some(Cell::Empty),
            'X' | 'x' => Some(Cell::X),
            'O' | 'o' | '0' => Some(Cell::O),
            _ => None,
        }
    }

    pub fn to_player(self) -> Option<Player> {
        match self {
            Cell::X => Some(Player::X),
            Cell::O => Some(Player::O),
            Cell::Empty => None,
        }
    }
}

/// A player in the game. X always opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    X,
    O,
}

impl Player {
    pub fn opponent(self) -> Player {
        match self {
            Player::X => Player::O,
            Player::O => Player::X,
        }
    }

    pub fn to_cell(self) -> Cell {
        match self {
            Player::X => Cell::X,
            Player::O => Cell::O,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_cell().to_char())
    }
}

/// Mutable game board: cells, player to move, move history and cached status
///
/// The board is the single owner of the game rules. Illegal moves are an
/// expected condition during play, so [`Board::apply_move`] reports them with
/// `false` instead of an error.
///
/// # Examples
///
/// ```
/// use noughts::tictactoe::{Board, GameStatus, Player};
///
/// let mut board = Board::new();
/// assert!(board.apply_move(4));
/// assert!(!board.apply_move(4)); // occupied
/// assert_eq!(board.current_player(), Player::O);
/// assert_eq!(board.check_winner(), GameStatus::InProgress);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Board {
    cells: [Cell; 9],
    to_move: Player,
    history: Vec<usize>,
    status: GameStatus,
}

impl Board {
    /// Create a new empty board with X to move
    pub fn new() -> Self {
        Board {
            cells: [Cell::Empty; 9],
            to_move: Player::X,
            history: Vec::new(),
            status: GameStatus::InProgress,
        }
    }

    /// Build a board from raw cells.
    ///
    /// The player to move is inferred from the piece counts (X when X has not
    /// moved more often than O). No turn-count validation is done, so test
    /// positions such as a lone X row are accepted. The history is empty.
    pub fn from_cells(cells: [Cell; 9]) -> Self {
        let x_count = cells.iter().filter(|&&c| c == Cell::X).count();
        let o_count = cells.iter().filter(|&&c| c == Cell::O).count();
        let to_move = if x_count <= o_count {
            Player::X
        } else {
            Player::O
        };
        let mut board = Board {
            cells,
            to_move,
            history: Vec::new(),
            status: GameStatus::InProgress,
        };
        board.status = board.evaluate_status();
        board
    }

    /// Clear all cells, give the move to X and drop the history
    pub fn reset(&mut self) {
        self.cells = [Cell::Empty; 9];
        self.to_move = Player::X;
        self.history.clear();
        self.status = GameStatus::InProgress;
    }

    pub fn cells(&self) -> &[Cell; 9] {
        &self.cells
    }

    pub fn get(&self, pos: usize) -> Cell {
        self.cells[pos]
    }

    pub fn current_player(&self) -> Player {
        self.to_move
    }

    /// Positions played so far, in order
    pub fn history(&self) -> &[usize] {
        &self.history
    }

    /// Empty cells in ascending order; empty once the game is over
    pub fn valid_actions(&self) -> Vec<usize> {
        if self.status.is_terminal() {
            return Vec::new();
        }
        self.empty_positions()
    }

    fn empty_positions(&self) -> Vec<usize> {
        self.cells
            .iter()
            .enumerate()
            .filter(|&(_, &cell)| cell == Cell::Empty)
            .map(|(i, _)| i)
            .collect()
    }

    /// Place the current player's mark at `action`.
    ///
    /// Returns `false` and leaves the board untouched when the game is over,
    /// the index is off the board or the cell is occupied. The player to move
    /// only switches while the game continues.
    pub fn apply_move(&mut self, action: usize) -> bool {
        if self.status.is_terminal() || action >= 9 || self.cells[action] != Cell::Empty {
            return false;
        }

        self.cells[action] = self.to_move.to_cell();
        self.history.push(action);
        self.status = self.evaluate_status();

        if !self.status.is_terminal() {
            self.to_move = self.to_move.opponent();
        }
        true
    }

    /// Rows, then columns, then diagonals; first full line wins
    pub fn check_winner(&self) -> GameStatus {
        self.status
    }

    fn evaluate_status(&self) -> GameStatus {
        if let Some((player, _)) = lines::winning_line(&self.cells) {
            GameStatus::Won(player)
        } else if self.cells.contains(&Cell::Empty) {
            GameStatus::InProgress
        } else {
            GameStatus::Draw
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn winner(&self) -> Option<Player> {
        match self.status {
            GameStatus::Won(player) => Some(player),
            _ => None,
        }
    }

    pub fn outcome(&self) -> Option<GameOutcome> {
        self.status.outcome()
    }

    /// Lookup key for the value table
    ///
    /// With `use_symmetry` the key is the smallest encoding over the 8
    /// rotations and reflections of the grid, so symmetric positions share
    /// one entry.
    pub fn state_key(&self, use_symmetry: bool) -> StateKey {
        self.canonical_context(use_symmetry).key
    }

    /// Key plus the transform needed to map actions into key coordinates
    pub fn canonical_context(&self, use_symmetry: bool) -> CanonicalContext {
        if use_symmetry {
            CanonicalContext::canonical(&self.cells)
        } else {
            CanonicalContext::plain(&self.cells)
        }
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for Board {
    type Err = crate::Error;

    /// Parse 9 row-major cells. `.` or space is empty; newlines and `|` are
    /// ignored so a rendered board parses back.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let chars: Vec<char> = s.chars().filter(|&c| c != '\n' && c != '|').collect();
        if chars.len() < 9 {
            return Err(crate::Error::InvalidBoardLength {
                expected: 9,
                got: chars.len(),
                context: s.to_string(),
            });
        }

        let mut cells = [Cell::Empty; 9];
        for (i, &c) in chars.iter().take(9).enumerate() {
            cells[i] = Cell::from_char(c).ok_or_else(|| crate::Error::InvalidCellCharacter {
                character: c,
                position: i,
                context: s.to_string(),
            })?;
        }

        Ok(Board::from_cells(cells))
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, &cell) in self.cells.iter().enumerate() {
            write!(f, "{}", cell.to_char())?;
            if (i + 1).is_multiple_of(3) && i < 8 {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}
