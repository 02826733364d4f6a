//! Newtype wrappers for value-table keys.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::tictactoe::Cell;

/// Value-table key: the 9-character row-major encoding of a grid.
///
/// Cells encode as `.`, `X` and `O`. Keys order lexicographically, which is
/// the total order used to pick the canonical symmetry representative.
/// Deserialization goes through [`StateKey::parse`], so a decoded key is
/// always well formed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StateKey(String);

impl StateKey {
    pub fn from_cells(cells: &[Cell; 9]) -> Self {
        StateKey(cells.iter().map(|&c| c.to_char()).collect())
    }

    /// Parse and validate an encoded key.
    ///
    /// # Errors
    ///
    /// Returns an error unless the input is exactly 9 of `.`, `X`, `O`.
    pub fn parse(encoded: &str) -> Result<Self, crate::Error> {
        let count = encoded.chars().count();
        if count != 9 {
            return Err(crate::Error::InvalidBoardLength {
                expected: 9,
                got: count,
                context: encoded.to_string(),
            });
        }
        if let Some((position, character)) = encoded
            .chars()
            .enumerate()
            .find(|&(_, c)| !matches!(c, '.' | 'X' | 'O'))
        {
            return Err(crate::Error::InvalidCellCharacter {
                character,
                position,
                context: encoded.to_string(),
            });
        }
        Ok(StateKey(encoded.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Decode the key back into cells
    pub fn cells(&self) -> [Cell; 9] {
        let mut cells = [Cell::Empty; 9];
        for (slot, c) in cells.iter_mut().zip(self.0.chars()) {
            *slot = Cell::from_char(c).unwrap_or(Cell::Empty);
        }
        cells
    }

    /// Legal actions in key coordinates (the empty cells)
    pub fn empty_positions(&self) -> Vec<usize> {
        self.0
            .char_indices()
            .filter(|&(_, c)| c == '.')
            .map(|(i, _)| i)
            .collect()
    }
}

impl TryFrom<String> for StateKey {
    type Error = crate::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        StateKey::parse(&value)
    }
}

impl From<StateKey> for String {
    fn from(key: StateKey) -> Self {
        key.0
    }
}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
