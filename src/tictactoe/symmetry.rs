//! D4 symmetry group operations for board canonicalization

use serde::{Deserialize, Serialize};

use super::board::Cell;
use crate::types::StateKey;

/// D4 symmetry transformation (dihedral group of the square)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct D4Transform {
    /// Clockwise rotation in degrees (0, 90, 180, 270)
    pub rotation: u16,
    /// Whether to mirror across the vertical axis before rotating
    pub reflection: bool,
}

impl D4Transform {
    pub fn identity() -> Self {
        D4Transform {
            rotation: 0,
            reflection: false,
        }
    }

    /// All 8 elements of the group, identity first
    pub fn all() -> [D4Transform; 8] {
        let mut transforms = [D4Transform::identity(); 8];
        for (i, rotation) in [0, 90, 180, 270].into_iter().enumerate() {
            transforms[2 * i] = D4Transform {
                rotation,
                reflection: false,
            };
            transforms[2 * i + 1] = D4Transform {
                rotation,
                reflection: true,
            };
        }
        transforms
    }

    /// Where the cell at `pos` (0-8) ends up after the transform
    pub fn transform_position(&self, pos: usize) -> usize {
        let (mut row, mut col) = (pos / 3, pos % 3);

        if self.reflection {
            col = 2 - col;
        }

        for _ in 0..(self.rotation / 90) {
            let new_row = col;
            let new_col = 2 - row;
            row = new_row;
            col = new_col;
        }

        row * 3 + col
    }

    pub fn apply_to_cells(&self, cells: &[Cell; 9]) -> [Cell; 9] {
        let mut transformed = [Cell::Empty; 9];
        for (idx, &cell) in cells.iter().enumerate() {
            transformed[self.transform_position(idx)] = cell;
        }
        transformed
    }

    pub fn inverse(&self) -> D4Transform {
        if self.reflection {
            // reflect-then-rotate is an involution for every rotation
            *self
        } else {
            D4Transform {
                rotation: (360 - self.rotation) % 360,
                reflection: false,
            }
        }
    }
}

/// Result of canonicalizing a board: the lookup key and the transform that
/// maps board coordinates onto key coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalContext {
    pub key: StateKey,
    pub transform: D4Transform,
}

impl CanonicalContext {
    /// Context without symmetry reduction: the flattened grid, identity transform
    pub fn plain(cells: &[Cell; 9]) -> Self {
        Self {
            key: StateKey::from_cells(cells),
            transform: D4Transform::identity(),
        }
    }

    /// Lexicographically smallest encoding over the 8 transforms
    ///
    /// Ties (boards with internal symmetry) keep the first transform in
    /// [`D4Transform::all`] order.
    pub fn canonical(cells: &[Cell; 9]) -> Self {
        let mut best = Self::plain(cells);
        for transform in D4Transform::all().into_iter().skip(1) {
            let key = StateKey::from_cells(&transform.apply_to_cells(cells));
            if key < best.key {
                best = Self { key, transform };
            }
        }
        best
    }

    pub fn map_action_to_key(&self, action: usize) -> usize {
        self.transform.transform_position(action)
    }

    pub fn map_action_to_board(&self, action: usize) -> usize {
        self.transform.inverse().transform_position(action)
    }
}
