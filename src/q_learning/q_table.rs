//! Q-table implementation for temporal difference learning

use std::collections::{HashMap, hash_map};

use serde::{Deserialize, Serialize};

use crate::types::StateKey;

/// Per-action values for one state, indexed by cell in key coordinates
pub type ActionValues = [f64; 9];

/// Q-table mapping state keys to per-action value estimates
///
/// Unseen (state, action) pairs read as `0.0`. Entries are created on first
/// update and never removed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QTable {
    values: HashMap<StateKey, ActionValues>,
}

impl QTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get Q-value for a state-action pair; actions outside `0..9` read as `0.0`
    pub fn get(&self, state: &StateKey, action: usize) -> f64 {
        self.values
            .get(state)
            .and_then(|values| values.get(action))
            .copied()
            .unwrap_or(0.0)
    }

    /// Set Q-value for a state-action pair. Actions outside `0..9` are ignored.
    pub fn set(&mut self, state: &StateKey, action: usize, value: f64) {
        if let Some(slot) = self.slot(state, action) {
            *slot = value;
        }
    }

    fn slot(&mut self, state: &StateKey, action: usize) -> Option<&mut f64> {
        if action >= 9 {
            log::warn!("Ignoring out-of-range action {action} for state {state}");
            return None;
        }
        self.values
            .entry(state.clone())
            .or_insert([0.0; 9])
            .get_mut(action)
    }

    /// Maximum Q-value over `actions`, `0.0` when there are none
    pub fn max_q(&self, state: &StateKey, actions: &[usize]) -> f64 {
        if actions.is_empty() {
            return 0.0;
        }
        actions
            .iter()
            .map(|&action| self.get(state, action))
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Every action in `actions` whose value equals the maximum
    pub fn greedy_actions(&self, state: &StateKey, actions: &[usize]) -> Vec<usize> {
        let best = self.max_q(state, actions);
        actions
            .iter()
            .copied()
            .filter(|&action| self.get(state, action) == best)
            .collect()
    }

    /// Q-learning update: off-policy TD control
    ///
    /// Q(s,a) ← Q(s,a) + α[r + γ max_a' Q(s',a') - Q(s,a)]
    ///
    /// The max runs over the empty cells of `next_state`. A terminal
    /// transition uses the reward alone as its target. Returns the new value,
    /// or `0.0` without touching the table when `action` is outside `0..9`.
    #[allow(clippy::too_many_arguments)]
    pub fn q_learning_update(
        &mut self,
        state: &StateKey,
        action: usize,
        reward: f64,
        next_state: &StateKey,
        terminal: bool,
        learning_rate: f64,
        discount_factor: f64,
    ) -> f64 {
        let target = if terminal {
            reward
        } else {
            reward + discount_factor * self.max_q(next_state, &next_state.empty_positions())
        };
        let Some(value) = self.slot(state, action) else {
            return 0.0;
        };
        *value += learning_rate * (target - *value);
        *value
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Number of states with at least one stored value
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> hash_map::Iter<'_, StateKey, ActionValues> {
        self.values.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> StateKey {
        StateKey::parse(s).unwrap()
    }

    #[test]
    fn test_qtable_initialization() {
        let qtable = QTable::new();
        assert_eq!(qtable.get(&key("........."), 0), 0.0);
        assert!(qtable.is_empty());
    }

    #[test]
    fn test_qtable_set_get() {
        let mut qtable = QTable::new();
        let state = key(".........");
        qtable.set(&state, 4, 1.5);
        assert_eq!(qtable.get(&state, 4), 1.5);
        assert_eq!(qtable.len(), 1);
    }

    #[test]
    fn test_max_q() {
        let mut qtable = QTable::new();
        let state = key(".........");
        qtable.set(&state, 0, 0.5);
        qtable.set(&state, 1, 1.5);
        qtable.set(&state, 2, 0.8);

        assert_eq!(qtable.max_q(&state, &[0, 1, 2]), 1.5);
        assert_eq!(qtable.max_q(&state, &[]), 0.0);
    }

    #[test]
    fn test_max_q_ignores_actions_outside_the_list() {
        let mut qtable = QTable::new();
        let state = key(".........");
        qtable.set(&state, 0, -0.5);
        qtable.set(&state, 1, -0.2);
        qtable.set(&state, 8, 3.0);

        assert_eq!(qtable.max_q(&state, &[0, 1]), -0.2);
    }

    #[test]
    fn test_greedy_actions_returns_all_ties() {
        let mut qtable = QTable::new();
        let state = key(".........");
        qtable.set(&state, 1, 1.0);
        qtable.set(&state, 5, 1.0);
        qtable.set(&state, 2, 0.3);

        assert_eq!(qtable.greedy_actions(&state, &[1, 2, 5]), vec![1, 5]);
        assert_eq!(
            qtable.greedy_actions(&key("X........"), &[1, 2, 3]),
            vec![1, 2, 3]
        );
    }

    #[test]
    fn test_q_learning_update() {
        let mut qtable = QTable::new();
        let state = key(".........");
        let next_state = key("X...O....");

        qtable.set(&next_state, 1, 1.0);
        qtable.set(&next_state, 2, 2.0);
        // occupied cell, must not take part in the max
        qtable.set(&next_state, 0, 9.0);

        let updated = qtable.q_learning_update(&state, 4, 0.0, &next_state, false, 0.5, 0.99);

        // Q(s,4) = 0.0 + 0.5 * (0.0 + 0.99 * 2.0 - 0.0) = 0.99
        assert!((updated - 0.99).abs() < 1e-12);
        assert_eq!(qtable.get(&state, 4), updated);
    }

    #[test]
    fn test_terminal_update_ignores_next_state() {
        let mut qtable = QTable::new();
        let state = key("XX.OO....");
        let next_state = key("XXXOO....");
        qtable.set(&next_state, 5, 10.0);

        let updated = qtable.q_learning_update(&state, 2, 1.0, &next_state, true, 0.5, 0.9);
        assert!((updated - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_out_of_range_action_is_ignored() {
        let mut qtable = QTable::new();
        let state = key(".........");

        qtable.set(&state, 9, 1.0);
        assert_eq!(qtable.get(&state, 9), 0.0);
        assert_eq!(qtable.q_learning_update(&state, 12, 1.0, &state, true, 0.5, 0.9), 0.0);
        assert!(qtable.is_empty());
    }

    #[test]
    fn test_unseen_next_state_bootstraps_from_zero() {
        let mut qtable = QTable::new();
        let state = key(".........");
        let updated =
            qtable.q_learning_update(&state, 0, 0.0, &key("X...O...."), false, 0.5, 0.9);
        assert_eq!(updated, 0.0);
        assert_eq!(qtable.len(), 1);
    }
}
