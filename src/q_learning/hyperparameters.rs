//! Agent hyperparameters and their validation

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Learning hyperparameters for [`super::QLearningAgent`]
///
/// `epsilon` is the starting exploration rate; the agent tracks the decayed
/// value separately. The defaults never explore less than a tenth of the
/// self-play moves, which 5000 episodes need to cover the positions a random
/// opponent walks into.
///
/// # Examples
///
/// ```
/// use noughts::q_learning::Hyperparameters;
///
/// let params = Hyperparameters::default()
///     .with_learning_rate(0.2)
///     .with_epsilon_decay(0.995)
///     .with_symmetry(false);
/// assert!(params.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hyperparameters {
    /// α, in (0, 1]
    pub learning_rate: f64,
    /// γ, in [0, 1]
    pub discount_factor: f64,
    /// Starting exploration rate, in [epsilon_min, 1]
    pub epsilon: f64,
    /// Multiplicative decay per episode, in (0, 1]
    pub epsilon_decay: f64,
    /// Exploration floor, in [0, 1)
    pub epsilon_min: f64,
    /// Collapse rotations and reflections onto one table entry
    pub use_symmetry: bool,
}

impl Default for Hyperparameters {
    fn default() -> Self {
        Self {
            learning_rate: 0.5,
            discount_factor: 0.95,
            epsilon: 1.0,
            epsilon_decay: 0.999,
            epsilon_min: 0.1,
            use_symmetry: true,
        }
    }
}

impl Hyperparameters {
    pub fn with_learning_rate(mut self, value: f64) -> Self {
        self.learning_rate = value;
        self
    }

    pub fn with_discount_factor(mut self, value: f64) -> Self {
        self.discount_factor = value;
        self
    }

    pub fn with_epsilon(mut self, value: f64) -> Self {
        self.epsilon = value;
        self
    }

    pub fn with_epsilon_decay(mut self, value: f64) -> Self {
        self.epsilon_decay = value;
        self
    }

    pub fn with_epsilon_min(mut self, value: f64) -> Self {
        self.epsilon_min = value;
        self
    }

    pub fn with_symmetry(mut self, enabled: bool) -> Self {
        self.use_symmetry = enabled;
        self
    }

    /// Check every parameter against its allowed range.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidHyperparameter`] for the first parameter that
    /// is out of range or not finite.
    pub fn validate(&self) -> Result<()> {
        check(
            "learning_rate",
            self.learning_rate,
            self.learning_rate > 0.0 && self.learning_rate <= 1.0,
            "0 < value <= 1",
        )?;
        check(
            "discount_factor",
            self.discount_factor,
            (0.0..=1.0).contains(&self.discount_factor),
            "0 <= value <= 1",
        )?;
        check(
            "epsilon_min",
            self.epsilon_min,
            (0.0..1.0).contains(&self.epsilon_min),
            "0 <= value < 1",
        )?;
        check(
            "epsilon",
            self.epsilon,
            (self.epsilon_min..=1.0).contains(&self.epsilon),
            "epsilon_min <= value <= 1",
        )?;
        check(
            "epsilon_decay",
            self.epsilon_decay,
            self.epsilon_decay > 0.0 && self.epsilon_decay <= 1.0,
            "0 < value <= 1",
        )
    }
}

fn check(name: &'static str, value: f64, ok: bool, expected: &'static str) -> Result<()> {
    if ok {
        Ok(())
    } else {
        Err(Error::InvalidHyperparameter {
            name,
            value,
            expected,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(Hyperparameters::default().validate().is_ok());
    }

    #[test]
    fn test_learning_rate_bounds() {
        let base = Hyperparameters::default();
        assert!(base.with_learning_rate(1.0).validate().is_ok());
        assert!(base.with_learning_rate(0.0).validate().is_err());
        assert!(base.with_learning_rate(1.5).validate().is_err());
        assert!(base.with_learning_rate(f64::NAN).validate().is_err());
    }

    #[test]
    fn test_discount_bounds() {
        let base = Hyperparameters::default();
        assert!(base.with_discount_factor(0.0).validate().is_ok());
        assert!(base.with_discount_factor(1.0).validate().is_ok());
        let err = base.with_discount_factor(-0.1).validate().unwrap_err();
        assert!(err.to_string().contains("discount_factor"));
    }

    #[test]
    fn test_epsilon_must_not_start_below_floor() {
        let params = Hyperparameters::default()
            .with_epsilon(0.05)
            .with_epsilon_min(0.1);
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_epsilon_min_of_one_is_rejected() {
        let params = Hyperparameters::default().with_epsilon_min(1.0);
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_zero_decay_is_rejected() {
        let params = Hyperparameters::default().with_epsilon_decay(0.0);
        assert!(params.validate().is_err());
    }
}
