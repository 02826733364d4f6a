//! Configuration types for agent creation and persistence.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::q_learning::Hyperparameters;

/// Configuration for creating a Q-learning agent.
///
/// # Examples
///
/// ```
/// use noughts::app::AgentConfig;
/// use noughts::q_learning::Hyperparameters;
///
/// let config = AgentConfig::new(Hyperparameters::default().with_learning_rate(0.3))
///     .with_seed(42);
/// ```
#[derive(Debug, Clone, Default)]
pub struct AgentConfig {
    pub hyperparameters: Hyperparameters,
    /// Random seed for reproducibility
    pub seed: Option<u64>,
}

impl AgentConfig {
    pub fn new(hyperparameters: Hyperparameters) -> Self {
        Self {
            hyperparameters,
            seed: None,
        }
    }

    /// Set the random seed for deterministic behavior.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// Application-wide settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Where trained agents are written by [`super::App::train_and_save`]
    pub model_path: PathBuf,
    /// Create missing parent directories before saving
    pub create_dirs: bool,
    /// Seed applied to agents whose config carries none
    pub default_seed: Option<u64>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("models/q_agent.msgpack"),
            create_dirs: true,
            default_seed: None,
        }
    }
}

impl AppConfig {
    pub fn with_model_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.model_path = path.into();
        self
    }

    pub fn with_create_dirs(mut self, enabled: bool) -> Self {
        self.create_dirs = enabled;
        self
    }
}
