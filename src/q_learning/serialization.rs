//! Snapshot format for trained Q-learning agents.

use std::{
    fs::File,
    io::{BufReader, BufWriter, ErrorKind},
    path::Path,
};

use serde::{Deserialize, Serialize};

use super::{
    agent::QLearningAgent, hyperparameters::Hyperparameters, q_table::QTable,
    stats::TrainingStats,
};
use crate::{Error, Result};

/// Everything needed to rebuild a [`QLearningAgent`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedAgent {
    pub version: u32,
    pub hyperparameters: Hyperparameters,
    /// Exploration rate at save time, after decay
    pub epsilon: f64,
    pub q_table: QTable,
    pub stats: TrainingStats,
    pub rng_seed: Option<u64>,
}

impl SavedAgent {
    pub const VERSION: u32 = 1;

    pub fn from_agent(agent: &QLearningAgent) -> Self {
        Self {
            version: Self::VERSION,
            hyperparameters: *agent.hyperparameters(),
            epsilon: agent.epsilon(),
            q_table: agent.table().clone(),
            stats: agent.training_stats().clone(),
            rng_seed: agent.rng_seed(),
        }
    }

    /// Rebuild the agent, rejecting unknown versions and out-of-range values
    pub fn to_agent(&self) -> Result<QLearningAgent> {
        if self.version != Self::VERSION {
            return Err(Error::UnsupportedSnapshotVersion {
                found: self.version,
                expected: Self::VERSION,
            });
        }
        self.hyperparameters.validate()?;
        if !(self.hyperparameters.epsilon_min..=1.0).contains(&self.epsilon) {
            return Err(Error::InvalidHyperparameter {
                name: "epsilon",
                value: self.epsilon,
                expected: "epsilon_min <= value <= 1",
            });
        }

        Ok(QLearningAgent::from_parts(
            self.hyperparameters,
            self.epsilon,
            self.q_table.clone(),
            self.stats.clone(),
            self.rng_seed,
        ))
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        rmp_serde::to_vec_named(self).map_err(|e| Error::CorruptSnapshot {
            operation: "encode agent snapshot".to_string(),
            message: e.to_string(),
        })
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        rmp_serde::from_slice(bytes).map_err(|e| Error::CorruptSnapshot {
            operation: "decode agent snapshot".to_string(),
            message: e.to_string(),
        })
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| Error::Io {
            operation: format!("create {}", path.display()),
            source,
        })?;
        let mut writer = BufWriter::new(file);

        rmp_serde::encode::write_named(&mut writer, self).map_err(|e| Error::CorruptSnapshot {
            operation: format!("write {}", path.display()),
            message: e.to_string(),
        })
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| match source.kind() {
            ErrorKind::NotFound => Error::SnapshotNotFound {
                path: path.to_path_buf(),
            },
            _ => Error::Io {
                operation: format!("open {}", path.display()),
                source,
            },
        })?;
        let reader = BufReader::new(file);

        rmp_serde::decode::from_read(reader).map_err(|e| Error::CorruptSnapshot {
            operation: format!("read {}", path.display()),
            message: e.to_string(),
        })
    }
}
