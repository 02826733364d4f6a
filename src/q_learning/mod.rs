//! Tabular Q-learning
//!
//! Off-policy temporal difference control over a table keyed by
//! [`crate::types::StateKey`]:
//!
//! Q(s,a) ← Q(s,a) + α[r + γ max_a' Q(s',a') - Q(s,a)]
//!
//! Terminal transitions drop the bootstrap term. Self-play training hands
//! the final outcome to every move as a terminal transition.
//!
//! Exploration is ε-greedy with multiplicative decay once per episode.
//!
//! ## Usage Example
//!
//! ```no_run
//! use noughts::q_learning::{Hyperparameters, QLearningAgent};
//!
//! let params = Hyperparameters::default()
//!     .with_learning_rate(0.5)
//!     .with_epsilon_decay(0.999);
//! let agent = QLearningAgent::new(params)?.with_seed(42);
//! let bytes = agent.serialize()?;
//! let restored = QLearningAgent::deserialize(&bytes)?;
//! # Ok::<(), noughts::Error>(())
//! ```

pub mod agent;
pub mod hyperparameters;
pub mod q_table;
pub mod serialization;
pub mod stats;

// Public re-exports
pub use agent::QLearningAgent;
pub use hyperparameters::Hyperparameters;
pub use q_table::{ActionValues, QTable};
pub use serialization::SavedAgent;
pub use stats::{AgentStats, TrainingStats};
