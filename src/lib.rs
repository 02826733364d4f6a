//! Tabular Q-learning for tic-tac-toe
//!
//! This crate provides:
//! - A tic-tac-toe engine with move validation and D4 symmetry reduction
//! - A Q-learning agent with ε-greedy exploration and decaying epsilon
//! - A self-play trainer with pluggable observers
//! - MessagePack snapshots of trained agents
//! - Evaluation of trained policies against a random baseline

pub mod adapters;
pub mod app;
pub mod cli;
pub mod error;
pub mod pipeline;
pub mod ports;
pub mod q_learning;
pub mod tictactoe;
pub mod types;

pub use error::{Error, Result};
pub use q_learning::{Hyperparameters, QLearningAgent};
pub use tictactoe::{Board, GameStatus, Player};
pub use types::StateKey;
