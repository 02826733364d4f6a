//! CLI infrastructure for the noughts trainer
//!
//! Non-interactive commands for training a Q-learning agent by self-play and
//! evaluating a saved agent against a random opponent.

pub mod commands;
pub mod output;
