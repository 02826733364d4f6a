//! Training and evaluation pipeline
//!
//! This module provides:
//! - Self-play training of a Q-learning agent
//! - Composable observers for progress, metrics and JSONL export
//! - Evaluation of fixed policies against each other

pub mod evaluation;
pub mod observers;
pub mod training;

pub use evaluation::{EvaluationResult, evaluate, evaluate_against_random, play_game};
pub use observers::{
    JsonlObserver, MetricsObserver, MetricsSummary, Observation, ProgressObserver,
    StepObservation,
};
pub use training::{
    RewardScheme, SelfPlayTrainer, StopHandle, TrainingConfig, TrainingResult, Transition, train,
    train_with_config,
};

pub use crate::ports::{Observer, Policy};
