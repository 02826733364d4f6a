//! Ports (trait boundaries) for external dependencies.
//!
//! These traits are owned by the domain and implemented by adapters, the
//! agent itself, or callers of the training pipeline.

pub mod observer;
pub mod policy;
pub mod repository;

pub use observer::Observer;
pub use policy::{Policy, RandomPolicy};
pub use repository::SnapshotRepository;
