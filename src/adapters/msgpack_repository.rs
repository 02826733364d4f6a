//! MessagePack implementation of the snapshot repository.

use std::path::Path;

use crate::{Result, ports::SnapshotRepository, q_learning::SavedAgent};

/// File-backed snapshot repository using rmp_serde.
///
/// # Examples
///
/// ```no_run
/// use noughts::adapters::MsgPackRepository;
/// use noughts::ports::SnapshotRepository;
/// use noughts::q_learning::{Hyperparameters, QLearningAgent, SavedAgent};
/// use std::path::Path;
///
/// let repo = MsgPackRepository::new();
/// let agent = QLearningAgent::new(Hyperparameters::default())?;
///
/// repo.save(&SavedAgent::from_agent(&agent), Path::new("trained.msgpack"))?;
/// let loaded = repo.load(Path::new("trained.msgpack"))?.to_agent()?;
/// # Ok::<(), noughts::Error>(())
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct MsgPackRepository;

impl MsgPackRepository {
    pub fn new() -> Self {
        Self
    }
}

impl SnapshotRepository for MsgPackRepository {
    fn save(&self, snapshot: &SavedAgent, path: &Path) -> Result<()> {
        snapshot.save_to_file(path)?;
        log::debug!("Wrote {} table states to {}", snapshot.q_table.len(), path.display());
        Ok(())
    }

    fn load(&self, path: &Path) -> Result<SavedAgent> {
        let snapshot = SavedAgent::load_from_file(path)?;
        log::debug!("Read {} table states from {}", snapshot.q_table.len(), path.display());
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::{
        Error,
        q_learning::{Hyperparameters, QLearningAgent},
        tictactoe::Board,
    };

    fn snapshot() -> SavedAgent {
        let mut agent = QLearningAgent::new(Hyperparameters::default()).unwrap();
        let key = Board::new().state_key(true);
        agent.update(&key, 4, 1.0, &key, true);
        SavedAgent::from_agent(&agent)
    }

    #[test]
    fn test_msgpack_roundtrip() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let file_path = temp_dir.path().join("agent.msgpack");

        let repo = MsgPackRepository::new();
        let saved = snapshot();
        repo.save(&saved, &file_path).expect("Failed to save");
        let loaded = repo.load(&file_path).expect("Failed to load");

        assert_eq!(loaded, saved);
    }

    #[test]
    fn test_load_nonexistent_is_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let result = MsgPackRepository::new().load(&temp_dir.path().join("missing.msgpack"));
        assert!(matches!(result, Err(Error::SnapshotNotFound { .. })));
    }

    #[test]
    fn test_truncated_file_is_corrupt() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("agent.msgpack");
        let bytes = snapshot().to_bytes().unwrap();
        std::fs::write(&file_path, &bytes[..bytes.len() / 2]).unwrap();

        let result = MsgPackRepository::new().load(&file_path);
        assert!(matches!(result, Err(Error::CorruptSnapshot { .. })));
    }

    #[test]
    fn test_save_to_invalid_path_returns_error() {
        let temp_dir = TempDir::new().unwrap();
        let result = MsgPackRepository::new().save(
            &snapshot(),
            &temp_dir.path().join("no_such_dir").join("agent.msgpack"),
        );
        assert!(result.is_err());
    }
}
