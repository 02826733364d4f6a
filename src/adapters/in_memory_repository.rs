//! In-memory snapshot repository for testing.

use std::{
    collections::HashMap,
    path::Path,
    sync::{Arc, Mutex, MutexGuard},
};

use crate::{Error, Result, ports::SnapshotRepository, q_learning::SavedAgent};

/// In-memory repository keyed by path.
///
/// Snapshots are stored as encoded bytes, so saving and loading go through
/// the same MessagePack path as the file adapter. All clones share storage.
///
/// # Examples
///
/// ```
/// use noughts::adapters::InMemoryRepository;
/// use noughts::ports::SnapshotRepository;
/// use noughts::q_learning::{Hyperparameters, QLearningAgent, SavedAgent};
/// use std::path::Path;
///
/// let repo = InMemoryRepository::new();
/// let agent = QLearningAgent::new(Hyperparameters::default())?;
///
/// repo.save(&SavedAgent::from_agent(&agent), Path::new("agent"))?;
/// let loaded = repo.load(Path::new("agent"))?;
/// assert_eq!(repo.count(), 1);
/// # Ok::<(), noughts::Error>(())
/// ```
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    storage: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of snapshots currently stored
    pub fn count(&self) -> usize {
        self.storage().len()
    }

    pub fn clear(&self) {
        self.storage().clear();
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.storage().contains_key(&Self::key(path))
    }

    fn key(path: &Path) -> String {
        path.to_string_lossy().to_string()
    }

    // a panic while holding the lock leaves the map intact
    fn storage(&self) -> MutexGuard<'_, HashMap<String, Vec<u8>>> {
        self.storage
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SnapshotRepository for InMemoryRepository {
    fn save(&self, snapshot: &SavedAgent, path: &Path) -> Result<()> {
        let bytes = snapshot.to_bytes()?;
        self.storage().insert(Self::key(path), bytes);
        Ok(())
    }

    fn load(&self, path: &Path) -> Result<SavedAgent> {
        let storage = self.storage();
        let bytes = storage
            .get(&Self::key(path))
            .ok_or_else(|| Error::SnapshotNotFound {
                path: path.to_path_buf(),
            })?;
        SavedAgent::from_bytes(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::q_learning::{Hyperparameters, QLearningAgent};

    fn snapshot() -> SavedAgent {
        SavedAgent::from_agent(&QLearningAgent::new(Hyperparameters::default()).unwrap())
    }

    #[test]
    fn test_in_memory_save_and_load() {
        let repo = InMemoryRepository::new();
        let path = Path::new("agent");
        assert!(!repo.contains(path));

        let saved = snapshot();
        repo.save(&saved, path).unwrap();
        assert!(repo.contains(path));
        assert_eq!(repo.load(path).unwrap(), saved);
    }

    #[test]
    fn test_load_nonexistent_returns_not_found() {
        let repo = InMemoryRepository::new();
        let result = repo.load(Path::new("nonexistent"));
        assert!(matches!(result, Err(Error::SnapshotNotFound { .. })));
    }

    #[test]
    fn test_clone_shares_storage() {
        let repo1 = InMemoryRepository::new();
        let repo2 = repo1.clone();

        repo1.save(&snapshot(), Path::new("shared")).unwrap();
        assert!(repo2.load(Path::new("shared")).is_ok());
        assert_eq!(repo2.count(), 1);

        repo2.clear();
        assert_eq!(repo1.count(), 0);
    }
}
