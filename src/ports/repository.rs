//! Repository port for agent snapshot persistence.

use std::path::Path;

use crate::{Result, q_learning::SavedAgent};

/// Port for persisting and loading agent snapshots.
///
/// # Examples
///
/// ```no_run
/// use noughts::{ports::SnapshotRepository, q_learning::SavedAgent};
/// use std::path::Path;
///
/// fn backup<R: SnapshotRepository>(repo: &R, snapshot: &SavedAgent) -> noughts::Result<()> {
///     repo.save(snapshot, Path::new("backup.msgpack"))
/// }
/// ```
pub trait SnapshotRepository {
    /// Save a snapshot to persistent storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the location cannot be written or encoding fails.
    fn save(&self, snapshot: &SavedAgent, path: &Path) -> Result<()>;

    /// Load a snapshot from persistent storage.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::SnapshotNotFound`] when nothing is stored at
    /// `path` and [`crate::Error::CorruptSnapshot`] when the bytes do not
    /// decode.
    fn load(&self, path: &Path) -> Result<SavedAgent>;
}
