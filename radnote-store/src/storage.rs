//! Persistence backends for the device snapshot.

use camino::{Utf8Path, Utf8PathBuf};
use radnote_core::DeviceSnapshot;
use radnote_fs::{read_to_string_if_exists, write_atomically};

use crate::SnapshotError;

/// File name of the snapshot inside the data directory.
pub const SNAPSHOT_FILE_NAME: &str = "radnote.json";

/// Whole-snapshot persistence used by [`DeviceEventStore`](crate::DeviceEventStore).
///
/// Implementations are called with the store's lock held, so they never see
/// concurrent calls from the same store.
pub trait SnapshotStorage {
    /// Load the persisted snapshot.
    ///
    /// Returns `Ok(None)` when nothing has been persisted yet.
    ///
    /// # Errors
    /// Returns [`SnapshotError`] when the snapshot exists but cannot be read
    /// or decoded.
    fn load(&self) -> Result<Option<DeviceSnapshot>, SnapshotError>;

    /// Replace the persisted snapshot with `snapshot`.
    ///
    /// # Errors
    /// Returns [`SnapshotError`] when the snapshot cannot be encoded or
    /// written.
    fn persist(&self, snapshot: &DeviceSnapshot) -> Result<(), SnapshotError>;
}

/// Snapshot stored as a single JSON object keyed by device identifier.
///
/// Writes go to a sibling staging file that is renamed into place, so a crash
/// mid-write leaves the previous snapshot intact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonFileStorage {
    path: Utf8PathBuf,
}

impl JsonFileStorage {
    /// Store the snapshot at `path`.
    #[must_use]
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store the snapshot as [`SNAPSHOT_FILE_NAME`] inside `data_dir`.
    #[must_use]
    pub fn in_data_dir(data_dir: &Utf8Path) -> Self {
        Self::new(data_dir.join(SNAPSHOT_FILE_NAME))
    }

    /// Location of the snapshot file.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }
}

impl SnapshotStorage for JsonFileStorage {
    fn load(&self) -> Result<Option<DeviceSnapshot>, SnapshotError> {
        let Some(contents) =
            read_to_string_if_exists(&self.path).map_err(|source| SnapshotError::Read {
                path: self.path.clone(),
                source,
            })?
        else {
            return Ok(None);
        };
        serde_json::from_str(&contents)
            .map(Some)
            .map_err(|source| SnapshotError::Decode {
                path: self.path.clone(),
                source,
            })
    }

    fn persist(&self, snapshot: &DeviceSnapshot) -> Result<(), SnapshotError> {
        let encoded = serde_json::to_vec(snapshot).map_err(|source| SnapshotError::Encode {
            path: self.path.clone(),
            source,
        })?;
        write_atomically(&self.path, &encoded).map_err(|source| SnapshotError::Write {
            path: self.path.clone(),
            source,
        })
    }
}
