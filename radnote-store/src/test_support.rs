//! In-memory storage with failure injection for store tests.

use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use camino::Utf8PathBuf;
use radnote_core::DeviceSnapshot;

use crate::{SnapshotError, SnapshotStorage};

const MEMORY_PATH: &str = "<memory>";

/// [`SnapshotStorage`] that keeps the last persisted snapshot in memory.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    persisted: Mutex<Option<DeviceSnapshot>>,
    fail_load: bool,
    fail_persist: bool,
    loads: AtomicUsize,
    persists: AtomicUsize,
}

impl MemoryStorage {
    /// Start with `snapshot` already persisted.
    #[must_use]
    pub fn with_snapshot(snapshot: DeviceSnapshot) -> Self {
        Self {
            persisted: Mutex::new(Some(snapshot)),
            ..Self::default()
        }
    }

    /// Report a corrupt snapshot on every load.
    #[must_use]
    pub fn failing_load() -> Self {
        Self {
            fail_load: true,
            ..Self::default()
        }
    }

    /// Reject every persist.
    #[must_use]
    pub fn failing_persist() -> Self {
        Self {
            fail_persist: true,
            ..Self::default()
        }
    }

    /// Most recently persisted snapshot.
    #[must_use]
    pub fn persisted(&self) -> Option<DeviceSnapshot> {
        self.persisted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of load calls observed.
    #[must_use]
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    /// Number of successful persist calls observed.
    #[must_use]
    pub fn persist_count(&self) -> usize {
        self.persists.load(Ordering::SeqCst)
    }
}

impl SnapshotStorage for MemoryStorage {
    fn load(&self) -> Result<Option<DeviceSnapshot>, SnapshotError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        if self.fail_load {
            return Err(SnapshotError::Read {
                path: Utf8PathBuf::from(MEMORY_PATH),
                source: io::Error::new(io::ErrorKind::InvalidData, "injected load failure"),
            });
        }
        Ok(self.persisted())
    }

    fn persist(&self, snapshot: &DeviceSnapshot) -> Result<(), SnapshotError> {
        if self.fail_persist {
            return Err(SnapshotError::Write {
                path: Utf8PathBuf::from(MEMORY_PATH),
                source: io::Error::other("injected persist failure"),
            });
        }
        *self
            .persisted
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(snapshot.clone());
        self.persists.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
