//! Mutex-guarded, lazily loaded map of the latest record per device.

use std::sync::{Mutex, MutexGuard, PoisonError};

use log::{debug, info, warn};
use radnote_core::{DeviceSnapshot, RecordOutcome, TelemetryEnvelope};

use crate::{JsonFileStorage, SnapshotStorage};

/// Latest radiation record per device, backed by a [`SnapshotStorage`].
///
/// The snapshot is loaded on first use. Every operation holds one lock for
/// its whole duration, so an update and the snapshot write it triggers are
/// never interleaved with another update or read.
///
/// # Examples
/// ```
/// use radnote_core::{RADIATION_NOTEFILE, TelemetryEnvelope};
/// use radnote_store::{DeviceEventStore, JsonFileStorage};
///
/// let dir = tempfile::tempdir().expect("tempdir");
/// let path = camino::Utf8PathBuf::from_path_buf(dir.path().join("radnote.json"))
///     .expect("utf-8 path");
/// let store = DeviceEventStore::new(JsonFileStorage::new(path));
///
/// let envelope = TelemetryEnvelope {
///     device_id: "dev:1".into(),
///     occurred_at: 100,
///     notefile: RADIATION_NOTEFILE.into(),
///     ..TelemetryEnvelope::default()
/// };
/// assert!(store.record_event(&envelope).is_accepted());
/// assert_eq!(store.snapshot().len(), 1);
/// ```
#[derive(Debug)]
pub struct DeviceEventStore<S = JsonFileStorage> {
    storage: S,
    state: Mutex<Option<DeviceSnapshot>>,
}

impl<S: SnapshotStorage> DeviceEventStore<S> {
    /// Create a store that loads from `storage` on first use.
    #[must_use]
    pub const fn new(storage: S) -> Self {
        Self {
            storage,
            state: Mutex::new(None),
        }
    }

    /// Load the persisted snapshot if this store has not done so yet.
    ///
    /// A missing snapshot starts the store empty. An unreadable or malformed
    /// snapshot is logged and also starts the store empty; the next accepted
    /// update overwrites it.
    pub fn ensure_loaded(&self) {
        let mut guard = self.lock();
        Self::loaded(&self.storage, &mut guard);
    }

    /// Apply `envelope` and persist the snapshot when the record changed.
    ///
    /// Envelopes for other notefiles and envelopes older than the stored
    /// record are ignored. A failed snapshot write is logged; the in-memory
    /// record keeps the update.
    pub fn record_event(&self, envelope: &TelemetryEnvelope) -> RecordOutcome {
        let mut guard = self.lock();
        let snapshot = Self::loaded(&self.storage, &mut guard);
        let outcome = snapshot.apply(envelope);
        match outcome {
            RecordOutcome::Accepted => {
                debug!(
                    "Accepted envelope from {} at {}",
                    envelope.device_id, envelope.occurred_at
                );
                if let Err(err) = self.storage.persist(snapshot) {
                    warn!(
                        "Failed to persist snapshot after update from {}: {err}",
                        envelope.device_id
                    );
                }
            }
            RecordOutcome::IgnoredKind => {
                debug!(
                    "Ignoring {} envelope from {}",
                    envelope.notefile, envelope.device_id
                );
            }
            RecordOutcome::Stale => {
                debug!(
                    "Ignoring stale envelope from {} at {}",
                    envelope.device_id, envelope.occurred_at
                );
            }
        }
        outcome
    }

    /// Run `read` against the current snapshot while holding the lock.
    pub fn inspect<R>(&self, read: impl FnOnce(&DeviceSnapshot) -> R) -> R {
        let mut guard = self.lock();
        read(Self::loaded(&self.storage, &mut guard))
    }

    /// Return a copy of the current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> DeviceSnapshot {
        self.inspect(DeviceSnapshot::clone)
    }

    /// Borrow the persistence backend.
    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    fn lock(&self) -> MutexGuard<'_, Option<DeviceSnapshot>> {
        // A panic mid-update leaves at worst one partially applied record,
        // which the next accepted envelope for that device replaces.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn loaded<'g>(storage: &S, slot: &'g mut Option<DeviceSnapshot>) -> &'g mut DeviceSnapshot {
        slot.get_or_insert_with(|| match storage.load() {
            Ok(Some(snapshot)) => {
                info!("Loaded snapshot with {} device records", snapshot.len());
                snapshot
            }
            Ok(None) => DeviceSnapshot::default(),
            Err(err) => {
                warn!("Starting with an empty snapshot: {err}");
                DeviceSnapshot::default()
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MemoryStorage;
    use radnote_core::test_support::{radiation_envelope, record};
    use rstest::rstest;
    use std::sync::Arc;
    use std::thread;

    #[expect(clippy::float_arithmetic, reason = "tolerance comparison")]
    fn close(actual: f64, expected: f64) -> bool {
        (actual - expected).abs() < 1e-9
    }

    #[rstest]
    fn does_not_touch_storage_until_first_use() {
        let storage = MemoryStorage::default();
        let store = DeviceEventStore::new(storage);
        assert_eq!(store.storage().load_count(), 0);

        store.ensure_loaded();
        store.ensure_loaded();
        assert!(store.snapshot().is_empty());
        assert_eq!(store.storage().load_count(), 1);
    }

    #[rstest]
    fn starts_from_the_persisted_snapshot() {
        let seeded: DeviceSnapshot = [record("dev:seed", 37.0, 140.0, 0.4)].into_iter().collect();
        let store = DeviceEventStore::new(MemoryStorage::with_snapshot(seeded.clone()));
        assert_eq!(store.snapshot(), seeded);
    }

    #[rstest]
    fn unreadable_snapshot_starts_empty() {
        let store = DeviceEventStore::new(MemoryStorage::failing_load());
        assert!(store.snapshot().is_empty());

        let outcome = store.record_event(&radiation_envelope("dev:1", 10, 0.2));
        assert_eq!(outcome, RecordOutcome::Accepted);
        assert_eq!(store.storage().persisted().map(|s| s.len()), Some(1));
    }

    #[rstest]
    #[case::newer(20, RecordOutcome::Accepted, 20)]
    #[case::equal(10, RecordOutcome::Accepted, 10)]
    #[case::older(5, RecordOutcome::Stale, 10)]
    fn keeps_the_latest_envelope(
        #[case] second: i64,
        #[case] expected: RecordOutcome,
        #[case] retained: i64,
    ) {
        let store = DeviceEventStore::new(MemoryStorage::default());
        store.record_event(&radiation_envelope("dev:1", 10, 0.2));

        assert_eq!(store.record_event(&radiation_envelope("dev:1", second, 0.3)), expected);
        let snapshot = store.snapshot();
        let record = snapshot.get("dev:1").expect("record retained");
        assert_eq!(record.occurred_at, retained);
    }

    #[rstest]
    fn ignored_envelopes_do_not_rewrite_the_snapshot() {
        let store = DeviceEventStore::new(MemoryStorage::default());
        store.record_event(&radiation_envelope("dev:1", 10, 0.2));
        assert_eq!(store.storage().persist_count(), 1);

        let mut other = radiation_envelope("dev:1", 50, 9.0);
        other.notefile = "_env.qo".into();
        assert_eq!(store.record_event(&other), RecordOutcome::IgnoredKind);
        assert_eq!(store.record_event(&radiation_envelope("dev:1", 1, 0.1)), RecordOutcome::Stale);
        assert_eq!(store.storage().persist_count(), 1);
    }

    #[rstest]
    fn failed_persist_keeps_the_in_memory_update() {
        let store = DeviceEventStore::new(MemoryStorage::failing_persist());
        let outcome = store.record_event(&radiation_envelope("dev:1", 10, 0.7));

        assert_eq!(outcome, RecordOutcome::Accepted);
        let snapshot = store.snapshot();
        let record = snapshot.get("dev:1").expect("record kept");
        assert!(close(record.usv, 0.7));
        assert!(store.storage().persisted().is_none());
    }

    #[rstest]
    fn concurrent_updates_for_different_devices_are_both_persisted() {
        let store = Arc::new(DeviceEventStore::new(MemoryStorage::default()));
        let handles: Vec<_> = (0..8)
            .map(|n| {
                let writer = Arc::clone(&store);
                thread::spawn(move || {
                    writer.record_event(&radiation_envelope(&format!("dev:{n}"), 100, 0.1))
                })
            })
            .collect();
        for handle in handles {
            assert!(handle.join().expect("writer thread").is_accepted());
        }

        let persisted = store.storage().persisted().expect("snapshot persisted");
        assert_eq!(persisted.len(), 8);
        assert_eq!(persisted, store.snapshot());
    }
}
