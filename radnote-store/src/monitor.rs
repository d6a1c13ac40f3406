//! Request-level entry points tying the store to the core evaluators.

use std::time::{SystemTime, UNIX_EPOCH};

use geo::Coord;
use log::debug;
use radnote_core::{
    AlertConfig, DeviceSnapshot, GeofenceVerdict, RecordOutcome, RegionQuery, RegionSummary,
    TelemetryEnvelope, evaluate_geofence, summarise_region,
};

use crate::{DeviceEventStore, IngestError, JsonFileStorage, SnapshotStorage};

/// Device event store paired with the alert configuration used to query it.
#[derive(Debug)]
pub struct RadiationMonitor<S = JsonFileStorage> {
    store: DeviceEventStore<S>,
    config: AlertConfig,
}

impl<S: SnapshotStorage> RadiationMonitor<S> {
    /// Pair `store` with `config`.
    #[must_use]
    pub const fn new(store: DeviceEventStore<S>, config: AlertConfig) -> Self {
        Self { store, config }
    }

    /// Decode a raw envelope and record it.
    ///
    /// # Errors
    /// Returns [`IngestError::Decode`] when `raw` is not a JSON envelope.
    /// Envelopes that decode but are ignored are reported through the
    /// returned [`RecordOutcome`].
    pub fn ingest(&self, raw: &[u8]) -> Result<RecordOutcome, IngestError> {
        let envelope: TelemetryEnvelope =
            serde_json::from_slice(raw).map_err(|source| IngestError::Decode {
                len: raw.len(),
                source,
            })?;
        debug!(
            "Received {} bytes from {} for {}",
            raw.len(),
            envelope.device_id,
            envelope.notefile
        );
        Ok(self.record(&envelope))
    }

    /// Record an already decoded envelope.
    pub fn record(&self, envelope: &TelemetryEnvelope) -> RecordOutcome {
        self.store.record_event(envelope)
    }

    /// Decide whether `location` lies inside any alerting device's region.
    #[must_use]
    pub fn geofence(&self, location: Coord<f64>) -> GeofenceVerdict {
        self.store
            .inspect(|snapshot| evaluate_geofence(snapshot, location, &self.config))
    }

    /// Summarise the dose rates reported around `query.center`.
    #[must_use]
    pub fn region(&self, query: &RegionQuery) -> RegionSummary {
        let modified = unix_now();
        self.store
            .inspect(|snapshot| summarise_region(snapshot, query, &self.config, modified))
    }

    /// Copy of every retained device record.
    #[must_use]
    pub fn records(&self) -> DeviceSnapshot {
        self.store.snapshot()
    }

    /// Borrow the underlying store.
    #[must_use]
    pub const fn store(&self) -> &DeviceEventStore<S> {
        &self.store
    }

    /// Borrow the alert configuration.
    #[must_use]
    pub const fn config(&self) -> &AlertConfig {
        &self.config
    }
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .ok()
        .and_then(|elapsed| i64::try_from(elapsed.as_secs()).ok())
        .unwrap_or_default()
}
