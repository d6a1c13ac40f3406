//! Facade crate for the Radnote radiation telemetry engine.
//!
//! This crate re-exports the core domain types and exposes the file-backed
//! device event store behind a feature flag.

#![forbid(unsafe_code)]

pub use radnote_core::{
    AlertAdvisory, AlertConfig, AlertConfigError, DeviceRecord, DeviceSnapshot, GeofenceVerdict,
    QueryError, QueryParams, RADIATION_NOTEFILE, RadiationReading, RecordOutcome, RegionQuery,
    RegionStats, RegionSummary, TelemetryEnvelope, aggregate, evaluate_geofence,
    is_location_in_warning_region, meters_between, summarise_region,
};

#[cfg(feature = "store-json")]
pub use radnote_store::{
    DeviceEventStore, IngestError, JsonFileStorage, RadiationMonitor, SNAPSHOT_FILE_NAME,
    SnapshotError, SnapshotStorage,
};
