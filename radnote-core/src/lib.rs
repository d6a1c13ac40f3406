//! Core domain types for the Radnote engine.
//!
//! The crate keeps the radiation domain free of I/O: telemetry envelopes and
//! their radiation payloads, the per-device records retained by a store, the
//! great-circle distance used by every scan, and the two query engines that
//! read a [`DeviceSnapshot`]:
//!
//! - the geofence evaluator, which decides whether a location lies near a
//!   device reporting a dose rate at or above the alert threshold, and
//! - the region aggregator, which summarises dose rates within a radius.
//!
//! Persisting and serialising access to the snapshot lives in
//! `radnote-store`.
//!
//! Coordinates follow the `geo` convention: `x = longitude`, `y = latitude`,
//! both in degrees.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod config;
pub mod distance;
pub mod envelope;
pub mod geofence;
pub mod query;
pub mod record;
pub mod region;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use config::{AlertAdvisory, AlertConfig, AlertConfigError};
pub use distance::meters_between;
pub use envelope::{RADIATION_NOTEFILE, RadiationReading, TelemetryEnvelope};
pub use geofence::{GeofenceVerdict, evaluate_geofence, is_location_in_warning_region};
pub use query::{QueryError, QueryParams};
pub use record::{DeviceRecord, DeviceSnapshot, RecordOutcome};
pub use region::{RegionQuery, RegionStats, RegionSummary, aggregate, summarise_region};
