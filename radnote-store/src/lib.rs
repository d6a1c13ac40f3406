//! Device event store and query glue for the Radnote engine.
//!
//! Responsibilities:
//! - Retain the latest radiation reading per device behind one mutex.
//! - Load the persisted snapshot lazily and rewrite it after every accepted
//!   update.
//! - Decode raw envelopes and route location queries to the geofence
//!   evaluator or the region aggregator in `radnote-core`.
//!
//! Invariants:
//! - For each device the retained `occurred_at` is the maximum seen among
//!   radiation envelopes; older envelopes never replace a record.
//! - Lazy loading, record replacement with its snapshot write, and snapshot
//!   reads all happen inside the same critical section.
//! - A failed snapshot write never rolls back the in-memory update.

#![forbid(unsafe_code)]

mod error;
mod monitor;
mod storage;
mod store;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use error::{IngestError, SnapshotError};
pub use monitor::RadiationMonitor;
pub use storage::{JsonFileStorage, SNAPSHOT_FILE_NAME, SnapshotStorage};
pub use store::DeviceEventStore;
