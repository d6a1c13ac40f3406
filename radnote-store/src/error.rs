//! Error types raised by the store and its ingestion path.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors raised while loading or persisting the device snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// Reading the snapshot file failed for a reason other than absence.
    #[error("failed to read snapshot from {path}")]
    Read {
        /// Snapshot location.
        path: Utf8PathBuf,
        /// Source error from std I/O.
        #[source]
        source: std::io::Error,
    },
    /// The snapshot file did not hold a device mapping.
    #[error("failed to decode snapshot at {path}")]
    Decode {
        /// Snapshot location.
        path: Utf8PathBuf,
        /// Source error from `serde_json`.
        #[source]
        source: serde_json::Error,
    },
    /// Encoding the in-memory snapshot failed.
    #[error("failed to encode snapshot for {path}")]
    Encode {
        /// Snapshot location.
        path: Utf8PathBuf,
        /// Source error from `serde_json`.
        #[source]
        source: serde_json::Error,
    },
    /// Writing the snapshot file failed.
    #[error("failed to write snapshot to {path}")]
    Write {
        /// Snapshot location.
        path: Utf8PathBuf,
        /// Source error from std I/O.
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised while ingesting a raw telemetry envelope.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The request body was not a telemetry envelope.
    #[error("failed to decode telemetry envelope ({len} bytes)")]
    Decode {
        /// Length of the raw body.
        len: usize,
        /// Source error from `serde_json`.
        #[source]
        source: serde_json::Error,
    },
}
