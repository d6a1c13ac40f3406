//! Error types emitted by the Radnote CLI.
//!
//! Keep this error type reasonably small, as every command helper returns
//! `Result<_, CliError>` and the workspace enables `clippy::result_large_err`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use radnote_core::{AlertConfigError, QueryError};
use radnote_store::IngestError;
use thiserror::Error;

/// Errors emitted by the Radnote CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        /// Flag name.
        field: &'static str,
        /// Environment variable that can supply the value.
        env: &'static str,
    },
    /// Merged alert settings are unusable.
    #[error("invalid alert configuration: {0}")]
    InvalidAlertConfig(#[from] AlertConfigError),
    /// The data directory exists but is not a directory.
    #[error("data directory {path:?} is not a directory")]
    DataDirNotDirectory {
        /// Offending path.
        path: Utf8PathBuf,
    },
    /// Reading the envelope input failed.
    #[error("failed to read envelope from {source_name}: {source}")]
    ReadEnvelope {
        /// File path, or `stdin`.
        source_name: String,
        /// Source error from std I/O.
        #[source]
        source: std::io::Error,
    },
    /// The envelope could not be decoded.
    #[error(transparent)]
    Ingest(#[from] IngestError),
    /// Query parameters were malformed.
    #[error(transparent)]
    Query(#[from] QueryError),
    /// Formatting a feed timestamp failed.
    #[error("failed to format feed timestamp: {0}")]
    FormatTimestamp(#[source] time::error::Format),
    /// Serialising command output failed.
    #[error("failed to serialise output: {0}")]
    SerialiseOutput(#[source] serde_json::Error),
    /// Writing command output failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] std::io::Error),
}
