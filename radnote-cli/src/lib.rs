//! Command-line interface for recording and querying radiation telemetry.
#![forbid(unsafe_code)]

use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, Subcommand};
use radnote_core::AlertConfig;
use radnote_store::{DeviceEventStore, JsonFileStorage, RadiationMonitor};
use serde::Serialize;

mod error;
mod feed;
mod ingest;
mod query;

pub use error::CliError;

use ingest::IngestArgs;
use query::{ListArgs, QueryArgs};

pub(crate) const ARG_INPUT: &str = "input";
pub(crate) const ARG_DATA_DIR: &str = "data-dir";
pub(crate) const ARG_LAT: &str = "lat";
pub(crate) const ARG_LON: &str = "lon";
pub(crate) const ARG_RADIUS_METERS: &str = "radius-meters";
pub(crate) const ARG_MODE: &str = "mode";
pub(crate) const ARG_FEED: &str = "feed";
pub(crate) const ARG_ALERT_AT_USV: &str = "alert-at-usv";
pub(crate) const ARG_ALERT_REGION_METERS: &str = "alert-region-meters";
pub(crate) const ARG_DEFAULT_RADIUS_METERS: &str = "default-radius-meters";
pub(crate) const ARG_ALERT_MINUTES: &str = "alert-minutes";
pub(crate) const ARG_SAMPLE_MINUTES: &str = "sample-minutes";
pub(crate) const ARG_SYNC_MINUTES: &str = "sync-minutes";
pub(crate) const ENV_INGEST_INPUT: &str = "RADNOTE_CMDS_INGEST_INPUT";

/// Run the Radnote CLI with the current process arguments and environment.
///
/// # Errors
/// Returns [`CliError`] when arguments or configuration are invalid, the
/// envelope cannot be read or decoded, or output cannot be written.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    let mut stdout = std::io::stdout().lock();
    match cli.command {
        Command::Ingest(args) => {
            let mut stdin = std::io::stdin().lock();
            ingest::run_ingest(args, &mut stdin, &mut stdout)
        }
        Command::Query(args) => query::run_query(args, &mut stdout),
        Command::List(args) => query::run_list(args, &mut stdout),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "radnote",
    about = "Record radiation telemetry and answer geofence and region queries",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Record one telemetry envelope.
    Ingest(IngestArgs),
    /// Run a geofence or region query, or list every device.
    Query(QueryArgs),
    /// Print the latest record for every device.
    List(ListArgs),
}

fn data_dir_or_default(data_dir: Option<Utf8PathBuf>) -> Utf8PathBuf {
    data_dir.unwrap_or_else(|| Utf8PathBuf::from("."))
}

fn require_directory(path: &Utf8Path) -> Result<(), CliError> {
    // Missing directories are created on the first accepted envelope.
    match radnote_fs::file_is_file(path) {
        Ok(true) => Err(CliError::DataDirNotDirectory {
            path: path.to_path_buf(),
        }),
        Ok(false) | Err(_) => Ok(()),
    }
}

fn open_monitor(data_dir: &Utf8Path, config: AlertConfig) -> RadiationMonitor {
    let storage = JsonFileStorage::in_data_dir(data_dir);
    RadiationMonitor::new(DeviceEventStore::new(storage), config)
}

fn write_json<T: Serialize + ?Sized>(writer: &mut dyn Write, value: &T) -> Result<(), CliError> {
    let payload = serde_json::to_string_pretty(value).map_err(CliError::SerialiseOutput)?;
    write_line(writer, &payload)
}

fn write_line(writer: &mut dyn Write, line: &str) -> Result<(), CliError> {
    writer
        .write_all(line.as_bytes())
        .map_err(CliError::WriteOutput)?;
    writer.write_all(b"\n").map_err(CliError::WriteOutput)?;
    Ok(())
}

#[cfg(test)]
mod tests;
