//! Ingest command implementation for the Radnote CLI.

use std::io::{Read, Write};

use camino::Utf8PathBuf;
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use radnote_core::{AlertConfig, RecordOutcome};
use radnote_fs::open_utf8_file;
use serde::{Deserialize, Serialize};

use crate::{
    ARG_DATA_DIR, ARG_INPUT, CliError, ENV_INGEST_INPUT, data_dir_or_default, open_monitor,
    require_directory, write_line,
};

const STDIN_MARKER: &str = "-";

/// CLI arguments for the `ingest` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Record one telemetry envelope, as delivered by the \
                 notehub route, into the device snapshot. Envelopes for \
                 other notefiles and envelopes older than the stored record \
                 are ignored.",
    about = "Record one telemetry envelope"
)]
#[ortho_config(prefix = "RADNOTE")]
pub(crate) struct IngestArgs {
    /// Path to a JSON envelope, or `-` to read standard input.
    #[arg(id = ARG_INPUT, value_name = "path")]
    #[serde(default)]
    pub(crate) input: Option<Utf8PathBuf>,
    /// Directory holding `radnote.json`.
    #[arg(long = ARG_DATA_DIR, value_name = "dir")]
    #[serde(default)]
    pub(crate) data_dir: Option<Utf8PathBuf>,
}

impl IngestArgs {
    fn into_config(self) -> Result<IngestConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        IngestConfig::try_from(merged)
    }
}

/// Where the envelope bytes come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum EnvelopeSource {
    Stdin,
    File(Utf8PathBuf),
}

/// Resolved `ingest` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct IngestConfig {
    pub(crate) origin: EnvelopeSource,
    pub(crate) data_dir: Utf8PathBuf,
}

impl TryFrom<IngestArgs> for IngestConfig {
    type Error = CliError;

    fn try_from(args: IngestArgs) -> Result<Self, Self::Error> {
        let input = args.input.ok_or(CliError::MissingArgument {
            field: ARG_INPUT,
            env: ENV_INGEST_INPUT,
        })?;
        let origin = if input == STDIN_MARKER {
            EnvelopeSource::Stdin
        } else {
            EnvelopeSource::File(input)
        };
        Ok(Self {
            origin,
            data_dir: data_dir_or_default(args.data_dir),
        })
    }
}

pub(crate) fn run_ingest(
    args: IngestArgs,
    stdin: &mut dyn Read,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    run_ingest_with(&config, stdin, writer)
}

pub(crate) fn run_ingest_with(
    config: &IngestConfig,
    stdin: &mut dyn Read,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    require_directory(&config.data_dir)?;
    let raw = read_envelope(&config.origin, stdin)?;
    // Ingestion never consults the alert thresholds.
    let monitor = open_monitor(&config.data_dir, AlertConfig::default());
    let outcome = monitor.ingest(&raw)?;
    write_line(writer, outcome_label(outcome))
}

pub(crate) fn read_envelope(
    origin: &EnvelopeSource,
    stdin: &mut dyn Read,
) -> Result<Vec<u8>, CliError> {
    let mut raw = Vec::new();
    match origin {
        EnvelopeSource::Stdin => {
            stdin
                .read_to_end(&mut raw)
                .map_err(|source| CliError::ReadEnvelope {
                    source_name: "stdin".to_owned(),
                    source,
                })?;
        }
        EnvelopeSource::File(path) => {
            open_utf8_file(path)
                .and_then(|mut file| file.read_to_end(&mut raw))
                .map_err(|source| CliError::ReadEnvelope {
                    source_name: path.to_string(),
                    source,
                })?;
        }
    }
    Ok(raw)
}

pub(crate) const fn outcome_label(outcome: RecordOutcome) -> &'static str {
    match outcome {
        RecordOutcome::Accepted => "accepted",
        RecordOutcome::IgnoredKind => "ignored",
        RecordOutcome::Stale => "stale",
    }
}
