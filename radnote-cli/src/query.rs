//! Query and list command implementations for the Radnote CLI.

use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, ValueEnum};
use log::debug;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use radnote_core::{AlertConfig, QueryParams, RegionQuery};
use radnote_store::RadiationMonitor;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::feed::{geofence_feed, region_feed};
use crate::{
    ARG_ALERT_AT_USV, ARG_ALERT_MINUTES, ARG_ALERT_REGION_METERS, ARG_DATA_DIR,
    ARG_DEFAULT_RADIUS_METERS, ARG_FEED, ARG_LAT, ARG_LON, ARG_MODE, ARG_RADIUS_METERS,
    ARG_SAMPLE_MINUTES, ARG_SYNC_MINUTES, CliError, data_dir_or_default, open_monitor,
    require_directory, write_json,
};

/// Which engine answers a located query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum QueryMode {
    /// Geofence check against alerting devices.
    Alert,
    /// Dose-rate statistics within a radius.
    #[default]
    Region,
}

/// CLI arguments for the `query` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Answer a location query from the device snapshot. With a \
                 location, `--mode alert` reports whether it lies inside an \
                 alert region and `--mode region` summarises nearby dose \
                 rates. Without a location, or at 0,0, every device record \
                 is listed. Thresholds can come from CLI flags, configuration \
                 files, or environment variables.",
    about = "Run a geofence or region query"
)]
#[ortho_config(prefix = "RADNOTE")]
pub(crate) struct QueryArgs {
    /// Latitude of the query location in degrees.
    #[arg(long = ARG_LAT, value_name = "deg", allow_hyphen_values = true)]
    #[serde(default)]
    pub(crate) lat: Option<String>,
    /// Longitude of the query location in degrees.
    #[arg(long = ARG_LON, value_name = "deg", allow_hyphen_values = true)]
    #[serde(default)]
    pub(crate) lon: Option<String>,
    /// Region radius in metres; zero selects the default radius.
    #[arg(long = ARG_RADIUS_METERS, value_name = "m")]
    #[serde(default)]
    pub(crate) radius_meters: Option<String>,
    /// Query engine to run for a located query.
    #[arg(long = ARG_MODE, value_enum)]
    #[serde(default)]
    pub(crate) mode: Option<QueryMode>,
    /// Wrap the result in a JSON Feed document.
    #[arg(long = ARG_FEED)]
    #[serde(default)]
    pub(crate) feed: bool,
    /// Directory holding `radnote.json`.
    #[arg(long = ARG_DATA_DIR, value_name = "dir")]
    #[serde(default)]
    pub(crate) data_dir: Option<Utf8PathBuf>,
    /// Dose rate (uSv/h) at or above which a device raises an alert.
    #[arg(long = ARG_ALERT_AT_USV, value_name = "usv")]
    #[serde(default)]
    pub(crate) alert_at_usv: Option<f64>,
    /// Distance in metres within which an alerting device warns a location.
    #[arg(long = ARG_ALERT_REGION_METERS, value_name = "m")]
    #[serde(default)]
    pub(crate) alert_region_meters: Option<f64>,
    /// Radius used when a region query gives none.
    #[arg(long = ARG_DEFAULT_RADIUS_METERS, value_name = "m")]
    #[serde(default)]
    pub(crate) default_radius_meters: Option<f64>,
    /// Minutes a warned device should stay in alert mode.
    #[arg(long = ARG_ALERT_MINUTES, value_name = "min")]
    #[serde(default)]
    pub(crate) alert_minutes: Option<u32>,
    /// Sampling period advised inside an alert region.
    #[arg(long = ARG_SAMPLE_MINUTES, value_name = "min")]
    #[serde(default)]
    pub(crate) sample_minutes: Option<u32>,
    /// Outbound sync period advised inside an alert region.
    #[arg(long = ARG_SYNC_MINUTES, value_name = "min")]
    #[serde(default)]
    pub(crate) sync_minutes: Option<u32>,
}

impl QueryArgs {
    fn into_config(self) -> Result<QueryConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        QueryConfig::try_from(merged)
    }
}

/// Resolved `query` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct QueryConfig {
    pub(crate) lat: Option<String>,
    pub(crate) lon: Option<String>,
    pub(crate) radius_meters: Option<String>,
    pub(crate) mode: QueryMode,
    pub(crate) feed: bool,
    pub(crate) data_dir: Utf8PathBuf,
    pub(crate) alert: AlertConfig,
}

impl QueryConfig {
    fn params(&self) -> QueryParams<'_> {
        QueryParams {
            lat: self.lat.as_deref(),
            lon: self.lon.as_deref(),
            radius_meters: self.radius_meters.as_deref(),
        }
    }
}

impl TryFrom<QueryArgs> for QueryConfig {
    type Error = CliError;

    fn try_from(args: QueryArgs) -> Result<Self, Self::Error> {
        let defaults = AlertConfig::default();
        let alert = AlertConfig {
            alert_at_usv: args.alert_at_usv.unwrap_or(defaults.alert_at_usv),
            alert_region_meters: args
                .alert_region_meters
                .unwrap_or(defaults.alert_region_meters),
            default_radius_meters: args
                .default_radius_meters
                .unwrap_or(defaults.default_radius_meters),
            alert_minutes: args.alert_minutes.unwrap_or(defaults.alert_minutes),
            sample_minutes: args.sample_minutes.unwrap_or(defaults.sample_minutes),
            sync_minutes: args.sync_minutes.unwrap_or(defaults.sync_minutes),
        }
        .validate()?;
        Ok(Self {
            lat: args.lat,
            lon: args.lon,
            radius_meters: args.radius_meters,
            mode: args.mode.unwrap_or_default(),
            feed: args.feed,
            data_dir: data_dir_or_default(args.data_dir),
            alert,
        })
    }
}

/// CLI arguments for the `list` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(about = "Print the latest record for every device")]
#[ortho_config(prefix = "RADNOTE")]
pub(crate) struct ListArgs {
    /// Directory holding `radnote.json`.
    #[arg(long = ARG_DATA_DIR, value_name = "dir")]
    #[serde(default)]
    pub(crate) data_dir: Option<Utf8PathBuf>,
}

pub(crate) fn run_query(args: QueryArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    run_query_with(&config, OffsetDateTime::now_utc(), writer)
}

pub(crate) fn run_query_with(
    config: &QueryConfig,
    now: OffsetDateTime,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    require_directory(&config.data_dir)?;
    let query = config.params().resolve()?;
    let monitor = open_monitor(&config.data_dir, config.alert);
    match query {
        Some(located) => answer_located(&monitor, &located, config, now, writer),
        None => {
            debug!("Query carries no location; listing every device");
            write_json(writer, &monitor.records())
        }
    }
}

fn answer_located(
    monitor: &RadiationMonitor,
    query: &RegionQuery,
    config: &QueryConfig,
    now: OffsetDateTime,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    match config.mode {
        QueryMode::Alert => {
            let verdict = monitor.geofence(query.center);
            if config.feed {
                write_json(writer, &geofence_feed(query.center, &verdict, now)?)
            } else {
                write_json(writer, &verdict)
            }
        }
        QueryMode::Region => {
            let summary = monitor.region(query);
            if config.feed {
                write_json(writer, &region_feed(&summary, now)?)
            } else {
                write_json(writer, &summary)
            }
        }
    }
}

pub(crate) fn run_list(args: ListArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let merged = args.load_and_merge().map_err(CliError::Configuration)?;
    run_list_with(&data_dir_or_default(merged.data_dir), writer)
}

pub(crate) fn run_list_with(data_dir: &Utf8Path, writer: &mut dyn Write) -> Result<(), CliError> {
    require_directory(data_dir)?;
    let monitor = open_monitor(data_dir, AlertConfig::default());
    write_json(writer, &monitor.records())
}

#[cfg(test)]
pub(crate) fn query_config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<QueryConfig, CliError> {
    let merged = QueryArgs::merge_from_layers(layers).map_err(CliError::from)?;
    QueryConfig::try_from(merged)
}
