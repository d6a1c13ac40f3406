//! Dose-rate statistics for devices within a radius of a point.

use geo::Coord;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::{AlertConfig, DeviceSnapshot, meters_between};

/// A radius query centred on a location.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionQuery {
    /// Centre of the region (`x = lon`, `y = lat`).
    pub center: Coord<f64>,
    /// Radius in metres; `None` or `0` selects the configured default.
    pub radius_meters: Option<f64>,
}

impl RegionQuery {
    /// Radius to scan, substituting `default` for a zero or absent radius.
    #[must_use]
    pub fn effective_radius(&self, default: f64) -> f64 {
        match self.radius_meters {
            Some(radius) if radius != 0.0 => radius,
            _ => default,
        }
    }
}

/// Count, minimum, maximum and mean dose rate of the matched devices.
///
/// All statistics are `0` when nothing matched.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RegionStats {
    /// Number of located devices within the radius.
    pub count: u64,
    /// Lowest dose rate among them.
    pub min: f64,
    /// Highest dose rate among them.
    pub max: f64,
    /// Mean dose rate among them.
    pub avg: f64,
}

/// Aggregate dose rates of located devices within `radius_meters` of `center`.
///
/// The radius is inclusive. Records with an unknown location are skipped,
/// and a NaN centre or radius matches nothing.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use radnote_core::{DeviceRecord, DeviceSnapshot, aggregate};
///
/// let snapshot: DeviceSnapshot = [1.0, 3.0, 5.0]
///     .into_iter()
///     .enumerate()
///     .map(|(i, usv)| DeviceRecord {
///         device_id: format!("dev:{i}"),
///         occurred_at: 1,
///         best_lat: 35.0,
///         best_lon: 139.0,
///         usv,
///     })
///     .collect();
///
/// let stats = aggregate(&snapshot, Coord { x: 139.0, y: 35.0 }, 10.0);
/// assert_eq!(stats.count, 3);
/// assert_eq!(stats.avg, 3.0);
/// ```
#[must_use]
#[expect(
    clippy::float_arithmetic,
    clippy::cast_precision_loss,
    reason = "mean dose rate divides the running sum by the match count"
)]
pub fn aggregate(snapshot: &DeviceSnapshot, center: Coord<f64>, radius_meters: f64) -> RegionStats {
    let mut stats = RegionStats::default();
    let mut sum = 0.0_f64;
    let within = snapshot
        .located()
        .filter(|&(_, location)| meters_between(location, center) <= radius_meters);
    for (record, _) in within {
        if stats.count == 0 {
            stats.min = record.usv;
            stats.max = record.usv;
        } else {
            stats.min = stats.min.min(record.usv);
            stats.max = stats.max.max(record.usv);
        }
        sum += record.usv;
        stats.count += 1;
    }
    if stats.count > 0 {
        stats.avg = sum / stats.count as f64;
    }
    stats
}

/// Region statistics together with the query that produced them.
///
/// Field names match the JSON object embedded in region feed items.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegionSummary {
    /// Latitude of the query centre.
    pub lat: f64,
    /// Longitude of the query centre.
    pub lon: f64,
    /// Radius actually scanned, in metres.
    pub radius_meters: f64,
    /// Number of matched devices.
    pub count: u64,
    /// Lowest matched dose rate.
    pub usv_min: f64,
    /// Highest matched dose rate.
    pub usv_max: f64,
    /// Mean matched dose rate.
    pub usv_avg: f64,
    /// Unix seconds at which the summary was computed.
    pub modified: i64,
}

/// Run a region query and package the result for a response envelope.
///
/// `modified` is the freshness timestamp (Unix seconds) to embed.
#[must_use]
pub fn summarise_region(
    snapshot: &DeviceSnapshot,
    query: &RegionQuery,
    config: &AlertConfig,
    modified: i64,
) -> RegionSummary {
    let radius_meters = query.effective_radius(config.default_radius_meters);
    let stats = aggregate(snapshot, query.center, radius_meters);
    if stats.count == 0 {
        debug!(
            "No devices within {radius_meters} m of {},{} ({} records scanned)",
            query.center.y,
            query.center.x,
            snapshot.len()
        );
    }
    RegionSummary {
        lat: query.center.y,
        lon: query.center.x,
        radius_meters,
        count: stats.count,
        usv_min: stats.min,
        usv_max: stats.max,
        usv_avg: stats.avg,
        modified,
    }
}
