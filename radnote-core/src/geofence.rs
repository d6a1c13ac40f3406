//! Geofence evaluation: is a location near a device reporting high dose?

use geo::Coord;
use serde::{Deserialize, Serialize};

use crate::{AlertAdvisory, AlertConfig, DeviceSnapshot, meters_between};

/// Outcome of a geofence check.
///
/// Serialises as `{"warning":false}` or, inside an alert region, as
/// `{"warning":true,"sample_mins":15,"outbound_mins":60}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeofenceVerdict {
    /// Whether the location lies inside an alert region.
    pub warning: bool,
    /// Sampling advice, present only when `warning` is set.
    #[serde(flatten)]
    pub advisory: Option<AlertAdvisory>,
}

/// Report whether `location` lies inside any alert region.
///
/// A record qualifies when its dose rate is at least
/// [`AlertConfig::alert_at_usv`], it has a known location, and it lies no
/// further than [`AlertConfig::alert_region_meters`] from `location`. The
/// scan stops at the first qualifying record.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use radnote_core::{AlertConfig, DeviceRecord, DeviceSnapshot, is_location_in_warning_region};
///
/// let snapshot: DeviceSnapshot = [DeviceRecord {
///     device_id: "dev:1".into(),
///     occurred_at: 1,
///     best_lat: 37.42,
///     best_lon: 141.03,
///     usv: 4.0,
/// }]
/// .into_iter()
/// .collect();
///
/// let config = AlertConfig::default();
/// let nearby = Coord { x: 141.031, y: 37.421 };
/// assert!(is_location_in_warning_region(&snapshot, nearby, &config));
/// ```
#[must_use]
pub fn is_location_in_warning_region(
    snapshot: &DeviceSnapshot,
    location: Coord<f64>,
    config: &AlertConfig,
) -> bool {
    snapshot
        .located()
        .filter(|(record, _)| record.usv >= config.alert_at_usv)
        .any(|(_, device)| meters_between(device, location) <= config.alert_region_meters)
}

/// Evaluate the geofence and attach sampling advice when warning.
#[must_use]
pub fn evaluate_geofence(
    snapshot: &DeviceSnapshot,
    location: Coord<f64>,
    config: &AlertConfig,
) -> GeofenceVerdict {
    if is_location_in_warning_region(snapshot, location, config) {
        GeofenceVerdict {
            warning: true,
            advisory: Some(config.advisory()),
        }
    } else {
        GeofenceVerdict {
            warning: false,
            advisory: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::record;
    use rstest::{fixture, rstest};
    use serde_json::json;

    const QUERY: Coord<f64> = Coord { x: 141.0, y: 37.0 };

    #[fixture]
    fn config() -> AlertConfig {
        AlertConfig {
            alert_at_usv: 1.0,
            alert_region_meters: 1_000.0,
            ..AlertConfig::default()
        }
    }

    #[rstest]
    fn empty_snapshot_never_warns(config: AlertConfig) {
        assert!(!is_location_in_warning_region(
            &DeviceSnapshot::default(),
            QUERY,
            &config
        ));
    }

    #[rstest]
    fn warns_for_one_qualifying_device_among_others(config: AlertConfig) {
        let snapshot: DeviceSnapshot = [
            // High dose but far away.
            record("dev:far", 37.5, 141.0, 9.0),
            // Close by but below threshold.
            record("dev:quiet", 37.001, 141.0, 0.2),
            // Close and hot.
            record("dev:hot", 37.005, 141.0, 1.5),
        ]
        .into_iter()
        .collect();
        assert!(is_location_in_warning_region(&snapshot, QUERY, &config));
    }

    #[rstest]
    fn does_not_warn_without_qualifying_device(config: AlertConfig) {
        let snapshot: DeviceSnapshot = [
            record("dev:far", 37.5, 141.0, 9.0),
            record("dev:quiet", 37.001, 141.0, 0.2),
        ]
        .into_iter()
        .collect();
        assert!(!is_location_in_warning_region(&snapshot, QUERY, &config));
    }

    #[rstest]
    fn threshold_is_inclusive(config: AlertConfig) {
        let snapshot: DeviceSnapshot = [record("dev:edge", 37.0, 141.0, 1.0)].into_iter().collect();
        assert!(is_location_in_warning_region(&snapshot, QUERY, &config));
    }

    #[rstest]
    fn radius_is_inclusive(config: AlertConfig) {
        let device = record("dev:ring", 37.005, 141.0, 2.0);
        let exact = meters_between(device.location().expect("located"), QUERY);
        let snapshot: DeviceSnapshot = [device].into_iter().collect();
        let at_edge = AlertConfig {
            alert_region_meters: exact,
            ..config
        };
        assert!(is_location_in_warning_region(&snapshot, QUERY, &at_edge));
    }

    #[rstest]
    fn unknown_location_is_excluded(config: AlertConfig) {
        let snapshot: DeviceSnapshot = [record("dev:nofix", 0.0, 0.0, 50.0)].into_iter().collect();
        let origin = Coord { x: 0.0, y: 0.0 };
        assert!(!is_location_in_warning_region(&snapshot, origin, &config));
    }

    #[rstest]
    fn verdict_serialises_advisory_only_when_warning(config: AlertConfig) {
        let hot: DeviceSnapshot = [record("dev:hot", 37.0, 141.0, 3.0)].into_iter().collect();
        let warning = evaluate_geofence(&hot, QUERY, &config);
        assert_eq!(
            serde_json::to_value(warning).expect("encode verdict"),
            json!({"warning": true, "sample_mins": 15, "outbound_mins": 60})
        );

        let clear = evaluate_geofence(&DeviceSnapshot::default(), QUERY, &config);
        assert_eq!(
            serde_json::to_value(clear).expect("encode verdict"),
            json!({"warning": false})
        );
    }
}
