//! Alert thresholds and advisory sampling parameters.
//!
//! Values are loaded by the caller (see `radnote-cli`); the engine only
//! consumes the typed result.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configured thresholds for geofence alerts and region queries.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlertConfig {
    /// Dose rate (µSv/h) at or above which a device raises an alert.
    pub alert_at_usv: f64,
    /// Distance in metres within which an alerting device warns a location.
    pub alert_region_meters: f64,
    /// Radius used by region queries that specify zero or no radius.
    pub default_radius_meters: f64,
    /// Minutes a warned device should remain in alert mode.
    pub alert_minutes: u32,
    /// Sampling period advised to devices inside an alert region.
    pub sample_minutes: u32,
    /// Outbound sync period advised to devices inside an alert region.
    pub sync_minutes: u32,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            alert_at_usv: 1.0,
            alert_region_meters: 1_000.0,
            default_radius_meters: 10.0,
            alert_minutes: 60,
            sample_minutes: 15,
            sync_minutes: 60,
        }
    }
}

/// Errors returned by [`AlertConfig::validate`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AlertConfigError {
    /// A threshold or radius was negative, NaN or infinite.
    #[error("{field} must be a finite, non-negative number (got {value})")]
    InvalidMeasure {
        /// Name of the offending setting.
        field: &'static str,
        /// Value supplied by the caller.
        value: f64,
    },
    /// A period was zero.
    #[error("{field} must be at least one minute")]
    ZeroPeriod {
        /// Name of the offending setting.
        field: &'static str,
    },
}

impl AlertConfig {
    /// Check that every setting is usable.
    ///
    /// # Errors
    /// Returns [`AlertConfigError`] naming the first unusable setting.
    pub fn validate(self) -> Result<Self, AlertConfigError> {
        for (field, value) in [
            ("alert_at_usv", self.alert_at_usv),
            ("alert_region_meters", self.alert_region_meters),
            ("default_radius_meters", self.default_radius_meters),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(AlertConfigError::InvalidMeasure { field, value });
            }
        }
        for (field, minutes) in [
            ("alert_minutes", self.alert_minutes),
            ("sample_minutes", self.sample_minutes),
            ("sync_minutes", self.sync_minutes),
        ] {
            if minutes == 0 {
                return Err(AlertConfigError::ZeroPeriod { field });
            }
        }
        Ok(self)
    }

    /// Advisory handed to devices found inside an alert region.
    #[must_use]
    pub const fn advisory(&self) -> AlertAdvisory {
        AlertAdvisory {
            sample_mins: self.sample_minutes,
            outbound_mins: self.sync_minutes,
        }
    }
}

/// Sampling parameters advised while a location is in an alert region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertAdvisory {
    /// Minutes between samples.
    pub sample_mins: u32,
    /// Minutes between outbound syncs.
    pub outbound_mins: u32,
}
