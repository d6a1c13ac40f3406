//! Telemetry envelopes as delivered by the notehub event route.
//!
//! An envelope wraps one event from one device. Only envelopes whose notefile
//! is [`RADIATION_NOTEFILE`] carry a [`RadiationReading`] in their body; all
//! other notefiles are accepted by the transport and ignored by the store.

use geo::Coord;
use log::warn;
use serde::{Deserialize, Serialize};

/// Notefile that carries radiation readings from air quality monitors.
pub const RADIATION_NOTEFILE: &str = "_air.qo";

/// A decoded telemetry event.
///
/// Field names match the hub's JSON event format. Unknown fields are
/// ignored so envelopes from newer hub versions still decode.
///
/// # Examples
/// ```
/// use radnote_core::TelemetryEnvelope;
///
/// let envelope: TelemetryEnvelope = serde_json::from_str(
///     r#"{"device":"dev:1","when":1700000000,"file":"_air.qo",
///         "best_lat":37.4,"best_lon":140.9,"body":{"usv":0.21}}"#,
/// )
/// .expect("decode envelope");
/// assert!(envelope.is_radiation());
/// assert_eq!(envelope.reading().usv, 0.21);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TelemetryEnvelope {
    /// Opaque identifier of the reporting device.
    #[serde(rename = "device", default)]
    pub device_id: String,
    /// Seconds since the Unix epoch at which the event occurred.
    #[serde(rename = "when", default)]
    pub occurred_at: i64,
    /// Notefile identifying the body schema.
    #[serde(rename = "file", default)]
    pub notefile: String,
    /// Best-known latitude in degrees; `0` when unknown.
    #[serde(default)]
    pub best_lat: f64,
    /// Best-known longitude in degrees; `0` when unknown.
    #[serde(default)]
    pub best_lon: f64,
    /// Untyped event body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<serde_json::Value>,
}

impl TelemetryEnvelope {
    /// Report whether the envelope carries a radiation reading.
    #[must_use]
    pub fn is_radiation(&self) -> bool {
        self.notefile == RADIATION_NOTEFILE
    }

    /// Best-known location as a `geo` coordinate, `None` when `(0,0)`.
    #[must_use]
    pub fn location(&self) -> Option<Coord<f64>> {
        known_location(self.best_lat, self.best_lon)
    }

    /// Decode the radiation fields from the body.
    ///
    /// A missing body yields an empty reading. A body that is not a
    /// radiation reading is logged and likewise yields an empty reading, so
    /// the device's position and timestamp are still retained.
    #[must_use]
    pub fn reading(&self) -> RadiationReading {
        let Some(body) = self.body.as_ref() else {
            return RadiationReading::default();
        };
        RadiationReading::deserialize(body).unwrap_or_else(|err| {
            warn!(
                "Ignoring undecodable radiation body: device={}, when={} ({err})",
                self.device_id, self.occurred_at
            );
            RadiationReading::default()
        })
    }
}

/// Radiation fields reported in the body of an [`RADIATION_NOTEFILE`] event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RadiationReading {
    /// Counts per minute.
    #[serde(default)]
    pub cpm: f64,
    /// Raw count over the counting window.
    #[serde(default)]
    pub cpm_count: u32,
    /// Length of the counting window in seconds.
    #[serde(rename = "csecs", default)]
    pub cpm_count_secs: u32,
    /// Identifier of the Geiger tube or sensor model.
    #[serde(default)]
    pub sensor: String,
    /// Device temperature in degrees Celsius.
    #[serde(rename = "temperature", default)]
    pub temperature_c: f64,
    /// Supply voltage.
    #[serde(default)]
    pub voltage: f64,
    /// Dose rate in microsieverts per hour.
    #[serde(default)]
    pub usv: f64,
}

/// Interpret a `(lat, lon)` pair, treating `(0,0)` as "no location yet".
#[must_use]
pub(crate) fn known_location(lat: f64, lon: f64) -> Option<Coord<f64>> {
    if lat == 0.0 && lon == 0.0 {
        None
    } else {
        Some(Coord { x: lon, y: lat })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn envelope(body: Option<serde_json::Value>) -> TelemetryEnvelope {
        TelemetryEnvelope {
            device_id: "dev:864475044203262".into(),
            occurred_at: 1_700_000_000,
            notefile: RADIATION_NOTEFILE.into(),
            best_lat: 37.42,
            best_lon: 141.03,
            body,
        }
    }

    #[rstest]
    fn decodes_hub_field_names() {
        let decoded: TelemetryEnvelope = serde_json::from_value(json!({
            "event": "a1b2",
            "device": "dev:1",
            "sn": "radnote-7",
            "when": 42,
            "file": "_air.qo",
            "best_lat": 1.5,
            "best_lon": -2.5,
            "body": {"usv": 0.3, "cpm": 25.0, "csecs": 60, "sensor": "lnd7128ec"}
        }))
        .expect("decode envelope");

        assert_eq!(decoded.device_id, "dev:1");
        assert_eq!(decoded.occurred_at, 42);
        assert!(decoded.is_radiation());
        assert_eq!(decoded.location(), Some(Coord { x: -2.5, y: 1.5 }));

        let reading = decoded.reading();
        assert_eq!(reading.cpm_count_secs, 60);
        assert_eq!(reading.sensor, "lnd7128ec");
    }

    #[rstest]
    fn missing_fields_default_to_zero() {
        let decoded: TelemetryEnvelope = serde_json::from_str("{}").expect("decode empty");
        assert_eq!(decoded, TelemetryEnvelope::default());
        assert!(!decoded.is_radiation());
        assert_eq!(decoded.location(), None);
    }

    #[rstest]
    #[case::absent(None)]
    #[case::not_an_object(Some(json!("noise")))]
    #[case::wrong_types(Some(json!({"usv": "high"})))]
    fn unusable_body_yields_empty_reading(#[case] body: Option<serde_json::Value>) {
        assert_eq!(envelope(body).reading(), RadiationReading::default());
    }

    #[rstest]
    #[case("_env.qo")]
    #[case("_track.qo")]
    #[case("")]
    fn other_notefiles_are_not_radiation(#[case] notefile: &str) {
        let mut other = envelope(None);
        other.notefile = notefile.into();
        assert!(!other.is_radiation());
    }
}
