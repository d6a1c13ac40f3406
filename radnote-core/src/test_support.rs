//! Builders shared by unit and behaviour tests.

use serde_json::json;

use crate::{DeviceRecord, RADIATION_NOTEFILE, TelemetryEnvelope};

/// Build a record for `device_id` at `(lat, lon)` reporting `usv`.
#[must_use]
pub fn record(device_id: &str, lat: f64, lon: f64, usv: f64) -> DeviceRecord {
    DeviceRecord {
        device_id: device_id.to_owned(),
        occurred_at: 1,
        best_lat: lat,
        best_lon: lon,
        usv,
    }
}

/// Build a radiation envelope for `device_id` with the given timestamp.
///
/// The device reports from Iitate, Fukushima, unless the caller moves it.
#[must_use]
pub fn radiation_envelope(device_id: &str, occurred_at: i64, usv: f64) -> TelemetryEnvelope {
    TelemetryEnvelope {
        device_id: device_id.to_owned(),
        occurred_at,
        notefile: RADIATION_NOTEFILE.to_owned(),
        best_lat: 37.6797,
        best_lon: 140.7353,
        body: Some(json!({ "usv": usv, "cpm": 30.0, "sensor": "lnd7318u" })),
    }
}
