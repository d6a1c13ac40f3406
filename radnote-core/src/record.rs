//! Last-known device state and the snapshot that holds it.

use std::collections::{HashMap, hash_map::Entry};

use geo::Coord;
use serde::{Deserialize, Serialize};

use crate::envelope::{TelemetryEnvelope, known_location};

/// Latest reading retained for one device.
///
/// The location fields stay in the hub's `(0,0)`-means-unknown form, and an
/// absent location decodes as unknown; use [`DeviceRecord::location`] for
/// distance work. `device`, `when` and `usv` are required, so an object of
/// any other shape fails to decode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceRecord {
    /// Opaque identifier of the reporting device.
    #[serde(rename = "device")]
    pub device_id: String,
    /// Seconds since the Unix epoch of the retained event.
    #[serde(rename = "when")]
    pub occurred_at: i64,
    /// Best-known latitude in degrees.
    #[serde(default)]
    pub best_lat: f64,
    /// Best-known longitude in degrees.
    #[serde(default)]
    pub best_lon: f64,
    /// Dose rate in microsieverts per hour.
    pub usv: f64,
}

impl DeviceRecord {
    /// Build the record retained for a radiation envelope.
    #[must_use]
    pub fn from_envelope(envelope: &TelemetryEnvelope) -> Self {
        Self {
            device_id: envelope.device_id.clone(),
            occurred_at: envelope.occurred_at,
            best_lat: envelope.best_lat,
            best_lon: envelope.best_lon,
            usv: envelope.reading().usv,
        }
    }

    /// Known location as a `geo` coordinate.
    ///
    /// Returns `None` for `(0,0)`, which devices report before their first
    /// fix. Such records are excluded from every distance-based scan.
    #[must_use]
    pub fn location(&self) -> Option<Coord<f64>> {
        known_location(self.best_lat, self.best_lon)
    }
}

/// How a store treated an incoming envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    /// The envelope replaced (or created) the device's record.
    Accepted,
    /// The envelope's notefile does not carry radiation readings.
    IgnoredKind,
    /// The envelope is older than the retained record.
    Stale,
}

impl RecordOutcome {
    /// Report whether the record was replaced.
    #[must_use]
    pub const fn is_accepted(self) -> bool {
        matches!(self, Self::Accepted)
    }
}

/// Mapping of device identifier to its latest [`DeviceRecord`].
///
/// Serialises as a plain JSON object keyed by device identifier.
///
/// # Examples
/// ```
/// use radnote_core::{DeviceSnapshot, RecordOutcome, TelemetryEnvelope};
///
/// let mut snapshot = DeviceSnapshot::default();
/// let mut envelope = TelemetryEnvelope {
///     device_id: "dev:1".into(),
///     occurred_at: 20,
///     notefile: "_air.qo".into(),
///     ..TelemetryEnvelope::default()
/// };
/// assert_eq!(snapshot.apply(&envelope), RecordOutcome::Accepted);
///
/// envelope.occurred_at = 10;
/// assert_eq!(snapshot.apply(&envelope), RecordOutcome::Stale);
/// assert_eq!(snapshot.get("dev:1").map(|r| r.occurred_at), Some(20));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceSnapshot {
    records: HashMap<String, DeviceRecord>,
}

impl DeviceSnapshot {
    /// Apply an envelope using last-writer-wins on `occurred_at`.
    ///
    /// Envelopes of another notefile never mutate the snapshot. A radiation
    /// envelope replaces the device's record when none exists or when its
    /// timestamp is greater than or equal to the retained one.
    pub fn apply(&mut self, envelope: &TelemetryEnvelope) -> RecordOutcome {
        if !envelope.is_radiation() {
            return RecordOutcome::IgnoredKind;
        }
        match self.records.entry(envelope.device_id.clone()) {
            Entry::Occupied(mut slot) => {
                if envelope.occurred_at < slot.get().occurred_at {
                    return RecordOutcome::Stale;
                }
                slot.insert(DeviceRecord::from_envelope(envelope));
            }
            Entry::Vacant(slot) => {
                slot.insert(DeviceRecord::from_envelope(envelope));
            }
        }
        RecordOutcome::Accepted
    }

    /// Return the record for a device, if any.
    #[must_use]
    pub fn get(&self, device_id: &str) -> Option<&DeviceRecord> {
        self.records.get(device_id)
    }

    /// Iterate over all records in unspecified order.
    pub fn records(&self) -> impl Iterator<Item = &DeviceRecord> + '_ {
        self.records.values()
    }

    /// Iterate over records that have a known location.
    pub fn located(&self) -> impl Iterator<Item = (&DeviceRecord, Coord<f64>)> + '_ {
        self.records
            .values()
            .filter_map(|record| record.location().map(|location| (record, location)))
    }

    /// Number of devices in the snapshot.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Report whether the snapshot holds no devices.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FromIterator<DeviceRecord> for DeviceSnapshot {
    fn from_iter<I: IntoIterator<Item = DeviceRecord>>(iter: I) -> Self {
        Self {
            records: iter
                .into_iter()
                .map(|record| (record.device_id.clone(), record))
                .collect(),
        }
    }
}
