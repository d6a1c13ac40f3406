//! Test helpers for seeding data directories and capturing command output.

use super::*;
use radnote_core::test_support::radiation_envelope;
use tempfile::TempDir;

/// Latitude of the envelopes built by `radnote_core::test_support`.
pub(super) const SEED_LAT: &str = "37.6797";
/// Longitude of the envelopes built by `radnote_core::test_support`.
pub(super) const SEED_LON: &str = "140.7353";

pub(super) struct DataDir {
    _dir: TempDir,
    pub(super) root: Utf8PathBuf,
}

impl DataDir {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 tempdir");
        Self { _dir: dir, root }
    }

    /// Record a radiation envelope for `device_id` reporting `usv`.
    pub(super) fn seed(&self, device_id: &str, occurred_at: i64, usv: f64) {
        let monitor = open_monitor(&self.root, AlertConfig::default());
        let outcome = monitor.record(&radiation_envelope(device_id, occurred_at, usv));
        assert!(outcome.is_accepted(), "seed envelope rejected: {outcome:?}");
    }

    pub(super) fn write_file(&self, name: &str, contents: &[u8]) -> Utf8PathBuf {
        let path = self.root.join(name);
        std::fs::write(&path, contents).expect("write test file");
        path
    }
}

#[expect(clippy::float_arithmetic, reason = "tolerance comparison")]
pub(super) fn close(actual: f64, expected: f64) -> bool {
    (actual - expected).abs() < 1e-9
}

pub(super) fn envelope_bytes(device_id: &str, occurred_at: i64, usv: f64) -> Vec<u8> {
    serde_json::to_vec(&radiation_envelope(device_id, occurred_at, usv)).expect("encode envelope")
}

pub(super) fn output_text(buffer: Vec<u8>) -> String {
    String::from_utf8(buffer).expect("utf-8 output")
}

pub(super) fn output_json(buffer: Vec<u8>) -> serde_json::Value {
    serde_json::from_slice(&buffer).expect("JSON output")
}
