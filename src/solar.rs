//! Persisted sunrise/sunset record.
//!
//! An external routine computes the next sunrise and sunset for the
//! configured location and persists them here; the scheduler only ever reads
//! the record. Both halves of that contract live in this module so the
//! on-disk format has a single owner.
//!
//! The record holds absolute instants. No ordering between the two is
//! assumed: depending on when the producer last refreshed the file, the
//! stored sunset may precede the stored sunrise (today's sunset next to
//! tomorrow's sunrise), so consumers compare each against "now" instead.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind};
use std::path::Path;

use crate::error::SolarTimesError;

/// The next sunrise and sunset as timezone-aware absolute instants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SunTimes {
    pub sunrise: DateTime<Utc>,
    pub sunset: DateTime<Utc>,
}

impl SunTimes {
    /// Read the record from disk.
    ///
    /// A missing record is reported as [`SolarTimesError::NotFound`]; the
    /// scheduler treats every variant as fatal since only the external
    /// producer can repair the file.
    pub fn load(path: &Path) -> Result<Self, SolarTimesError> {
        let file = File::open(path).map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                SolarTimesError::NotFound {
                    path: path.to_path_buf(),
                }
            } else {
                SolarTimesError::Io(e)
            }
        })?;

        Ok(bincode::deserialize_from(BufReader::new(file))?)
    }

    /// Persist the record, creating parent directories as needed.
    ///
    /// This is the producer half of the interface; the scheduler itself
    /// never writes.
    pub fn save(&self, path: &Path) -> Result<(), SolarTimesError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = File::create(path)?;
        bincode::serialize_into(BufWriter::new(file), self)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn load_reports_missing_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sun_times");

        match SunTimes::load(&path) {
            Err(SolarTimesError::NotFound { path: p }) => assert_eq!(p, path),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn saved_record_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("sun_times");

        let times = SunTimes {
            sunrise: Utc.with_ymd_and_hms(2025, 6, 21, 4, 45, 12).unwrap(),
            sunset: Utc.with_ymd_and_hms(2025, 6, 21, 17, 10, 3).unwrap(),
        };

        times.save(&path).unwrap();
        assert_eq!(SunTimes::load(&path).unwrap(), times);
    }

    #[test]
    fn corrupt_record_is_a_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sun_times");
        std::fs::write(&path, b"\x00\x01not a record").unwrap();

        assert!(matches!(
            SunTimes::load(&path),
            Err(SolarTimesError::Decode(_))
        ));
    }
}
