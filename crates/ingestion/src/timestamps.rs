//! Timestamp file parsing
//!
//! One line per sample: `YYYY-MM-DD HH:MM:SS.fffffffff`. The fractional
//! part is truncated to microseconds.

use std::fs;
use std::path::Path;

use chrono::NaiveDateTime;
use contracts::{DatasetError, Timestamp};
use tracing::debug;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Number of fractional digits kept
const SUBSECOND_DIGITS: usize = 6;

/// Parse a single timestamp line.
pub fn parse_timestamp(line: &str) -> Result<Timestamp, String> {
    let line = line.trim();
    let truncated = match line.split_once('.') {
        Some((head, frac)) => {
            if frac.is_empty() || !frac.bytes().all(|b| b.is_ascii_digit()) {
                return Err(format!("invalid fractional seconds in '{line}'"));
            }
            let keep = frac.len().min(SUBSECOND_DIGITS);
            format!("{head}.{}", &frac[..keep])
        }
        None => line.to_string(),
    };

    let parsed = NaiveDateTime::parse_from_str(&truncated, TIMESTAMP_FORMAT)
        .map_err(|e| format!("'{line}': {e}"))?;
    Ok(Timestamp::from_micros(parsed.and_utc().timestamp_micros()))
}

/// Load a timestamp series eagerly.
///
/// Blank lines are skipped. The series must be strictly increasing.
pub fn load_timestamps(path: &Path) -> Result<Vec<Timestamp>, DatasetError> {
    let content = fs::read_to_string(path).map_err(|e| DatasetError::storage_read(path, e))?;

    let mut series: Vec<Timestamp> = Vec::new();
    for (lineno, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let ts = parse_timestamp(line).map_err(|message| DatasetError::TimestampParse {
            path: path.to_path_buf(),
            line: lineno + 1,
            message,
        })?;

        if series.last().is_some_and(|last| ts <= *last) {
            return Err(DatasetError::UnorderedTimestamps {
                path: path.to_path_buf(),
                line: lineno + 1,
            });
        }
        series.push(ts);
    }

    debug!(path = %path.display(), count = series.len(), "loaded timestamps");
    Ok(series)
}
