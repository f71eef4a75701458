//! Timestamp - shared sensor clock

use serde::{Deserialize, Serialize};
use std::fmt;

/// Microseconds since the Unix epoch (naive wall-clock time of the recording).
///
/// Scan and inertial timestamps of one session live on this clock, so they
/// compare directly. Microseconds is the finest resolution kept; finer
/// digits are truncated when timestamp files are parsed.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    #[inline]
    pub const fn from_micros(micros: i64) -> Self {
        Self(micros)
    }

    #[inline]
    pub const fn as_micros(self) -> i64 {
        self.0
    }

    /// Seconds as f64, for logging and plotting.
    #[inline]
    pub fn as_secs_f64(self) -> f64 {
        self.0 as f64 / 1_000_000.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secs = self.0.div_euclid(1_000_000);
        let micros = self.0.rem_euclid(1_000_000);
        write!(f, "{secs}.{micros:06}")
    }
}

impl fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timestamp({self})")
    }
}
