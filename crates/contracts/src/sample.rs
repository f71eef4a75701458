//! SequenceSample - window query output
//!
//! One fixed-length run of range images plus the inertial samples whose
//! timestamps fall inside the time span covered by those scans.

use serde::{Deserialize, Serialize};

use crate::{ImuReading, Pose, RangeImage, SessionId, Timestamp};

/// One inertial sample selected for a window
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlignedInertial {
    /// Index into the session's inertial stream
    pub index: usize,

    /// Inertial stream timestamp
    pub timestamp: Timestamp,

    /// Accelerations and angular rates
    pub reading: ImuReading,

    /// Reference pose T_w_imu at this sample
    pub pose: Pose,
}

/// Inertial part of a window
///
/// `NoData` is kept distinct from a real zero-motion reading so consumers
/// can tell missing data from a stationary vehicle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InertialWindow {
    /// At least one inertial sample fell inside the window's time span
    Samples { samples: Vec<AlignedInertial> },

    /// No inertial timestamp inside the window's time span
    NoData,
}

impl InertialWindow {
    /// Whether real inertial samples are present
    pub fn has_data(&self) -> bool {
        matches!(self, Self::Samples { .. })
    }

    /// Real samples (empty for `NoData`)
    pub fn samples(&self) -> &[AlignedInertial] {
        match self {
            Self::Samples { samples } => samples,
            Self::NoData => &[],
        }
    }
}

/// Result of a window query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SequenceSample {
    /// Session the window was cut from
    pub session: SessionId,

    /// First local scan index of the window
    pub start: usize,

    /// Scan timestamps, one per image
    pub scan_timestamps: Vec<Timestamp>,

    /// Range images, length == window length, in scan order
    pub images: Vec<RangeImage>,

    /// Time-aligned inertial samples
    pub inertial: InertialWindow,
}

impl SequenceSample {
    /// Number of scans in the window
    pub fn window_len(&self) -> usize {
        self.images.len()
    }

    /// Flattened inertial readings.
    ///
    /// A `NoData` window yields exactly one all-zero reading, so readers that
    /// expect at least one row keep working. Use [`InertialWindow::has_data`]
    /// to tell it apart from real samples.
    pub fn imu_readings(&self) -> Vec<ImuReading> {
        match &self.inertial {
            InertialWindow::Samples { samples } => samples.iter().map(|s| s.reading).collect(),
            InertialWindow::NoData => vec![ImuReading::ZERO],
        }
    }

    /// Reference poses, one per real inertial sample (empty for `NoData`)
    pub fn ground_truth(&self) -> Vec<Pose> {
        self.inertial.samples().iter().map(|s| s.pose).collect()
    }

    /// Readings padded or truncated to `len`, plus a validity mask.
    ///
    /// Padding rows are all-zero and masked `false`; the `NoData` fallback
    /// row is masked `false` as well.
    pub fn padded_inertial(&self, len: usize) -> (Vec<[f64; 6]>, Vec<bool>) {
        let mut rows = Vec::with_capacity(len);
        let mut mask = Vec::with_capacity(len);
        for sample in self.inertial.samples().iter().take(len) {
            rows.push(sample.reading.to_array());
            mask.push(true);
        }
        rows.resize(len, [0.0; 6]);
        mask.resize(len, false);
        (rows, mask)
    }
}
