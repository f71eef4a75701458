//! Calibration file parsing
//!
//! Files hold `key: v0 v1 ...` lines. Non-numeric entries (e.g.
//! `calib_time`) are skipped.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use contracts::{DatasetError, Pose};
use nalgebra::{Matrix3, Matrix4, Vector3};
use tracing::debug;

use crate::oxts::{matrix_to_pose, pose_to_matrix};

/// IMU -> Velodyne extrinsics file name, under the date directory
pub const IMU_TO_VELO_FILE: &str = "calib_imu_to_velo.txt";

/// Parse a calibration file into numeric entries.
pub fn read_calib_file(path: &Path) -> Result<HashMap<String, Vec<f64>>, DatasetError> {
    let content = fs::read_to_string(path).map_err(|e| DatasetError::storage_read(path, e))?;

    let mut data = HashMap::new();
    for line in content.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let parsed: Result<Vec<f64>, _> = value.split_whitespace().map(str::parse).collect();
        match parsed {
            Ok(values) if !values.is_empty() => {
                data.insert(key.trim().to_string(), values);
            }
            _ => debug!(key = key.trim(), "skipping non-numeric calibration entry"),
        }
    }
    Ok(data)
}

/// Build a rigid transform from a row-major 3x3 rotation and a translation.
pub fn transform_from_rot_trans(rotation: &[f64], translation: &[f64]) -> Option<Matrix4<f64>> {
    if rotation.len() != 9 || translation.len() != 3 {
        return None;
    }
    let r = Matrix3::from_row_slice(rotation);
    let t = Vector3::from_row_slice(translation);

    let mut m = Matrix4::identity();
    m.fixed_view_mut::<3, 3>(0, 0).copy_from(&r);
    m.fixed_view_mut::<3, 1>(0, 3).copy_from(&t);
    Some(m)
}

/// Rigid calibration of a capture date
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calibration {
    /// Velodyne <- IMU
    pub t_velo_imu: Pose,
}

impl Calibration {
    /// Load the calibration stored in `calib_dir`.
    pub fn load(calib_dir: &Path) -> Result<Self, DatasetError> {
        let path = calib_dir.join(IMU_TO_VELO_FILE);
        let data = read_calib_file(&path)?;

        let (Some(r), Some(t)) = (data.get("R"), data.get("T")) else {
            return Err(DatasetError::payload_parse(&path, "missing R or T entry"));
        };
        let m = transform_from_rot_trans(r, t).ok_or_else(|| {
            DatasetError::payload_parse(
                &path,
                format!("R needs 9 values and T 3, got {} and {}", r.len(), t.len()),
            )
        })?;

        Ok(Self {
            t_velo_imu: matrix_to_pose(&m),
        })
    }

    /// IMU <- Velodyne
    pub fn t_imu_velo(&self) -> Option<Pose> {
        pose_to_matrix(&self.t_velo_imu)
            .try_inverse()
            .map(|m| matrix_to_pose(&m))
    }
}
