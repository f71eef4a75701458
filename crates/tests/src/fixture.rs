//! 合成 KITTI raw 数据集
//!
//! 在临时目录中写出与真实数据相同布局的会话：
//! `.bin` 点云、OXTS 数据包、时间戳文件与标定文件。

use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use contracts::Point;
use tempfile::TempDir;

/// Test image width
pub const WIDTH: u32 = 64;
/// Test image height
pub const HEIGHT: u32 = 16;

const CALIB_IMU_TO_VELO: &str = "calib_time: 25-May-2012 16:47:16
R: 1 0 0 0 1 0 0 0 1
T: -0.8086759 0.3195559 -0.7997231
";

/// One drive: timestamps as microsecond offsets from 2011-09-26 13:00:00
#[derive(Debug, Clone)]
pub struct DriveSpec {
    pub scan_offsets_us: Vec<i64>,
    pub imu_offsets_us: Vec<i64>,
}

impl DriveSpec {
    /// `scans` scans every `scan_period_us`, inertial packets every
    /// `imu_period_us` over the same span.
    pub fn regular(scans: usize, scan_period_us: i64, imu_period_us: i64) -> Self {
        let span = scans as i64 * scan_period_us;
        Self {
            scan_offsets_us: (0..scans as i64).map(|i| i * scan_period_us).collect(),
            imu_offsets_us: (0..span / imu_period_us).map(|i| i * imu_period_us).collect(),
        }
    }

    pub fn explicit(scan_offsets_us: &[i64], imu_offsets_us: &[i64]) -> Self {
        Self {
            scan_offsets_us: scan_offsets_us.to_vec(),
            imu_offsets_us: imu_offsets_us.to_vec(),
        }
    }
}

fn base_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2011, 9, 26)
        .and_then(|d| d.and_hms_opt(13, 0, 0))
        .unwrap_or_default()
}

/// KITTI-style timestamp line with nanosecond digits
pub fn timestamp_line(offset_us: i64) -> String {
    let t = base_time() + TimeDelta::microseconds(offset_us);
    format!("{}", t.format("%Y-%m-%d %H:%M:%S%.9f"))
}

/// Microseconds since epoch of an offset, as parsed back by the loader
pub fn timestamp_micros(offset_us: i64) -> i64 {
    (base_time() + TimeDelta::microseconds(offset_us))
        .and_utc()
        .timestamp_micros()
}

/// OXTS line of packet `i`; `ax` carries the packet index.
pub fn oxts_line(i: usize) -> String {
    let f = i as f64;
    let mut fields = vec![0.0f64; 30];
    fields[0] = 49.011 + f * 1e-6; // lat
    fields[1] = 8.423 + f * 1e-6; // lon
    fields[2] = 112.0 + f * 0.01; // alt
    fields[5] = 0.001 * f; // yaw
    fields[11] = f; // ax
    fields[12] = 0.5; // ay
    fields[13] = 9.81; // az
    fields[17] = 0.01; // wx
    fields[18] = 0.02; // wy
    fields[19] = 0.03; // wz
    fields[25] = 4.0; // navstat
    fields[26] = 10.0; // numsats

    let mut line = String::new();
    for (k, v) in fields.iter().enumerate() {
        if k > 0 {
            line.push(' ');
        }
        let _ = write!(line, "{v}");
    }
    line
}

/// Ring of points around the sensor; radius grows with the scan index.
pub fn scan_points(k: usize) -> Vec<Point> {
    let radius = 5.0 + k as f32;
    (0..64)
        .map(|j| {
            let angle = j as f32 / 64.0 * std::f32::consts::TAU;
            Point {
                x: radius * angle.cos(),
                y: radius * angle.sin(),
                z: -1.0,
                reflectance: j as f32 / 64.0,
            }
        })
        .collect()
}

/// Synthetic dataset rooted in a temporary directory
pub struct SyntheticDataset {
    dir: TempDir,
}

impl SyntheticDataset {
    pub fn new() -> io::Result<Self> {
        Ok(Self {
            dir: tempfile::tempdir()?,
        })
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Write one drive (and its date's calibration file).
    pub fn add_drive(&self, date: &str, drive: &str, plan: &DriveSpec) -> io::Result<()> {
        let date_dir = self.root().join(date);
        let velo = date_dir.join(drive).join("velodyne_points");
        let oxts = date_dir.join(drive).join("oxts");
        fs::create_dir_all(velo.join("data"))?;
        fs::create_dir_all(oxts.join("data"))?;
        fs::write(date_dir.join("calib_imu_to_velo.txt"), CALIB_IMU_TO_VELO)?;

        let mut stamps = String::new();
        for (k, offset) in plan.scan_offsets_us.iter().enumerate() {
            let points = scan_points(k);
            fs::write(
                velo.join("data").join(format!("{k:010}.bin")),
                bytemuck::cast_slice::<Point, u8>(&points),
            )?;
            stamps.push_str(&timestamp_line(*offset));
            stamps.push('\n');
        }
        fs::write(velo.join("timestamps.txt"), stamps)?;

        let mut stamps = String::new();
        for (i, offset) in plan.imu_offsets_us.iter().enumerate() {
            fs::write(oxts.join("data").join(format!("{i:010}.txt")), oxts_line(i))?;
            stamps.push_str(&timestamp_line(*offset));
            stamps.push('\n');
        }
        fs::write(oxts.join("timestamps.txt"), stamps)?;
        Ok(())
    }

    /// Configuration TOML with a train split of `(date, drives)` entries.
    pub fn config_toml(&self, window: usize, train: &[(&str, &[&str])]) -> String {
        let mut toml = format!(
            "sequence-size = {window}\n\n\
             [datasets.kitti]\n\
             root-path = {:?}\n\
             image-width = {WIDTH}\n\
             image-height = {HEIGHT}\n\
             fov-up = 3.0\n\
             fov-down = -25.0\n\n\
             [datasets.kitti.train]\n",
            self.root().display().to_string()
        );
        for (date, drives) in train {
            let list = drives
                .iter()
                .map(|d| format!("{d:?}"))
                .collect::<Vec<_>>()
                .join(", ");
            let _ = writeln!(toml, "{date:?} = [{list}]");
        }
        toml
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_line_format() {
        assert_eq!(timestamp_line(0), "2011-09-26 13:00:00.000000000");
        assert_eq!(timestamp_line(1_500_250), "2011-09-26 13:00:01.500250000");
    }

    #[test]
    fn test_oxts_line_has_30_fields() {
        assert_eq!(oxts_line(3).split_whitespace().count(), 30);
    }
}
