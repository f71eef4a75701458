//! In-memory decoder for exercising sessions without files.
//!
//! File names carry the payload: `7.bin` decodes to an image filled with
//! `7.0` and `7.txt` to a reading whose every component is `7.0`. A name
//! listed in `failing` reports a storage error instead.

use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};

use contracts::{
    DatasetError, ImuReading, InertialMeasurement, Point, PointCloud, Pose, RangeImage,
    SensorDecoder, Vector3,
};

/// Deterministic [`SensorDecoder`] keyed on file stems
#[derive(Debug, Clone)]
pub struct MockDecoder {
    width: u32,
    height: u32,
    failing: HashSet<PathBuf>,
}

impl MockDecoder {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            failing: HashSet::new(),
        }
    }

    /// Make reads of `path` fail with a storage error.
    pub fn fail_on(mut self, path: impl Into<PathBuf>) -> Self {
        self.failing.insert(path.into());
        self
    }

    fn value_of(&self, path: &Path) -> Result<f64, DatasetError> {
        if self.failing.contains(path) {
            return Err(DatasetError::storage_read(
                path,
                io::Error::new(io::ErrorKind::NotFound, "mock failure"),
            ));
        }
        path.file_stem()
            .and_then(|s| s.to_str())
            .and_then(|s| s.parse::<f64>().ok())
            .ok_or_else(|| DatasetError::payload_parse(path, "mock file stem is not a number"))
    }
}

impl SensorDecoder for MockDecoder {
    fn read_scan(&self, path: &Path) -> Result<PointCloud, DatasetError> {
        let v = self.value_of(path)? as f32;
        Ok(PointCloud::new(vec![Point {
            x: v,
            y: v,
            z: v,
            reflectance: v,
        }]))
    }

    fn decode_scan(&self, path: &Path) -> Result<RangeImage, DatasetError> {
        let v = self.value_of(path)? as f32;
        let mut image = RangeImage::empty(self.width, self.height);
        image.data.fill(v);
        Ok(image)
    }

    fn decode_inertial(&self, path: &Path) -> Result<InertialMeasurement, DatasetError> {
        let v = self.value_of(path)?;
        let mut matrix = Pose::IDENTITY.matrix;
        matrix[3] = v;
        Ok(InertialMeasurement {
            reading: ImuReading {
                accelerometer: Vector3::new(v, v, v),
                gyroscope: Vector3::new(v, v, v),
            },
            pose: Pose::from_row_major(matrix),
        })
    }
}
