//! SensorDecoder trait - payload decoding abstraction
//!
//! Decouples recording sessions from concrete file formats. Sessions only
//! hold paths and timestamps; every payload read goes through a decoder.

use std::path::Path;

use crate::{DatasetError, InertialMeasurement, PointCloud, RangeImage};

/// Sensor payload decoder
///
/// Implemented by the on-disk KITTI decoder and by in-memory mocks in tests.
/// Implementations must not cache: every call reads storage afresh.
///
/// # Example
///
/// ```ignore
/// let decoder: Arc<dyn SensorDecoder> = Arc::new(KittiDecoder::new(projector, origin));
/// let image = decoder.decode_scan(&scan_files[0])?;
/// ```
pub trait SensorDecoder: Send + Sync {
    /// Read the raw point cloud of one scan
    fn read_scan(&self, path: &Path) -> Result<PointCloud, DatasetError>;

    /// Read one scan and project it into a range image
    fn decode_scan(&self, path: &Path) -> Result<RangeImage, DatasetError>;

    /// Read one inertial packet and derive its reference pose
    fn decode_inertial(&self, path: &Path) -> Result<InertialMeasurement, DatasetError>;
}
