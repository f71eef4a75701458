//! KITTI raw payload decoder

use std::path::Path;

use contracts::{
    DatasetError, InertialMeasurement, PointCloud, Pose, RangeImage, SensorDecoder,
};
use tracing::trace;

use crate::oxts::{read_oxts_packet, MercatorOrigin};
use crate::projection::RangeProjector;
use crate::scan::read_scan;

/// Decoder for one KITTI raw session.
///
/// Holds only immutable parameters: the range projector and the session's
/// Mercator origin. Every call reads its file afresh.
#[derive(Debug, Clone)]
pub struct KittiDecoder {
    projector: RangeProjector,
    origin: Option<MercatorOrigin>,
}

impl KittiDecoder {
    pub fn new(projector: RangeProjector, origin: Option<MercatorOrigin>) -> Self {
        Self { projector, origin }
    }
}

impl SensorDecoder for KittiDecoder {
    fn read_scan(&self, path: &Path) -> Result<PointCloud, DatasetError> {
        read_scan(path)
    }

    fn decode_scan(&self, path: &Path) -> Result<RangeImage, DatasetError> {
        let cloud = read_scan(path)?;
        trace!(path = %path.display(), points = cloud.len(), "projecting scan");
        Ok(self.projector.project(&cloud))
    }

    fn decode_inertial(&self, path: &Path) -> Result<InertialMeasurement, DatasetError> {
        let packet = read_oxts_packet(path)?;
        // A session with inertial files always has an origin; a packet read
        // without one is its own origin.
        let origin = self
            .origin
            .unwrap_or_else(|| MercatorOrigin::from_packet(&packet));
        let pose: Pose = origin.pose(&packet);
        Ok(InertialMeasurement {
            reading: packet.imu_reading(),
            pose,
        })
    }
}
