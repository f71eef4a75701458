//! Spherical range projection
//!
//! Maps each point to a pixel by azimuth (columns) and elevation (rows)
//! inside the configured vertical field of view. When several points land
//! on the same pixel the closest one wins.

use std::f64::consts::PI;

use contracts::{PointCloud, ProjectionParams, RangeImage};

/// Point cloud -> range image projector
#[derive(Debug, Clone, Copy)]
pub struct RangeProjector {
    params: ProjectionParams,
    fov_down: f64,
    fov: f64,
}

impl RangeProjector {
    pub fn new(params: ProjectionParams) -> Self {
        let fov_up = params.fov_up.to_radians();
        let fov_down = params.fov_down.to_radians();
        Self {
            params,
            fov_down,
            fov: fov_up - fov_down,
        }
    }

    /// Pixel (row, col) of a point at `depth`, or `None` for degenerate points
    /// and zero-sized images.
    fn pixel_of(&self, x: f64, y: f64, z: f64, depth: f64) -> Option<(usize, usize)> {
        if self.params.width == 0 || self.params.height == 0 {
            return None;
        }
        if !depth.is_finite() || depth <= 0.0 {
            return None;
        }
        let width = self.params.width as f64;
        let height = self.params.height as f64;

        let yaw = -y.atan2(x);
        let pitch = (z / depth).clamp(-1.0, 1.0).asin();

        let u = 0.5 * (yaw / PI + 1.0) * width;
        let v = (1.0 - (pitch - self.fov_down) / self.fov) * height;

        let col = u.floor().clamp(0.0, width - 1.0) as usize;
        let row = v.floor().clamp(0.0, height - 1.0) as usize;
        Some((row, col))
    }

    /// Project a scan into a (height, width, 5) range image.
    pub fn project(&self, cloud: &PointCloud) -> RangeImage {
        let mut image = RangeImage::empty(self.params.width, self.params.height);

        for point in &cloud.points {
            let (x, y, z) = (point.x as f64, point.y as f64, point.z as f64);
            let depth = (x * x + y * y + z * z).sqrt();
            let Some((row, col)) = self.pixel_of(x, y, z, depth) else {
                continue;
            };

            let current = image.pixel(row, col)[4];
            if current < 0.0 || (depth as f32) < current {
                image.set_pixel(
                    row,
                    col,
                    [point.x, point.y, point.z, point.reflectance, depth as f32],
                );
            }
        }
        image
    }
}
