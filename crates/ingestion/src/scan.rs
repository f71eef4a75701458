//! Velodyne scan reading
//!
//! `.bin`: packed little-endian f32 quadruples (x, y, z, reflectance).
//! `.txt`: one point per line, four whitespace-separated numbers.

use std::fs;
use std::path::Path;

use contracts::{DatasetError, Point, PointCloud};

const POINT_BYTES: usize = std::mem::size_of::<Point>();

/// Read a scan file, dispatching on its extension.
pub fn read_scan(path: &Path) -> Result<PointCloud, DatasetError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("bin") => read_scan_bin(path),
        Some(ext) if ext.eq_ignore_ascii_case("txt") => read_scan_txt(path),
        _ => Err(DatasetError::payload_parse(
            path,
            "unsupported scan file extension",
        )),
    }
}

/// Read a packed binary scan.
pub fn read_scan_bin(path: &Path) -> Result<PointCloud, DatasetError> {
    let raw = fs::read(path).map_err(|e| DatasetError::storage_read(path, e))?;
    if raw.len() % POINT_BYTES != 0 {
        return Err(DatasetError::payload_parse(
            path,
            format!(
                "size {} is not a multiple of {POINT_BYTES} bytes",
                raw.len()
            ),
        ));
    }

    let points: Vec<Point> = if cfg!(target_endian = "little") {
        bytemuck::pod_collect_to_vec(&raw)
    } else {
        raw.chunks_exact(POINT_BYTES)
            .map(|chunk| {
                let f = |i: usize| {
                    f32::from_le_bytes([chunk[i], chunk[i + 1], chunk[i + 2], chunk[i + 3]])
                };
                Point {
                    x: f(0),
                    y: f(4),
                    z: f(8),
                    reflectance: f(12),
                }
            })
            .collect()
    };
    Ok(PointCloud::new(points))
}

/// Read a text scan.
pub fn read_scan_txt(path: &Path) -> Result<PointCloud, DatasetError> {
    let content = fs::read_to_string(path).map_err(|e| DatasetError::storage_read(path, e))?;

    let mut points = Vec::new();
    for (lineno, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let values = line
            .split_whitespace()
            .map(str::parse::<f32>)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| DatasetError::payload_parse(path, format!("line {}: {e}", lineno + 1)))?;

        let [x, y, z, reflectance] = values[..] else {
            return Err(DatasetError::payload_parse(
                path,
                format!("line {}: expected 4 values, got {}", lineno + 1, values.len()),
            ));
        };
        points.push(Point {
            x,
            y,
            z,
            reflectance,
        });
    }
    Ok(PointCloud::new(points))
}
