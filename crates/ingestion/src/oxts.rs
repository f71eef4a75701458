//! OXTS GPS/IMU packets and reference poses
//!
//! Poses follow the KITTI raw devkit convention: position from a Mercator
//! projection scaled by the latitude of the session's first packet,
//! orientation `Rz(yaw) * Ry(pitch) * Rx(roll)`, translated so the first
//! packet sits at the world origin.

use std::fs;
use std::path::Path;

use contracts::{DatasetError, OxtsPacket, Pose};
use nalgebra::{Isometry3, Matrix4, Rotation3, Translation3, UnitQuaternion, Vector3};

/// Earth radius (m), approximation used by the devkit
const EARTH_RADIUS: f64 = 6_378_137.0;

/// Parse the 30 whitespace-separated fields of an OXTS line.
pub fn parse_oxts_line(line: &str) -> Result<OxtsPacket, String> {
    let values = line
        .split_whitespace()
        .map(str::parse::<f64>)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| e.to_string())?;

    if values.len() != OxtsPacket::FIELDS {
        return Err(format!(
            "expected {} fields, got {}",
            OxtsPacket::FIELDS,
            values.len()
        ));
    }

    let v = &values;
    Ok(OxtsPacket {
        lat: v[0],
        lon: v[1],
        alt: v[2],
        roll: v[3],
        pitch: v[4],
        yaw: v[5],
        vn: v[6],
        ve: v[7],
        vf: v[8],
        vl: v[9],
        vu: v[10],
        ax: v[11],
        ay: v[12],
        az: v[13],
        af: v[14],
        al: v[15],
        au: v[16],
        wx: v[17],
        wy: v[18],
        wz: v[19],
        wf: v[20],
        wl: v[21],
        wu: v[22],
        pos_accuracy: v[23],
        vel_accuracy: v[24],
        navstat: v[25] as i32,
        numsats: v[26] as i32,
        posmode: v[27] as i32,
        velmode: v[28] as i32,
        orimode: v[29] as i32,
    })
}

/// Read the single packet stored in an OXTS data file.
pub fn read_oxts_packet(path: &Path) -> Result<OxtsPacket, DatasetError> {
    let content = fs::read_to_string(path).map_err(|e| DatasetError::storage_read(path, e))?;
    let line = content
        .lines()
        .find(|l| !l.trim().is_empty())
        .ok_or_else(|| DatasetError::payload_parse(path, "empty OXTS file"))?;
    parse_oxts_line(line).map_err(|message| DatasetError::payload_parse(path, message))
}

/// Mercator reference of a session: scale and world origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MercatorOrigin {
    scale: f64,
    origin: Vector3<f64>,
}

impl MercatorOrigin {
    /// Fix the reference at the given (first) packet.
    pub fn from_packet(packet: &OxtsPacket) -> Self {
        let scale = packet.lat.to_radians().cos();
        Self {
            scale,
            origin: mercator_translation(packet, scale),
        }
    }

    /// T_w_imu of a packet, as a homogeneous matrix.
    pub fn transform(&self, packet: &OxtsPacket) -> Matrix4<f64> {
        let rotation = Rotation3::from_euler_angles(packet.roll, packet.pitch, packet.yaw);
        let translation = mercator_translation(packet, self.scale) - self.origin;
        Isometry3::from_parts(
            Translation3::from(translation),
            UnitQuaternion::from_rotation_matrix(&rotation),
        )
        .to_homogeneous()
    }

    /// T_w_imu of a packet.
    pub fn pose(&self, packet: &OxtsPacket) -> Pose {
        matrix_to_pose(&self.transform(packet))
    }
}

fn mercator_translation(packet: &OxtsPacket, scale: f64) -> Vector3<f64> {
    let tx = scale * packet.lon.to_radians() * EARTH_RADIUS;
    let ty = scale * EARTH_RADIUS * ((90.0 + packet.lat).to_radians() / 2.0).tan().ln();
    Vector3::new(tx, ty, packet.alt)
}

/// Row-major flatten of a 4x4 matrix.
pub fn matrix_to_pose(m: &Matrix4<f64>) -> Pose {
    let mut matrix = [0.0; 16];
    for row in 0..4 {
        for col in 0..4 {
            matrix[row * 4 + col] = m[(row, col)];
        }
    }
    Pose::from_row_major(matrix)
}

/// Inverse of [`matrix_to_pose`].
pub fn pose_to_matrix(pose: &Pose) -> Matrix4<f64> {
    Matrix4::from_row_slice(&pose.matrix)
}
