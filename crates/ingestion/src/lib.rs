//! # Ingestion
//!
//! KITTI raw on-disk format handling.
//!
//! Responsibilities:
//! - Discover a session's scan / OXTS files and load its timestamp series
//! - Read Velodyne scans (`.bin` / `.txt`) and project them to range images
//! - Parse OXTS packets into IMU readings and reference poses
//! - Read the IMU -> Velodyne calibration
//!
//! ## Usage Example
//!
//! ```ignore
//! use ingestion::{KittiDecoder, RangeProjector, SessionSource};
//!
//! let source = SessionSource::load(root, id, None)?;
//! let decoder = KittiDecoder::new(RangeProjector::new(params), source.origin);
//! let image = decoder.decode_scan(&source.scan_files[0])?;
//! ```

mod calibration;
mod decoder;
mod layout;
mod oxts;
mod projection;
mod scan;
mod timestamps;

// Re-exports
pub use calibration::{read_calib_file, transform_from_rot_trans, Calibration, IMU_TO_VELO_FILE};
pub use decoder::KittiDecoder;
pub use layout::{discover_files, SessionLayout, SessionSource, OXTS_EXTENSIONS, SCAN_EXTENSIONS};
pub use oxts::{matrix_to_pose, parse_oxts_line, pose_to_matrix, read_oxts_packet, MercatorOrigin};
pub use projection::RangeProjector;
pub use scan::{read_scan, read_scan_bin, read_scan_txt};
pub use timestamps::{load_timestamps, parse_timestamp};
