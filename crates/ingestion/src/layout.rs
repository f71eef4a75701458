//! Session directory layout and file discovery
//!
//! ```text
//! <root>/<date>/calib_imu_to_velo.txt
//! <root>/<date>/<drive>/velodyne_points/timestamps.txt
//! <root>/<date>/<drive>/velodyne_points/data/*.bin|*.txt
//! <root>/<date>/<drive>/oxts/timestamps.txt
//! <root>/<date>/<drive>/oxts/data/*.txt
//! ```

use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};

use contracts::{DatasetError, SessionId, Timestamp};
use tracing::{debug, instrument};

use crate::oxts::{read_oxts_packet, MercatorOrigin};
use crate::timestamps::load_timestamps;

/// Extensions accepted for scan files
pub const SCAN_EXTENSIONS: &[&str] = &["bin", "txt"];

/// Extensions accepted for inertial packet files
pub const OXTS_EXTENSIONS: &[&str] = &["txt"];

/// Paths of one session on disk
#[derive(Debug, Clone)]
pub struct SessionLayout {
    /// `<root>/<date>`
    pub calib_dir: PathBuf,
    /// `<root>/<date>/<drive>`
    pub data_dir: PathBuf,
}

impl SessionLayout {
    pub fn new(root: &Path, id: &SessionId) -> Self {
        let calib_dir = root.join(id.date());
        let data_dir = calib_dir.join(id.drive());
        Self {
            calib_dir,
            data_dir,
        }
    }

    pub fn scan_dir(&self) -> PathBuf {
        self.data_dir.join("velodyne_points").join("data")
    }

    pub fn scan_timestamps(&self) -> PathBuf {
        self.data_dir.join("velodyne_points").join("timestamps.txt")
    }

    pub fn oxts_dir(&self) -> PathBuf {
        self.data_dir.join("oxts").join("data")
    }

    pub fn oxts_timestamps(&self) -> PathBuf {
        self.data_dir.join("oxts").join("timestamps.txt")
    }
}

/// List files with one of `extensions` in `dir`, sorted by file name.
pub fn discover_files(dir: &Path, extensions: &[&str]) -> Result<Vec<PathBuf>, DatasetError> {
    let entries = fs::read_dir(dir).map_err(|e| DatasetError::storage_read(dir, e))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| DatasetError::storage_read(dir, e))?.path();
        let matches = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| extensions.iter().any(|x| x.eq_ignore_ascii_case(ext)));
        if matches && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Everything a recording session needs, loaded once.
///
/// File lists are discovered and timestamp series read eagerly; payloads
/// are not touched except for the first inertial packet, which fixes the
/// Mercator origin for pose derivation.
#[derive(Debug, Clone)]
pub struct SessionSource {
    pub id: SessionId,
    pub layout: SessionLayout,
    pub scan_files: Vec<PathBuf>,
    pub scan_timestamps: Vec<Timestamp>,
    pub inertial_files: Vec<PathBuf>,
    pub inertial_timestamps: Vec<Timestamp>,
    pub origin: Option<MercatorOrigin>,
}

impl SessionSource {
    /// Discover and load a session.
    ///
    /// `frames` restricts the scan stream to a local range; scan files and
    /// scan timestamps are cut together. The inertial stream stays whole.
    #[instrument(name = "session_source_load", skip(root), fields(session = %id))]
    pub fn load(
        root: &Path,
        id: SessionId,
        frames: Option<Range<usize>>,
    ) -> Result<Self, DatasetError> {
        let layout = SessionLayout::new(root, &id);

        let mut scan_files = discover_files(&layout.scan_dir(), SCAN_EXTENSIONS)?;
        let mut scan_timestamps = load_timestamps(&layout.scan_timestamps())?;
        let inertial_files = discover_files(&layout.oxts_dir(), OXTS_EXTENSIONS)?;
        let inertial_timestamps = load_timestamps(&layout.oxts_timestamps())?;

        if scan_files.len() != scan_timestamps.len() {
            return Err(DatasetError::inconsistent(
                &id,
                format!(
                    "{} scan files but {} scan timestamps",
                    scan_files.len(),
                    scan_timestamps.len()
                ),
            ));
        }
        if inertial_files.len() != inertial_timestamps.len() {
            return Err(DatasetError::inconsistent(
                &id,
                format!(
                    "{} inertial files but {} inertial timestamps",
                    inertial_files.len(),
                    inertial_timestamps.len()
                ),
            ));
        }

        if let Some(range) = frames {
            if range.start >= range.end || range.end > scan_files.len() {
                return Err(DatasetError::inconsistent(
                    &id,
                    format!(
                        "frame range {}..{} outside of {} scans",
                        range.start,
                        range.end,
                        scan_files.len()
                    ),
                ));
            }
            scan_files = scan_files[range.clone()].to_vec();
            scan_timestamps = scan_timestamps[range].to_vec();
        }

        let origin = match inertial_files.first() {
            Some(first) => Some(MercatorOrigin::from_packet(&read_oxts_packet(first)?)),
            None => None,
        };

        debug!(
            scans = scan_files.len(),
            inertial = inertial_files.len(),
            "session discovered"
        );

        Ok(Self {
            id,
            layout,
            scan_files,
            scan_timestamps,
            inertial_files,
            inertial_timestamps,
            origin,
        })
    }
}
