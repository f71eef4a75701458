//! One recording session: file lists, timestamp series and window assembly.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use contracts::{
    AlignedInertial, DatasetError, IndexScope, InertialWindow, PointCloud, RangeImage,
    SensorDecoder, SequenceSample, SessionId, Timestamp,
};
use ingestion::{Calibration, SessionSource};
use observability::metrics::{record_inertial_fallback, record_storage_error, record_window_served};
use tracing::{instrument, trace, warn};

use crate::aligner::TemporalAligner;

/// Immutable view over one session's files.
///
/// Timestamps are held in memory; payloads are decoded on every call.
pub struct RecordingSession {
    id: SessionId,
    calib_dir: Option<PathBuf>,
    scan_files: Vec<PathBuf>,
    scan_timestamps: Vec<Timestamp>,
    inertial_files: Vec<PathBuf>,
    inertial_timestamps: Vec<Timestamp>,
    decoder: Arc<dyn SensorDecoder>,
}

impl fmt::Debug for RecordingSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordingSession")
            .field("id", &self.id)
            .field("scans", &self.scan_files.len())
            .field("inertial", &self.inertial_files.len())
            .finish()
    }
}

impl RecordingSession {
    /// Build a session from already-ordered file lists and timestamps.
    ///
    /// Each file list must pair one-to-one with its timestamp series, and
    /// both series must be strictly increasing.
    pub fn new(
        id: SessionId,
        scan_files: Vec<PathBuf>,
        scan_timestamps: Vec<Timestamp>,
        inertial_files: Vec<PathBuf>,
        inertial_timestamps: Vec<Timestamp>,
        decoder: Arc<dyn SensorDecoder>,
    ) -> Result<Self, DatasetError> {
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
        for (name, series) in [("scan", &scan_timestamps), ("inertial", &inertial_timestamps)] {
            if series.windows(2).any(|w| w[0] >= w[1]) {
                return Err(DatasetError::inconsistent(
                    &id,
                    format!("{name} timestamps are not strictly increasing"),
                ));
            }
        }

        Ok(Self {
            id,
            calib_dir: None,
            scan_files,
            scan_timestamps,
            inertial_files,
            inertial_timestamps,
            decoder,
        })
    }

    /// Build a session from a discovered on-disk source.
    pub fn from_source(
        source: SessionSource,
        decoder: Arc<dyn SensorDecoder>,
    ) -> Result<Self, DatasetError> {
        let calib_dir = source.layout.calib_dir;
        let mut session = Self::new(
            source.id,
            source.scan_files,
            source.scan_timestamps,
            source.inertial_files,
            source.inertial_timestamps,
            decoder,
        )?;
        session.calib_dir = Some(calib_dir);
        Ok(session)
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Number of scans
    pub fn length(&self) -> usize {
        self.scan_files.len()
    }

    /// Number of inertial samples
    pub fn inertial_len(&self) -> usize {
        self.inertial_files.len()
    }

    pub fn scan_timestamps(&self) -> &[Timestamp] {
        &self.scan_timestamps
    }

    pub fn inertial_timestamps(&self) -> &[Timestamp] {
        &self.inertial_timestamps
    }

    pub fn scan_files(&self) -> &[PathBuf] {
        &self.scan_files
    }

    fn scan_path(&self, index: usize) -> Result<&Path, DatasetError> {
        self.scan_files
            .get(index)
            .map(PathBuf::as_path)
            .ok_or_else(|| DatasetError::out_of_range(IndexScope::Scan, index, self.length()))
    }

    /// Raw point cloud of one scan.
    pub fn get_scan(&self, index: usize) -> Result<PointCloud, DatasetError> {
        let path = self.scan_path(index)?;
        self.decoder
            .read_scan(path)
            .inspect_err(|e| note_storage_error(e, "scan"))
    }

    /// Range image of one scan.
    pub fn get_scan_image(&self, index: usize) -> Result<RangeImage, DatasetError> {
        let path = self.scan_path(index)?;
        self.decoder
            .decode_scan(path)
            .inspect_err(|e| note_storage_error(e, "scan"))
    }

    /// One inertial sample with its reference pose.
    pub fn get_inertial(&self, index: usize) -> Result<AlignedInertial, DatasetError> {
        let (path, timestamp) = self
            .inertial_files
            .get(index)
            .zip(self.inertial_timestamps.get(index))
            .ok_or_else(|| {
                DatasetError::out_of_range(IndexScope::Inertial, index, self.inertial_len())
            })?;

        let measurement = self
            .decoder
            .decode_inertial(path)
            .inspect_err(|e| note_storage_error(e, "inertial"))?;

        Ok(AlignedInertial {
            index,
            timestamp: *timestamp,
            reading: measurement.reading,
            pose: measurement.pose,
        })
    }

    /// Assemble `window` consecutive scans starting at `start` together with
    /// the inertial samples timestamped in `[ts[start], ts[start + window - 1])`.
    ///
    /// When no inertial sample falls in that span the window carries
    /// [`InertialWindow::NoData`] and one warning is logged.
    #[instrument(name = "recording_session_get_window", skip(self), fields(session = %self.id))]
    pub fn get_window(&self, start: usize, window: usize) -> Result<SequenceSample, DatasetError> {
        if window == 0 {
            return Err(DatasetError::config_validation(
                "window",
                "window length must be at least 1",
            ));
        }
        let end = start
            .checked_add(window)
            .filter(|end| *end <= self.length())
            .ok_or_else(|| {
                DatasetError::out_of_range(
                    IndexScope::Scan,
                    start.saturating_add(window - 1),
                    self.length(),
                )
            })?;

        let started = Instant::now();

        let images = self.scan_files[start..end]
            .iter()
            .map(|path| self.decoder.decode_scan(path))
            .collect::<Result<Vec<_>, _>>()
            .inspect_err(|e| note_storage_error(e, "scan"))?;

        let t0 = self.scan_timestamps[start];
        let t1 = self.scan_timestamps[end - 1];
        let selected = TemporalAligner::select(&self.inertial_timestamps, t0..t1);
        trace!(%t0, %t1, selected = selected.len(), "inertial interval");

        let inertial = if selected.is_empty() {
            warn!(
                session = %self.id,
                start,
                t0 = %t0,
                t1 = %t1,
                "no inertial samples inside window, falling back to zero reading"
            );
            record_inertial_fallback(&self.id);
            InertialWindow::NoData
        } else {
            let samples = selected
                .map(|i| self.get_inertial(i))
                .collect::<Result<Vec<_>, _>>()?;
            InertialWindow::Samples { samples }
        };

        record_window_served(
            &self.id,
            started.elapsed().as_secs_f64() * 1000.0,
            inertial.samples().len(),
        );

        Ok(SequenceSample {
            session: self.id.clone(),
            start,
            scan_timestamps: self.scan_timestamps[start..end].to_vec(),
            images,
            inertial,
        })
    }

    /// IMU -> Velodyne calibration of the session's capture date.
    pub fn calibration(&self) -> Result<Calibration, DatasetError> {
        let dir = self.calib_dir.as_deref().ok_or_else(|| {
            DatasetError::inconsistent(&self.id, "session has no calibration directory")
        })?;
        Calibration::load(dir).inspect_err(|e| note_storage_error(e, "calibration"))
    }
}

fn note_storage_error(err: &DatasetError, kind: &str) {
    if err.is_storage() {
        record_storage_error(kind);
    }
}
