//! Virtual concatenation of sessions addressed by one global index.

use std::fmt;
use std::sync::Arc;

use contracts::{DatasetError, SequenceSample, SessionId};
use serde::Serialize;
use tracing::{info, instrument};

use crate::index::{Bin, SessionIndex};
use crate::session::RecordingSession;

/// Caller-supplied post-processing applied to every sample
pub type SampleTransform = Arc<dyn Fn(SequenceSample) -> SequenceSample + Send + Sync>;

/// Read-only dataset view over ordered sessions.
///
/// Safe to share across threads behind an `Arc`; every `get` decodes into
/// fresh buffers.
pub struct GlobalSequenceView {
    sessions: Vec<RecordingSession>,
    index: SessionIndex,
    transform: Option<SampleTransform>,
}

impl fmt::Debug for GlobalSequenceView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlobalSequenceView")
            .field("sessions", &self.sessions.len())
            .field("window", &self.index.window())
            .field("length", &self.index.total_len())
            .field("transform", &self.transform.is_some())
            .finish()
    }
}

impl GlobalSequenceView {
    /// Index `sessions` in the given order with windows of `window` scans.
    #[instrument(name = "global_sequence_view_new", skip(sessions), fields(sessions = sessions.len()))]
    pub fn new(sessions: Vec<RecordingSession>, window: usize) -> Result<Self, DatasetError> {
        let index = SessionIndex::build(&sessions, window)?;
        Ok(Self {
            sessions,
            index,
            transform: None,
        })
    }

    /// Apply `transform` to every sample returned by [`get`](Self::get).
    pub fn with_transform<F>(mut self, transform: F) -> Self
    where
        F: Fn(SequenceSample) -> SequenceSample + Send + Sync + 'static,
    {
        self.transform = Some(Arc::new(transform));
        self
    }

    /// Number of addressable windows
    pub fn length(&self) -> usize {
        self.index.total_len()
    }

    pub fn is_empty(&self) -> bool {
        self.length() == 0
    }

    pub fn window(&self) -> usize {
        self.index.window()
    }

    pub fn sessions(&self) -> &[RecordingSession] {
        &self.sessions
    }

    pub fn bins(&self) -> &[Bin] {
        self.index.bins()
    }

    /// Session and local offset behind a global index
    pub fn locate(&self, global: usize) -> Result<(&RecordingSession, usize), DatasetError> {
        let (position, offset) = self.index.resolve(global)?;
        Ok((&self.sessions[position], offset))
    }

    /// Window at a global index.
    pub fn get(&self, global: usize) -> Result<SequenceSample, DatasetError> {
        let (session, offset) = self.locate(global)?;
        let sample = session.get_window(offset, self.index.window())?;
        Ok(match &self.transform {
            Some(transform) => transform(sample),
            None => sample,
        })
    }

    /// Per-session layout of the view
    pub fn summary(&self) -> DatasetSummary {
        let sessions = self
            .sessions
            .iter()
            .zip(self.index.bins())
            .map(|(session, bin)| SessionSummary {
                session: session.id().clone(),
                scans: session.length(),
                inertial: session.inertial_len(),
                bin: *bin,
            })
            .collect();

        DatasetSummary {
            window: self.window(),
            length: self.length(),
            sessions,
        }
    }

    /// Log the summary at info level, one event per session.
    pub fn log_summary(&self, split: &str) {
        info!(
            split,
            length = self.length(),
            window = self.window(),
            sessions = self.sessions.len(),
            "dataset ready"
        );
        for (session, bin) in self.sessions.iter().zip(self.index.bins()) {
            info!(
                date = session.id().date(),
                drive = session.id().drive(),
                length = session.length(),
                bin_start = bin.start,
                bin_end = bin.end,
                "session"
            );
        }
    }
}

/// Serializable description of a view
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetSummary {
    pub window: usize,
    pub length: usize,
    pub sessions: Vec<SessionSummary>,
}

/// One session's entry in a [`DatasetSummary`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSummary {
    pub session: SessionId,
    pub scans: usize,
    pub inertial: usize,
    pub bin: Bin,
}

impl fmt::Display for DatasetSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Window length: {}", self.window)?;
        writeln!(f, "Total windows: {}", self.length)?;
        writeln!(f, "Sessions: {}", self.sessions.len())?;
        for s in &self.sessions {
            writeln!(
                f,
                "  {}: {} scans, {} inertial, bin [{}, {}]",
                s.session, s.scans, s.inertial, s.bin.start, s.bin.end
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockDecoder;
    use contracts::{SensorDecoder, Timestamp};
    use std::path::PathBuf;

    fn session(drive: &str, scans: usize, imu_every: i64) -> RecordingSession {
        let decoder: Arc<dyn SensorDecoder> = Arc::new(MockDecoder::new(2, 1));
        let scan_ts = (0..scans as i64).map(|i| Timestamp::from_micros(i * 100)).collect();
        let imu_count = scans as i64 * 100 / imu_every;
        let imu_ts = (0..imu_count)
            .map(|i| Timestamp::from_micros(i * imu_every))
            .collect();
        RecordingSession::new(
            SessionId::new("2011_09_26", drive),
            (0..scans).map(|i| PathBuf::from(format!("{i}.bin"))).collect(),
            scan_ts,
            (0..imu_count)
                .map(|i| PathBuf::from(format!("{i}.txt")))
                .collect(),
            imu_ts,
            decoder,
        )
        .unwrap()
    }

    #[test]
    fn test_get_crosses_into_second_session() {
        let view =
            GlobalSequenceView::new(vec![session("a", 5, 10), session("b", 4, 10)], 3).unwrap();
        assert_eq!(view.length(), 5);

        let first = view.get(2).unwrap();
        assert_eq!(first.session.drive(), "a");
        assert_eq!(first.start, 2);
        assert_eq!(first.images[0].data[0], 2.0);

        let second = view.get(3).unwrap();
        assert_eq!(second.session.drive(), "b");
        assert_eq!(second.start, 0);
        assert_eq!(second.window_len(), 3);
        // span [0, 200) with imu every 10us -> 20 samples
        assert_eq!(second.inertial.samples().len(), 20);

        assert!(view.get(5).is_err());
    }

    #[test]
    fn test_short_session_fails_construction() {
        let err = GlobalSequenceView::new(vec![session("a", 5, 10), session("b", 2, 10)], 3)
            .unwrap_err();
        assert!(matches!(err, DatasetError::SessionTooShort { .. }));
    }

    #[test]
    fn test_with_transform() {
        let view = GlobalSequenceView::new(vec![session("a", 4, 25)], 2)
            .unwrap()
            .with_transform(|mut sample| {
                sample.images.truncate(1);
                sample
            });
        assert_eq!(view.get(0).unwrap().images.len(), 1);
    }

    #[test]
    fn test_summary() {
        let view =
            GlobalSequenceView::new(vec![session("a", 5, 50), session("b", 4, 50)], 3).unwrap();
        let summary = view.summary();
        assert_eq!(summary.length, 5);
        assert_eq!(summary.sessions[1].bin.start, 3);
        assert_eq!(summary.sessions[1].scans, 4);
        assert_eq!(summary.sessions[0].inertial, 10);

        let text = summary.to_string();
        assert!(text.contains("2011_09_26/b: 4 scans"), "got: {text}");
        view.log_summary("train");
    }

    #[test]
    fn test_view_shared_across_threads() {
        let view = Arc::new(
            GlobalSequenceView::new(vec![session("a", 20, 10), session("b", 20, 10)], 4).unwrap(),
        );
        let total = view.length();

        std::thread::scope(|scope| {
            for worker in 0..4 {
                let view = Arc::clone(&view);
                scope.spawn(move || {
                    for global in (worker..total).step_by(4) {
                        let sample = view.get(global).unwrap();
                        assert_eq!(sample.window_len(), 4);
                        assert_eq!(sample.imu_readings().len(), sample.ground_truth().len());
                    }
                });
            }
        });
    }
}
