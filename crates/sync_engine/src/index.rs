//! Global index -> (session, local offset) mapping.

use contracts::{DatasetError, IndexScope, SessionId};
use serde::Serialize;
use tracing::{debug, instrument};

use crate::session::RecordingSession;

/// Contiguous run of global indices owned by one session.
///
/// `start..=end` are the valid window starts of the session, shifted by the
/// lengths of the sessions before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Bin {
    /// First global index (inclusive)
    pub start: usize,
    /// Last global index (inclusive)
    pub end: usize,
    /// Position of the owning session
    pub session: usize,
}

impl Bin {
    /// Number of windows in the bin
    pub fn count(&self) -> usize {
        self.end - self.start + 1
    }

    pub fn contains(&self, global: usize) -> bool {
        self.start <= global && global <= self.end
    }
}

/// Sorted table of bins, one per session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionIndex {
    bins: Vec<Bin>,
    window: usize,
}

impl SessionIndex {
    /// Build bins from session lengths, in the given order.
    ///
    /// Every session must hold at least `window` scans.
    pub fn from_lengths<I>(sessions: I, window: usize) -> Result<Self, DatasetError>
    where
        I: IntoIterator<Item = (SessionId, usize)>,
    {
        if window == 0 {
            return Err(DatasetError::config_validation(
                "sequence-size",
                "window length must be at least 1",
            ));
        }

        let mut bins = Vec::new();
        let mut next = 0usize;
        for (position, (id, length)) in sessions.into_iter().enumerate() {
            if length < window {
                return Err(DatasetError::SessionTooShort {
                    session: id,
                    length,
                    window,
                });
            }
            let start = next;
            let end = start + (length - window);
            bins.push(Bin {
                start,
                end,
                session: position,
            });
            next = end + 1;
        }

        Ok(Self { bins, window })
    }

    /// Build bins for constructed sessions.
    #[instrument(name = "session_index_build", skip(sessions), fields(sessions = sessions.len()))]
    pub fn build(sessions: &[RecordingSession], window: usize) -> Result<Self, DatasetError> {
        let index = Self::from_lengths(
            sessions.iter().map(|s| (s.id().clone(), s.length())),
            window,
        )?;
        debug!(total = index.total_len(), "session index built");
        Ok(index)
    }

    /// Total number of global indices
    pub fn total_len(&self) -> usize {
        self.bins.last().map_or(0, |b| b.end + 1)
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn bins(&self) -> &[Bin] {
        &self.bins
    }

    /// Map a global index to `(session position, local offset)`.
    ///
    /// Binary search over bin starts, O(log sessions).
    pub fn resolve(&self, global: usize) -> Result<(usize, usize), DatasetError> {
        let total = self.total_len();
        if global >= total {
            return Err(DatasetError::out_of_range(IndexScope::Global, global, total));
        }

        // first bin whose start is past `global`, minus one
        let pos = self.bins.partition_point(|b| b.start <= global) - 1;
        let bin = &self.bins[pos];
        debug_assert!(bin.contains(global));
        Ok((bin.session, global - bin.start))
    }
}
