//! SessionId - Cheap-to-clone recording session identifier
//!
//! Uses Arc<str> internally for O(1) clone operations.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Recording session identifier: capture date plus drive directory.
///
/// Internally uses `Arc<str>` so cloning only increments reference counts.
/// Every `SequenceSample` carries a clone of the id of the session it was
/// cut from.
///
/// # Examples
/// ```
/// use contracts::SessionId;
///
/// let id = SessionId::new("2011_09_30", "2011_09_30_drive_0018_sync");
/// let id2 = id.clone(); // O(1)
/// assert_eq!(id, id2);
/// assert_eq!(id.to_string(), "2011_09_30/2011_09_30_drive_0018_sync");
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId {
    date: Arc<str>,
    drive: Arc<str>,
}

impl SessionId {
    /// Create a new SessionId.
    #[inline]
    pub fn new(date: &str, drive: &str) -> Self {
        Self {
            date: Arc::from(date),
            drive: Arc::from(drive),
        }
    }

    /// Capture date (directory name under the dataset root).
    #[inline]
    pub fn date(&self) -> &str {
        &self.date
    }

    /// Drive directory name under the date directory.
    #[inline]
    pub fn drive(&self) -> &str {
        &self.drive
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.date, self.drive)
    }
}

impl fmt::Debug for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionId({:?}/{:?})", self.date, self.drive)
    }
}
