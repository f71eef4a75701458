//! Layered error definitions
//!
//! Categorized by source: config / index / session / storage

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::SessionId;

/// Which index space an out-of-range index belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexScope {
    /// Global sequence index over all sessions
    Global,
    /// Local scan index inside one session
    Scan,
    /// Local inertial index inside one session
    Inertial,
}

impl fmt::Display for IndexScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Global => f.write_str("global"),
            Self::Scan => f.write_str("scan"),
            Self::Inertial => f.write_str("inertial"),
        }
    }
}

/// Unified error type
#[derive(Debug, Error)]
pub enum DatasetError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Index Errors =====
    /// Index outside of the addressable range
    #[error("{scope} index {index} out of range (len {len})")]
    OutOfRange {
        scope: IndexScope,
        index: usize,
        len: usize,
    },

    /// A session cannot hold a single window
    #[error("session {session} has {length} scans, shorter than window length {window}")]
    SessionTooShort {
        session: SessionId,
        length: usize,
        window: usize,
    },

    // ===== Session Errors =====
    /// Malformed timestamp line
    #[error("timestamp parse error in {}:{line}: {message}", .path.display())]
    TimestampParse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    /// Timestamp series not strictly increasing
    #[error("timestamps in {} are not strictly increasing at line {line}", .path.display())]
    UnorderedTimestamps { path: PathBuf, line: usize },

    /// File lists and timestamp series disagree
    #[error("session {session} is inconsistent: {message}")]
    InconsistentSession { session: SessionId, message: String },

    // ===== Storage Errors =====
    /// Underlying file missing or unreadable
    #[error("failed to read {}: {source}", .path.display())]
    StorageRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File readable but content malformed
    #[error("payload parse error in {}: {message}", .path.display())]
    PayloadParse { path: PathBuf, message: String },
}

impl DatasetError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create out-of-range error
    pub fn out_of_range(scope: IndexScope, index: usize, len: usize) -> Self {
        Self::OutOfRange { scope, index, len }
    }

    /// Create storage read error
    pub fn storage_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::StorageRead {
            path: path.into(),
            source,
        }
    }

    /// Create payload parse error
    pub fn payload_parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::PayloadParse {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create inconsistent session error
    pub fn inconsistent(session: &SessionId, message: impl Into<String>) -> Self {
        Self::InconsistentSession {
            session: session.clone(),
            message: message.into(),
        }
    }

    /// Whether the error is caused by the storage layer
    pub fn is_storage(&self) -> bool {
        matches!(self, Self::StorageRead { .. } | Self::PayloadParse { .. })
    }
}
