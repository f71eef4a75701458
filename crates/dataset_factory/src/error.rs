//! Dataset factory error types

use contracts::{DatasetError, SplitKind};
use thiserror::Error;

/// Dataset factory specific error
#[derive(Debug, Error)]
pub enum FactoryError {
    /// Split requested but absent from the configuration
    #[error("split '{split}' is not configured (available: {available})")]
    UnknownSplit { split: SplitKind, available: String },

    /// Session build failure, tagged with the split being built
    #[error("failed to build split '{split}': {source}")]
    Build {
        split: SplitKind,
        #[source]
        source: DatasetError,
    },

    /// Wrapped DatasetError
    #[error(transparent)]
    Dataset(#[from] DatasetError),
}

impl FactoryError {
    /// Create unknown split error
    pub fn unknown_split(split: SplitKind, available: &[SplitKind]) -> Self {
        let available = if available.is_empty() {
            "none".to_string()
        } else {
            available
                .iter()
                .map(|s| s.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        };
        Self::UnknownSplit { split, available }
    }

    /// Underlying dataset error, if any
    pub fn dataset_error(&self) -> Option<&DatasetError> {
        match self {
            Self::UnknownSplit { .. } => None,
            Self::Build { source, .. } => Some(source),
            Self::Dataset(e) => Some(e),
        }
    }
}

/// Result alias
pub type Result<T> = std::result::Result<T, FactoryError>;
