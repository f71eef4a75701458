//! Error types for CLI operations.

use std::path::PathBuf;

use contracts::DatasetError;
use dataset_factory::FactoryError;
use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration file not found
    #[error("Configuration file not found: {}", .path.display())]
    ConfigNotFound { path: PathBuf },

    /// Index outside the split
    #[error("Index {index} is outside split '{split}' (length {length})")]
    IndexOutOfSplit {
        split: String,
        index: usize,
        length: usize,
    },

    /// Export write error
    #[error("Failed to export {}: {message}", .path.display())]
    Export { path: PathBuf, message: String },

    /// Dataset error
    #[error(transparent)]
    Dataset(#[from] DatasetError),

    /// Dataset assembly error
    #[error(transparent)]
    Factory(#[from] FactoryError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub fn config_not_found(path: impl Into<PathBuf>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    pub fn export(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Export {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
