//! # Config Loader
//!
//! Configuration loading and parsing module.
//!
//! Responsibilities:
//! - Parse TOML/JSON configuration files
//! - Validate configuration legality
//! - Generate `DatasetBlueprint`
//!
//! # Example
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let blueprint = ConfigLoader::load_from_path(Path::new("config.toml")).unwrap();
//! println!("Window: {}", blueprint.sequence_size);
//! ```

mod parser;
mod validator;

pub use contracts::DatasetBlueprint;
pub use parser::ConfigFormat;

use contracts::DatasetError;
use std::path::Path;
use tracing::debug;

/// Configuration loader
///
/// Provides static methods to load configuration from files or strings.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from file path
    ///
    /// The format follows the file extension (`.toml` / `.json`). A relative
    /// `root-path` is resolved against the directory holding the file.
    ///
    /// # Errors
    /// - File read failure
    /// - Unsupported format
    /// - Parse or validation failure
    pub fn load_from_path(path: &Path) -> Result<DatasetBlueprint, DatasetError> {
        let format = detect_format(path)?;
        let content =
            std::fs::read_to_string(path).map_err(|e| DatasetError::storage_read(path, e))?;
        debug!(path = %path.display(), ?format, "loading dataset configuration");

        let mut blueprint = Self::load_from_str(&content, format)?;
        if let Some(base) = path.parent() {
            anchor_root(&mut blueprint, base);
        }
        Ok(blueprint)
    }

    /// Load configuration from string
    ///
    /// `root-path` is kept as written.
    pub fn load_from_str(
        content: &str,
        format: ConfigFormat,
    ) -> Result<DatasetBlueprint, DatasetError> {
        let blueprint = parser::parse(content, format)?;
        validator::validate(&blueprint)?;
        Ok(blueprint)
    }

    /// Serialize DatasetBlueprint to TOML string
    pub fn to_toml(blueprint: &DatasetBlueprint) -> Result<String, DatasetError> {
        toml::to_string_pretty(blueprint)
            .map_err(|e| DatasetError::config_parse(format!("TOML serialize error: {e}")))
    }

    /// Serialize DatasetBlueprint to JSON string
    pub fn to_json(blueprint: &DatasetBlueprint) -> Result<String, DatasetError> {
        serde_json::to_string_pretty(blueprint)
            .map_err(|e| DatasetError::config_parse(format!("JSON serialize error: {e}")))
    }
}

fn detect_format(path: &Path) -> Result<ConfigFormat, DatasetError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .ok_or_else(|| DatasetError::config_parse("cannot determine file format from extension"))?;

    ConfigFormat::from_extension(ext)
        .ok_or_else(|| DatasetError::config_parse(format!("unsupported config format: .{ext}")))
}

fn anchor_root(blueprint: &mut DatasetBlueprint, base: &Path) {
    let root = &mut blueprint.datasets.kitti.root_path;
    if root.is_relative() {
        *root = base.join(&*root);
        debug!(root = %root.display(), "resolved relative dataset root");
    }
}
