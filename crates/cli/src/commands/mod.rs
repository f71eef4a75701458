//! Command implementations.

mod bench;
mod export;
mod info;
mod sample;
mod validate;

pub use bench::run_bench;
pub use export::run_export;
pub use info::run_info;
pub use sample::run_sample;
pub use validate::run_validate;

use std::path::Path;

use contracts::{DatasetBlueprint, SplitKind};
use dataset_factory::DatasetFactory;
use sync_engine::GlobalSequenceView;
use tracing::info;

use crate::error::{CliError, Result};

/// Load and validate the configuration file
pub(crate) fn load_blueprint(path: &Path) -> Result<DatasetBlueprint> {
    if !path.exists() {
        return Err(CliError::config_not_found(path));
    }
    Ok(config_loader::ConfigLoader::load_from_path(path)?)
}

/// Load the configuration and build one split
pub(crate) fn load_view(path: &Path, split: SplitKind) -> Result<GlobalSequenceView> {
    let blueprint = load_blueprint(path)?;
    info!(config = %path.display(), split = %split, "Building split");
    Ok(DatasetFactory::new(blueprint).build_split(split)?)
}
