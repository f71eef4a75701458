//! `info` command implementation.

use anyhow::{Context, Result};
use dataset_factory::DatasetFactory;
use serde::Serialize;
use sync_engine::DatasetSummary;
use tracing::info;

use crate::cli::InfoArgs;

/// Split layout for JSON output
#[derive(Serialize)]
struct SplitInfo {
    split: String,
    #[serde(flatten)]
    summary: DatasetSummary,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    let path = &args.config.config;
    info!(config = %path.display(), "Loading dataset info");

    let blueprint = super::load_blueprint(path)
        .with_context(|| format!("Failed to load config from {}", path.display()))?;

    let splits = match args.split {
        Some(split) => vec![split],
        None => blueprint.datasets.kitti.configured_splits(),
    };

    let factory = DatasetFactory::new(blueprint);
    let mut infos = Vec::with_capacity(splits.len());
    for split in splits {
        let view = factory
            .build_split(split)
            .with_context(|| format!("Failed to build split '{split}'"))?;
        infos.push(SplitInfo {
            split: split.to_string(),
            summary: view.summary(),
        });
    }

    if args.json {
        let json = serde_json::to_string_pretty(&infos).context("Failed to serialize info")?;
        println!("{}", json);
    } else {
        print_info(&factory, &infos);
    }

    Ok(())
}

fn print_info(factory: &DatasetFactory, infos: &[SplitInfo]) {
    let kitti = &factory.blueprint().datasets.kitti;

    println!("Dataset root: {}", kitti.root_path.display());
    println!(
        "Range image: {}x{} x5, fov [{}, {}] deg",
        kitti.image_width, kitti.image_height, kitti.fov_down, kitti.fov_up
    );

    for info in infos {
        println!("\n=== Split: {} ===", info.split);
        print!("{}", info.summary);
    }
}
