//! `validate` command implementation.

use anyhow::{Context, Result};
use contracts::DatasetBlueprint;
use dataset_factory::DatasetFactory;
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    root_path: String,
    sequence_size: usize,
    image: String,
    splits: Vec<SplitSummary>,
}

#[derive(Serialize)]
struct SplitSummary {
    name: String,
    sessions: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    windows: Option<usize>,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    let path = &args.config.config;
    info!(config = %path.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn invalid(config_path: String, error: String) -> ValidationResult {
    ValidationResult {
        valid: false,
        config_path,
        error: Some(error),
        warnings: None,
        summary: None,
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.config.display().to_string();

    let blueprint = match super::load_blueprint(&args.config.config) {
        Ok(blueprint) => blueprint,
        Err(e) => return invalid(config_path, e.to_string()),
    };

    let kitti = &blueprint.datasets.kitti;
    let mut splits: Vec<SplitSummary> = kitti
        .configured_splits()
        .into_iter()
        .map(|split| SplitSummary {
            name: split.to_string(),
            sessions: kitti.split(split).map_or(0, |s| s.values().map(Vec::len).sum::<usize>()),
            windows: None,
        })
        .collect();

    // Optionally load every split from disk
    if args.check_files {
        let factory = DatasetFactory::new(blueprint.clone());
        for (summary, split) in splits.iter_mut().zip(kitti.configured_splits()) {
            match factory.build_split(split) {
                Ok(view) => summary.windows = Some(view.length()),
                Err(e) => return invalid(config_path, e.to_string()),
            }
        }
    }

    let warnings = collect_warnings(&blueprint);
    ValidationResult {
        valid: true,
        config_path,
        error: None,
        warnings: if warnings.is_empty() {
            None
        } else {
            Some(warnings)
        },
        summary: Some(ConfigSummary {
            version: format!("{:?}", blueprint.version),
            root_path: kitti.root_path.display().to_string(),
            sequence_size: blueprint.sequence_size,
            image: format!(
                "{}x{} (fov {}..{} deg)",
                kitti.image_width, kitti.image_height, kitti.fov_down, kitti.fov_up
            ),
            splits,
        }),
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(blueprint: &DatasetBlueprint) -> Vec<String> {
    let mut warnings = Vec::new();
    let kitti = &blueprint.datasets.kitti;

    if !kitti.root_path.exists() {
        warnings.push(format!(
            "root-path '{}' does not exist on this machine",
            kitti.root_path.display()
        ));
    }

    if kitti.train.is_none() {
        warnings.push("No train split configured".to_string());
    }

    if blueprint.sequence_size == 1 {
        warnings.push(
            "sequence-size is 1 - every window spans zero time and carries no inertial data"
                .to_string(),
        );
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Root: {}", summary.root_path);
            println!("  Sequence size: {}", summary.sequence_size);
            println!("  Image: {}", summary.image);
            for split in &summary.splits {
                match split.windows {
                    Some(windows) => println!(
                        "  Split {}: {} sessions, {} windows",
                        split.name, split.sessions, windows
                    ),
                    None => println!("  Split {}: {} sessions", split.name, split.sessions),
                }
            }
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
