//! `sample` command implementation.

use anyhow::{Context, Result};
use contracts::SequenceSample;
use serde::Serialize;
use tracing::info;

use crate::cli::SampleArgs;
use crate::error::CliError;

/// Per-window shape report
#[derive(Serialize)]
struct WindowReport {
    index: usize,
    session: String,
    start: usize,
    /// (window, height, width, channels)
    images: [usize; 4],
    valid_pixels: usize,
    imu_readings: usize,
    poses: usize,
    has_inertial: bool,
    first_timestamp: String,
    last_timestamp: String,
}

impl WindowReport {
    fn new(index: usize, sample: &SequenceSample) -> Self {
        let (height, width, channels) = sample
            .images
            .first()
            .map(|image| image.shape())
            .unwrap_or_default();
        let stamp = |t: Option<&contracts::Timestamp>| t.map(ToString::to_string).unwrap_or_default();

        Self {
            index,
            session: sample.session.to_string(),
            start: sample.start,
            images: [sample.window_len(), height, width, channels],
            valid_pixels: sample.images.iter().map(|i| i.valid_pixels()).sum(),
            imu_readings: sample.imu_readings().len(),
            poses: sample.ground_truth().len(),
            has_inertial: sample.inertial.has_data(),
            first_timestamp: stamp(sample.scan_timestamps.first()),
            last_timestamp: stamp(sample.scan_timestamps.last()),
        }
    }
}

/// Execute the `sample` command
pub fn run_sample(args: &SampleArgs) -> Result<()> {
    let view = super::load_view(&args.config.config, args.split)?;

    let length = view.length();
    if args.start >= length {
        return Err(CliError::IndexOutOfSplit {
            split: args.split.to_string(),
            index: args.start,
            length,
        }
        .into());
    }

    let end = args.start.saturating_add(args.count).min(length);
    info!(start = args.start, end, length, "Sampling windows");

    for index in args.start..end {
        let sample = view
            .get(index)
            .with_context(|| format!("Failed to read window {index}"))?;
        let report = WindowReport::new(index, &sample);

        if args.json {
            println!(
                "{}",
                serde_json::to_string(&report).context("Failed to serialize window report")?
            );
        } else {
            print_report(&report);
        }
    }

    Ok(())
}

fn print_report(r: &WindowReport) {
    println!(
        "[{}] {} @{}: images {:?}, {} valid px, imu {} x6{}, poses {} x4x4, t {} .. {}",
        r.index,
        r.session,
        r.start,
        r.images,
        r.valid_pixels,
        r.imu_readings,
        if r.has_inertial { "" } else { " (no data)" },
        r.poses,
        r.first_timestamp,
        r.last_timestamp,
    );
}
