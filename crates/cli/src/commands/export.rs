//! `export` command implementation.
//!
//! Writes every channel of every scan of one window as a 16-bit grayscale
//! PNG, plus `window.json` holding the decoding ranges, the inertial
//! readings and the reference poses.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use contracts::{InertialWindow, RangeChannel, RangeImage, SequenceSample, Timestamp};
use image::{ImageBuffer, Luma};
use serde::Serialize;
use tracing::{debug, info};

use crate::cli::ExportArgs;
use crate::error::{self, CliError};

/// Code reserved for pixels without a return
const EMPTY_CODE: u16 = 0;
const MAX_CODE: f32 = (u16::MAX - 1) as f32;

/// Linear mapping of one channel to 16-bit codes.
///
/// `value = min + (code - 1) / 65534 * (max - min)`; code 0 marks an
/// empty pixel.
#[derive(Debug, Clone, PartialEq, Serialize)]
struct ChannelEncoding {
    channel: &'static str,
    file: String,
    min: f32,
    max: f32,
}

#[derive(Serialize)]
struct ScanManifest {
    timestamp: Timestamp,
    channels: Vec<ChannelEncoding>,
}

#[derive(Serialize)]
struct WindowManifest<'a> {
    split: String,
    index: usize,
    session: String,
    start: usize,
    width: u32,
    height: u32,
    scans: Vec<ScanManifest>,
    inertial: &'a InertialWindow,
    imu_readings: Vec<[f64; 6]>,
    ground_truth: Vec<[f64; 16]>,
}

/// Execute the `export` command
pub fn run_export(args: &ExportArgs) -> Result<()> {
    let view = super::load_view(&args.config.config, args.split)?;

    if args.index >= view.length() {
        return Err(CliError::IndexOutOfSplit {
            split: args.split.to_string(),
            index: args.index,
            length: view.length(),
        }
        .into());
    }

    let sample = view
        .get(args.index)
        .with_context(|| format!("Failed to read window {}", args.index))?;

    fs::create_dir_all(&args.output)
        .with_context(|| format!("Failed to create {}", args.output.display()))?;

    let manifest_path = export_window(&sample, args)?;
    info!(
        output = %args.output.display(),
        manifest = %manifest_path.display(),
        scans = sample.window_len(),
        "Window exported"
    );
    println!("✓ Exported window {} to {}", args.index, args.output.display());
    Ok(())
}

fn export_window(sample: &SequenceSample, args: &ExportArgs) -> error::Result<PathBuf> {
    let (width, height) = sample
        .images
        .first()
        .map_or((0, 0), |image| (image.width, image.height));

    let mut scans = Vec::with_capacity(sample.window_len());
    for (k, (image, timestamp)) in sample
        .images
        .iter()
        .zip(&sample.scan_timestamps)
        .enumerate()
    {
        let mut channels = Vec::with_capacity(RangeImage::CHANNELS);
        for channel in RangeChannel::ALL {
            let file = format!("{k:02}_{}.png", channel.name());
            let (codes, min, max) = encode_channel(image, channel);
            write_png(&args.output.join(&file), image.width, image.height, codes)?;
            channels.push(ChannelEncoding {
                channel: channel.name(),
                file,
                min,
                max,
            });
        }
        scans.push(ScanManifest {
            timestamp: *timestamp,
            channels,
        });
    }

    let manifest = WindowManifest {
        split: args.split.to_string(),
        index: args.index,
        session: sample.session.to_string(),
        start: sample.start,
        width,
        height,
        scans,
        inertial: &sample.inertial,
        imu_readings: sample.imu_readings().iter().map(|r| r.to_array()).collect(),
        ground_truth: sample.ground_truth().iter().map(|p| p.matrix).collect(),
    };

    let path = args.output.join("window.json");
    let file = File::create(&path)?;
    serde_json::to_writer_pretty(file, &manifest)
        .map_err(|e| CliError::export(&path, e.to_string()))?;
    Ok(path)
}

/// Quantize one channel; returns the codes and the (min, max) of valid pixels.
fn encode_channel(image: &RangeImage, channel: RangeChannel) -> (Vec<u16>, f32, f32) {
    let values = image.channel(channel);
    let valid = image.channel(RangeChannel::Range);

    let (min, max) = values
        .iter()
        .zip(&valid)
        .filter(|(_, range)| **range >= 0.0)
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), (v, _)| {
            (lo.min(*v), hi.max(*v))
        });
    if min > max {
        return (vec![EMPTY_CODE; values.len()], 0.0, 0.0);
    }

    let span = max - min;
    let codes = values
        .iter()
        .zip(&valid)
        .map(|(v, range)| {
            if *range < 0.0 {
                EMPTY_CODE
            } else if span == 0.0 {
                1
            } else {
                1 + ((v - min) / span * MAX_CODE).round() as u16
            }
        })
        .collect();
    (codes, min, max)
}

fn write_png(path: &Path, width: u32, height: u32, codes: Vec<u16>) -> error::Result<()> {
    let buffer = ImageBuffer::<Luma<u16>, Vec<u16>>::from_raw(width, height, codes)
        .ok_or_else(|| CliError::export(path, "buffer size does not match image shape"))?;
    buffer
        .save(path)
        .map_err(|e| CliError::export(path, e.to_string()))?;
    debug!(path = %path.display(), "channel written");
    Ok(())
}
