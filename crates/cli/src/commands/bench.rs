//! `bench` command implementation.
//!
//! Shares one view between worker threads; worker `t` of `T` requests the
//! indices `t, t + T, t + 2T, ...` so no two workers touch the same window.

use std::ops::Range;
use std::time::{Duration, Instant};

use anyhow::Result;
use observability::WindowMetricsAggregator;
use sync_engine::GlobalSequenceView;
use tracing::{info, warn};

use crate::cli::BenchArgs;

/// Execute the `bench` command
pub fn run_bench(args: &BenchArgs) -> Result<()> {
    let view = super::load_view(&args.config.config, args.split)?;

    let total = if args.limit == 0 {
        view.length()
    } else {
        args.limit.min(view.length())
    };
    let threads = args.threads.max(1);
    info!(windows = total, threads, "Starting benchmark");

    let started = Instant::now();
    let metrics = run_workers(&view, 0..total, threads);
    let elapsed = started.elapsed();

    print_summary(&metrics, elapsed, threads);
    if metrics.failures > 0 {
        anyhow::bail!("{} window requests failed", metrics.failures);
    }
    Ok(())
}

/// Indices served by `worker` out of `workers`
fn worker_indices(range: Range<usize>, worker: usize, workers: usize) -> impl Iterator<Item = usize> {
    range.skip(worker).step_by(workers)
}

fn run_workers(view: &GlobalSequenceView, range: Range<usize>, threads: usize) -> WindowMetricsAggregator {
    let mut merged = WindowMetricsAggregator::new();

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..threads)
            .map(|worker| {
                let range = range.clone();
                scope.spawn(move || {
                    let mut local = WindowMetricsAggregator::new();
                    for global in worker_indices(range, worker, threads) {
                        let started = Instant::now();
                        match view.get(global) {
                            Ok(sample) => {
                                let latency_ms = started.elapsed().as_secs_f64() * 1000.0;
                                let inertial = sample
                                    .inertial
                                    .has_data()
                                    .then(|| sample.inertial.samples().len());
                                local.update(&sample.session, latency_ms, inertial);
                            }
                            Err(e) => {
                                warn!(global, error = %e, "window request failed");
                                local.record_failure();
                            }
                        }
                    }
                    local
                })
            })
            .collect();

        for handle in handles {
            match handle.join() {
                Ok(local) => merged.merge(&local),
                Err(_) => {
                    warn!("benchmark worker panicked");
                    merged.record_failure();
                }
            }
        }
    });

    merged
}

fn print_summary(metrics: &WindowMetricsAggregator, elapsed: Duration, threads: usize) {
    let secs = elapsed.as_secs_f64();
    let throughput = if secs > 0.0 {
        metrics.total_windows as f64 / secs
    } else {
        0.0
    };

    println!("\nBenchmark: {} threads, {:.2}s, {:.1} windows/s", threads, secs, throughput);
    print!("{}", metrics.summary());
}
