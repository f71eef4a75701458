//! # KITTI Seq CLI
//!
//! 命令行接口入口点。
//!
//! 提供：
//! - 配置加载与验证
//! - 数据划分信息输出
//! - 窗口打印、导出与并发基准测试

mod cli;
mod commands;
mod error;

use anyhow::Result;
use clap::Parser;
use observability::ObservabilityConfig;
use tracing::info;

use cli::{Cli, Commands};
use commands::{run_bench, run_export, run_info, run_sample, run_validate};

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Initialize logging based on CLI options
    init_logging(&cli)?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "KITTI Seq CLI starting"
    );

    // Execute command
    let result = match &cli.command {
        Commands::Validate(args) => run_validate(args),
        Commands::Info(args) => run_info(args),
        Commands::Sample(args) => run_sample(args),
        Commands::Export(args) => run_export(args),
        Commands::Bench(args) => run_bench(args),
    };

    if let Err(ref e) = result {
        tracing::error!(error = %e, "Command failed");
    }

    result
}

/// Initialize logging and the optional metrics endpoint
fn init_logging(cli: &Cli) -> Result<()> {
    observability::init_with_config(ObservabilityConfig {
        log_format: cli.log_format.into(),
        metrics_port: cli.metrics_port,
        ..ObservabilityConfig::from_verbosity(cli.quiet, cli.verbose)
    })
}
