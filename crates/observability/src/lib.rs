//! # Observability
//!
//! 可观测性模块：Tracing + Prometheus 指标。
//!
//! ## 功能
//!
//! - Tracing 初始化 (JSON/Pretty/Compact 格式)
//! - Prometheus 指标导出（可选）
//! - 窗口读取指标收集与统计
//!
//! ## 使用示例
//!
//! ```ignore
//! use observability::{init_with_config, ObservabilityConfig, LogFormat};
//!
//! init_with_config(ObservabilityConfig {
//!     log_format: LogFormat::Pretty,
//!     metrics_port: None,
//!     ..Default::default()
//! })?;
//!
//! let sample = view.get(0)?;
//! ```

pub mod metrics;

use anyhow::{Context, Result};
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry,
};

// Re-exports
pub use crate::metrics::{
    record_inertial_fallback, record_storage_error, record_window_served, MetricsSummary,
    RunningStats, StatsSummary, WindowMetricsAggregator,
};

/// 可观测性配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservabilityConfig {
    /// 日志格式
    pub log_format: LogFormat,
    /// Prometheus 端口 (None = 禁用)
    pub metrics_port: Option<u16>,
    /// `RUST_LOG` 未设置时使用的过滤指令
    pub default_log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_format: LogFormat::Pretty,
            metrics_port: None,
            default_log_level: "info".to_string(),
        }
    }
}

impl ObservabilityConfig {
    /// 由命令行的 `-q` / `-v` 计数推导默认日志级别
    pub fn from_verbosity(quiet: bool, verbose: u8) -> Self {
        let level = match (quiet, verbose) {
            (true, _) => "warn",
            (false, 0) => "info",
            (false, 1) => "debug",
            (false, _) => "trace",
        };
        Self {
            default_log_level: level.to_string(),
            ..Self::default()
        }
    }
}

/// 日志格式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// JSON 结构化日志
    Json,
    /// 人类可读格式
    #[default]
    Pretty,
    /// 紧凑单行格式
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            other => Err(format!("unknown log format: {other}")),
        }
    }
}

impl LogFormat {
    fn layer(self) -> Box<dyn Layer<Registry> + Send + Sync> {
        match self {
            Self::Json => fmt::layer()
                .json()
                .with_thread_names(true)
                .with_file(true)
                .with_line_number(true)
                .boxed(),
            Self::Pretty => fmt::layer().pretty().boxed(),
            Self::Compact => fmt::layer().compact().with_target(false).boxed(),
        }
    }
}

/// 安装全局 tracing subscriber，并按需启动 Prometheus 导出端点
///
/// `RUST_LOG` 优先于 `default_log_level`。进程内只能调用一次。
pub fn init_with_config(config: ObservabilityConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.default_log_level))
        .context("Invalid log filter directive")?;

    tracing_subscriber::registry()
        .with(config.log_format.layer())
        .with(filter)
        .try_init()
        .context("Failed to initialize tracing subscriber")?;

    if let Some(port) = config.metrics_port {
        install_prometheus(port)?;
    }

    tracing::debug!(
        log_format = ?config.log_format,
        metrics_port = ?config.metrics_port,
        "Observability initialized"
    );
    Ok(())
}

fn install_prometheus(port: u16) -> Result<()> {
    PrometheusBuilder::new()
        .with_http_listener(([0, 0, 0, 0], port))
        .install()
        .with_context(|| format!("Failed to install Prometheus recorder on port {port}"))?;

    tracing::info!(port, "Prometheus metrics endpoint listening");
    Ok(())
}
