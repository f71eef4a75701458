//! 序列窗口指标收集模块
//!
//! 记录窗口读取次数、解码延迟、惯性样本数与存储错误。
//! 未安装 recorder 时所有记录均为 no-op。

use std::collections::HashMap;

use contracts::SessionId;
use metrics::{counter, histogram};

/// 记录一次成功返回的窗口
///
/// # Example
///
/// ```ignore
/// use observability::metrics::record_window_served;
///
/// let started = Instant::now();
/// let sample = session.get_window(start, window)?;
/// record_window_served(
///     session.id(),
///     started.elapsed().as_secs_f64() * 1000.0,
///     sample.inertial.samples().len(),
/// );
/// ```
pub fn record_window_served(session: &SessionId, latency_ms: f64, inertial_count: usize) {
    counter!(
        "kitti_seq_windows_served_total",
        "session" => session.to_string()
    )
    .increment(1);

    histogram!("kitti_seq_window_latency_ms").record(latency_ms);
    histogram!("kitti_seq_window_inertial_samples").record(inertial_count as f64);
}

/// 记录无惯性数据的窗口（回退为零读数）
pub fn record_inertial_fallback(session: &SessionId) {
    counter!(
        "kitti_seq_inertial_fallback_total",
        "session" => session.to_string()
    )
    .increment(1);
}

/// 记录存储读取失败
pub fn record_storage_error(kind: &str) {
    counter!(
        "kitti_seq_storage_errors_total",
        "kind" => kind.to_string()
    )
    .increment(1);
}

/// 窗口指标聚合器
///
/// 在内存中聚合指标，供 CLI bench 输出摘要。
#[derive(Debug, Clone, Default)]
pub struct WindowMetricsAggregator {
    /// 总窗口数
    pub total_windows: u64,

    /// 无惯性数据窗口数
    pub fallback_windows: u64,

    /// 失败请求数
    pub failures: u64,

    /// 延迟统计 (ms)
    pub latency_stats: RunningStats,

    /// 每窗口惯性样本数统计
    pub inertial_stats: RunningStats,

    /// 各会话窗口数
    pub session_counts: HashMap<String, u64>,
}

impl WindowMetricsAggregator {
    /// 创建新的聚合器
    pub fn new() -> Self {
        Self::default()
    }

    /// 更新聚合统计
    pub fn update(&mut self, session: &SessionId, latency_ms: f64, inertial_count: Option<usize>) {
        self.total_windows += 1;
        self.latency_stats.push(latency_ms);

        match inertial_count {
            Some(count) => self.inertial_stats.push(count as f64),
            None => self.fallback_windows += 1,
        }

        *self.session_counts.entry(session.to_string()).or_insert(0) += 1;
    }

    /// 记录失败请求
    pub fn record_failure(&mut self) {
        self.failures += 1;
    }

    /// 合并另一个聚合器（多线程结果汇总）
    pub fn merge(&mut self, other: &Self) {
        self.total_windows += other.total_windows;
        self.fallback_windows += other.fallback_windows;
        self.failures += other.failures;
        self.latency_stats.merge(&other.latency_stats);
        self.inertial_stats.merge(&other.inertial_stats);
        for (session, count) in &other.session_counts {
            *self.session_counts.entry(session.clone()).or_insert(0) += count;
        }
    }

    /// 生成摘要报告
    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            total_windows: self.total_windows,
            fallback_windows: self.fallback_windows,
            failures: self.failures,
            fallback_rate: if self.total_windows > 0 {
                self.fallback_windows as f64 / self.total_windows as f64 * 100.0
            } else {
                0.0
            },
            latency_ms: StatsSummary::from(&self.latency_stats),
            inertial_samples: StatsSummary::from(&self.inertial_stats),
            session_counts: self.session_counts.clone(),
        }
    }
}

/// 指标摘要
#[derive(Debug, Clone, Default)]
pub struct MetricsSummary {
    pub total_windows: u64,
    pub fallback_windows: u64,
    pub failures: u64,
    pub fallback_rate: f64,
    pub latency_ms: StatsSummary,
    pub inertial_samples: StatsSummary,
    pub session_counts: HashMap<String, u64>,
}

impl std::fmt::Display for MetricsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Window Metrics Summary ===")?;
        writeln!(f, "Total windows: {}", self.total_windows)?;
        writeln!(
            f,
            "No-data windows: {} ({:.2}%)",
            self.fallback_windows, self.fallback_rate
        )?;
        writeln!(f, "Failed requests: {}", self.failures)?;
        writeln!(f, "Latency (ms): {}", self.latency_ms)?;
        writeln!(f, "Inertial samples: {}", self.inertial_samples)?;

        if !self.session_counts.is_empty() {
            let mut sessions: Vec<_> = self.session_counts.iter().collect();
            sessions.sort();
            writeln!(f, "Windows per session:")?;
            for (session, count) in sessions {
                writeln!(f, "  {}: {}", session, count)?;
            }
        }

        Ok(())
    }
}

/// 统计摘要
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// 在线统计计算器 (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// 添加新值
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    /// 合并两组统计 (Chan et al. 并行公式)
    pub fn merge(&mut self, other: &Self) {
        if other.count == 0 {
            return;
        }
        if self.count == 0 {
            *self = other.clone();
            return;
        }

        let count = self.count + other.count;
        let delta = other.mean - self.mean;
        let mean = self.mean + delta * other.count as f64 / count as f64;
        let m2 = self.m2
            + other.m2
            + delta * delta * (self.count as f64 * other.count as f64) / count as f64;

        self.count = count;
        self.mean = mean;
        self.m2 = m2;
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }

    /// 样本数量
    pub fn count(&self) -> u64 {
        self.count
    }

    /// 均值
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// 方差
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    /// 标准差
    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    /// 最小值
    pub fn min(&self) -> f64 {
        self.min
    }

    /// 最大值
    pub fn max(&self) -> f64 {
        self.max
    }
}
