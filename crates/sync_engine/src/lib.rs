//! # Sync Engine
//!
//! 多会话序列窗口引擎。
//!
//! 负责：
//! - 时间区间对齐（二分查找选取惯性样本）
//! - 会话窗口组装（距离图像 + 惯性读数 + 参考位姿）
//! - 全局索引到 (会话, 局部偏移) 的映射
//!
//! ## 使用示例
//!
//! ```ignore
//! use sync_engine::{GlobalSequenceView, RecordingSession};
//!
//! let sessions = sources
//!     .into_iter()
//!     .map(|source| RecordingSession::from_source(source, decoder.clone()))
//!     .collect::<Result<Vec<_>, _>>()?;
//!
//! let view = GlobalSequenceView::new(sessions, 3)?;
//! for global in 0..view.length() {
//!     let sample = view.get(global)?;
//! }
//! ```

mod aligner;
mod index;
pub mod mock;
mod session;
mod view;

// Re-exports
pub use aligner::TemporalAligner;
pub use index::{Bin, SessionIndex};
pub use session::RecordingSession;
pub use view::{DatasetSummary, GlobalSequenceView, SampleTransform, SessionSummary};

// Re-export contracts types
pub use contracts::{AlignedInertial, InertialWindow, SequenceSample};
