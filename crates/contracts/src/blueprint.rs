//! DatasetBlueprint - Config Loader 输出
//!
//! 描述完整的数据集配置：窗口长度、数据根目录、投影参数、数据划分。

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use validator::Validate;

/// 配置版本
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// 完整的数据集配置蓝图
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "kebab-case")]
pub struct DatasetBlueprint {
    /// 配置版本
    #[serde(default)]
    pub version: ConfigVersion,

    /// 窗口长度 (每个样本包含的连续扫描帧数)，必须 >= 1
    #[validate(range(min = 1))]
    pub sequence_size: usize,

    /// 数据集定义
    #[validate(nested)]
    pub datasets: DatasetsConfig,
}

/// 数据集集合
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DatasetsConfig {
    /// KITTI raw 数据集
    #[validate(nested)]
    pub kitti: KittiConfig,
}

/// 一个数据划分：日期 -> drive 列表
///
/// 按日期排序遍历；同一日期内保持配置中的 drive 顺序。
pub type SplitConfig = BTreeMap<String, Vec<String>>;

/// KITTI raw 数据集配置
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "kebab-case")]
pub struct KittiConfig {
    /// 数据根目录 (<root>/<date>/<drive>/...)
    pub root_path: PathBuf,

    /// 距离图像宽度
    #[validate(range(min = 1))]
    pub image_width: u32,

    /// 距离图像高度
    #[validate(range(min = 1))]
    pub image_height: u32,

    /// 垂直视场上界 (度)
    pub fov_up: f64,

    /// 垂直视场下界 (度)
    pub fov_down: f64,

    /// 训练集
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub train: Option<SplitConfig>,

    /// 验证集
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<SplitConfig>,

    /// 测试集
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test: Option<SplitConfig>,

    /// 可选的帧范围裁剪：drive -> [start, end) (扫描帧下标)
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub frames: HashMap<String, [usize; 2]>,
}

impl KittiConfig {
    /// 获取指定划分
    pub fn split(&self, kind: SplitKind) -> Option<&SplitConfig> {
        match kind {
            SplitKind::Train => self.train.as_ref(),
            SplitKind::Validation => self.validation.as_ref(),
            SplitKind::Test => self.test.as_ref(),
        }
    }

    /// 已配置的划分
    pub fn configured_splits(&self) -> Vec<SplitKind> {
        SplitKind::ALL
            .into_iter()
            .filter(|kind| self.split(*kind).is_some())
            .collect()
    }

    /// 投影参数
    pub fn projection(&self) -> ProjectionParams {
        ProjectionParams {
            width: self.image_width,
            height: self.image_height,
            fov_up: self.fov_up,
            fov_down: self.fov_down,
        }
    }
}

/// 点云 -> 距离图像投影参数
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectionParams {
    /// 图像宽度
    pub width: u32,
    /// 图像高度
    pub height: u32,
    /// 垂直视场上界 (度)
    pub fov_up: f64,
    /// 垂直视场下界 (度)
    pub fov_down: f64,
}

/// 数据划分类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitKind {
    Train,
    Validation,
    Test,
}

impl SplitKind {
    pub const ALL: [SplitKind; 3] = [SplitKind::Train, SplitKind::Validation, SplitKind::Test];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Train => "train",
            Self::Validation => "validation",
            Self::Test => "test",
        }
    }
}

impl fmt::Display for SplitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SplitKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "train" => Ok(Self::Train),
            "validation" | "val" => Ok(Self::Validation),
            "test" => Ok(Self::Test),
            other => Err(format!("unknown split '{other}'")),
        }
    }
}
