//! 配置校验模块
//!
//! 校验规则：
//! - 字段级约束 (validator derive)：sequence-size >= 1，图像尺寸 >= 1
//! - fov-up > fov-down，且均在 [-90, 90] 度内
//! - root-path 非空
//! - 至少配置一个划分，每个划分至少包含一个 drive，划分内 drive 唯一
//! - frames 裁剪范围合法且引用已配置的 drive

use std::collections::HashSet;

use contracts::{DatasetBlueprint, DatasetError, KittiConfig, SplitKind};
use ::validator::Validate;

/// 校验 DatasetBlueprint 配置
///
/// 返回第一个遇到的错误，或 Ok(())。
pub fn validate(blueprint: &DatasetBlueprint) -> Result<(), DatasetError> {
    validate_fields(blueprint)?;
    let kitti = &blueprint.datasets.kitti;
    validate_root_path(kitti)?;
    validate_fov(kitti)?;
    validate_splits(kitti)?;
    validate_frames(kitti)?;
    Ok(())
}

/// 字段级约束
fn validate_fields(blueprint: &DatasetBlueprint) -> Result<(), DatasetError> {
    blueprint.validate().map_err(|e| {
        let field = e
            .field_errors()
            .keys()
            .next()
            .map(|k| k.to_string())
            .unwrap_or_else(|| "datasets.kitti".to_string());
        DatasetError::config_validation(field, e.to_string())
    })
}

/// 校验数据根目录
fn validate_root_path(kitti: &KittiConfig) -> Result<(), DatasetError> {
    if kitti.root_path.as_os_str().is_empty() {
        return Err(DatasetError::config_validation(
            "datasets.kitti.root-path",
            "root-path cannot be empty",
        ));
    }
    Ok(())
}

/// 校验垂直视场
fn validate_fov(kitti: &KittiConfig) -> Result<(), DatasetError> {
    for (field, value) in [("fov-up", kitti.fov_up), ("fov-down", kitti.fov_down)] {
        if !value.is_finite() || !(-90.0..=90.0).contains(&value) {
            return Err(DatasetError::config_validation(
                format!("datasets.kitti.{field}"),
                format!("{field} must be within [-90, 90] degrees, got {value}"),
            ));
        }
    }

    if kitti.fov_up <= kitti.fov_down {
        return Err(DatasetError::config_validation(
            "datasets.kitti.fov-up / datasets.kitti.fov-down",
            format!(
                "fov-up ({}) must be > fov-down ({})",
                kitti.fov_up, kitti.fov_down
            ),
        ));
    }
    Ok(())
}

/// 校验数据划分
fn validate_splits(kitti: &KittiConfig) -> Result<(), DatasetError> {
    if kitti.configured_splits().is_empty() {
        return Err(DatasetError::config_validation(
            "datasets.kitti",
            "at least one of train / validation / test must be configured",
        ));
    }

    for kind in SplitKind::ALL {
        let Some(split) = kitti.split(kind) else {
            continue;
        };

        let mut seen = HashSet::new();
        let mut drive_count = 0;
        for (date, drives) in split {
            if drives.is_empty() {
                return Err(DatasetError::config_validation(
                    format!("datasets.kitti.{kind}[{date}]"),
                    "date has no drives",
                ));
            }
            for drive in drives {
                if !seen.insert((date.as_str(), drive.as_str())) {
                    return Err(DatasetError::config_validation(
                        format!("datasets.kitti.{kind}[{date}]"),
                        format!("duplicate drive '{drive}'"),
                    ));
                }
                drive_count += 1;
            }
        }

        if drive_count == 0 {
            return Err(DatasetError::config_validation(
                format!("datasets.kitti.{kind}"),
                "split has no drives",
            ));
        }
    }
    Ok(())
}

/// 校验帧范围裁剪
fn validate_frames(kitti: &KittiConfig) -> Result<(), DatasetError> {
    let known: HashSet<&str> = SplitKind::ALL
        .into_iter()
        .filter_map(|kind| kitti.split(kind))
        .flat_map(|split| split.values().flatten().map(String::as_str))
        .collect();

    for (drive, [start, end]) in &kitti.frames {
        if start >= end {
            return Err(DatasetError::config_validation(
                format!("datasets.kitti.frames[{drive}]"),
                format!("frame range start ({start}) must be < end ({end})"),
            ));
        }
        if !known.contains(drive.as_str()) {
            return Err(DatasetError::config_validation(
                format!("datasets.kitti.frames[{drive}]"),
                format!("drive '{drive}' not found in any split"),
            ));
        }
    }
    Ok(())
}
