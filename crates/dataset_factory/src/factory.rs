//! DatasetFactory 核心实现
//!
//! 从 DatasetBlueprint 加载会话，构建 GlobalSequenceView。

use std::ops::Range;
use std::sync::Arc;

use contracts::{DatasetBlueprint, SensorDecoder, SessionId, SplitKind};
use ingestion::{KittiDecoder, RangeProjector, SessionSource};
use sync_engine::{GlobalSequenceView, RecordingSession};
use tracing::{info, instrument, warn};

use crate::error::{FactoryError, Result};

/// Dataset Factory
///
/// 负责按 split 发现会话、读取时间戳并组装全局序列视图。
/// 会话按日期排序访问，同一日期内按配置中的驱动顺序。
#[derive(Debug, Clone)]
pub struct DatasetFactory {
    blueprint: DatasetBlueprint,
    projector: RangeProjector,
}

impl DatasetFactory {
    /// 创建新的 DatasetFactory
    pub fn new(blueprint: DatasetBlueprint) -> Self {
        let projector = RangeProjector::new(blueprint.datasets.kitti.projection());
        Self {
            blueprint,
            projector,
        }
    }

    pub fn blueprint(&self) -> &DatasetBlueprint {
        &self.blueprint
    }

    /// 某个 split 的会话 ID（访问顺序）
    pub fn session_ids(&self, split: SplitKind) -> Result<Vec<SessionId>> {
        let kitti = &self.blueprint.datasets.kitti;
        let config = kitti
            .split(split)
            .ok_or_else(|| FactoryError::unknown_split(split, &kitti.configured_splits()))?;

        Ok(config
            .iter()
            .flat_map(|(date, drives)| drives.iter().map(move |drive| SessionId::new(date, drive)))
            .collect())
    }

    /// 可选的帧子区间（半开）
    fn frames_of(&self, id: &SessionId) -> Option<Range<usize>> {
        self.blueprint
            .datasets
            .kitti
            .frames
            .get(id.drive())
            .map(|[start, end]| *start..*end)
    }

    /// 加载单个会话
    #[instrument(name = "dataset_factory_build_session", skip(self), fields(session = %id))]
    pub fn build_session(&self, id: SessionId) -> Result<RecordingSession> {
        let frames = self.frames_of(&id);
        let source = SessionSource::load(&self.blueprint.datasets.kitti.root_path, id, frames)?;

        if source.inertial_files.is_empty() {
            warn!(session = %source.id, "session has no inertial samples");
        }

        let decoder: Arc<dyn SensorDecoder> =
            Arc::new(KittiDecoder::new(self.projector, source.origin));
        Ok(RecordingSession::from_source(source, decoder)?)
    }

    /// 构建某个 split 的全局序列视图
    ///
    /// # 原子性保证
    /// 任何会话加载失败或长度不足都会使整个构建失败，不返回部分视图。
    #[instrument(name = "dataset_factory_build_split", skip(self), fields(split = %split))]
    pub fn build_split(&self, split: SplitKind) -> Result<GlobalSequenceView> {
        let ids = self.session_ids(split)?;

        let sessions = ids
            .into_iter()
            .map(|id| self.build_session(id))
            .collect::<Result<Vec<_>>>()
            .map_err(|e| match e {
                FactoryError::Dataset(source) => FactoryError::Build { split, source },
                other => other,
            })?;

        let view = GlobalSequenceView::new(sessions, self.blueprint.sequence_size)
            .map_err(|source| FactoryError::Build { split, source })?;

        view.log_summary(split.as_str());
        info!(
            split = %split,
            length = view.length(),
            "split built successfully"
        );
        Ok(view)
    }

    /// 构建配置中的所有 split
    pub fn build_all(&self) -> Result<Vec<(SplitKind, GlobalSequenceView)>> {
        self.blueprint
            .datasets
            .kitti
            .configured_splits()
            .into_iter()
            .map(|split| Ok((split, self.build_split(split)?)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{DatasetError, DatasetsConfig, KittiConfig, SplitConfig};
    use std::collections::{BTreeMap, HashMap};
    use std::fs;
    use std::path::Path;

    const OXTS_LINE: &str = "49.0 8.4 116.0 0.0 0.0 0.0 0 0 0 0 0 0.1 0.2 9.8 0 0 0 0.01 0.02 0.03 0 0 0 0.05 0.02 4 10 4 4 0";

    fn timestamp(micros: u64) -> String {
        format!(
            "2011-09-26 13:02:{:02}.{:06}000",
            micros / 1_000_000,
            micros % 1_000_000
        )
    }

    /// Write a drive with scans every 100 ms and OXTS packets every `imu_ms`.
    fn write_drive(root: &Path, date: &str, drive: &str, scans: u64, imu_ms: u64) {
        let velo = root.join(date).join(drive).join("velodyne_points");
        let oxts = root.join(date).join(drive).join("oxts");
        fs::create_dir_all(velo.join("data")).unwrap();
        fs::create_dir_all(oxts.join("data")).unwrap();

        let mut ts = String::new();
        for i in 0..scans {
            fs::write(velo.join("data").join(format!("{i:010}.txt")), "5 0 0 0.5\n").unwrap();
            ts.push_str(&timestamp(i * 100_000));
            ts.push('\n');
        }
        fs::write(velo.join("timestamps.txt"), ts).unwrap();

        let mut ts = String::new();
        let packets = scans * 100 / imu_ms;
        for i in 0..packets {
            fs::write(oxts.join("data").join(format!("{i:010}.txt")), OXTS_LINE).unwrap();
            ts.push_str(&timestamp(i * imu_ms * 1000));
            ts.push('\n');
        }
        fs::write(oxts.join("timestamps.txt"), ts).unwrap();
    }

    fn blueprint(root: &Path, train: SplitConfig, window: usize) -> DatasetBlueprint {
        DatasetBlueprint {
            version: Default::default(),
            sequence_size: window,
            datasets: DatasetsConfig {
                kitti: KittiConfig {
                    root_path: root.to_path_buf(),
                    image_width: 16,
                    image_height: 4,
                    fov_up: 3.0,
                    fov_down: -25.0,
                    train: Some(train),
                    validation: None,
                    test: None,
                    frames: HashMap::new(),
                },
            },
        }
    }

    #[test]
    fn test_build_split_orders_sessions_by_date() {
        let dir = tempfile::tempdir().unwrap();
        write_drive(dir.path(), "2011_09_30", "drive_b", 4, 10);
        write_drive(dir.path(), "2011_09_26", "drive_a", 5, 10);

        let train = BTreeMap::from([
            ("2011_09_30".to_string(), vec!["drive_b".to_string()]),
            ("2011_09_26".to_string(), vec!["drive_a".to_string()]),
        ]);
        let factory = DatasetFactory::new(blueprint(dir.path(), train, 3));

        let view = factory.build_split(SplitKind::Train).unwrap();
        assert_eq!(view.length(), 5);
        assert_eq!(view.sessions()[0].id().drive(), "drive_a");
        assert_eq!(view.bins()[1].start, 3);

        let sample = view.get(3).unwrap();
        assert_eq!(sample.session.drive(), "drive_b");
        assert_eq!(sample.images[0].shape(), (4, 16, 5));
        // [0 ms, 200 ms) with packets every 10 ms
        assert_eq!(sample.inertial.samples().len(), 20);
        assert_eq!(sample.imu_readings()[0].accelerometer.z, 9.8);
    }

    #[test]
    fn test_unknown_split() {
        let dir = tempfile::tempdir().unwrap();
        let factory = DatasetFactory::new(blueprint(dir.path(), BTreeMap::new(), 3));
        let err = factory.build_split(SplitKind::Test).unwrap_err();
        assert!(matches!(
            err,
            FactoryError::UnknownSplit {
                split: SplitKind::Test,
                ..
            }
        ));
        assert!(err.to_string().contains("available: train"));
    }

    #[test]
    fn test_short_session_fails_whole_split() {
        let dir = tempfile::tempdir().unwrap();
        write_drive(dir.path(), "2011_09_26", "drive_a", 5, 10);
        write_drive(dir.path(), "2011_09_26", "drive_b", 2, 10);

        let train = BTreeMap::from([(
            "2011_09_26".to_string(),
            vec!["drive_a".to_string(), "drive_b".to_string()],
        )]);
        let err = DatasetFactory::new(blueprint(dir.path(), train, 3))
            .build_split(SplitKind::Train)
            .unwrap_err();
        assert!(matches!(
            err.dataset_error(),
            Some(DatasetError::SessionTooShort { length: 2, .. })
        ));
    }

    #[test]
    fn test_missing_drive_is_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let train = BTreeMap::from([("2011_09_26".to_string(), vec!["nope".to_string()])]);
        let err = DatasetFactory::new(blueprint(dir.path(), train, 1))
            .build_split(SplitKind::Train)
            .unwrap_err();
        assert!(err.dataset_error().is_some_and(DatasetError::is_storage));
    }

    #[test]
    fn test_frames_sub_selection() {
        let dir = tempfile::tempdir().unwrap();
        write_drive(dir.path(), "2011_09_26", "drive_a", 10, 25);

        let train = BTreeMap::from([("2011_09_26".to_string(), vec!["drive_a".to_string()])]);
        let mut bp = blueprint(dir.path(), train, 2);
        bp.datasets.kitti.frames.insert("drive_a".to_string(), [4, 8]);

        let view = DatasetFactory::new(bp).build_split(SplitKind::Train).unwrap();
        assert_eq!(view.sessions()[0].length(), 4);
        assert_eq!(view.length(), 3);

        // local 0 is scan 4 (400 ms): [400, 500) holds packets at 400, 425, 450, 475
        let sample = view.get(0).unwrap();
        let first = sample.inertial.samples()[0];
        assert_eq!(sample.inertial.samples().len(), 4);
        assert_eq!(first.index, 16);
        assert_eq!(first.timestamp, sample.scan_timestamps[0]);
        assert_eq!(
            sample.scan_timestamps[1].as_micros() - sample.scan_timestamps[0].as_micros(),
            100_000
        );
    }

    #[test]
    fn test_build_all() {
        let dir = tempfile::tempdir().unwrap();
        write_drive(dir.path(), "2011_09_26", "drive_a", 3, 50);
        let train = BTreeMap::from([("2011_09_26".to_string(), vec!["drive_a".to_string()])]);
        let views = DatasetFactory::new(blueprint(dir.path(), train, 3))
            .build_all()
            .unwrap();
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].0, SplitKind::Train);
        assert_eq!(views[0].1.length(), 1);
    }
}
