//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 合成数据集 (`fixture`)
//! - 配置 -> 工厂 -> 全局视图 的端到端测试
//! - 全局索引、时间对齐与回退行为的性质测试

pub mod fixture;

#[cfg(test)]
mod contract_tests {
    use contracts::{InertialWindow, SequenceSample, SessionId, Timestamp};

    #[test]
    fn test_no_data_serializes_as_tagged_variant() {
        let sample = SequenceSample {
            session: SessionId::new("2011_09_26", "drive_0001"),
            start: 0,
            scan_timestamps: vec![Timestamp::from_micros(1)],
            images: vec![],
            inertial: InertialWindow::NoData,
        };
        let json = serde_json::to_value(&sample).unwrap();
        assert_eq!(json["inertial"]["kind"], "no_data");
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{DatasetError, ImuReading, IndexScope, SplitKind};
    use dataset_factory::{DatasetFactory, FactoryError};
    use ingestion::pose_to_matrix;
    use sync_engine::{GlobalSequenceView, TemporalAligner};
    use tracing::{Event, Level, Subscriber};
    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

    use crate::fixture::{timestamp_micros, DriveSpec, SyntheticDataset, HEIGHT, WIDTH};

    const DATE: &str = "2011_09_26";

    /// Counts WARN events
    struct WarnCounter(Arc<AtomicUsize>);

    impl<S: Subscriber> Layer<S> for WarnCounter {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            if *event.metadata().level() == Level::WARN {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    fn build(
        dataset: &SyntheticDataset,
        window: usize,
        drives: &[&str],
    ) -> Result<GlobalSequenceView, FactoryError> {
        let toml = dataset.config_toml(window, &[(DATE, drives)]);
        let blueprint = ConfigLoader::load_from_str(&toml, ConfigFormat::Toml)?;
        DatasetFactory::new(blueprint).build_split(SplitKind::Train)
    }

    /// Two drives of 5 and 4 scans every 100 ms, inertial every 10 ms
    fn two_drive_dataset() -> SyntheticDataset {
        let dataset = SyntheticDataset::new().unwrap();
        dataset
            .add_drive(DATE, "drive_a", &DriveSpec::regular(5, 100_000, 10_000))
            .unwrap();
        dataset
            .add_drive(DATE, "drive_b", &DriveSpec::regular(4, 100_000, 10_000))
            .unwrap();
        dataset
    }

    #[test]
    fn test_single_session_bins() {
        // 5 scans, window 3 -> bin [0, 2]
        let dataset = SyntheticDataset::new().unwrap();
        dataset
            .add_drive(DATE, "drive_a", &DriveSpec::regular(5, 100_000, 10_000))
            .unwrap();
        let view = build(&dataset, 3, &["drive_a"]).unwrap();

        assert_eq!(view.length(), 3);
        assert_eq!((view.bins()[0].start, view.bins()[0].end), (0, 2));
        assert_eq!(view.locate(0).unwrap().1, 0);
        assert_eq!(view.locate(2).unwrap().1, 2);
        assert!(matches!(
            view.get(3),
            Err(DatasetError::OutOfRange {
                scope: IndexScope::Global,
                index: 3,
                len: 3
            })
        ));
    }

    #[test]
    fn test_two_session_bins_and_resolution() {
        // lengths 5 and 4, window 3 -> [0, 2], [3, 4]
        let dataset = two_drive_dataset();
        let view = build(&dataset, 3, &["drive_a", "drive_b"]).unwrap();

        assert_eq!(view.length(), 5);
        let bins: Vec<_> = view.bins().iter().map(|b| (b.start, b.end)).collect();
        assert_eq!(bins, vec![(0, 2), (3, 4)]);

        // every global index maps to exactly one valid local offset
        for global in 0..view.length() {
            let (session, offset) = view.locate(global).unwrap();
            assert!(offset + view.window() <= session.length());

            let sample = view.get(global).unwrap();
            assert_eq!(&sample.session, session.id());
            assert_eq!(sample.start, offset);
            assert_eq!(sample.images.len(), 3);
            for image in &sample.images {
                assert_eq!(image.shape(), (HEIGHT as usize, WIDTH as usize, 5));
                assert!(image.valid_pixels() > 0);
            }
        }
        assert_eq!(view.get(3).unwrap().session.drive(), "drive_b");
    }

    #[test]
    fn test_inertial_selection_matches_interval() {
        let dataset = two_drive_dataset();
        let view = build(&dataset, 3, &["drive_a", "drive_b"]).unwrap();

        for global in 0..view.length() {
            let sample = view.get(global).unwrap();
            let (session, _) = view.locate(global).unwrap();

            let t0 = sample.scan_timestamps[0];
            let t1 = *sample.scan_timestamps.last().unwrap();
            let expected: Vec<usize> = session
                .inertial_timestamps()
                .iter()
                .enumerate()
                .filter(|(_, t)| t0 <= **t && **t < t1)
                .map(|(i, _)| i)
                .collect();

            let got: Vec<usize> = sample.inertial.samples().iter().map(|s| s.index).collect();
            assert_eq!(got, expected);
            assert_eq!(
                TemporalAligner::select(session.inertial_timestamps(), t0..t1).collect::<Vec<_>>(),
                expected
            );

            // 200 ms span at 10 ms
            assert_eq!(got.len(), 20);
            assert_eq!(sample.imu_readings().len(), sample.ground_truth().len());
            // packet index is carried in ax
            assert_eq!(sample.imu_readings()[0].accelerometer.x, expected[0] as f64);
        }
    }

    #[test]
    fn test_explicit_interval_example() {
        // scans at 0, 10, 20, 30 us; window 2 -> [0, 10); imu at 1, 5, 9, 15
        let dataset = SyntheticDataset::new().unwrap();
        dataset
            .add_drive(
                DATE,
                "drive_a",
                &DriveSpec::explicit(&[0, 10, 20, 30], &[1, 5, 9, 15]),
            )
            .unwrap();
        let view = build(&dataset, 2, &["drive_a"]).unwrap();

        let sample = view.get(0).unwrap();
        let stamps: Vec<i64> = sample
            .inertial
            .samples()
            .iter()
            .map(|s| s.timestamp.as_micros())
            .collect();
        assert_eq!(
            stamps,
            vec![timestamp_micros(1), timestamp_micros(5), timestamp_micros(9)]
        );

        // [10, 20) holds only 15
        assert_eq!(view.get(1).unwrap().inertial.samples().len(), 1);
    }

    #[test]
    fn test_no_overlap_falls_back_with_one_warning() {
        let dataset = SyntheticDataset::new().unwrap();
        dataset
            .add_drive(
                DATE,
                "drive_a",
                &DriveSpec::explicit(&[0, 100, 200, 300], &[500, 600]),
            )
            .unwrap();
        let view = build(&dataset, 2, &["drive_a"]).unwrap();

        let warnings = Arc::new(AtomicUsize::new(0));
        let subscriber = tracing_subscriber::registry().with(WarnCounter(warnings.clone()));
        let sample = tracing::subscriber::with_default(subscriber, || view.get(1)).unwrap();

        assert_eq!(warnings.load(Ordering::SeqCst), 1);
        assert!(!sample.inertial.has_data());
        assert_eq!(sample.imu_readings(), vec![ImuReading::ZERO]);
        assert!(sample.ground_truth().is_empty());
        assert_eq!(sample.images.len(), 2);
    }

    #[test]
    fn test_short_session_rejected() {
        let dataset = two_drive_dataset();
        dataset
            .add_drive(DATE, "drive_c", &DriveSpec::regular(2, 100_000, 10_000))
            .unwrap();

        let err = build(&dataset, 3, &["drive_a", "drive_c", "drive_b"]).unwrap_err();
        match err.dataset_error() {
            Some(DatasetError::SessionTooShort {
                session,
                length,
                window,
            }) => {
                assert_eq!(session.drive(), "drive_c");
                assert_eq!((*length, *window), (2, 3));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_poses_start_at_origin_and_calibration_loads() {
        let dataset = SyntheticDataset::new().unwrap();
        dataset
            .add_drive(DATE, "drive_a", &DriveSpec::regular(4, 100_000, 10_000))
            .unwrap();
        let view = build(&dataset, 2, &["drive_a"]).unwrap();

        let session = &view.sessions()[0];
        let first = session.get_inertial(0).unwrap();
        let t = first.pose.translation();
        assert!(t.x.abs() < 1e-9 && t.y.abs() < 1e-9 && t.z.abs() < 1e-9);

        // later packets move north-east and up
        let later = session.get_inertial(30).unwrap().pose.translation();
        assert!(later.x > 0.0 && later.y > 0.0 && later.z > 0.0);

        // poses are rigid transforms
        let m = pose_to_matrix(&session.get_inertial(10).unwrap().pose);
        let r = m.fixed_view::<3, 3>(0, 0);
        assert!((r.determinant() - 1.0).abs() < 1e-9);

        let calib = session.calibration().unwrap();
        assert!((calib.t_velo_imu.translation().x + 0.8086759).abs() < 1e-12);
    }

    #[test]
    fn test_frames_config_sub_selects_scans() {
        let dataset = SyntheticDataset::new().unwrap();
        dataset
            .add_drive(DATE, "drive_a", &DriveSpec::regular(10, 100_000, 10_000))
            .unwrap();
        let mut toml = dataset.config_toml(3, &[(DATE, &["drive_a"])]);
        toml.push_str("\n[datasets.kitti.frames]\ndrive_a = [2, 7]\n");

        let blueprint = ConfigLoader::load_from_str(&toml, ConfigFormat::Toml).unwrap();
        let view = DatasetFactory::new(blueprint)
            .build_split(SplitKind::Train)
            .unwrap();

        assert_eq!(view.sessions()[0].length(), 5);
        assert_eq!(view.length(), 3);
        let sample = view.get(0).unwrap();
        assert_eq!(sample.scan_timestamps[0].as_micros(), timestamp_micros(200_000));
        assert_eq!(sample.inertial.samples()[0].index, 20);
    }

    #[test]
    fn test_malformed_timestamps_abort_split() {
        let dataset = two_drive_dataset();
        let stamps = dataset
            .root()
            .join(DATE)
            .join("drive_b")
            .join("oxts")
            .join("timestamps.txt");
        let content = fs::read_to_string(&stamps).unwrap();
        let mut lines: Vec<&str> = content.lines().collect();
        lines[2] = "2011-09-26 13:00:xx.000000000";
        fs::write(&stamps, lines.join("\n")).unwrap();

        let err = build(&dataset, 3, &["drive_a", "drive_b"]).unwrap_err();
        assert!(
            matches!(err, FactoryError::Build { split: SplitKind::Train, .. }),
            "got: {err:?}"
        );
        match err.dataset_error() {
            Some(DatasetError::TimestampParse { path, line, .. }) => {
                assert_eq!(path, &stamps);
                assert_eq!(*line, 3);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_missing_payload_is_storage_error() {
        let dataset = SyntheticDataset::new().unwrap();
        dataset
            .add_drive(DATE, "drive_a", &DriveSpec::regular(4, 100_000, 10_000))
            .unwrap();
        let view = build(&dataset, 2, &["drive_a"]).unwrap();

        let victim = view.sessions()[0].scan_files()[3].clone();
        fs::remove_file(&victim).unwrap();

        assert!(view.get(0).is_ok());
        let err = view.get(2).unwrap_err();
        assert!(err.is_storage(), "got: {err}");
        // the view is unchanged by the failure
        assert_eq!(view.length(), 3);
        assert!(view.get(1).is_ok());
    }

    #[test]
    fn test_concurrent_disjoint_requests() {
        let dataset = two_drive_dataset();
        let view = Arc::new(build(&dataset, 2, &["drive_a", "drive_b"]).unwrap());
        let total = view.length();
        let served = AtomicUsize::new(0);

        std::thread::scope(|scope| {
            for worker in 0..3 {
                let view = Arc::clone(&view);
                let served = &served;
                scope.spawn(move || {
                    for global in (worker..total).step_by(3) {
                        let sample = view.get(global).unwrap();
                        assert_eq!(sample.images.len(), 2);
                        served.fetch_add(1, Ordering::SeqCst);
                    }
                });
            }
        });

        assert_eq!(served.load(Ordering::SeqCst), total);
    }

    #[test]
    fn test_metrics_aggregate_over_full_pass() {
        use observability::WindowMetricsAggregator;

        let dataset = SyntheticDataset::new().unwrap();
        dataset
            .add_drive(
                DATE,
                "drive_a",
                &DriveSpec::explicit(&[0, 100, 200, 300], &[10, 50, 150]),
            )
            .unwrap();
        let view = build(&dataset, 2, &["drive_a"]).unwrap();

        let mut aggregator = WindowMetricsAggregator::new();
        for global in 0..view.length() {
            let sample = view.get(global).unwrap();
            let count = sample
                .inertial
                .has_data()
                .then(|| sample.inertial.samples().len());
            aggregator.update(&sample.session, 1.0, count);
        }

        // [0, 100) -> 2, [100, 200) -> 1, [200, 300) -> none
        let summary = aggregator.summary();
        assert_eq!(summary.total_windows, 3);
        assert_eq!(summary.fallback_windows, 1);
        assert_eq!(summary.inertial_samples.count, 2);
        assert_eq!(summary.session_counts.get("2011_09_26/drive_a"), Some(&3));
    }

    #[test]
    fn test_transform_and_summary() {
        let dataset = two_drive_dataset();
        let view = build(&dataset, 3, &["drive_a", "drive_b"])
            .unwrap()
            .with_transform(|mut sample| {
                sample.images.reverse();
                sample
            });

        let sample = view.get(0).unwrap();
        assert!(sample.scan_timestamps[0] < sample.scan_timestamps[2]);
        // reversed: farthest ring first
        let first_range = sample.images[0].channel(contracts::RangeChannel::Range);
        let last_range = sample.images[2].channel(contracts::RangeChannel::Range);
        let max = |v: &[f32]| v.iter().copied().fold(f32::MIN, f32::max);
        assert!(max(&first_range) > max(&last_range));

        let summary = view.summary();
        assert_eq!(summary.length, 5);
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["sessions"][1]["bin"]["start"], 3);
        assert_eq!(json["sessions"][0]["session"]["drive"], "drive_a");
    }
}
