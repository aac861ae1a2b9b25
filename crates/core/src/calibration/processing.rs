use crate::calibration::record::{CalibrationRecord, ProcessedCalibrationPoint};
use crate::detection::domain::landmark_detector::{lock_detector, SharedDetector};

/// Finalize every collected record by re-running detection against its
/// retained frame.
///
/// Runs strictly after the presentation loop has terminated, over the whole
/// collection; a record is never skipped. When a record carries no frame, or
/// the re-run fails, the landmarks sampled at capture time stand.
pub fn process_records(
    detector: &SharedDetector,
    records: &[CalibrationRecord],
) -> Vec<ProcessedCalibrationPoint> {
    records
        .iter()
        .map(|record| {
            let landmarks = match record.frame.as_deref() {
                Some(frame) => match lock_detector(detector).detect(frame) {
                    Ok(result) => result.into_landmarks(),
                    Err(e) => {
                        log::warn!("post-processing detection failed: {e}; keeping sampled landmarks");
                        record.landmarks.clone()
                    }
                },
                None => record.landmarks.clone(),
            };
            ProcessedCalibrationPoint {
                x: record.x,
                y: record.y,
                onset_time: record.onset_time,
                landmarks,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::domain::detection_result::DetectionResult;
    use crate::detection::domain::landmark_detector::{shared, LandmarkDetector};
    use crate::shared::error::TrackerError;
    use crate::shared::frame::Frame;
    use std::sync::Arc;
    use std::time::Duration;

    struct FixedDetector(Vec<(f64, f64)>);

    impl LandmarkDetector for FixedDetector {
        fn detect(&mut self, _frame: &Frame) -> Result<DetectionResult, TrackerError> {
            Ok(DetectionResult::new(self.0.clone(), None))
        }
    }

    struct RejectingDetector;

    impl LandmarkDetector for RejectingDetector {
        fn detect(&mut self, _frame: &Frame) -> Result<DetectionResult, TrackerError> {
            Err(TrackerError::DetectionFailed("model rejected input".into()))
        }
    }

    fn record(x: f64, with_frame: bool) -> CalibrationRecord {
        CalibrationRecord {
            x,
            y: 50.0,
            onset_time: Duration::from_millis(100),
            landmarks: vec![(9.0, 9.0)],
            frame: with_frame.then(|| {
                Arc::new(Frame::new(vec![0; 3], 1, 1, 3, 0, Duration::from_millis(1)))
            }),
        }
    }

    #[test]
    fn test_processes_every_record() {
        let detector = shared(Box::new(FixedDetector(vec![(1.0, 2.0)])));
        let records = vec![record(10.0, true), record(50.0, true), record(90.0, true)];
        let processed = process_records(&detector, &records);
        assert_eq!(processed.len(), 3);
        for (p, r) in processed.iter().zip(&records) {
            assert_eq!(p.x, r.x);
            assert_eq!(p.onset_time, r.onset_time);
            assert_eq!(p.landmarks, vec![(1.0, 2.0)]);
        }
    }

    #[test]
    fn test_record_without_frame_keeps_sampled_landmarks() {
        let detector = shared(Box::new(FixedDetector(vec![(1.0, 2.0)])));
        let processed = process_records(&detector, &[record(10.0, false)]);
        assert_eq!(processed[0].landmarks, vec![(9.0, 9.0)]);
    }

    #[test]
    fn test_failed_rerun_keeps_sampled_landmarks() {
        let detector = shared(Box::new(RejectingDetector));
        let processed = process_records(&detector, &[record(10.0, true)]);
        assert_eq!(processed[0].landmarks, vec![(9.0, 9.0)]);
    }

    #[test]
    fn test_empty_collection_yields_empty_result() {
        let detector = shared(Box::new(FixedDetector(Vec::new())));
        assert!(process_records(&detector, &[]).is_empty());
    }
}
