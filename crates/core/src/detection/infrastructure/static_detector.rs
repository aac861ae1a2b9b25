use crate::detection::domain::detection_result::{BoundingBox, DetectionResult};
use crate::detection::domain::landmark_detector::{DetectorConfig, LandmarkDetector};
use crate::shared::constants::{FACE_MESH_POINT_COUNT, REFINED_MESH_POINT_COUNT};
use crate::shared::error::TrackerError;
use crate::shared::frame::Frame;

/// Deterministic detector that reports the same face on every frame.
///
/// Stands in for the pretrained model in the CLI demo and in tests: the
/// mesh is a fixed grid scaled to the frame, so downstream geometry
/// (overlay marks, calibration records) is reproducible.
pub struct StaticLandmarkDetector {
    config: DetectorConfig,
    calls: u64,
}

impl StaticLandmarkDetector {
    pub fn new(config: DetectorConfig) -> Self {
        Self { config, calls: 0 }
    }

    pub fn calls(&self) -> u64 {
        self.calls
    }

    fn mesh_for(&self, width: f64, height: f64) -> Vec<(f64, f64)> {
        let count = if self.config.refine_landmarks {
            REFINED_MESH_POINT_COUNT
        } else {
            FACE_MESH_POINT_COUNT
        };
        // Points on a coarse lattice covering the middle half of the frame.
        let cols = 24.0;
        (0..count)
            .map(|i| {
                let col = (i % 24) as f64;
                let row = (i / 24) as f64;
                let x = width * (0.25 + 0.5 * col / cols);
                let y = height * (0.25 + 0.5 * row / cols);
                (x, y)
            })
            .collect()
    }
}

impl Default for StaticLandmarkDetector {
    fn default() -> Self {
        Self::new(DetectorConfig::default())
    }
}

impl LandmarkDetector for StaticLandmarkDetector {
    fn detect(&mut self, frame: &Frame) -> Result<DetectionResult, TrackerError> {
        self.calls += 1;
        let (w, h) = (frame.width() as f64, frame.height() as f64);
        let landmarks = self.mesh_for(w, h);
        let bounding_box = BoundingBox {
            x_min: w * 0.25,
            y_min: h * 0.25,
            x_max: w * 0.75,
            y_max: h * 0.75,
        };
        Ok(DetectionResult::new(landmarks, Some(bounding_box)))
    }
}
