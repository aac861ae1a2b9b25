use std::sync::{Arc, Mutex, MutexGuard};

use crate::detection::domain::detection_result::DetectionResult;
use crate::shared::error::TrackerError;
use crate::shared::frame::Frame;

/// Loader options for the landmark model.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DetectorConfig {
    /// Maximum simultaneous faces the model tracks.
    pub max_faces: usize,
    /// Whether the model refines iris keypoints (adds mesh indices 468..478).
    pub refine_landmarks: bool,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            max_faces: 1,
            refine_landmarks: true,
        }
    }
}

/// Boundary to the pretrained facial-landmark model.
///
/// One call maps an image to zero-or-one face results. Implementations may
/// be stateful (warm model sessions, frame-to-frame tracking), hence
/// `&mut self`. A `DetectionFailed` error is never fatal to callers; loops
/// absorb it as "no face this frame".
pub trait LandmarkDetector: Send {
    fn detect(&mut self, frame: &Frame) -> Result<DetectionResult, TrackerError>;
}

/// The single detector instance is owned by the tracker context and shared
/// between the detection loop and the calibration sampler; lock acquisition
/// order queues concurrent requests instead of racing them.
pub type SharedDetector = Arc<Mutex<Box<dyn LandmarkDetector>>>;

pub fn shared(detector: Box<dyn LandmarkDetector>) -> SharedDetector {
    Arc::new(Mutex::new(detector))
}

/// Lock the shared detector, recovering from a poisoned lock (a panicked
/// holder leaves the model in an unknown but still usable state).
pub fn lock_detector(detector: &SharedDetector) -> MutexGuard<'_, Box<dyn LandmarkDetector>> {
    match detector.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
