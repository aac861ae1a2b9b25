use std::sync::Arc;
use std::time::Duration;

use crate::shared::frame::Frame;

/// One completed calibration sample: the stimulus position, when it appeared,
/// and the landmark evidence captured `sample_delay` later.
///
/// `frame` retains the visual evidence the sample detection ran against so
/// post-processing can re-detect; it is `None` when the sample fired before
/// any frame had been captured. Records are immutable once created and owned
/// by the session's result collection until handed to the caller.
#[derive(Clone, Debug)]
pub struct CalibrationRecord {
    pub x: f64,
    pub y: f64,
    pub onset_time: Duration,
    /// Empty when no face was found (or no frame existed) at sample time.
    pub landmarks: Vec<(f64, f64)>,
    pub frame: Option<Arc<Frame>>,
}

impl CalibrationRecord {
    pub fn has_landmarks(&self) -> bool {
        !self.landmarks.is_empty()
    }
}

/// Finalized calibration point produced by the post-processing pass.
#[derive(Clone, Debug, PartialEq)]
pub struct ProcessedCalibrationPoint {
    pub x: f64,
    pub y: f64,
    pub onset_time: Duration,
    pub landmarks: Vec<(f64, f64)>,
}
