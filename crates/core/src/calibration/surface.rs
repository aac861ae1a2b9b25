use crate::calibration::stimulus::StimulusPoint;

/// Boundary to whatever draws the calibration stimuli.
///
/// The session calls `clear` before every transition and `show` for each new
/// point; fixation shape and styling are entirely the implementation's
/// business.
pub trait StimulusSurface: Send {
    fn show(&mut self, point: &StimulusPoint);
    fn clear(&mut self);
}

/// Surface that draws nothing; for headless runs and tests that only care
/// about the collected records.
pub struct NullStimulusSurface;

impl StimulusSurface for NullStimulusSurface {
    fn show(&mut self, _point: &StimulusPoint) {}
    fn clear(&mut self) {}
}
