use crate::detection::domain::detection_result::DetectionResult;
use crate::shared::error::TrackerError;
use crate::shared::frame::Frame;

/// Caller-selected annotation flags for one render call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OverlayOptions {
    pub draw_face_points: bool,
    pub draw_iris_points: bool,
    pub draw_bounding_box: bool,
}

impl Default for OverlayOptions {
    /// Iris marks only.
    fn default() -> Self {
        Self {
            draw_face_points: false,
            draw_iris_points: true,
            draw_bounding_box: false,
        }
    }
}

/// Boundary to the presentation surface that shows the live feed.
///
/// One call paints the frame and whatever annotations the options select.
/// `result` may be empty ("no face this frame"); renderers must still blit
/// the frame so the feed keeps moving.
pub trait OverlayRenderer: Send {
    fn render(
        &mut self,
        frame: &Frame,
        result: &DetectionResult,
        options: &OverlayOptions,
    ) -> Result<(), TrackerError>;
}

/// Renderer that discards everything; used when detection should run
/// without any visible feed.
pub struct NullOverlayRenderer;

impl OverlayRenderer for NullOverlayRenderer {
    fn render(
        &mut self,
        _frame: &Frame,
        _result: &DetectionResult,
        _options: &OverlayOptions,
    ) -> Result<(), TrackerError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_default_options_draw_iris_only() {
        let options = OverlayOptions::default();
        assert!(!options.draw_face_points);
        assert!(options.draw_iris_points);
        assert!(!options.draw_bounding_box);
    }

    #[test]
    fn test_null_renderer_accepts_empty_result() {
        let frame = Frame::new(vec![0u8; 3], 1, 1, 3, 0, Duration::from_millis(1));
        let mut renderer = NullOverlayRenderer;
        renderer
            .render(&frame, &DetectionResult::empty(), &OverlayOptions::default())
            .unwrap();
    }
}
