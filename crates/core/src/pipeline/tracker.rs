use std::sync::Arc;
use std::time::Duration;

use crate::calibration::session::{CalibrationSession, SessionConfig, SessionHandle};
use crate::calibration::surface::StimulusSurface;
use crate::camera::domain::camera_access::{CameraAccess, DeviceDescriptor};
use crate::camera::domain::video_stream::VideoStream;
use crate::capture::frame_buffer::{capacity_for_delay, FrameBuffer};
use crate::capture::frame_source::{CaptureHandle, FrameSource};
use crate::detection::domain::landmark_detector::{shared, LandmarkDetector, SharedDetector};
use crate::overlay::domain::overlay_renderer::{OverlayOptions, OverlayRenderer};
use crate::pipeline::detection_loop::{DetectionLoop, LoopHandle};
use crate::shared::error::TrackerError;

/// Explicitly constructed context owning the stream, frame buffer, and
/// detector handles, wired together in single-ownership fashion.
///
/// Every component receives its collaborators from here; the permission,
/// device, capture, detect, and calibrate sequence happens through one
/// owner, with no shared mutable state outside it.
pub struct Tracker {
    camera: Box<dyn CameraAccess>,
    detector: SharedDetector,
    buffer: Arc<FrameBuffer>,
    stream: Option<Box<dyn VideoStream>>,
    dimensions: Option<(u32, u32)>,
    capture: Option<CaptureHandle>,
}

impl Tracker {
    pub fn new(camera: Box<dyn CameraAccess>, detector: Box<dyn LandmarkDetector>) -> Self {
        Self {
            camera,
            detector: shared(detector),
            buffer: Arc::new(FrameBuffer::new()),
            stream: None,
            dimensions: None,
            capture: None,
        }
    }

    pub fn buffer(&self) -> Arc<FrameBuffer> {
        self.buffer.clone()
    }

    pub fn detector(&self) -> SharedDetector {
        self.detector.clone()
    }

    /// Ask for camera permission; the default device's stream becomes the
    /// active source.
    pub fn request_permission(&mut self) -> Result<(), TrackerError> {
        let stream = self.camera.request_permission()?;
        self.set_stream(stream);
        Ok(())
    }

    pub fn list_video_devices(&mut self) -> Result<Vec<DeviceDescriptor>, TrackerError> {
        self.camera.list_video_devices()
    }

    /// Bind a specific device, replacing any previously selected stream.
    pub fn select_device(&mut self, device: &DeviceDescriptor) -> Result<(), TrackerError> {
        let stream = self.camera.select_device(device)?;
        self.set_stream(stream);
        Ok(())
    }

    fn set_stream(&mut self, stream: Box<dyn VideoStream>) {
        self.dimensions = Some(stream.dimensions());
        self.stream = Some(stream);
    }

    /// Resolved dimensions of the acquired stream. Remains available after
    /// `start_capture` hands the stream to the capture thread, so overlay
    /// canvases can be sized at any point in the sequence.
    pub fn stream_dimensions(&self) -> Option<(u32, u32)> {
        self.dimensions
    }

    /// Start pulling frames from the selected stream into the buffer.
    /// Fails with `SourceNotReady` when no stream has been acquired, and
    /// resizes the buffer window to the stream's cadence.
    pub fn start_capture(&mut self, sample_delay: Duration) -> Result<(), TrackerError> {
        let mut source = FrameSource::new();
        if let Some(stream) = self.stream.take() {
            let interval = stream.frame_interval().as_secs_f64();
            if interval > 0.0 {
                self.buffer = Arc::new(FrameBuffer::with_capacity(capacity_for_delay(
                    sample_delay,
                    1.0 / interval,
                )));
            }
            source.attach(stream);
        }
        self.capture = Some(source.start(self.buffer.clone())?);
        Ok(())
    }

    pub fn is_capturing(&self) -> bool {
        self.capture.is_some()
    }

    pub fn pause_capture(&self) {
        if let Some(capture) = &self.capture {
            capture.pause();
        }
    }

    pub fn resume_capture(&self) {
        if let Some(capture) = &self.capture {
            capture.resume();
        }
    }

    pub fn stop_capture(&mut self) {
        if let Some(capture) = self.capture.take() {
            capture.stop();
        }
    }

    /// Spawn the per-frame detect-and-render loop against the shared
    /// detector and the current buffer.
    pub fn start_detection_loop(
        &self,
        renderer: Box<dyn OverlayRenderer>,
        options: OverlayOptions,
    ) -> LoopHandle {
        DetectionLoop::start(
            self.buffer.clone(),
            self.detector.clone(),
            renderer,
            options,
        )
    }

    /// Run a calibration session on the given surface. Capture keeps running
    /// throughout; the session reads whatever frame is latest.
    pub fn calibrate(
        &self,
        config: SessionConfig,
        surface: Box<dyn StimulusSurface>,
    ) -> Result<SessionHandle, TrackerError> {
        let mut session = CalibrationSession::new(config)?;
        session.attach_surface(surface);
        session.start(self.buffer.clone(), self.detector.clone())
    }
}

impl Drop for Tracker {
    fn drop(&mut self) {
        self.stop_capture();
    }
}
