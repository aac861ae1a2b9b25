use std::sync::atomic::{AtomicBool, AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::RecvTimeoutError;

use crate::capture::frame_buffer::{FrameBuffer, SubscriptionId};
use crate::detection::domain::detection_result::DetectionResult;
use crate::detection::domain::landmark_detector::{lock_detector, SharedDetector};
use crate::overlay::domain::overlay_renderer::{OverlayOptions, OverlayRenderer};
use crate::shared::frame::Frame;

/// Where the loop currently is in its per-frame cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Detecting,
    Rendering,
    Paused,
}

const STATE_IDLE: u8 = 0;
const STATE_DETECTING: u8 = 1;
const STATE_RENDERING: u8 = 2;
const STATE_PAUSED: u8 = 3;

/// Drives frame notifications into detector calls and overlay renders.
///
/// Subscribes to the buffer with a depth-one latest-wins channel: if a new
/// frame arrives while detection is still running, the stale notification is
/// replaced, so the loop always works on the newest frame at display cadence
/// and the backlog can never grow. A failed detection is logged and rendered
/// as "no face this frame"; the loop re-arms regardless.
pub struct DetectionLoop;

impl DetectionLoop {
    pub fn start(
        buffer: Arc<FrameBuffer>,
        detector: SharedDetector,
        mut renderer: Box<dyn OverlayRenderer>,
        options: OverlayOptions,
    ) -> LoopHandle {
        let (tx, rx) = crossbeam_channel::bounded::<Arc<Frame>>(1);
        let drain = rx.clone();
        let subscription = buffer.subscribe(Arc::new(move |frame| {
            if tx.is_full() {
                let _ = drain.try_recv();
            }
            let _ = tx.try_send(frame.clone());
        }));

        let cancelled = Arc::new(AtomicBool::new(false));
        let paused = Arc::new(AtomicBool::new(false));
        let overlay_enabled = Arc::new(AtomicBool::new(true));
        let frames_processed = Arc::new(AtomicU64::new(0));
        let state = Arc::new(AtomicU8::new(STATE_IDLE));

        let thread = {
            let cancelled = cancelled.clone();
            let paused = paused.clone();
            let overlay_enabled = overlay_enabled.clone();
            let frames_processed = frames_processed.clone();
            let state = state.clone();
            thread::spawn(move || {
                loop {
                    if cancelled.load(Ordering::Relaxed) {
                        break;
                    }
                    // Timed recv keeps the cancellation flag live even when
                    // the frame source has gone quiet.
                    let frame = match rx.recv_timeout(Duration::from_millis(50)) {
                        Ok(frame) => frame,
                        Err(RecvTimeoutError::Timeout) => continue,
                        Err(RecvTimeoutError::Disconnected) => break,
                    };
                    if paused.load(Ordering::Relaxed) {
                        state.store(STATE_PAUSED, Ordering::Relaxed);
                        continue;
                    }

                    state.store(STATE_DETECTING, Ordering::Relaxed);
                    let result = match lock_detector(&detector).detect(&frame) {
                        Ok(result) => result,
                        Err(e) => {
                            log::warn!("detection failed, treating as no face: {e}");
                            DetectionResult::empty()
                        }
                    };
                    frames_processed.fetch_add(1, Ordering::Relaxed);

                    if overlay_enabled.load(Ordering::Relaxed) {
                        state.store(STATE_RENDERING, Ordering::Relaxed);
                        if let Err(e) = renderer.render(&frame, &result, &options) {
                            log::warn!("overlay render failed: {e}");
                        }
                    }
                    state.store(STATE_IDLE, Ordering::Relaxed);
                }
                state.store(STATE_IDLE, Ordering::Relaxed);
            })
        };

        LoopHandle {
            buffer,
            subscription,
            cancelled,
            paused,
            overlay_enabled,
            frames_processed,
            state,
            thread: Some(thread),
        }
    }
}

/// Owner-side handle to a running detection loop.
pub struct LoopHandle {
    buffer: Arc<FrameBuffer>,
    subscription: SubscriptionId,
    cancelled: Arc<AtomicBool>,
    paused: Arc<AtomicBool>,
    overlay_enabled: Arc<AtomicBool>,
    frames_processed: Arc<AtomicU64>,
    state: Arc<AtomicU8>,
    thread: Option<JoinHandle<()>>,
}

impl LoopHandle {
    /// Suspend detection and rendering; frame notifications keep flowing and
    /// are discarded.
    pub fn pause(&self) {
        self.paused.store(true, Ordering::Relaxed);
    }

    pub fn resume(&self) {
        self.paused.store(false, Ordering::Relaxed);
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Relaxed)
    }

    /// Flip the overlay flag without stopping detection; returns the new
    /// state. Toggling twice restores the original drawing behavior.
    pub fn toggle_overlay(&self) -> bool {
        // fetch_xor flips and returns the previous value
        !self.overlay_enabled.fetch_xor(true, Ordering::Relaxed)
    }

    pub fn overlay_enabled(&self) -> bool {
        self.overlay_enabled.load(Ordering::Relaxed)
    }

    /// Number of frames that reached the detector.
    pub fn frames_processed(&self) -> u64 {
        self.frames_processed.load(Ordering::Relaxed)
    }

    pub fn state(&self) -> LoopState {
        match self.state.load(Ordering::Relaxed) {
            STATE_DETECTING => LoopState::Detecting,
            STATE_RENDERING => LoopState::Rendering,
            STATE_PAUSED => LoopState::Paused,
            _ => LoopState::Idle,
        }
    }

    /// Cease re-arming, clear the pause flag, and wait for the thread.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.cancelled.store(true, Ordering::Relaxed);
        self.paused.store(false, Ordering::Relaxed);
        self.buffer.unsubscribe(self.subscription);
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                log::error!("detection loop thread panicked");
            }
        }
    }
}

impl Drop for LoopHandle {
    fn drop(&mut self) {
        if self.thread.is_some() {
            self.shutdown();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::domain::landmark_detector::{shared, LandmarkDetector};
    use crate::overlay::domain::overlay_renderer::NullOverlayRenderer;
    use crate::shared::error::TrackerError;
    use std::sync::atomic::AtomicUsize;

    struct FixedDetector;

    impl LandmarkDetector for FixedDetector {
        fn detect(&mut self, _frame: &Frame) -> Result<DetectionResult, TrackerError> {
            Ok(DetectionResult::new(vec![(1.0, 2.0)], None))
        }
    }

    struct RejectingDetector;

    impl LandmarkDetector for RejectingDetector {
        fn detect(&mut self, _frame: &Frame) -> Result<DetectionResult, TrackerError> {
            Err(TrackerError::DetectionFailed("model rejected input".into()))
        }
    }

    /// Counts render calls and how many carried an empty result.
    struct CountingRenderer {
        renders: Arc<AtomicUsize>,
        empty_renders: Arc<AtomicUsize>,
    }

    impl OverlayRenderer for CountingRenderer {
        fn render(
            &mut self,
            _frame: &Frame,
            result: &DetectionResult,
            _options: &OverlayOptions,
        ) -> Result<(), TrackerError> {
            self.renders.fetch_add(1, Ordering::SeqCst);
            if result.is_empty() {
                self.empty_renders.fetch_add(1, Ordering::SeqCst);
            }
            Ok(())
        }
    }

    fn frame(index: u64) -> Frame {
        Frame::new(vec![0u8; 3], 1, 1, 3, index, Duration::from_millis(index + 1))
    }

    // `start` keeps indices and timestamps monotone across repeated feeds.
    fn feed(buffer: &Arc<FrameBuffer>, start: u64, count: u64, gap: Duration) {
        for i in start..start + count {
            buffer.append(frame(i));
            thread::sleep(gap);
        }
    }

    #[test]
    fn test_renders_each_notified_frame() {
        let buffer = Arc::new(FrameBuffer::new());
        let renders = Arc::new(AtomicUsize::new(0));
        let empty = Arc::new(AtomicUsize::new(0));
        let handle = DetectionLoop::start(
            buffer.clone(),
            shared(Box::new(FixedDetector)),
            Box::new(CountingRenderer {
                renders: renders.clone(),
                empty_renders: empty.clone(),
            }),
            OverlayOptions::default(),
        );

        feed(&buffer, 0, 10, Duration::from_millis(5));
        thread::sleep(Duration::from_millis(20));
        handle.stop();

        assert!(renders.load(Ordering::SeqCst) >= 5);
        assert_eq!(empty.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_failing_detector_keeps_rearming_with_empty_renders() {
        let buffer = Arc::new(FrameBuffer::new());
        let renders = Arc::new(AtomicUsize::new(0));
        let empty = Arc::new(AtomicUsize::new(0));
        let handle = DetectionLoop::start(
            buffer.clone(),
            shared(Box::new(RejectingDetector)),
            Box::new(CountingRenderer {
                renders: renders.clone(),
                empty_renders: empty.clone(),
            }),
            OverlayOptions::default(),
        );

        feed(&buffer, 0, 10, Duration::from_millis(5));
        thread::sleep(Duration::from_millis(20));

        // Survived well past five consecutive failures, each rendered empty.
        assert!(handle.frames_processed() >= 5);
        assert!(empty.load(Ordering::SeqCst) >= 5);
        assert_eq!(renders.load(Ordering::SeqCst), empty.load(Ordering::SeqCst));
        handle.stop();
    }

    #[test]
    fn test_toggle_overlay_twice_restores_state() {
        let buffer = Arc::new(FrameBuffer::new());
        let handle = DetectionLoop::start(
            buffer,
            shared(Box::new(FixedDetector)),
            Box::new(NullOverlayRenderer),
            OverlayOptions::default(),
        );

        assert!(handle.overlay_enabled());
        assert!(!handle.toggle_overlay());
        assert!(handle.toggle_overlay());
        assert!(handle.overlay_enabled());
        handle.stop();
    }

    #[test]
    fn test_overlay_disabled_suppresses_rendering_not_detection() {
        let buffer = Arc::new(FrameBuffer::new());
        let renders = Arc::new(AtomicUsize::new(0));
        let empty = Arc::new(AtomicUsize::new(0));
        let handle = DetectionLoop::start(
            buffer.clone(),
            shared(Box::new(FixedDetector)),
            Box::new(CountingRenderer {
                renders: renders.clone(),
                empty_renders: empty.clone(),
            }),
            OverlayOptions::default(),
        );

        handle.toggle_overlay(); // off
        feed(&buffer, 0, 8, Duration::from_millis(5));
        thread::sleep(Duration::from_millis(20));

        assert!(handle.frames_processed() >= 5);
        assert_eq!(renders.load(Ordering::SeqCst), 0);
        handle.stop();
    }

    #[test]
    fn test_pause_discards_frames_and_resume_recovers() {
        let buffer = Arc::new(FrameBuffer::new());
        let handle = DetectionLoop::start(
            buffer.clone(),
            shared(Box::new(FixedDetector)),
            Box::new(NullOverlayRenderer),
            OverlayOptions::default(),
        );

        handle.pause();
        assert!(handle.is_paused());
        feed(&buffer, 0, 5, Duration::from_millis(5));
        thread::sleep(Duration::from_millis(20));
        assert_eq!(handle.frames_processed(), 0);

        handle.resume();
        feed(&buffer, 5, 5, Duration::from_millis(5));
        thread::sleep(Duration::from_millis(20));
        assert!(handle.frames_processed() > 0);
        handle.stop();
    }

    #[test]
    fn test_stop_clears_pause_and_ceases_processing() {
        let buffer = Arc::new(FrameBuffer::new());
        let handle = DetectionLoop::start(
            buffer.clone(),
            shared(Box::new(FixedDetector)),
            Box::new(NullOverlayRenderer),
            OverlayOptions::default(),
        );

        feed(&buffer, 0, 3, Duration::from_millis(5));
        thread::sleep(Duration::from_millis(20));
        handle.pause();
        handle.stop();

        // Appends after stop reach no observer.
        feed(&buffer, 3, 3, Duration::from_millis(2));
    }
}
