use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::camera::domain::video_stream::VideoStream;
use crate::capture::frame_buffer::FrameBuffer;
use crate::shared::error::TrackerError;
use crate::shared::frame::Frame;

/// Pulls frames from an attached [`VideoStream`] into a [`FrameBuffer`] at
/// the stream's native cadence.
///
/// `start` hands ownership of the stream to a capture thread and returns a
/// [`CaptureHandle`]; the cancellation flag is checked at the top of every
/// iteration, so the loop is always stoppable from outside. While paused the
/// thread keeps pulling (the notification chain stays alive) but buffers
/// nothing.
pub struct FrameSource {
    stream: Option<Box<dyn VideoStream>>,
}

impl FrameSource {
    pub fn new() -> Self {
        Self { stream: None }
    }

    pub fn attach(&mut self, stream: Box<dyn VideoStream>) {
        self.stream = Some(stream);
    }

    pub fn is_attached(&self) -> bool {
        self.stream.is_some()
    }

    /// Start capturing into `buffer`. Fails fast with `SourceNotReady` when
    /// no stream has been attached.
    pub fn start(mut self, buffer: Arc<FrameBuffer>) -> Result<CaptureHandle, TrackerError> {
        let mut stream = self.stream.take().ok_or(TrackerError::SourceNotReady)?;
        let cancelled = Arc::new(AtomicBool::new(false));
        let paused = Arc::new(AtomicBool::new(false));

        let thread_cancelled = cancelled.clone();
        let thread_paused = paused.clone();
        let thread = thread::spawn(move || {
            let epoch = Instant::now();
            let (width, height) = stream.dimensions();
            let mut index: u64 = 0;
            let mut last_timestamp = Duration::ZERO;

            loop {
                if thread_cancelled.load(Ordering::Relaxed) {
                    break;
                }
                let pixels = match stream.next_frame() {
                    Ok(pixels) => pixels,
                    Err(e) => {
                        log::warn!("frame capture ended: {e}");
                        break;
                    }
                };
                if thread_paused.load(Ordering::Relaxed) {
                    continue;
                }

                // Clock reads can collapse under coarse timers; keep the
                // sequence strictly increasing.
                let mut timestamp = epoch.elapsed();
                if timestamp <= last_timestamp {
                    timestamp = last_timestamp + Duration::from_nanos(1);
                }
                last_timestamp = timestamp;

                buffer.append(Frame::new(pixels, width, height, 3, index, timestamp));
                index += 1;
            }
            log::debug!("capture thread exiting after {index} frames");
        });

        Ok(CaptureHandle {
            cancelled,
            paused,
            thread: Some(thread),
        })
    }
}

impl Default for FrameSource {
    fn default() -> Self {
        Self::new()
    }
}

/// Owner-side handle to a running capture thread.
pub struct CaptureHandle {
    cancelled: Arc<AtomicBool>,
    paused: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl CaptureHandle {
    pub fn pause(&self) {
        self.paused.store(true, Ordering::Relaxed);
    }

    pub fn resume(&self) {
        self.paused.store(false, Ordering::Relaxed);
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Relaxed)
    }

    /// Stop capturing and wait for the thread to exit.
    pub fn stop(mut self) {
        self.cancelled.store(true, Ordering::Relaxed);
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                log::error!("capture thread panicked");
            }
        }
    }
}

impl Drop for CaptureHandle {
    fn drop(&mut self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }
}
