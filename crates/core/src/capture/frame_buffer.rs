use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::shared::constants::{DEFAULT_FPS_HINT, DEFAULT_SAMPLE_DELAY_MS};
use crate::shared::error::TrackerError;
use crate::shared::frame::Frame;

/// Callback invoked synchronously after each append, outside the frame lock.
pub type FrameObserver = Arc<dyn Fn(&Arc<Frame>) + Send + Sync>;

/// Opaque handle returned by [`FrameBuffer::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SubscriptionId(u64);

/// Ordered, bounded history of captured frames.
///
/// Sole owner of the frame sequence: the capture thread appends, everyone
/// else reads through `latest()`. The window is a sliding frame-count bound
/// sized to exceed the longest configured sample delay, so a pending
/// calibration sample can never lose the frame it would have read while
/// long sessions stay at constant memory.
pub struct FrameBuffer {
    frames: Mutex<Window>,
    observers: Mutex<Vec<(SubscriptionId, FrameObserver)>>,
    next_subscription: Mutex<u64>,
}

struct Window {
    frames: VecDeque<Arc<Frame>>,
    capacity: usize,
}

/// Frames to retain so a sample firing `sample_delay` after onset still has
/// history to read, with 2x headroom for jitter.
pub fn capacity_for_delay(sample_delay: Duration, fps_hint: f64) -> usize {
    let frames = (sample_delay.as_secs_f64() * fps_hint).ceil() as usize;
    (frames * 2).max(8)
}

impl FrameBuffer {
    /// Buffer sized for the default sample delay at the default frame rate.
    pub fn new() -> Self {
        Self::with_capacity(capacity_for_delay(
            Duration::from_millis(DEFAULT_SAMPLE_DELAY_MS),
            DEFAULT_FPS_HINT,
        ))
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            frames: Mutex::new(Window {
                frames: VecDeque::with_capacity(capacity.max(1)),
                capacity: capacity.max(1),
            }),
            observers: Mutex::new(Vec::new()),
            next_subscription: Mutex::new(0),
        }
    }

    /// Append a frame, evicting the oldest once the window is full, then
    /// notify subscribers. Observers run after the frame lock is released,
    /// so `latest()` from inside a callback sees the frame just appended.
    pub fn append(&self, frame: Frame) {
        let frame = Arc::new(frame);
        {
            let mut window = lock(&self.frames);
            if let Some(last) = window.frames.back() {
                debug_assert!(
                    frame.timestamp() > last.timestamp(),
                    "frame timestamps must be strictly increasing"
                );
            }
            if window.frames.len() == window.capacity {
                window.frames.pop_front();
            }
            window.frames.push_back(frame.clone());
        }

        let observers: Vec<FrameObserver> = lock(&self.observers)
            .iter()
            .map(|(_, observer)| observer.clone())
            .collect();
        for observer in observers {
            observer(&frame);
        }
    }

    /// Most recently appended frame, or `NoFramesYet` before the first
    /// append completes.
    pub fn latest(&self) -> Result<Arc<Frame>, TrackerError> {
        lock(&self.frames)
            .frames
            .back()
            .cloned()
            .ok_or(TrackerError::NoFramesYet)
    }

    pub fn len(&self) -> usize {
        lock(&self.frames).frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        lock(&self.frames).capacity
    }

    /// Register an observer invoked synchronously after each append.
    pub fn subscribe(&self, observer: FrameObserver) -> SubscriptionId {
        let mut next = lock(&self.next_subscription);
        let id = SubscriptionId(*next);
        *next += 1;
        lock(&self.observers).push((id, observer));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        lock(&self.observers).retain(|(sid, _)| *sid != id);
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn frame(index: u64) -> Frame {
        Frame::new(
            vec![index as u8; 3],
            1,
            1,
            3,
            index,
            Duration::from_millis(index + 1),
        )
    }

    // ── latest / append ─────────────────────────────────────────────

    #[test]
    fn test_latest_empty_is_no_frames_yet() {
        let buffer = FrameBuffer::new();
        assert!(matches!(buffer.latest(), Err(TrackerError::NoFramesYet)));
    }

    #[test]
    fn test_latest_tracks_each_append() {
        let buffer = FrameBuffer::new();
        for i in 0..20 {
            buffer.append(frame(i));
            assert_eq!(buffer.latest().unwrap().index(), i);
        }
    }

    #[test]
    fn test_window_evicts_oldest() {
        let buffer = FrameBuffer::with_capacity(3);
        for i in 0..5 {
            buffer.append(frame(i));
        }
        assert_eq!(buffer.len(), 3);
        assert_eq!(buffer.latest().unwrap().index(), 4);
    }

    #[test]
    fn test_zero_capacity_clamped_to_one() {
        let buffer = FrameBuffer::with_capacity(0);
        buffer.append(frame(0));
        buffer.append(frame(1));
        assert_eq!(buffer.len(), 1);
        assert_eq!(buffer.latest().unwrap().index(), 1);
    }

    // ── subscribe ───────────────────────────────────────────────────

    #[test]
    fn test_observer_runs_synchronously_per_append() {
        let buffer = FrameBuffer::new();
        let seen = Arc::new(AtomicUsize::new(0));
        let seen_clone = seen.clone();
        buffer.subscribe(Arc::new(move |_| {
            seen_clone.fetch_add(1, Ordering::SeqCst);
        }));

        buffer.append(frame(0));
        assert_eq!(seen.load(Ordering::SeqCst), 1);
        buffer.append(frame(1));
        assert_eq!(seen.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_observer_sees_appended_frame_via_latest() {
        let buffer = Arc::new(FrameBuffer::new());
        let buffer_clone = buffer.clone();
        let matched = Arc::new(AtomicUsize::new(0));
        let matched_clone = matched.clone();
        buffer.subscribe(Arc::new(move |f| {
            let latest = buffer_clone.latest().unwrap();
            if latest.index() == f.index() {
                matched_clone.fetch_add(1, Ordering::SeqCst);
            }
        }));

        buffer.append(frame(0));
        buffer.append(frame(1));
        assert_eq!(matched.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_unsubscribe_stops_notifications() {
        let buffer = FrameBuffer::new();
        let seen = Arc::new(AtomicUsize::new(0));
        let seen_clone = seen.clone();
        let id = buffer.subscribe(Arc::new(move |_| {
            seen_clone.fetch_add(1, Ordering::SeqCst);
        }));

        buffer.append(frame(0));
        buffer.unsubscribe(id);
        buffer.append(frame(1));
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    // ── capacity sizing ─────────────────────────────────────────────

    #[rstest]
    // 1.5s at 30fps = 45 frames, doubled for headroom
    #[case::default_timings(1500, 30.0, 90)]
    #[case::short_delay_hits_floor(10, 30.0, 8)]
    #[case::low_fps(1500, 5.0, 16)]
    fn test_capacity_for_delay(#[case] delay_ms: u64, #[case] fps: f64, #[case] expected: usize) {
        assert_eq!(
            capacity_for_delay(Duration::from_millis(delay_ms), fps),
            expected
        );
    }
}
