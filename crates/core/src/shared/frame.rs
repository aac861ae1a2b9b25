use std::time::Duration;

/// A single captured video frame: contiguous RGB bytes in row-major order.
///
/// Format conversion happens at the camera boundary only; the rest of the
/// pipeline treats pixel data as opaque. Frames are immutable after capture
/// and shared as `Arc<Frame>` between the buffer, the detection loop, and
/// calibration records.
#[derive(Clone, Debug)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    channels: u8,
    index: u64,
    timestamp: Duration,
}

impl Frame {
    /// `timestamp` is measured against the frame source's start instant and
    /// must be strictly greater than the previous frame's.
    pub fn new(
        data: Vec<u8>,
        width: u32,
        height: u32,
        channels: u8,
        index: u64,
        timestamp: Duration,
    ) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * (channels as usize),
            "data length must equal width * height * channels"
        );
        Self {
            data,
            width,
            height,
            channels,
            index,
            timestamp,
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    /// Arrival-order index, starting at 0 for the first captured frame.
    pub fn index(&self) -> u64 {
        self.index
    }

    /// Monotonic capture time relative to the source's start.
    pub fn timestamp(&self) -> Duration {
        self.timestamp
    }
}
