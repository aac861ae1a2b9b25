use std::time::Duration;

use crate::shared::error::TrackerError;

/// An open video stream delivering frames at its native cadence.
///
/// `next_frame` blocks until the device presents a new frame and returns its
/// RGB pixel data; there is no guarantee of a fixed interval, only "as
/// frequently as the device produces one". Implementations pace themselves.
pub trait VideoStream: Send {
    /// Resolved `(width, height)` of the stream.
    fn dimensions(&self) -> (u32, u32);

    /// Nominal delay between frames, used to size buffer windows.
    fn frame_interval(&self) -> Duration;

    /// Block until the next frame is available and return its RGB bytes
    /// (`width * height * 3`, row-major).
    fn next_frame(&mut self) -> Result<Vec<u8>, TrackerError>;
}
