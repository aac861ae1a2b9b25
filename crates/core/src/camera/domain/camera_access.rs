use crate::camera::domain::video_stream::VideoStream;
use crate::shared::error::TrackerError;

/// Identifies one video-input capture device.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeviceDescriptor {
    pub device_id: String,
    pub label: String,
}

/// Boundary to the platform's camera/device layer.
///
/// Mirrors the three acquisition operations: ask for permission (yielding a
/// default stream), enumerate video-input devices, and bind a specific
/// device as the active stream source. Errors here are fatal to the
/// acquisition attempt only; callers may retry.
pub trait CameraAccess: Send {
    /// Request camera permission and open the default device.
    fn request_permission(&mut self) -> Result<Box<dyn VideoStream>, TrackerError>;

    /// Enumerate available capture devices, filtered to video-input kind.
    fn list_video_devices(&mut self) -> Result<Vec<DeviceDescriptor>, TrackerError>;

    /// Open a stream bound to the given device.
    fn select_device(
        &mut self,
        device: &DeviceDescriptor,
    ) -> Result<Box<dyn VideoStream>, TrackerError>;
}
