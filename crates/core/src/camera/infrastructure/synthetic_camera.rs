use std::thread;
use std::time::Duration;

use crate::camera::domain::camera_access::{CameraAccess, DeviceDescriptor};
use crate::camera::domain::video_stream::VideoStream;
use crate::shared::error::TrackerError;

const DEVICE_ID: &str = "synthetic-0";

/// Camera adapter that fabricates frames in software.
///
/// Used by the CLI demo and by tests that need a live, paced frame stream
/// without touching real capture hardware. Exposes a single device.
pub struct SyntheticCamera {
    width: u32,
    height: u32,
    frame_interval: Duration,
    permission_granted: bool,
}

impl SyntheticCamera {
    pub fn new(width: u32, height: u32, frame_interval: Duration) -> Self {
        Self {
            width,
            height,
            frame_interval,
            permission_granted: true,
        }
    }

    /// Configure the camera to refuse permission, for exercising the
    /// acquisition error path.
    pub fn deny_permission(mut self) -> Self {
        self.permission_granted = false;
        self
    }

    fn open_stream(&self) -> Box<dyn VideoStream> {
        Box::new(SyntheticStream {
            width: self.width,
            height: self.height,
            frame_interval: self.frame_interval,
            frame_count: 0,
        })
    }
}

impl CameraAccess for SyntheticCamera {
    fn request_permission(&mut self) -> Result<Box<dyn VideoStream>, TrackerError> {
        if !self.permission_granted {
            return Err(TrackerError::PermissionDenied);
        }
        Ok(self.open_stream())
    }

    fn list_video_devices(&mut self) -> Result<Vec<DeviceDescriptor>, TrackerError> {
        if !self.permission_granted {
            return Err(TrackerError::PermissionDenied);
        }
        Ok(vec![DeviceDescriptor {
            device_id: DEVICE_ID.to_string(),
            label: "Synthetic camera".to_string(),
        }])
    }

    fn select_device(
        &mut self,
        device: &DeviceDescriptor,
    ) -> Result<Box<dyn VideoStream>, TrackerError> {
        if device.device_id != DEVICE_ID {
            return Err(TrackerError::DeviceUnavailable(device.device_id.clone()));
        }
        Ok(self.open_stream())
    }
}

/// Paced stream of generated frames: a diagonal gradient that shifts one
/// step per frame, so consecutive frames are distinguishable in tests.
struct SyntheticStream {
    width: u32,
    height: u32,
    frame_interval: Duration,
    frame_count: u64,
}

impl VideoStream for SyntheticStream {
    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn frame_interval(&self) -> Duration {
        self.frame_interval
    }

    fn next_frame(&mut self) -> Result<Vec<u8>, TrackerError> {
        thread::sleep(self.frame_interval);
        let shift = self.frame_count;
        self.frame_count += 1;

        let (w, h) = (self.width as usize, self.height as usize);
        let mut data = Vec::with_capacity(w * h * 3);
        for y in 0..h {
            for x in 0..w {
                let v = (x as u64 + y as u64 + shift) as u8;
                data.extend_from_slice(&[v, v.wrapping_add(85), v.wrapping_add(170)]);
            }
        }
        Ok(data)
    }
}
