use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use crate::camera::domain::camera_access::{CameraAccess, DeviceDescriptor};
use crate::camera::domain::video_stream::VideoStream;
use crate::shared::constants::IMAGE_EXTENSIONS;
use crate::shared::error::TrackerError;

/// Camera adapter that replays still images from a directory as a paced
/// video stream, cycling back to the first file at the end.
///
/// Every image is decoded up front and resized frames are not supported:
/// all files must share the dimensions of the first one.
pub struct ImageSequenceCamera {
    dir: PathBuf,
    frame_interval: Duration,
}

impl ImageSequenceCamera {
    pub fn new(dir: impl Into<PathBuf>, frame_interval: Duration) -> Self {
        Self {
            dir: dir.into(),
            frame_interval,
        }
    }

    fn open_stream(&self) -> Result<Box<dyn VideoStream>, TrackerError> {
        let stream = ImageSequenceStream::open(&self.dir, self.frame_interval)?;
        Ok(Box::new(stream))
    }
}

impl CameraAccess for ImageSequenceCamera {
    fn request_permission(&mut self) -> Result<Box<dyn VideoStream>, TrackerError> {
        self.open_stream()
    }

    fn list_video_devices(&mut self) -> Result<Vec<DeviceDescriptor>, TrackerError> {
        Ok(vec![DeviceDescriptor {
            device_id: self.dir.to_string_lossy().into_owned(),
            label: format!("Image sequence ({})", self.dir.display()),
        }])
    }

    fn select_device(
        &mut self,
        device: &DeviceDescriptor,
    ) -> Result<Box<dyn VideoStream>, TrackerError> {
        if Path::new(&device.device_id) != self.dir {
            return Err(TrackerError::DeviceUnavailable(device.device_id.clone()));
        }
        self.open_stream()
    }
}

struct ImageSequenceStream {
    frames: Vec<Vec<u8>>,
    width: u32,
    height: u32,
    frame_interval: Duration,
    cursor: usize,
}

impl ImageSequenceStream {
    fn open(dir: &Path, frame_interval: Duration) -> Result<Self, TrackerError> {
        let mut paths: Vec<PathBuf> = fs::read_dir(dir)
            .map_err(|e| TrackerError::DeviceUnavailable(format!("{}: {e}", dir.display())))?
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|p| {
                p.extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| {
                        IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str())
                    })
            })
            .collect();
        paths.sort();

        if paths.is_empty() {
            return Err(TrackerError::DeviceUnavailable(format!(
                "no image files in {}",
                dir.display()
            )));
        }

        let mut frames = Vec::with_capacity(paths.len());
        let mut dims: Option<(u32, u32)> = None;
        for path in &paths {
            let img = image::open(path)
                .map_err(|e| TrackerError::DeviceUnavailable(format!("{}: {e}", path.display())))?
                .to_rgb8();
            let (w, h) = img.dimensions();
            match dims {
                None => dims = Some((w, h)),
                Some(expected) if expected != (w, h) => {
                    return Err(TrackerError::DeviceUnavailable(format!(
                        "{} is {w}x{h}, expected {}x{}",
                        path.display(),
                        expected.0,
                        expected.1
                    )));
                }
                Some(_) => {}
            }
            frames.push(img.into_raw());
        }

        let (width, height) = dims.unwrap_or((0, 0));
        Ok(Self {
            frames,
            width,
            height,
            frame_interval,
            cursor: 0,
        })
    }
}

impl VideoStream for ImageSequenceStream {
    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn frame_interval(&self) -> Duration {
        self.frame_interval
    }

    fn next_frame(&mut self) -> Result<Vec<u8>, TrackerError> {
        thread::sleep(self.frame_interval);
        let frame = self.frames[self.cursor].clone();
        self.cursor = (self.cursor + 1) % self.frames.len();
        Ok(frame)
    }
}
