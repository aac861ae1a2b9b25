use crate::detection::domain::detection_result::DetectionResult;
use crate::overlay::domain::overlay_renderer::{OverlayOptions, OverlayRenderer};
use crate::shared::error::TrackerError;
use crate::shared::frame::Frame;

const MARK_SIZE: u32 = 2;
const MARK_COLOR: [u8; 3] = [0, 255, 0];
const BOX_COLOR: [u8; 3] = [255, 0, 0];

/// In-memory RGB canvas sized to the stream's resolved dimensions and
/// horizontally mirrored, so a front-facing camera feed reads like a mirror.
///
/// Each render blits the frame mirrored, then stamps a 2x2 mark per selected
/// keypoint and an outline for the bounding box. Landmark coordinates arrive
/// in frame space and are mirrored together with the pixels.
pub struct CanvasOverlayRenderer {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
    renders: u64,
}

impl CanvasOverlayRenderer {
    /// Canvas dimensions mirror the video's resolved dimensions.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0u8; (width * height * 3) as usize],
            renders: 0,
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn renders(&self) -> u64 {
        self.renders
    }

    fn mirror_x(&self, x: f64) -> i64 {
        self.width as i64 - 1 - x.round() as i64
    }

    fn put_pixel(&mut self, x: i64, y: i64, color: [u8; 3]) {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return;
        }
        let offset = ((y as u32 * self.width + x as u32) * 3) as usize;
        self.pixels[offset..offset + 3].copy_from_slice(&color);
    }

    fn stamp_mark(&mut self, x: f64, y: f64, color: [u8; 3]) {
        let cx = self.mirror_x(x);
        let cy = y.round() as i64;
        for dy in 0..MARK_SIZE as i64 {
            for dx in 0..MARK_SIZE as i64 {
                // Mirrored space grows leftward from the anchor.
                self.put_pixel(cx - dx, cy + dy, color);
            }
        }
    }

    fn blit_mirrored(&mut self, frame: &Frame) {
        let fw = frame.width().min(self.width) as usize;
        let fh = frame.height().min(self.height) as usize;
        let src = frame.data();
        let stride = frame.width() as usize * 3;
        let dst_stride = self.width as usize * 3;

        for y in 0..fh {
            for x in 0..fw {
                let src_offset = y * stride + x * 3;
                let mirrored = self.width as usize - 1 - x;
                let dst_offset = y * dst_stride + mirrored * 3;
                self.pixels[dst_offset..dst_offset + 3]
                    .copy_from_slice(&src[src_offset..src_offset + 3]);
            }
        }
    }

    fn outline_box(&mut self, result: &DetectionResult) {
        let Some(bbox) = result.bounding_box() else {
            return;
        };
        let (x_min, x_max) = (bbox.x_min, bbox.x_max);
        let (y_min, y_max) = (bbox.y_min.round() as i64, bbox.y_max.round() as i64);
        // The two vertical edges swap sides under mirroring.
        let left = self.mirror_x(x_max);
        let right = self.mirror_x(x_min);
        for x in left..=right {
            self.put_pixel(x, y_min, BOX_COLOR);
            self.put_pixel(x, y_max, BOX_COLOR);
        }
        for y in y_min..=y_max {
            self.put_pixel(left, y, BOX_COLOR);
            self.put_pixel(right, y, BOX_COLOR);
        }
    }
}

impl OverlayRenderer for CanvasOverlayRenderer {
    fn render(
        &mut self,
        frame: &Frame,
        result: &DetectionResult,
        options: &OverlayOptions,
    ) -> Result<(), TrackerError> {
        self.blit_mirrored(frame);

        if options.draw_face_points {
            for &(x, y) in result.face_points() {
                self.stamp_mark(x, y, MARK_COLOR);
            }
        }
        if options.draw_iris_points {
            for &(x, y) in result.iris_points() {
                self.stamp_mark(x, y, MARK_COLOR);
            }
        }
        if options.draw_bounding_box {
            self.outline_box(result);
        }

        self.renders += 1;
        Ok(())
    }
}
