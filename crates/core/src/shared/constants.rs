use std::ops::Range;

/// Number of face-contour mesh points produced by the landmark model.
pub const FACE_MESH_POINT_COUNT: usize = 468;

/// Index range of the refined iris keypoints within the full mesh.
///
/// Present only when the detector was loaded with `refine_landmarks`.
pub const IRIS_POINT_RANGE: Range<usize> = 468..478;

/// Total mesh size when iris refinement is enabled.
pub const REFINED_MESH_POINT_COUNT: usize = 478;

/// Default time each calibration stimulus stays on screen.
pub const DEFAULT_PRESENTATION_INTERVAL_MS: u64 = 3000;

/// Default delay after stimulus onset before the sample is captured.
pub const DEFAULT_SAMPLE_DELAY_MS: u64 = 1500;

/// Below this many stimulus points calibration accuracy degrades noticeably.
pub const MIN_RECOMMENDED_POINTS: usize = 4;

/// Frame-rate assumption used to size the frame buffer window when the
/// stream does not report its own cadence.
pub const DEFAULT_FPS_HINT: f64 = 30.0;

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];
