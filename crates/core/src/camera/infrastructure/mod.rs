pub mod image_sequence_camera;
pub mod synthetic_camera;
