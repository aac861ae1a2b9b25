pub mod camera_access;
pub mod video_stream;
