pub mod detection_result;
pub mod landmark_detector;
