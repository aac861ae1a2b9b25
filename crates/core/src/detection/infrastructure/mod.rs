pub mod static_detector;
