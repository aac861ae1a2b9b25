pub mod detection_loop;
pub mod tracker;
