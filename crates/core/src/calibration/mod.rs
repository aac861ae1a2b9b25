pub mod processing;
pub mod record;
pub mod session;
pub mod stimulus;
pub mod surface;
