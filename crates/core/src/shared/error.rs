use thiserror::Error;

/// Error taxonomy for the capture and calibration pipeline.
///
/// Only acquisition-time and start-time variants are surfaced to callers;
/// steady-state per-frame conditions (`NoFramesYet`, `DetectionFailed`) are
/// absorbed by the loops that encounter them and reflected as empty results.
#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("camera permission denied")]
    PermissionDenied,

    #[error("capture device unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("frame capture started before a stream was attached")]
    SourceNotReady,

    #[error("no frames captured yet")]
    NoFramesYet,

    #[error("landmark detection failed: {0}")]
    DetectionFailed(String),

    #[error("calibration started without a display surface attached")]
    NoTargetSurface,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("session thread failed: {0}")]
    SessionFailed(String),
}
