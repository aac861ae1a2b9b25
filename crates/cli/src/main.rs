use std::fs;
use std::path::PathBuf;
use std::process;
use std::time::Duration;

use clap::Parser;
use serde::Serialize;

use gazetrack_core::calibration::record::{CalibrationRecord, ProcessedCalibrationPoint};
use gazetrack_core::calibration::session::{SessionConfig, SessionOutcome};
use gazetrack_core::calibration::stimulus::{default_grid, StimulusPoint};
use gazetrack_core::calibration::surface::StimulusSurface;
use gazetrack_core::camera::domain::camera_access::CameraAccess;
use gazetrack_core::camera::infrastructure::image_sequence_camera::ImageSequenceCamera;
use gazetrack_core::camera::infrastructure::synthetic_camera::SyntheticCamera;
use gazetrack_core::detection::domain::landmark_detector::DetectorConfig;
use gazetrack_core::detection::infrastructure::static_detector::StaticLandmarkDetector;
use gazetrack_core::overlay::domain::overlay_renderer::OverlayOptions;
use gazetrack_core::overlay::infrastructure::canvas_renderer::CanvasOverlayRenderer;
use gazetrack_core::pipeline::tracker::Tracker;

/// Run a gaze-calibration session against a synthetic or image-backed camera.
#[derive(Parser)]
#[command(name = "gazetrack")]
struct Cli {
    /// Directory of image files to replay as the camera feed
    /// (synthetic frames are generated when omitted).
    #[arg(long)]
    frames_dir: Option<PathBuf>,

    /// Synthetic camera width in pixels.
    #[arg(long, default_value = "640")]
    width: u32,

    /// Synthetic camera height in pixels.
    #[arg(long, default_value = "480")]
    height: u32,

    /// Camera frame rate.
    #[arg(long, default_value = "30.0")]
    fps: f64,

    /// Time each stimulus stays visible, in milliseconds.
    #[arg(long, default_value = "3000")]
    interval_ms: u64,

    /// Delay after stimulus onset before sampling, in milliseconds.
    #[arg(long, default_value = "1500")]
    sample_delay_ms: u64,

    /// Calibration points as "x,y;x,y;..." in percent coordinates
    /// (defaults to the 9-point grid).
    #[arg(long)]
    points: Option<String>,

    /// Maximum faces the detector tracks.
    #[arg(long, default_value = "1")]
    max_faces: usize,

    /// Disable iris refinement in the detector.
    #[arg(long)]
    no_refine: bool,

    /// Also run the live detect-and-render loop during calibration.
    #[arg(long)]
    overlay: bool,

    /// Write the calibration result to this file instead of stdout.
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Serialize)]
struct RecordJson {
    x: f64,
    y: f64,
    onset_ms: f64,
    landmarks: Vec<(f64, f64)>,
}

#[derive(Serialize)]
struct OutcomeJson {
    records: Vec<RecordJson>,
    processed: Vec<RecordJson>,
}

/// Prints each stimulus transition; the terminal stands in for the
/// calibration display surface.
struct TerminalSurface;

impl StimulusSurface for TerminalSurface {
    fn show(&mut self, point: &StimulusPoint) {
        log::info!("stimulus at ({:.0}%, {:.0}%)", point.x, point.y);
    }

    fn clear(&mut self) {
        log::debug!("stimulus cleared");
    }
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let frame_interval = Duration::from_secs_f64(1.0 / cli.fps.max(1.0));
    let camera: Box<dyn CameraAccess> = match &cli.frames_dir {
        Some(dir) => Box::new(ImageSequenceCamera::new(dir.clone(), frame_interval)),
        None => Box::new(SyntheticCamera::new(cli.width, cli.height, frame_interval)),
    };
    let detector = StaticLandmarkDetector::new(DetectorConfig {
        max_faces: cli.max_faces,
        refine_landmarks: !cli.no_refine,
    });

    let mut tracker = Tracker::new(camera, Box::new(detector));
    tracker.request_permission()?;
    log::info!("camera permission acquired");

    let devices = tracker.list_video_devices()?;
    log::info!("{} video device(s) found", devices.len());
    tracker.select_device(&devices[0])?;

    let sample_delay = Duration::from_millis(cli.sample_delay_ms);
    tracker.start_capture(sample_delay)?;
    let (width, height) = tracker
        .stream_dimensions()
        .unwrap_or((cli.width, cli.height));

    let loop_handle = cli.overlay.then(|| {
        tracker.start_detection_loop(
            Box::new(CanvasOverlayRenderer::new(width, height)),
            OverlayOptions::default(),
        )
    });

    let config = SessionConfig {
        presentation_interval: Duration::from_millis(cli.interval_ms),
        sample_delay,
        points: match &cli.points {
            Some(spec) => parse_points(spec)?,
            None => default_grid(),
        },
    };
    log::info!(
        "calibrating {} points ({}ms interval, {}ms sample delay)",
        config.points.len(),
        cli.interval_ms,
        cli.sample_delay_ms
    );

    let session = tracker.calibrate(config, Box::new(TerminalSurface))?;
    let outcome = session.join()?;

    if let Some(handle) = loop_handle {
        handle.stop();
    }
    tracker.stop_capture();

    let json = serde_json::to_string_pretty(&to_json(&outcome))?;
    match &cli.output {
        Some(path) => {
            fs::write(path, json)?;
            log::info!("calibration result written to {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn parse_points(spec: &str) -> Result<Vec<StimulusPoint>, String> {
    spec.split(';')
        .filter(|chunk| !chunk.trim().is_empty())
        .map(|chunk| {
            let (x, y) = chunk
                .split_once(',')
                .ok_or_else(|| format!("malformed point '{chunk}', expected 'x,y'"))?;
            let x: f64 = x.trim().parse().map_err(|_| format!("bad x in '{chunk}'"))?;
            let y: f64 = y.trim().parse().map_err(|_| format!("bad y in '{chunk}'"))?;
            Ok(StimulusPoint::new(x, y))
        })
        .collect()
}

fn to_json(outcome: &SessionOutcome) -> OutcomeJson {
    OutcomeJson {
        records: outcome.records.iter().map(record_json).collect(),
        processed: outcome.processed.iter().map(processed_json).collect(),
    }
}

fn record_json(record: &CalibrationRecord) -> RecordJson {
    RecordJson {
        x: record.x,
        y: record.y,
        onset_ms: record.onset_time.as_secs_f64() * 1000.0,
        landmarks: record.landmarks.clone(),
    }
}

fn processed_json(point: &ProcessedCalibrationPoint) -> RecordJson {
    RecordJson {
        x: point.x,
        y: point.y,
        onset_ms: point.onset_time.as_secs_f64() * 1000.0,
        landmarks: point.landmarks.clone(),
    }
}
