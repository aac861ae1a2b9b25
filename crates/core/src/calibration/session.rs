use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{never, select, Sender};

use crate::calibration::processing;
use crate::calibration::record::{CalibrationRecord, ProcessedCalibrationPoint};
use crate::calibration::stimulus::{default_grid, StimulusPoint};
use crate::calibration::surface::StimulusSurface;
use crate::capture::frame_buffer::FrameBuffer;
use crate::detection::domain::landmark_detector::{lock_detector, SharedDetector};
use crate::shared::constants::{
    DEFAULT_PRESENTATION_INTERVAL_MS, DEFAULT_SAMPLE_DELAY_MS, MIN_RECOMMENDED_POINTS,
};
use crate::shared::error::TrackerError;

/// Timing and stimulus sequence for one calibration run.
#[derive(Clone, Debug)]
pub struct SessionConfig {
    /// How long each stimulus stays visible before the next replaces it.
    pub presentation_interval: Duration,
    /// Delay after stimulus onset before the sample is captured. Must be
    /// strictly between zero and `presentation_interval`.
    pub sample_delay: Duration,
    /// Consumed front-to-back, one per presentation interval.
    pub points: Vec<StimulusPoint>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            presentation_interval: Duration::from_millis(DEFAULT_PRESENTATION_INTERVAL_MS),
            sample_delay: Duration::from_millis(DEFAULT_SAMPLE_DELAY_MS),
            points: default_grid(),
        }
    }
}

impl SessionConfig {
    fn validate(&self) -> Result<(), TrackerError> {
        if self.sample_delay.is_zero() {
            return Err(TrackerError::InvalidConfig(
                "sample_delay must be greater than zero".into(),
            ));
        }
        if self.sample_delay >= self.presentation_interval {
            return Err(TrackerError::InvalidConfig(format!(
                "sample_delay ({:?}) must be shorter than presentation_interval ({:?})",
                self.sample_delay, self.presentation_interval
            )));
        }
        Ok(())
    }
}

/// Everything a finished (or cancelled) session hands back to the caller.
#[derive(Debug, Default)]
pub struct SessionOutcome {
    /// Raw records in stimulus-presentation order, one per point that
    /// completed its dwell before the session ended.
    pub records: Vec<CalibrationRecord>,
    /// Post-processed points, always the same length as `records`.
    pub processed: Vec<ProcessedCalibrationPoint>,
}

/// Presents each stimulus point for a fixed interval and captures one
/// landmark sample per point at a fixed delay after its onset.
///
/// The session thread multiplexes three event sources: the presentation
/// ticker, the per-point one-shot sample timer, and cancellation. Samples
/// run on the session thread itself, so a slow detection delays the next
/// presentation tick rather than racing it, and records always land in
/// cursor order. The owning stimulus point and its onset are captured by
/// value when the sample timer is armed, so a late completion can never be
/// attributed to the wrong point.
pub struct CalibrationSession {
    config: SessionConfig,
    surface: Option<Box<dyn StimulusSurface>>,
}

impl CalibrationSession {
    /// Validates timing up front; supplying fewer than four points is
    /// allowed but logged as a calibration-quality warning.
    pub fn new(config: SessionConfig) -> Result<Self, TrackerError> {
        config.validate()?;
        if config.points.len() < MIN_RECOMMENDED_POINTS {
            log::warn!(
                "only {} calibration points supplied; {MIN_RECOMMENDED_POINTS} or more are \
                 recommended for usable accuracy",
                config.points.len()
            );
        }
        Ok(Self {
            config,
            surface: None,
        })
    }

    pub fn attach_surface(&mut self, surface: Box<dyn StimulusSurface>) {
        self.surface = Some(surface);
    }

    pub fn has_surface(&self) -> bool {
        self.surface.is_some()
    }

    /// Start the presentation loop on its own thread. Fails fast with
    /// `NoTargetSurface` when no display surface has been attached.
    pub fn start(
        self,
        buffer: Arc<FrameBuffer>,
        detector: SharedDetector,
    ) -> Result<SessionHandle, TrackerError> {
        let mut surface = self.surface.ok_or(TrackerError::NoTargetSurface)?;
        let config = self.config;
        let (cancel_tx, cancel_rx) = crossbeam_channel::bounded::<()>(1);

        let thread = thread::spawn(move || {
            let epoch = Instant::now();
            let ticker = crossbeam_channel::tick(config.presentation_interval);
            let mut sample_timer = never::<Instant>();
            let mut cursor = config.points.into_iter();
            let mut pending: Option<(StimulusPoint, Duration)> = None;
            let mut records: Vec<CalibrationRecord> = Vec::new();
            let mut cancelled = false;

            loop {
                select! {
                    recv(cancel_rx) -> _ => {
                        // A point still mid-dwell produces no record.
                        cancelled = true;
                        break;
                    }
                    recv(sample_timer) -> _ => {
                        sample_timer = never();
                        if let Some((point, onset)) = pending.take() {
                            records.push(capture_sample(&buffer, &detector, point, onset));
                        }
                    }
                    recv(ticker) -> _ => {
                        // A sample due at the same instant completes before
                        // its stimulus is replaced.
                        if sample_timer.try_recv().is_ok() {
                            sample_timer = never();
                            if let Some((point, onset)) = pending.take() {
                                records.push(capture_sample(&buffer, &detector, point, onset));
                            }
                        }
                        surface.clear();
                        match cursor.next() {
                            None => break,
                            Some(point) => {
                                surface.show(&point);
                                let onset = epoch.elapsed();
                                pending = Some((point, onset));
                                sample_timer = crossbeam_channel::after(config.sample_delay);
                            }
                        }
                    }
                }
            }

            surface.clear();
            if cancelled {
                log::info!("calibration cancelled after {} records", records.len());
            } else {
                log::info!("calibration finished with {} records", records.len());
            }

            // Post-processing is strictly ordered after the presentation
            // loop; it never races the final samples.
            let processed = processing::process_records(&detector, &records);
            SessionOutcome { records, processed }
        });

        Ok(SessionHandle {
            cancel_tx,
            thread,
        })
    }
}

/// Capture one sample: read the most recent frame *at fire time*, run
/// detection against it, and correlate with the owning stimulus point.
/// Firing before any frame has arrived records an empty landmark set.
fn capture_sample(
    buffer: &Arc<FrameBuffer>,
    detector: &SharedDetector,
    point: StimulusPoint,
    onset: Duration,
) -> CalibrationRecord {
    match buffer.latest() {
        Ok(frame) => {
            let landmarks = match lock_detector(detector).detect(&frame) {
                Ok(result) => result.into_landmarks(),
                Err(e) => {
                    log::warn!("sample detection failed: {e}; recording no face");
                    Vec::new()
                }
            };
            CalibrationRecord {
                x: point.x,
                y: point.y,
                onset_time: onset,
                landmarks,
                frame: Some(frame),
            }
        }
        Err(_) => {
            log::debug!("sample fired before first frame; recording empty landmarks");
            CalibrationRecord {
                x: point.x,
                y: point.y,
                onset_time: onset,
                landmarks: Vec::new(),
                frame: None,
            }
        }
    }
}

/// Owner-side handle to a running calibration session.
///
/// Dropping the handle without joining also cancels the session (the
/// cancellation channel disconnects).
pub struct SessionHandle {
    cancel_tx: Sender<()>,
    thread: JoinHandle<SessionOutcome>,
}

impl SessionHandle {
    /// Stop the presentation timer and any pending sample timer. Records
    /// collected so far are preserved and returned by `join`.
    pub fn cancel(&self) {
        let _ = self.cancel_tx.try_send(());
    }

    /// Wait for the session to finish and take its outcome.
    pub fn join(self) -> Result<SessionOutcome, TrackerError> {
        self.thread
            .join()
            .map_err(|_| TrackerError::SessionFailed("calibration thread panicked".into()))
    }
}
