//! Webcam frame capture and gaze-calibration sampling.
//!
//! The pipeline wires a camera boundary into a bounded frame buffer, drives
//! a facial-landmark detector at display cadence, and runs timed calibration
//! sessions that correlate stimulus positions with landmark samples.
//!
//! Layout per concern: `domain` holds the trait seams and pure types,
//! `infrastructure` the concrete adapters. [`pipeline::tracker::Tracker`] is
//! the top-level context that owns and wires the pieces.

pub mod calibration;
pub mod camera;
pub mod capture;
pub mod detection;
pub mod overlay;
pub mod pipeline;
pub mod shared;
