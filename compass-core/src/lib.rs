//! Platform-agnostic heading pipeline, event bus and device state machine.
//!
//! This crate holds everything the compass firmware does that does not touch
//! a peripheral directly. It builds for `no_std` targets and on host for
//! testing.
//!
//! # Overview
//!
//! - [`sensor`]: the [`Magnetometer`] seam implemented by the chip drivers
//! - [`calibration`]: min/max sweep and hard/soft-iron correction ([`CalibrationEngine`])
//! - [`smoothing`]: moving-average and trimmed-mean filter ([`SmoothingFilter`])
//! - [`heading`]: `atan2` heading, declination and per-chip corrections
//! - [`pipeline`]: read, correct, smooth and convert in one call ([`HeadingPipeline`])
//! - [`bus`]: bounded event queue ([`EventBus`])
//! - [`state`]: [`Context`] owner and state machine ([`StateMachine`])
//! - [`gps`]: distance-driven receiver duty cycling ([`GpsDutyCycleController`])
//! - [`nmea`], [`transport`]: line parsers for the GPS receiver and the
//!   configuration console
//! - [`button`], [`nether`], [`needle`]: gesture detection, the fake-needle
//!   generator used without a fix, and needle damping
//!
//! # Data flow
//!
//! ```text
//! Magnetometer -> HeadingPipeline -> Azimuth event -+
//! Button / GPS / console / nether  -> events -------+-> EventBus -> StateMachine -> Board
//! ```
//!
//! Producers never touch the [`Context`]; only the state machine writes it.
//!
//! # Features
//!
//! - **`std`**: Enable standard library support (for host testing)
//! - **`defmt`**: Enable defmt formatting and logging (for embedded targets)

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

#[macro_use]
mod fmt;

pub mod bus;
pub mod button;
pub mod calibration;
pub mod context;
pub mod event;
pub mod geo;
pub mod gps;
pub mod heading;
pub mod needle;
pub mod nether;
pub mod nmea;
pub mod pipeline;
pub mod sensor;
pub mod services;
pub mod settings;
pub mod smoothing;
pub mod state;
pub mod transport;
pub mod types;

#[cfg(test)]
mod testing;

// Re-export main types at crate root
pub use bus::{BusError, EventBus, EVENT_QUEUE_DEPTH, MAX_QUEUED_SAMPLES};
pub use button::{ButtonDetector, Gesture};
pub use calibration::{CalibrationEngine, CalibrationProfile, SweepStats, SWEEP_DURATION_MS};
pub use context::Context;
pub use event::{ConfigCommand, Event, EventKind, Source, Text};
pub use gps::{DutyDecision, GpsDutyCycleController, Presence, PresenceMonitor, SleepConfigRow};
pub use heading::{bearing16, heading, ChipCorrection, Declination};
pub use needle::NeedleDamper;
pub use nether::NetherGenerator;
pub use pipeline::HeadingPipeline;
pub use sensor::Magnetometer;
pub use services::{Board, Calibrator, Renderer, Storage, StorageError, System};
pub use settings::{RecordError, Settings};
pub use smoothing::SmoothingFilter;
pub use state::{Boot, StateMachine};
pub use transport::{parse_command, Command, CommandError};
pub use types::{
    CalibratedSample, DeviceState, Location, Model, PointerColor, RawSample, Rgb, SensorError,
    SensorModel, ServerMode, WorkType,
};
