//! Handheld LED-matrix compass firmware for RP2040.
//!
//! This crate wires the platform-agnostic [`compass_core`] state machine and
//! the [`magnetometer`] drivers to the RP2040 peripherals.
//!
//! # Overview
//!
//! The firmware runs on a Raspberry Pi Pico (RP2040) and:
//! 1. Reads a QMC5883L, QMC5883P or MMC5883MA magnetometer at 60 Hz
//! 2. Shows the heading, or the way back to a saved spawn point, on a
//!    42-pixel WS2812 matrix
//! 3. Accepts configuration over a serial console and a single button
//! 4. Duty-cycles the GPS receiver by distance to spawn
//!
//! # Hardware Configuration
//!
//! | Function    | GPIO | Description |
//! |-------------|------|-------------|
//! | UART0 TX    | 0    | GPS receiver RX |
//! | UART0 RX    | 1    | GPS receiver TX (NMEA, 9600 baud) |
//! | GPS enable  | 2    | Receiver power switch (high = on) |
//! | I2C0 SDA    | 4    | Magnetometer |
//! | I2C0 SCL    | 5    | Magnetometer |
//! | UART1 TX    | 8    | Console transmit |
//! | UART1 RX    | 9    | Console receive (115200 baud) |
//! | Button      | 15   | Active low, internal pull-up |
//! | WS2812 data | 16   | LED matrix (PIO0) |
//!
//! # Architecture
//!
//! Producer tasks (sensor, nether, button, GPS, console, info expiry) post
//! events to one bounded [`EventBus`](compass_core::EventBus). The dispatcher
//! task is its only consumer and owns the [`StateMachine`](compass_core::StateMachine);
//! it reaches back to the other tasks only through the signals and watches
//! in [`shared`].
//!
//! # Modules
//!
//! - [`board`]: [`FirmwareBoard`], the hardware side of the state machine
//! - [`display`]: needle and scrolling-text frames for the matrix
//! - [`line_reader`]: newline-delimited UART reader ([`LineReader`])
//! - [`shared`]: statics shared between tasks
//! - [`storage`]: settings record in flash ([`FlashStorage`])
//! - [`tasks`]: task bodies
//!
//! # Features
//!
//! - **`dev-panic`** (default): Use `panic-probe` for development (prints panic info via RTT)
//! - **`prod-panic`**: Use `panic-reset` for production (silent watchdog reset)
//! - **`model-gps`** (default): first-boot defaults for the GPS board
//! - **`model-lite`**: first-boot defaults for the sensor-only board

#![no_std]

#[cfg(all(feature = "model-gps", feature = "model-lite"))]
compile_error!("Cannot enable both `model-gps` and `model-lite` features - pick the board being built");

pub mod board;
pub mod display;
pub mod line_reader;
pub mod shared;
pub mod storage;
pub mod tasks;

pub use board::FirmwareBoard;
pub use line_reader::{LineError, LineReader, MAX_LINE_LENGTH};
pub use storage::FlashStorage;

use compass_core::Model;

/// Hardware model assumed when nothing is persisted yet.
pub const FIRST_BOOT_MODEL: Model = if cfg!(feature = "model-lite") {
    Model::Lite
} else {
    Model::Gps
};
