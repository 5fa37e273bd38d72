//! Async tasks for the firmware.
//!
//! Each producer task turns one input into events on the bus; the dispatcher
//! task is the only consumer.

pub mod button;
pub mod console;
pub mod dispatcher;
pub mod gps;
pub mod info;
pub mod led;
pub mod nether;
pub mod sensor;
