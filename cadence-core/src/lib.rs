//! Board-agnostic superloop services
//!
//! This crate contains everything the firmware does that does not depend
//! on a particular chip:
//!
//! - Chunked display render engine and the text line cache feeding it
//! - Sensor poll service with I2C bus recovery
//! - Telemetry codec and the datagram/stream telemetry client
//! - Interrupt-to-loop snapshot mailboxes
//! - Console commands and the periodic status log
//! - The cooperative main loop tying them together
//!
//! Every service is ticked from one thread and returns after a bounded
//! amount of work, so none of them may block except where noted.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

// This must go first so the log macros are visible to every module
mod fmt;

pub mod config;
pub mod console;
pub mod display;
pub mod net;
pub mod scheduler;
pub mod sensor;
pub mod snapshot;
pub mod telemetry;
pub mod text;
pub mod time;
pub mod ui;

#[cfg(test)]
mod testing;
