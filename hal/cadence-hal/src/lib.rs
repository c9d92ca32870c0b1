//! Cadence Hardware Abstraction Layer
//!
//! This crate defines the traits the superloop services are written
//! against. Chip-specific crates implement them, the core crate consumes
//! them, and host tests mock them.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  cadence-firmware (superloop binary)    │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  cadence-core (services, host-tested)   │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  cadence-hal (this crate - traits)      │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//!            ┌─────────────────┐
//!            │  cadence-hal-   │
//!            │    stm32f7      │
//!            └─────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::OutputPin`], [`gpio::InputPin`] - Digital I/O
//! - [`i2c::I2cBus`], [`i2c::BusLines`] - Sensor bus and manual line control
//! - [`spi::SpiBus`], [`spi::DisplayBus`] - Display bus
//! - [`console::Console`] - Line-oriented operator console
//! - [`net::NetStack`] - Packet-level network adapter
//! - [`time::Monotonic`], [`time::Idle`] - Millisecond clock and idle wait

#![no_std]
#![deny(unsafe_code)]

pub mod console;
pub mod gpio;
pub mod i2c;
pub mod net;
pub mod spi;
pub mod time;

// Re-export key traits at crate root for convenience
pub use console::Console;
pub use gpio::{InputPin, IoPin, OutputPin};
pub use i2c::{BusError, BusLines, I2cBus, I2cErrorKind};
pub use net::{LinkEvent, NetError, NetStack};
pub use spi::{DisplayBus, SpiBus, SpiDisplay};
pub use time::{Idle, Monotonic};
