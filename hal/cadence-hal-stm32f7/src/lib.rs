//! STM32F7-specific HAL for the Cadence firmware
//!
//! This crate adapts embassy-stm32's blocking drivers to the `cadence-hal`
//! traits. It supports:
//!
//! - STM32F767ZI (NUCLEO-F767ZI, reference board)
//! - STM32F746ZG
//!
//! # Features
//!
//! - `stm32f767zi` / `stm32f746zg` - Chip selection
//! - `defmt` - Enable debug formatting support
//!
//! # Usage
//!
//! The firmware creates the embassy drivers and wraps them here. Wrappers are
//! generic over the `embedded-hal` and `embedded-io` traits those drivers
//! implement, so the firmware never has to spell out embassy's driver
//! generics. Bus recovery goes below embassy to the register level.

#![no_std]

pub mod console;
pub mod gpio;
pub mod i2c;
pub mod spi;
pub mod time;

pub use console::UartConsole;
pub use gpio::{HalOutput, PacPin};
pub use i2c::{I2cFault, SensorBus};
pub use spi::{SpiFault, SpiWriter};
pub use time::{EmbassyClock, WfiIdle};
