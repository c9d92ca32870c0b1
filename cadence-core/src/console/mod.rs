//! Operator console
//!
//! Complete lines arrive from the [`Console`](cadence_hal::Console)
//! transport, are parsed into a [`Command`] and answered by the main loop,
//! which owns the state the answers are built from.

mod command;
mod editor;
mod log;

pub use command::{Command, CommandError, HELP_TEXT, MAX_COMMAND_LEN};
pub use editor::{LineEditor, PROMPT};
pub use log::StatusLog;

/// Firmware identification printed by `version`
pub const VERSION_TEXT: &str = concat!(
    "FW: ",
    env!("CARGO_PKG_NAME"),
    " ",
    env!("CARGO_PKG_VERSION")
);
