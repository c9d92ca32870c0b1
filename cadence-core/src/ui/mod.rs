//! Screen contents
//!
//! [`lines`] keeps the desired text per row and feeds changed rows to the
//! render engine; [`status`] decides what those rows say.

pub mod lines;
pub mod status;

pub use lines::{LineAttrs, LineManager, TEXT_CAPACITY};
pub use status::{LinkSummary, StatusColors, StatusView};

/// Rows on the panel (128 px / 8 px per row)
pub const MAX_LINES: usize = 16;

/// Line cache sized for the whole panel
pub type Lines = LineManager<MAX_LINES>;
