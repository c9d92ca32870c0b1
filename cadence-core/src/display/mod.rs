//! Display pipeline
//!
//! Text rows are rasterized into a one-line staging buffer and streamed to
//! the panel a chunk per main-loop tick by [`RenderEngine`].

pub mod color;
pub mod font;
pub mod panel;
pub mod raster;
pub mod render;

pub use color::Rgb565;
pub use panel::Window;
pub use render::{RenderConfig, RenderEngine, RenderStats, TextTarget};

/// Panel width in landscape orientation
pub const WIDTH: usize = 160;

/// Panel height in landscape orientation
pub const HEIGHT: usize = 128;

/// Height of one text row in pixels
pub const LINE_HEIGHT: usize = 8;

/// Bytes per RGB565 pixel
pub const BYTES_PER_PIXEL: usize = 2;

/// Largest chunk a single pump may push
pub const MAX_CHUNK_BYTES: usize = 1024;
