//! Chunked render engine
//!
//! Owns the display bus. An operation (full-screen fill or blit of the
//! staging buffer) is started in one call and then streamed by
//! [`RenderEngine::pump`] at most `chunk_bytes` per main-loop tick, so a
//! 40 KB fill never holds the loop for more than one chunk's worth of SPI
//! time.
//!
//! While an operation is active the panel stays selected and nothing else
//! may touch the bus; start calls are refused until the engine is idle.

use cadence_hal::DisplayBus;

use super::color::Rgb565;
use super::panel::{self, Window};
use super::raster::{render_line, LINE_BYTES};
use super::{BYTES_PER_PIXEL, HEIGHT, LINE_HEIGHT, MAX_CHUNK_BYTES};
use crate::config::DisplayConfig;

/// Anything that can take one row of text for display
///
/// The line manager is written against this so it can be tested without a
/// bus.
pub trait TextTarget {
    /// True while an earlier submission is still being transferred
    fn is_busy(&self) -> bool;

    /// Queue one text row at pixel row `y`; `false` if refused
    fn start_text_line(&mut self, y: u16, text: &str, fg: Rgb565, bg: Rgb565) -> bool;
}

/// Render engine settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RenderConfig {
    /// Bytes per pump; rounded down to whole pixels
    pub chunk_bytes: usize,
    /// Failed writes tolerated in a row before the operation is dropped
    ///
    /// `None` keeps retrying forever.
    pub max_write_retries: Option<u32>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            chunk_bytes: 512,
            max_write_retries: None,
        }
    }
}

impl From<&DisplayConfig> for RenderConfig {
    fn from(cfg: &DisplayConfig) -> Self {
        Self {
            chunk_bytes: cfg.chunk_bytes as usize,
            max_write_retries: cfg.max_write_retries,
        }
    }
}

/// Engine counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RenderStats {
    /// Chunks written successfully
    pub chunks: u32,
    /// Chunk writes that failed
    pub write_failures: u32,
    /// Failures since the last successful write
    pub consecutive_failures: u32,
    /// Operations dropped after exhausting the retry bound
    pub aborted: u32,
}

/// Operation in progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RenderOp {
    /// Bus free
    Idle,
    /// Stream `total` pixels of `color`
    Fill {
        color: Rgb565,
        total: usize,
        sent: usize,
    },
    /// Stream the first `total` bytes of the staging buffer
    Blit { total: usize, sent: usize },
}

/// Chunked render engine over a display bus
pub struct RenderEngine<B> {
    bus: B,
    chunk_bytes: usize,
    max_write_retries: Option<u32>,
    op: RenderOp,
    stage: [u8; LINE_BYTES],
    fill: [u8; MAX_CHUNK_BYTES],
    stats: RenderStats,
}

impl<B: DisplayBus> RenderEngine<B> {
    /// Create an idle engine
    pub fn new(bus: B, config: RenderConfig) -> Self {
        let chunk_bytes = config.chunk_bytes.clamp(BYTES_PER_PIXEL, MAX_CHUNK_BYTES)
            / BYTES_PER_PIXEL
            * BYTES_PER_PIXEL;
        Self {
            bus,
            chunk_bytes,
            max_write_retries: config.max_write_retries,
            op: RenderOp::Idle,
            stage: [0; LINE_BYTES],
            fill: [0; MAX_CHUNK_BYTES],
            stats: RenderStats::default(),
        }
    }

    /// True while an operation owns the bus
    pub fn is_busy(&self) -> bool {
        !matches!(self.op, RenderOp::Idle)
    }

    /// Current operation
    pub fn op(&self) -> RenderOp {
        self.op
    }

    /// Counters
    pub fn stats(&self) -> RenderStats {
        self.stats
    }

    /// Effective chunk size in bytes
    pub fn chunk_bytes(&self) -> usize {
        self.chunk_bytes
    }

    /// Direct bus access, only while idle
    pub fn bus_mut(&mut self) -> Option<&mut B> {
        if self.is_busy() {
            None
        } else {
            Some(&mut self.bus)
        }
    }

    /// Start filling the whole panel with `color`
    pub fn start_fill(&mut self, color: Rgb565) -> bool {
        if self.is_busy() || !self.open(Window::FULL) {
            return false;
        }
        let px = color.to_be_bytes();
        for slot in self.fill[..self.chunk_bytes].chunks_exact_mut(BYTES_PER_PIXEL) {
            slot.copy_from_slice(&px);
        }
        self.op = RenderOp::Fill {
            color,
            total: Window::FULL.pixels(),
            sent: 0,
        };
        true
    }

    /// Start streaming `data` (panel byte order) into `window`
    ///
    /// `data` is copied into the staging buffer, so it may be at most one
    /// text row's worth of bytes.
    pub fn start_blit(&mut self, window: Window, data: &[u8]) -> bool {
        if self.is_busy() || data.is_empty() || data.len() > LINE_BYTES {
            return false;
        }
        if !window.is_on_panel() || !self.open(window) {
            return false;
        }
        self.stage[..data.len()].copy_from_slice(data);
        self.op = RenderOp::Blit {
            total: data.len(),
            sent: 0,
        };
        true
    }

    /// Rasterize one text row straight into the staging buffer and blit it
    ///
    /// Rows that would hang off the bottom of the panel are refused.
    pub fn start_text_line(&mut self, y: u16, text: &str, fg: Rgb565, bg: Rgb565) -> bool {
        if self.is_busy() || y as usize + LINE_HEIGHT > HEIGHT {
            return false;
        }
        if !self.open(Window::band(y, LINE_HEIGHT as u16)) {
            return false;
        }
        render_line(&mut self.stage, text, fg, bg);
        self.op = RenderOp::Blit {
            total: LINE_BYTES,
            sent: 0,
        };
        true
    }

    /// Push the next chunk of the active operation
    ///
    /// A failed write leaves the counters untouched so the same chunk goes
    /// out again next tick.
    pub fn pump(&mut self) {
        let written = match &mut self.op {
            RenderOp::Idle => return,
            RenderOp::Fill { total, sent, .. } => {
                let pixels = (*total - *sent).min(self.chunk_bytes / BYTES_PER_PIXEL);
                match self
                    .bus
                    .write_pixels(&self.fill[..pixels * BYTES_PER_PIXEL])
                {
                    Ok(()) => {
                        *sent += pixels;
                        Some(*sent >= *total)
                    }
                    Err(_) => None,
                }
            }
            RenderOp::Blit { total, sent } => {
                let bytes = (*total - *sent).min(self.chunk_bytes);
                match self.bus.write_pixels(&self.stage[*sent..*sent + bytes]) {
                    Ok(()) => {
                        *sent += bytes;
                        Some(*sent >= *total)
                    }
                    Err(_) => None,
                }
            }
        };

        match written {
            Some(done) => {
                self.stats.chunks = self.stats.chunks.wrapping_add(1);
                self.stats.consecutive_failures = 0;
                if done {
                    self.close();
                }
            }
            None => {
                self.stats.write_failures = self.stats.write_failures.wrapping_add(1);
                self.stats.consecutive_failures = self.stats.consecutive_failures.saturating_add(1);
                trace!(
                    "render: write failed ({} in a row)",
                    self.stats.consecutive_failures
                );
                if let Some(limit) = self.max_write_retries {
                    if self.stats.consecutive_failures > limit {
                        warn!(
                            "render: dropping operation after {} failed writes",
                            self.stats.consecutive_failures
                        );
                        self.stats.aborted = self.stats.aborted.wrapping_add(1);
                        self.close();
                    }
                }
            }
        }
    }

    /// Set the window and select the panel for streaming
    fn open(&mut self, window: Window) -> bool {
        if panel::set_window(&mut self.bus, window).is_err() {
            debug!("render: window setup failed");
            return false;
        }
        self.bus.begin_pixels();
        self.stats.consecutive_failures = 0;
        true
    }

    fn close(&mut self) {
        self.bus.end_pixels();
        self.op = RenderOp::Idle;
    }
}

impl<B: DisplayBus> TextTarget for RenderEngine<B> {
    fn is_busy(&self) -> bool {
        RenderEngine::is_busy(self)
    }

    fn start_text_line(&mut self, y: u16, text: &str, fg: Rgb565, bg: Rgb565) -> bool {
        RenderEngine::start_text_line(self, y, text, fg, bg)
    }
}
