//! ST7735-class panel commands

use cadence_hal::DisplayBus;
use embedded_hal::delay::DelayNs;

use super::{HEIGHT, WIDTH};

/// Exit sleep
pub const SLPOUT: u8 = 0x11;
/// Display on
pub const DISPON: u8 = 0x29;
/// Column address set
pub const CASET: u8 = 0x2A;
/// Row address set
pub const RASET: u8 = 0x2B;
/// Memory write
pub const RAMWR: u8 = 0x2C;
/// Memory access control (orientation)
pub const MADCTL: u8 = 0x36;
/// Interface pixel format
pub const COLMOD: u8 = 0x3A;

/// COLMOD value for 16 bits per pixel
const COLMOD_RGB565: u8 = 0x05;
/// MADCTL value for landscape (row/column exchange, column mirror)
const MADCTL_LANDSCAPE: u8 = 0x60;

/// Inclusive pixel rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Window {
    pub x0: u16,
    pub y0: u16,
    pub x1: u16,
    pub y1: u16,
}

impl Window {
    /// The whole panel
    pub const FULL: Self = Self {
        x0: 0,
        y0: 0,
        x1: WIDTH as u16 - 1,
        y1: HEIGHT as u16 - 1,
    };

    /// Full-width band `height` pixels tall starting at `y`
    pub const fn band(y: u16, height: u16) -> Self {
        Self {
            x0: 0,
            y0: y,
            x1: WIDTH as u16 - 1,
            y1: y + height - 1,
        }
    }

    /// Number of pixels covered
    pub const fn pixels(&self) -> usize {
        (self.x1 - self.x0 + 1) as usize * (self.y1 - self.y0 + 1) as usize
    }

    /// True if the window lies on the panel
    pub const fn is_on_panel(&self) -> bool {
        self.x0 <= self.x1
            && self.y0 <= self.y1
            && (self.x1 as usize) < WIDTH
            && (self.y1 as usize) < HEIGHT
    }
}

/// Point the panel's write pointer at `window` and start a memory write
///
/// Pixels streamed afterwards fill the window row by row.
pub fn set_window<B: DisplayBus>(bus: &mut B, window: Window) -> Result<(), B::Error> {
    let [x0h, x0l] = window.x0.to_be_bytes();
    let [x1h, x1l] = window.x1.to_be_bytes();
    let [y0h, y0l] = window.y0.to_be_bytes();
    let [y1h, y1l] = window.y1.to_be_bytes();
    bus.command(CASET, &[x0h, x0l, x1h, x1l])?;
    bus.command(RASET, &[y0h, y0l, y1h, y1l])?;
    bus.command(RAMWR, &[])
}

/// Wake the panel and configure it for landscape RGB565
///
/// Blocks for about 140 ms; only called before the main loop starts. The
/// hardware reset pulse is the board's job.
pub fn init<B: DisplayBus, D: DelayNs>(bus: &mut B, delay: &mut D) -> Result<(), B::Error> {
    bus.command(SLPOUT, &[])?;
    delay.delay_ms(120);
    bus.command(COLMOD, &[COLMOD_RGB565])?;
    bus.command(MADCTL, &[MADCTL_LANDSCAPE])?;
    bus.command(DISPON, &[])?;
    delay.delay_ms(20);
    Ok(())
}
