//! Text line cache
//!
//! Screen rows are set by whoever owns the information and rendered later,
//! one row per call, only when their text actually changed. A rotating
//! start index keeps a row that changes every tick from starving the rows
//! after it.

use heapless::String;

use crate::display::{Rgb565, TextTarget, LINE_HEIGHT};
use crate::text::truncate;

/// Longest text a row keeps
pub const TEXT_CAPACITY: usize = 127;

/// Foreground/background pair for a row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LineAttrs {
    pub fg: Rgb565,
    pub bg: Rgb565,
}

impl LineAttrs {
    pub const fn new(fg: Rgb565, bg: Rgb565) -> Self {
        Self { fg, bg }
    }

    /// `fg` on black
    pub const fn on_black(fg: Rgb565) -> Self {
        Self::new(fg, Rgb565::BLACK)
    }
}

impl Default for LineAttrs {
    fn default() -> Self {
        Self::on_black(Rgb565::WHITE)
    }
}

#[derive(Debug, Clone, Default)]
struct LineEntry {
    used: bool,
    dirty: bool,
    attrs: LineAttrs,
    text: String<TEXT_CAPACITY>,
    last: String<TEXT_CAPACITY>,
}

/// Fixed-capacity cache of `N` screen rows
pub struct LineManager<const N: usize> {
    lines: [LineEntry; N],
    cursor: usize,
}

impl<const N: usize> Default for LineManager<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> LineManager<N> {
    /// Empty cache
    pub fn new() -> Self {
        Self {
            lines: core::array::from_fn(|_| LineEntry::default()),
            cursor: 0,
        }
    }

    /// Set the desired text and colors of row `index`
    ///
    /// Returns `false` for an index past the last row. Text longer than
    /// [`TEXT_CAPACITY`] is cut at a character boundary. Setting the text a
    /// row already has does not mark it dirty.
    pub fn set_line(&mut self, index: usize, attrs: LineAttrs, text: &str) -> bool {
        let Some(line) = self.lines.get_mut(index) else {
            return false;
        };
        line.used = true;
        line.attrs = attrs;

        let text = truncate(text, TEXT_CAPACITY);
        if line.text.as_str() != text {
            line.text.clear();
            // Cannot fail: truncated to capacity above
            let _ = line.text.push_str(text);
            line.dirty = line.text != line.last;
        }
        true
    }

    /// Forget row `index`
    pub fn clear_line(&mut self, index: usize) {
        if let Some(line) = self.lines.get_mut(index) {
            *line = LineEntry::default();
        }
    }

    /// Forget every row and restart the rotation
    pub fn clear_all(&mut self) {
        for line in self.lines.iter_mut() {
            *line = LineEntry::default();
        }
        self.cursor = 0;
    }

    /// Desired text of row `index`
    pub fn text(&self, index: usize) -> Option<&str> {
        self.lines
            .get(index)
            .filter(|l| l.used)
            .map(|l| l.text.as_str())
    }

    /// True if row `index` is waiting to be rendered
    pub fn is_dirty(&self, index: usize) -> bool {
        self.lines.get(index).is_some_and(|l| l.used && l.dirty)
    }

    /// One past the highest row ever set
    pub fn active_count(&self) -> usize {
        self.lines
            .iter()
            .rposition(|l| l.used)
            .map_or(0, |last| last + 1)
    }

    /// Submit at most one changed row to `target`
    ///
    /// Does nothing while the target is busy. Scanning starts at the
    /// rotating cursor and wraps within the active rows. Returns `true` if
    /// a row was submitted.
    pub fn pump_once<T: TextTarget>(&mut self, target: &mut T) -> bool {
        if target.is_busy() {
            return false;
        }
        let active = self.active_count();
        if active == 0 {
            self.cursor = 0;
            return false;
        }
        if self.cursor >= active {
            self.cursor = 0;
        }

        for step in 0..active {
            let index = (self.cursor + step) % active;
            let line = &mut self.lines[index];
            if !line.used || !(line.dirty || line.text != line.last) {
                continue;
            }

            let y = (index * LINE_HEIGHT) as u16;
            if !target.start_text_line(y, &line.text, line.attrs.fg, line.attrs.bg) {
                // Stays dirty and is picked up again next time
                return false;
            }
            line.last.clone_from(&line.text);
            line.dirty = false;
            self.cursor = (index + 1) % active;
            return true;
        }

        self.cursor = 0;
        false
    }
}
