//! Terminal line editor
//!
//! Turns a raw byte stream from a terminal into complete lines. Printable
//! characters are echoed, backspace erases, CR or LF finishes the line.
//! Output printed while the operator is typing first erases the partial
//! line and then redraws it, so the two never interleave.

use heapless::{String, Vec};

use super::MAX_COMMAND_LEN;

/// Prompt shown before every input line
pub const PROMPT: &str = "> ";

const ERASE_LINE: &str = "\r\x1b[2K";
const BACKSPACE: u8 = 0x08;
const DELETE: u8 = 0x7F;

/// Line assembly state
#[derive(Debug, Default)]
pub struct LineEditor {
    partial: String<MAX_COMMAND_LEN>,
    ready: Option<String<MAX_COMMAND_LEN>>,
    after_cr: bool,
}

impl LineEditor {
    pub const fn new() -> Self {
        Self {
            partial: String::new(),
            ready: None,
            after_cr: false,
        }
    }

    /// Feed one received byte, appending any echo to `echo`
    ///
    /// A line finished while an earlier one has not been taken replaces it.
    pub fn feed<const N: usize>(&mut self, byte: u8, echo: &mut Vec<u8, N>) {
        let after_cr = core::mem::replace(&mut self.after_cr, byte == b'\r');
        match byte {
            b'\r' | b'\n' => {
                // CRLF from the terminal: the LF finishes nothing
                if byte == b'\n' && after_cr {
                    return;
                }
                let _ = echo.extend_from_slice(b"\r\n");
                let _ = echo.extend_from_slice(PROMPT.as_bytes());
                self.ready = Some(core::mem::take(&mut self.partial));
            }
            BACKSPACE | DELETE => {
                if self.partial.pop().is_some() {
                    let _ = echo.extend_from_slice(b"\x08 \x08");
                }
            }
            0x20..=0x7E => {
                if self.partial.push(byte as char).is_ok() {
                    let _ = echo.push(byte);
                }
            }
            _ => {}
        }
    }

    /// True if a finished line is waiting
    pub fn has_line(&self) -> bool {
        self.ready.is_some()
    }

    /// Take the finished line, if any
    pub fn take_line(&mut self) -> Option<String<MAX_COMMAND_LEN>> {
        self.ready.take()
    }

    /// Text typed so far on the current line
    pub fn partial(&self) -> &str {
        &self.partial
    }

    /// Append `text` framed so it does not corrupt the line being typed
    ///
    /// Returns `false` if `out` ran out of room; whatever fit is kept.
    pub fn frame_output<const N: usize>(&self, text: &str, out: &mut Vec<u8, N>) -> bool {
        [
            ERASE_LINE.as_bytes(),
            text.as_bytes(),
            &b"\r\n"[..],
            PROMPT.as_bytes(),
            self.partial.as_bytes(),
        ]
        .iter()
        .all(|part| out.extend_from_slice(part).is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Echo = Vec<u8, 512>;

    fn feed_all(ed: &mut LineEditor, bytes: &[u8]) -> Echo {
        let mut echo = Echo::new();
        for &b in bytes {
            ed.feed(b, &mut echo);
        }
        echo
    }

    #[test]
    fn test_line_with_echo() {
        let mut ed = LineEditor::new();
        let echo = feed_all(&mut ed, b"help\r");
        assert_eq!(echo.as_slice(), b"help\r\n> ");
        assert_eq!(ed.take_line().unwrap(), "help");
        assert!(ed.take_line().is_none());
    }

    #[test]
    fn test_crlf_is_one_line() {
        let mut ed = LineEditor::new();
        feed_all(&mut ed, b"uptime\r\n");
        assert_eq!(ed.take_line().unwrap(), "uptime");
        assert!(ed.take_line().is_none());
    }

    #[test]
    fn test_lf_after_taken_line_is_swallowed() {
        let mut ed = LineEditor::new();
        feed_all(&mut ed, b"log on\r");
        assert!(ed.has_line());
        assert_eq!(ed.take_line().unwrap(), "log on");
        let echo = feed_all(&mut ed, b"\n");
        assert!(echo.is_empty());
        assert!(!ed.has_line());
    }

    #[test]
    fn test_bare_lf_finishes_line() {
        let mut ed = LineEditor::new();
        feed_all(&mut ed, b"version\n\n");
        // Second LF is an empty line of its own
        assert_eq!(ed.take_line().unwrap(), "");
    }

    #[test]
    fn test_backspace() {
        let mut ed = LineEditor::new();
        let echo = feed_all(&mut ed, b"gex\x7ft a\r");
        assert!(echo.windows(3).any(|w| w == b"\x08 \x08"));
        assert_eq!(ed.take_line().unwrap(), "get a");

        // Backspace on an empty line echoes nothing
        let echo = feed_all(&mut ed, b"\x08");
        assert!(echo.is_empty());
    }

    #[test]
    fn test_control_bytes_dropped() {
        let mut ed = LineEditor::new();
        feed_all(&mut ed, b"\x1bst\x00atus\r");
        assert_eq!(ed.take_line().unwrap(), "status");
    }

    #[test]
    fn test_overlong_line_truncated() {
        let mut ed = LineEditor::new();
        let long = [b'x'; MAX_COMMAND_LEN + 20];
        feed_all(&mut ed, &long);
        assert_eq!(ed.partial().len(), MAX_COMMAND_LEN);
    }

    #[test]
    fn test_output_redraws_partial_line() {
        let mut ed = LineEditor::new();
        feed_all(&mut ed, b"get");
        let mut out = Echo::new();
        assert!(ed.frame_output("OK", &mut out));
        assert_eq!(out.as_slice(), b"\r\x1b[2KOK\r\n> get");
    }

    #[test]
    fn test_output_overflow_reported() {
        let ed = LineEditor::new();
        let mut out: Vec<u8, 8> = Vec::new();
        assert!(!ed.frame_output("far too long for this", &mut out));
    }
}
