//! Text row rasterizer
//!
//! Draws one row of 5x7 text into an RGB565 buffer already in panel byte
//! order, ready to be streamed as a blit.

use super::color::Rgb565;
use super::font::{glyph, CELL_WIDTH, GLYPH_HEIGHT};
use super::{BYTES_PER_PIXEL, LINE_HEIGHT, WIDTH};

/// Size of one rasterized row
pub const LINE_BYTES: usize = WIDTH * LINE_HEIGHT * BYTES_PER_PIXEL;

/// Characters that fit on one row
pub const MAX_CHARS: usize = WIDTH / CELL_WIDTH;

const ELLIPSIS: &str = "...";

/// Render `text` into `buf`, left aligned, padded with `bg`
///
/// Text that does not fit is cut short and ends in `...`.
pub fn render_line(buf: &mut [u8; LINE_BYTES], text: &str, fg: Rgb565, bg: Rgb565) {
    let bg_bytes = bg.to_be_bytes();
    for px in buf.chunks_exact_mut(BYTES_PER_PIXEL) {
        px.copy_from_slice(&bg_bytes);
    }

    let overflow = text.chars().nth(MAX_CHARS).is_some();
    let (keep, tail) = if overflow {
        (MAX_CHARS - ELLIPSIS.len(), ELLIPSIS)
    } else {
        (MAX_CHARS, "")
    };

    let fg_bytes = fg.to_be_bytes();
    for (cell, c) in text.chars().take(keep).chain(tail.chars()).enumerate() {
        let x0 = cell * CELL_WIDTH;
        for (col, bits) in glyph(c).iter().enumerate() {
            for row in 0..GLYPH_HEIGHT {
                if bits & (1 << row) != 0 {
                    let at = (row * WIDTH + x0 + col) * BYTES_PER_PIXEL;
                    buf[at..at + BYTES_PER_PIXEL].copy_from_slice(&fg_bytes);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::font::GLYPH_WIDTH;

    fn pixel(buf: &[u8; LINE_BYTES], x: usize, y: usize) -> Rgb565 {
        let at = (y * WIDTH + x) * BYTES_PER_PIXEL;
        Rgb565(u16::from_be_bytes([buf[at], buf[at + 1]]))
    }

    fn lit_cells(buf: &[u8; LINE_BYTES], fg: Rgb565) -> usize {
        (0..MAX_CHARS)
            .filter(|cell| {
                (0..GLYPH_WIDTH).any(|col| {
                    (0..LINE_HEIGHT).any(|row| pixel(buf, cell * CELL_WIDTH + col, row) == fg)
                })
            })
            .count()
    }

    #[test]
    fn test_empty_text_is_background() {
        let mut buf = [0u8; LINE_BYTES];
        render_line(&mut buf, "", Rgb565::WHITE, Rgb565::BLUE);
        assert!(buf
            .chunks_exact(2)
            .all(|px| px == Rgb565::BLUE.to_be_bytes()));
    }

    #[test]
    fn test_glyph_pixels() {
        let mut buf = [0u8; LINE_BYTES];
        render_line(&mut buf, "!", Rgb565::WHITE, Rgb565::BLACK);
        // '!' is a single lit column (index 2), rows 0..=4 and 6
        assert_eq!(pixel(&buf, 2, 0), Rgb565::WHITE);
        assert_eq!(pixel(&buf, 2, 4), Rgb565::WHITE);
        assert_eq!(pixel(&buf, 2, 5), Rgb565::BLACK);
        assert_eq!(pixel(&buf, 2, 6), Rgb565::WHITE);
        assert_eq!(pixel(&buf, 1, 0), Rgb565::BLACK);
        assert_eq!(pixel(&buf, 2, 7), Rgb565::BLACK);
    }

    #[test]
    fn test_exact_fit_not_truncated() {
        let text = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
        assert_eq!(text.len(), MAX_CHARS);
        let mut buf = [0u8; LINE_BYTES];
        render_line(&mut buf, text, Rgb565::WHITE, Rgb565::BLACK);
        assert_eq!(lit_cells(&buf, Rgb565::WHITE), MAX_CHARS);
        // Last cell is 'Z', not a dot
        let z = glyph('Z');
        let x0 = (MAX_CHARS - 1) * CELL_WIDTH;
        assert_eq!(pixel(&buf, x0, 0) == Rgb565::WHITE, z[0] & 1 != 0);
    }

    #[test]
    fn test_overflow_gets_ellipsis() {
        let mut long = [0u8; LINE_BYTES];
        render_line(
            &mut long,
            "ABCDEFGHIJKLMNOPQRSTUVWXYZ0123",
            Rgb565::WHITE,
            Rgb565::BLACK,
        );
        let mut expected = [0u8; LINE_BYTES];
        render_line(
            &mut expected,
            "ABCDEFGHIJKLMNOPQRSTUVW...",
            Rgb565::WHITE,
            Rgb565::BLACK,
        );
        assert_eq!(long[..], expected[..]);
    }
}
