//! Bounded string helpers

use heapless::String;

/// Longest prefix of `text` that fits in `max` bytes without splitting a char
pub fn truncate(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text;
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

/// Append as much of `text` as fits, stopping at a char boundary
///
/// Returns `true` if all of it fit.
pub fn push_truncated<const N: usize>(dst: &mut String<N>, text: &str) -> bool {
    let room = N - dst.len();
    let part = truncate(text, room);
    // Cannot fail: `part` is at most `room` bytes
    let _ = dst.push_str(part);
    part.len() == text.len()
}
