//! Wire format
//!
//! ```text
//! {"ts":123456,"i2c":-12,"can101":"rpm=900","can120":"none"}\n
//! ```
//!
//! A record never exceeds [`RECORD_CAPACITY`] bytes. Snapshot text is
//! escaped (`"` and `\` get a backslash, control characters become a space)
//! and cut short if needed so the closing `"}` and newline always fit.

use core::fmt::{self, Write};

use heapless::String;

use super::Sample;
use crate::snapshot::SnapshotText;

/// Largest encoded record, newline included
pub const RECORD_CAPACITY: usize = 256;

/// One encoded record
pub type Record = String<RECORD_CAPACITY>;

const KEY_TS: &str = "{\"ts\":";
const KEY_READING: &str = ",\"i2c\":";
const KEY_A: &str = ",\"can101\":\"";
const KEY_B: &str = "\",\"can120\":\"";
const TAIL: &str = "\"}\n";

/// Decode errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CodecError {
    /// A key or delimiter is missing or out of place
    Malformed,
    /// A number did not parse or overflowed
    BadNumber,
    /// A string was not closed, or ended in a dangling escape
    Unterminated,
    /// A snapshot is longer than a sample can hold
    TooLong,
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecError::Malformed => write!(f, "malformed record"),
            CodecError::BadNumber => write!(f, "invalid number"),
            CodecError::Unterminated => write!(f, "unterminated string"),
            CodecError::TooLong => write!(f, "snapshot too long"),
        }
    }
}

impl core::error::Error for CodecError {}

/// Encode `sample` as one record line
pub fn encode(sample: &Sample) -> Record {
    let mut out = Record::new();
    // Keys and two integers are under 50 bytes, always fits
    let _ = write!(
        out,
        "{}{}{}{}{}",
        KEY_TS, sample.timestamp_ms, KEY_READING, sample.reading, KEY_A
    );
    push_escaped(&mut out, &sample.snapshot_a, RECORD_CAPACITY - KEY_B.len() - TAIL.len());
    let _ = out.push_str(KEY_B);
    push_escaped(&mut out, &sample.snapshot_b, RECORD_CAPACITY - TAIL.len());
    let _ = out.push_str(TAIL);
    out
}

/// Append `text` escaped, stopping before `out` would pass `limit` bytes
///
/// Stops at a whole character or escape sequence, never inside one.
pub(crate) fn push_escaped<const N: usize>(out: &mut String<N>, text: &str, limit: usize) {
    let limit = limit.min(N);
    let mut utf8 = [0u8; 4];
    for c in text.chars() {
        let piece: &str = match c {
            '"' => "\\\"",
            '\\' => "\\\\",
            c if c.is_control() => " ",
            c => c.encode_utf8(&mut utf8),
        };
        if out.len() + piece.len() > limit {
            return;
        }
        let _ = out.push_str(piece);
    }
}

/// Parse one record line back into a sample
///
/// A trailing `\n` (or `\r\n`) is optional.
pub fn decode(line: &str) -> Result<Sample, CodecError> {
    let line = line.trim_end_matches(['\r', '\n']);

    let rest = line.strip_prefix(KEY_TS).ok_or(CodecError::Malformed)?;
    let (ts, rest) = split_number(rest);
    let timestamp_ms = ts.parse().map_err(|_| CodecError::BadNumber)?;

    let rest = rest.strip_prefix(KEY_READING).ok_or(CodecError::Malformed)?;
    let (reading, rest) = split_number(rest);
    let reading = reading.parse().map_err(|_| CodecError::BadNumber)?;

    let rest = rest.strip_prefix(KEY_A).ok_or(CodecError::Malformed)?;
    let (snapshot_a, rest) = read_string(rest)?;

    let rest = rest.strip_prefix(&KEY_B[1..]).ok_or(CodecError::Malformed)?;
    let (snapshot_b, rest) = read_string(rest)?;

    if rest != "}" {
        return Err(CodecError::Malformed);
    }

    Ok(Sample {
        timestamp_ms,
        reading,
        snapshot_a,
        snapshot_b,
    })
}

fn split_number(s: &str) -> (&str, &str) {
    let end = s
        .find(|c: char| !(c.is_ascii_digit() || c == '-'))
        .unwrap_or(s.len());
    s.split_at(end)
}

/// Read an escaped string body up to its closing quote
///
/// Returns the text and whatever follows the quote.
fn read_string(s: &str) -> Result<(SnapshotText, &str), CodecError> {
    let mut text = SnapshotText::new();
    let mut chars = s.char_indices();
    while let Some((i, c)) = chars.next() {
        let c = match c {
            '"' => return Ok((text, &s[i + 1..])),
            '\\' => match chars.next() {
                Some((_, e @ ('"' | '\\'))) => e,
                Some(_) => return Err(CodecError::Malformed),
                None => return Err(CodecError::Unterminated),
            },
            c => c,
        };
        text.push(c).map_err(|_| CodecError::TooLong)?;
    }
    Err(CodecError::Unterminated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::SNAPSHOT_CAPACITY;
    use proptest::prelude::*;

    #[test]
    fn test_encode_layout() {
        let sample = Sample::new(1234, -7, "rpm=900", "none");
        assert_eq!(
            encode(&sample).as_str(),
            "{\"ts\":1234,\"i2c\":-7,\"can101\":\"rpm=900\",\"can120\":\"none\"}\n"
        );
    }

    #[test]
    fn test_escapes_quotes_and_controls() {
        let sample = Sample::new(0, 0, "a\"b\\c", "x\ty");
        let line = encode(&sample);
        assert!(line.contains("\"can101\":\"a\\\"b\\\\c\""));
        assert!(line.contains("\"can120\":\"x y\""));

        let back = decode(&line).unwrap();
        assert_eq!(back.snapshot_a, "a\"b\\c");
        assert_eq!(back.snapshot_b, "x y");
    }

    #[test]
    fn test_extremes_roundtrip() {
        let sample = Sample::new(u32::MAX, i32::MIN, "", "");
        let back = decode(&encode(&sample)).unwrap();
        assert_eq!(back, sample);
    }

    #[test]
    fn test_worst_case_stays_in_capacity() {
        let quotes = "\"".repeat(SNAPSHOT_CAPACITY);
        let sample = Sample::new(u32::MAX, i32::MIN, &quotes, &quotes);
        let line = encode(&sample);
        assert!(line.len() <= RECORD_CAPACITY);
        assert!(line.ends_with("\"}\n"));

        let back = decode(&line).unwrap();
        assert_eq!(back.snapshot_a, sample.snapshot_a);
        assert!(back.snapshot_b.len() < SNAPSHOT_CAPACITY);
        assert!(back.snapshot_b.chars().all(|c| c == '"'));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert_eq!(decode(""), Err(CodecError::Malformed));
        assert_eq!(decode("{\"ts\":x"), Err(CodecError::BadNumber));
        assert_eq!(
            decode("{\"ts\":1,\"i2c\":2,\"can101\":\"open"),
            Err(CodecError::Unterminated)
        );
        assert_eq!(
            decode("{\"ts\":1,\"i2c\":2,\"can101\":\"a\",\"can120\":\"b\"}junk"),
            Err(CodecError::Malformed)
        );
        assert_eq!(
            decode("{\"ts\":99999999999,\"i2c\":2,\"can101\":\"a\",\"can120\":\"b\"}"),
            Err(CodecError::BadNumber)
        );
    }

    #[test]
    fn test_decode_without_newline() {
        let back = decode("{\"ts\":5,\"i2c\":6,\"can101\":\"a\",\"can120\":\"b\"}").unwrap();
        assert_eq!(back, Sample::new(5, 6, "a", "b"));
    }

    proptest! {
        #[test]
        fn prop_timestamp_and_reading_exact(
            ts in any::<u32>(),
            reading in any::<i32>(),
            a in "[ -~]{0,63}",
            b in "[ -~]{0,63}",
        ) {
            let sample = Sample::new(ts, reading, &a, &b);
            let line = encode(&sample);
            prop_assert!(line.len() <= RECORD_CAPACITY);
            prop_assert!(line.ends_with('\n'));

            let back = decode(&line).unwrap();
            prop_assert_eq!(back.timestamp_ms, ts);
            prop_assert_eq!(back.reading, reading);
            prop_assert_eq!(&back.snapshot_a, &sample.snapshot_a);
            prop_assert!(sample.snapshot_b.starts_with(back.snapshot_b.as_str()));
        }
    }
}
