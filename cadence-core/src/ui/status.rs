//! Status screen
//!
//! Maps sensor, snapshot and link state onto fixed rows. Rows are rewritten
//! on every feed; the line cache drops the ones whose text did not change.

use core::fmt::Write;

use heapless::String;

use super::lines::{LineAttrs, LineManager, TEXT_CAPACITY};
use crate::config::StatusLayout;
use crate::display::Rgb565;
use crate::net::LinkState;
use crate::sensor::SensorStatus;
use crate::snapshot::NONE_TEXT;

/// Palette for the status rows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StatusColors {
    pub ok: Rgb565,
    pub error: Rgb565,
    pub snapshot_a: Rgb565,
    pub snapshot_b: Rgb565,
    pub link_up: Rgb565,
    pub link_down: Rgb565,
    pub payload: Rgb565,
}

impl Default for StatusColors {
    fn default() -> Self {
        Self {
            ok: Rgb565::GREEN,
            error: Rgb565::RED,
            snapshot_a: Rgb565::CYAN,
            snapshot_b: Rgb565::MAGENTA,
            link_up: Rgb565::YELLOW,
            link_down: Rgb565::GREY,
            payload: Rgb565::from_rgb(0, 100, 100),
        }
    }
}

/// Link facts shown on the status screen
#[derive(Debug, Clone, Copy)]
pub struct LinkSummary<'a> {
    pub state: LinkState,
    pub send_interval_ms: u32,
    pub last_stream: &'a str,
    pub last_datagram: &'a str,
}

/// Writes the status rows into a line cache
#[derive(Debug, Clone, Copy)]
pub struct StatusView {
    layout: StatusLayout,
    colors: StatusColors,
}

type RowText = String<TEXT_CAPACITY>;

impl StatusView {
    pub fn new(layout: StatusLayout, colors: StatusColors) -> Self {
        Self { layout, colors }
    }

    /// Refresh every status row
    pub fn feed<const N: usize>(
        &self,
        lines: &mut LineManager<N>,
        sensor: &SensorStatus,
        snapshot_a: &str,
        snapshot_b: &str,
        link: &LinkSummary<'_>,
    ) {
        let c = &self.colors;
        let mut text = RowText::new();

        if sensor.ok {
            let _ = write!(text, "SENSOR: {}", sensor.value);
            self.set(lines, self.layout.sensor_row, c.ok, &text);
        } else {
            let _ = write!(text, "SENSOR: ERR {}", sensor.error_tag());
            self.set(lines, self.layout.sensor_row, c.error, &text);
        }

        self.snapshot_row(lines, self.layout.snapshot_a_row, "BUS A", snapshot_a, c.snapshot_a);
        self.snapshot_row(lines, self.layout.snapshot_b_row, "BUS B", snapshot_b, c.snapshot_b);

        let link_color = if link.state.is_up() {
            c.link_up
        } else {
            c.link_down
        };
        text.clear();
        let _ = write!(text, "NET TCP: {}", link.state.as_str());
        self.set(lines, self.layout.stream_link_row, link_color, &text);

        text.clear();
        let _ = write!(text, "TCP: {}", link.last_stream);
        self.set(lines, self.layout.stream_payload_row, c.payload, &text);

        text.clear();
        let _ = write!(text, "NET UDP: TX {}ms", link.send_interval_ms);
        self.set(lines, self.layout.datagram_link_row, c.link_up, &text);

        text.clear();
        let _ = write!(text, "UDP: {}", link.last_datagram);
        self.set(lines, self.layout.datagram_payload_row, c.payload, &text);
    }

    fn snapshot_row<const N: usize>(
        &self,
        lines: &mut LineManager<N>,
        row: u8,
        label: &str,
        snapshot: &str,
        color: Rgb565,
    ) {
        let mut text = RowText::new();
        if snapshot == NONE_TEXT {
            let _ = write!(text, "{}: (no data)", label);
            self.set(lines, row, self.colors.error, &text);
        } else {
            let _ = write!(text, "{}: {}", label, snapshot);
            self.set(lines, row, color, &text);
        }
    }

    fn set<const N: usize>(&self, lines: &mut LineManager<N>, row: u8, fg: Rgb565, text: &str) {
        lines.set_line(row as usize, LineAttrs::on_black(fg), text);
    }
}

impl Default for StatusView {
    fn default() -> Self {
        Self::new(StatusLayout::default(), StatusColors::default())
    }
}
