//! Cooperative main loop
//!
//! Every service gets one bounded turn per tick, always in the same order:
//!
//! ```text
//! tick(now)
//!   ├─ telemetry: adapter poll, then publish when due
//!   ├─ console:   one command line, then the periodic status line
//!   ├─ sensor:    read when due (recovery blocks a few ms)
//!   ├─ UI:        status rows, then at most one changed row (throttled)
//!   └─ render:    one chunk of the active operation
//! ```
//!
//! Nothing here waits on hardware except the sensor's bus recovery. When
//! the render engine has nothing to stream and the console has drained,
//! the loop halts until the next interrupt.

use core::fmt::Write;
use core::net::Ipv4Addr;

use cadence_hal::{BusLines, Console, DisplayBus, I2cBus, Idle, Monotonic, NetStack};
use embedded_hal::delay::DelayNs;
use heapless::String;

use crate::config::{Config, ConfigError};
use crate::console::{Command, CommandError, StatusLog, HELP_TEXT, MAX_COMMAND_LEN, VERSION_TEXT};
use crate::display::{RenderConfig, RenderEngine, Rgb565};
use crate::net::{Remote, TelemetryClient};
use crate::sensor::{SensorPoller, SensorStatus};
use crate::snapshot::SnapshotSource;
use crate::telemetry::codec::push_escaped;
use crate::telemetry::Sample;
use crate::time::Interval;
use crate::ui::{LinkSummary, Lines, StatusColors, StatusView};

/// Longest console response line
const RESPONSE_CAPACITY: usize = 256;

type Response = String<RESPONSE_CAPACITY>;

/// The hardware a main loop runs on
pub trait Board {
    /// Panel command/pixel bus
    type Display: DisplayBus;
    /// Sensor bus, with manual line control for recovery
    type Sensor: I2cBus + BusLines;
    /// Blocking delay used during bus recovery
    type Delay: DelayNs;
    /// Network adapter
    type Net: NetStack;
    /// Operator console transport
    type Console: Console;
    /// Broadcast-bus decoder output
    type Snapshots: SnapshotSource;
}

/// Peripherals handed to [`MainLoop::new`]
pub struct Parts<B: Board> {
    pub display: B::Display,
    pub sensor: B::Sensor,
    pub delay: B::Delay,
    pub net: B::Net,
    pub console: B::Console,
    pub snapshots: B::Snapshots,
}

/// Superloop state
pub struct MainLoop<B: Board> {
    render: RenderEngine<B::Display>,
    lines: Lines,
    status_view: StatusView,
    ui_interval: Interval,
    sensor: SensorPoller<B::Sensor, B::Delay>,
    client: TelemetryClient<B::Net>,
    console: B::Console,
    log: StatusLog,
    snapshots: B::Snapshots,
    line_buf: [u8; MAX_COMMAND_LEN],
}

impl<B: Board> MainLoop<B> {
    /// Wire the services together and queue the initial screen clear
    ///
    /// `config` is expected to have passed [`Config::validate`]; the only
    /// thing checked again here is the collector address.
    pub fn new(parts: Parts<B>, config: &Config) -> Result<Self, ConfigError> {
        let remote = Remote::from_config(&config.telemetry)?;
        let mut this = Self {
            render: RenderEngine::new(parts.display, RenderConfig::from(&config.display)),
            lines: Lines::new(),
            status_view: StatusView::new(config.layout, StatusColors::default()),
            ui_interval: Interval::new(config.display.ui_interval_ms),
            sensor: SensorPoller::new(parts.sensor, parts.delay, &config.sensor),
            client: TelemetryClient::new(parts.net, remote, &config.telemetry),
            console: parts.console,
            log: StatusLog::new(&config.console),
            snapshots: parts.snapshots,
            line_buf: [0; MAX_COMMAND_LEN],
        };

        this.lines.clear_all();
        this.render.start_fill(Rgb565::BLACK);
        this.console.print_safe("Cadence ready. Type 'help'");
        info!(
            "main loop ready: sensor {:#x} every {} ms, publish every {} ms",
            config.sensor.address,
            config.sensor.poll_interval_ms,
            config.telemetry.send_interval_ms
        );
        Ok(this)
    }

    /// Run every service once
    ///
    /// Returns `true` when the core may sleep until the next interrupt.
    pub fn tick(&mut self, now_ms: u32) -> bool {
        self.client.poll(now_ms);
        if self.client.publish_due(now_ms) {
            let sample = self.sample(now_ms);
            self.client.publish(&sample);
        }

        self.service_console(now_ms);
        if self.log.due(now_ms) {
            let line = self.status_line(now_ms);
            self.console.print_safe(&line);
        }

        self.sensor.service(now_ms);

        if self.ui_interval.poll(now_ms) {
            self.feed_status(now_ms);
            self.lines.pump_once(&mut self.render);
        }

        self.render.pump();

        !self.render.is_busy() && self.console.tx_idle()
    }

    /// Loop forever on `clock`, sleeping on `idle` between busy periods
    pub fn run<C: Monotonic, I: Idle>(&mut self, clock: &C, idle: &mut I) -> ! {
        loop {
            let now_ms = clock.now_ms();
            if self.tick(now_ms) {
                idle.wait_for_interrupt();
            }
        }
    }

    fn sample(&self, now_ms: u32) -> Sample {
        Sample::new(
            now_ms,
            self.sensor.status().value,
            &self.snapshots.snapshot_a(now_ms),
            &self.snapshots.snapshot_b(now_ms),
        )
    }

    fn feed_status(&mut self, now_ms: u32) {
        let link = LinkSummary {
            state: self.client.state(),
            send_interval_ms: self.client.send_interval_ms(),
            last_stream: self.client.last_stream(),
            last_datagram: self.client.last_datagram(),
        };
        self.status_view.feed(
            &mut self.lines,
            &self.sensor.status(),
            &self.snapshots.snapshot_a(now_ms),
            &self.snapshots.snapshot_b(now_ms),
            &link,
        );
    }

    /// Handle at most one pending command line
    fn service_console(&mut self, now_ms: u32) {
        let Some(len) = self.console.read_line(&mut self.line_buf) else {
            return;
        };
        let len = len.min(MAX_COMMAND_LEN);
        let parsed = core::str::from_utf8(&self.line_buf[..len])
            .map_err(|_| CommandError::Unknown)
            .and_then(Command::parse);

        match parsed {
            Ok(command) => {
                debug!("console: {}", command);
                self.execute(command, now_ms);
            }
            Err(CommandError::Empty) => {}
            Err(e) => {
                warn!("console: rejected command: {}", e);
                let mut text = Response::new();
                let _ = write!(text, "{}", e);
                self.console.print_safe(&text);
            }
        }
    }

    fn execute(&mut self, command: Command, now_ms: u32) {
        let mut out = Response::new();
        match command {
            Command::Help => {
                self.console.print_safe(HELP_TEXT);
                return;
            }
            Command::Version => {
                self.console.print_safe(VERSION_TEXT);
                return;
            }
            Command::Status => out = self.status_line(now_ms),
            Command::StatusJson => out = self.status_json(now_ms),
            Command::GetSensor => {
                let _ = out.push_str("[SENSOR]: ");
                push_sensor(&mut out, &self.sensor.status());
            }
            Command::GetSnapshotA => {
                let _ = write!(out, "[A]: {}", self.snapshots.snapshot_a(now_ms));
            }
            Command::GetSnapshotB => {
                let _ = write!(out, "[B]: {}", self.snapshots.snapshot_b(now_ms));
            }
            Command::GetNet => {
                let remote = self.client.remote();
                let stats = self.client.stats();
                let _ = write!(
                    out,
                    "[NET]: tcp {} {}:{} | udp {}:{} every {} ms | sent {} dropped {} | stream {} rejected {}",
                    self.client.state().as_str(),
                    remote.ip,
                    remote.tcp_port,
                    remote.ip,
                    remote.udp_port,
                    self.client.send_interval_ms(),
                    stats.datagrams_sent,
                    stats.datagrams_dropped,
                    stats.stream_sent,
                    stats.stream_rejected
                );
            }
            Command::Uptime => {
                let _ = write!(out, "Uptime: {} ms", now_ms);
            }
            Command::Log(enabled) => {
                self.log.set_enabled(enabled, now_ms);
                let _ = out.push_str(if enabled {
                    "OK: log enabled"
                } else {
                    "OK: log disabled"
                });
            }
            Command::Rate(ms) => {
                self.log.set_period(ms);
                let _ = write!(out, "OK: rate={} ms", ms);
            }
            Command::Remote {
                ip,
                udp_port,
                tcp_port,
            } => {
                let current = self.client.remote();
                let remote = Remote::new(
                    Ipv4Addr::from(ip),
                    udp_port.unwrap_or(current.udp_port),
                    tcp_port.unwrap_or(current.tcp_port),
                );
                self.client.set_remote(remote);
                let _ = write!(
                    out,
                    "OK: remote {} udp {} tcp {}",
                    remote.ip,
                    remote.udp_port,
                    remote.tcp_port
                );
            }
        }
        self.console.print_safe(&out);
    }

    fn status_line(&self, now_ms: u32) -> Response {
        let mut out = Response::new();
        let _ = out.push_str("[SENSOR]: ");
        push_sensor(&mut out, &self.sensor.status());
        let _ = write!(
            out,
            " | [A]: {} | [B]: {} | [NET]: {}",
            self.snapshots.snapshot_a(now_ms),
            self.snapshots.snapshot_b(now_ms),
            self.client.state().as_str()
        );
        out
    }

    fn status_json(&self, now_ms: u32) -> Response {
        let mut out = Response::new();
        let status = self.sensor.status();
        if status.ok {
            let _ = write!(out, "{{\"sensor\":{{\"ok\":true,\"value\":{}}}", status.value);
        } else {
            let _ = write!(
                out,
                "{{\"sensor\":{{\"ok\":false,\"err\":\"{}\"}}",
                status.error_tag()
            );
        }
        let _ = out.push_str(",\"a\":\"");
        push_escaped(&mut out, &self.snapshots.snapshot_a(now_ms), RESPONSE_CAPACITY - 64);
        let _ = out.push_str("\",\"b\":\"");
        push_escaped(&mut out, &self.snapshots.snapshot_b(now_ms), RESPONSE_CAPACITY - 32);
        let _ = write!(out, "\",\"net\":\"{}\"}}", self.client.state().as_str());
        out
    }

    /// Render engine, for inspection
    pub fn render(&self) -> &RenderEngine<B::Display> {
        &self.render
    }

    /// Line cache, for inspection
    pub fn lines(&self) -> &Lines {
        &self.lines
    }

    pub fn client(&self) -> &TelemetryClient<B::Net> {
        &self.client
    }

    pub fn sensor_status(&self) -> SensorStatus {
        self.sensor.status()
    }

    pub fn console_mut(&mut self) -> &mut B::Console {
        &mut self.console
    }
}

fn push_sensor(out: &mut Response, status: &SensorStatus) {
    if status.ok {
        let _ = write!(out, "{}", status.value);
    } else {
        let _ = write!(out, "ERR {}", status.error_tag());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::LinkState;
    use crate::snapshot::{BusSnapshots, SnapshotView};
    use crate::testing::{MockConsole, MockDelay, MockDisplay, MockI2c, MockNet};
    use cadence_hal::{I2cErrorKind, LinkEvent};

    struct TestBoard;

    impl Board for TestBoard {
        type Display = MockDisplay;
        type Sensor = MockI2c;
        type Delay = MockDelay;
        type Net = MockNet;
        type Console = MockConsole;
        type Snapshots = SnapshotView<'static>;
    }

    fn boot(sensor: MockI2c) -> (MainLoop<TestBoard>, &'static BusSnapshots) {
        let snapshots: &'static BusSnapshots = Box::leak(Box::new(BusSnapshots::new()));
        let config = Config::default();
        let parts = Parts {
            display: MockDisplay::new(),
            sensor,
            delay: MockDelay::default(),
            net: MockNet::new(),
            console: MockConsole::default(),
            snapshots: snapshots.view(config.snapshot.freshness_ms),
        };
        (MainLoop::new(parts, &config).unwrap(), snapshots)
    }

    /// Tick once per millisecond over `[from, to)`
    fn run(main: &mut MainLoop<TestBoard>, from: u32, to: u32) {
        for now in from..to {
            main.tick(now);
        }
    }

    fn command(main: &mut MainLoop<TestBoard>, now: u32, line: &str) -> String<RESPONSE_CAPACITY> {
        main.console_mut().input.push_back(line.into());
        main.tick(now);
        let out = main.console_mut().output.pop().unwrap();
        let mut text = String::new();
        let _ = text.push_str(&out);
        text
    }

    #[test]
    fn test_boot_clears_screen_then_idles() {
        let (mut main, _) = boot(MockI2c::new());
        assert!(main.render().is_busy());
        assert_eq!(main.console_mut().output[0], "Cadence ready. Type 'help'");

        // 40 KB in 512 byte chunks
        let mut idle_at = None;
        for now in 0..200 {
            if main.tick(now) && idle_at.is_none() {
                idle_at = Some(now);
            }
        }
        assert!(idle_at.is_some());
        assert!(main.render().stats().chunks >= 80);
    }

    #[test]
    fn test_status_rows_reach_panel() {
        let (mut main, snaps) = boot(MockI2c::new());
        snaps.publish_a("rpm=900", 0);
        run(&mut main, 0, 500);
        assert_eq!(main.lines().text(0), Some("SENSOR: 0"));
        assert_eq!(main.lines().text(1), Some("BUS A: rpm=900"));
        assert_eq!(main.lines().text(2), Some("BUS B: (no data)"));
        assert_eq!(main.lines().text(6), Some("NET TCP: CONNECTING"));
        for row in 0..16 {
            assert!(!main.lines().is_dirty(row), "row {} never rendered", row);
        }
    }

    #[test]
    fn test_sensor_failures_shown() {
        let mut bus = MockI2c::new();
        bus.push_read(Err(I2cErrorKind::Nack));
        bus.push_read(Err(I2cErrorKind::Timeout));
        let (mut main, _) = boot(bus);
        run(&mut main, 0, 100);
        let status = main.sensor_status();
        assert!(!status.ok);
        assert_eq!(status.error, Some(I2cErrorKind::Timeout));
        assert_eq!(main.lines().text(0), Some("SENSOR: ERR TIMEOUT"));
    }

    #[test]
    fn test_publishes_every_second() {
        let (mut main, _) = boot(MockI2c::new());
        run(&mut main, 0, 3000);
        assert_eq!(main.client().stats().datagrams_sent, 3);
        assert!(main.client().last_datagram().starts_with("ts=2000 "));
    }

    #[test]
    fn test_stream_used_once_up() {
        let (mut main, _) = boot(MockI2c::new());
        main.tick(0);
        main.client_stack().events.push_back(LinkEvent::Connected);
        run(&mut main, 1, 1001);
        assert_eq!(main.client().state(), LinkState::Up);
        assert_eq!(main.client().stats().stream_sent, 1);

        // No ack yet: the next publish is refused on the stream
        run(&mut main, 1001, 2001);
        assert_eq!(main.client().stats().stream_sent, 1);
        assert_eq!(main.client().stats().stream_rejected, 2);
    }

    #[test]
    fn test_console_commands() {
        let (mut main, snaps) = boot(MockI2c::new());
        main.tick(0);
        snaps.publish_b("lux=12", 0);

        assert_eq!(command(&mut main, 1, "get sensor"), "[SENSOR]: 0");
        assert_eq!(command(&mut main, 2, "get b"), "[B]: lux=12");
        assert_eq!(command(&mut main, 3, "get a"), "[A]: none");
        assert_eq!(command(&mut main, 4, "uptime"), "Uptime: 4 ms");
        assert_eq!(command(&mut main, 5, "rate 5"), "OK: rate=200 ms");
        assert_eq!(command(&mut main, 6, "frobnicate"), "ERR: unknown cmd. Type 'help'");
        assert_eq!(command(&mut main, 7, "help").as_str(), HELP_TEXT);
        assert!(command(&mut main, 8, "version").starts_with("FW: "));
        assert_eq!(
            command(&mut main, 9, "status"),
            "[SENSOR]: 0 | [A]: none | [B]: lux=12 | [NET]: CONNECTING"
        );
        assert_eq!(
            command(&mut main, 10, "status json"),
            "{\"sensor\":{\"ok\":true,\"value\":0},\"a\":\"none\",\"b\":\"lux=12\",\"net\":\"CONNECTING\"}"
        );
        assert!(command(&mut main, 11, "get net").starts_with("[NET]: tcp CONNECTING 192.168.1.50:6006"));
    }

    #[test]
    fn test_empty_line_ignored() {
        let (mut main, _) = boot(MockI2c::new());
        let before = main.console_mut().output.len();
        main.console_mut().input.push_back("   ".into());
        main.tick(0);
        assert_eq!(main.console_mut().output.len(), before);
    }

    #[test]
    fn test_remote_command_keeps_unset_ports() {
        let (mut main, _) = boot(MockI2c::new());
        main.tick(0);
        assert_eq!(
            command(&mut main, 1, "remote 10.0.0.9 7000"),
            "OK: remote 10.0.0.9 udp 7000 tcp 6006"
        );
        assert_eq!(main.client().state(), LinkState::Down);
        assert_eq!(main.client().remote().ip, Ipv4Addr::new(10, 0, 0, 9));
    }

    #[test]
    fn test_periodic_log() {
        let (mut main, _) = boot(MockI2c::new());
        assert_eq!(command(&mut main, 0, "log on"), "OK: log enabled");
        run(&mut main, 1, 5000);
        let before = main.console_mut().output.len();
        main.tick(5000);
        assert_eq!(main.console_mut().output.len(), before + 1);
        assert!(main.console_mut().output.last().unwrap().starts_with("[SENSOR]: "));

        assert_eq!(command(&mut main, 5001, "log off"), "OK: log disabled");
        let before = main.console_mut().output.len();
        run(&mut main, 5002, 20_000);
        assert_eq!(main.console_mut().output.len(), before);
    }

    #[test]
    fn test_busy_console_blocks_idle() {
        let (mut main, _) = boot(MockI2c::new());
        run(&mut main, 0, 900);
        assert!(main.tick(925));
        main.console_mut().tx_busy = true;
        assert!(!main.tick(926));
    }

    impl MainLoop<TestBoard> {
        fn client_stack(&mut self) -> &mut MockNet {
            self.client.stack_mut()
        }
    }
}
