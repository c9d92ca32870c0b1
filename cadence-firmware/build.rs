//! Build script for cadence-firmware
//!
//! - Validates board.toml at compile time
//! - Generates `board_config.rs` so the firmware never parses TOML

use std::env;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use cadence_core::config::Config;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    let config = load_config();
    generate_config(&config);
}

/// Read, parse and validate board.toml
fn load_config() -> Config {
    println!("cargo:rerun-if-changed=board.toml");

    let config_path = Path::new("board.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: board.toml not found!                                    ║\n\
            ║                                                                  ║\n\
            ║  The firmware requires a board.toml configuration file.          ║\n\
            ║  Please create one in the cadence-firmware directory.            ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read board.toml                                ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    let config: Config = match toml::from_str(&content) {
        Ok(config) => config,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid board.toml                                       ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&e.to_string())
            );
        }
    };

    if let Err(e) = config.validate() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid board configuration                              ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            format_error_lines(&format!("• {}", e))
        );
    }

    println!("cargo:warning=board.toml validated successfully");
    config
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.chars().count() > 64 {
                format!("{}...", line.chars().take(61).collect::<String>())
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Write `board_config()` into OUT_DIR
fn generate_config(config: &Config) {
    let s = &config.sensor;
    let d = &config.display;
    let t = &config.telemetry;
    let l = &config.layout;

    let retries = match d.max_write_retries {
        Some(n) => format!("Some({})", n),
        None => "None".to_string(),
    };

    let mut code = String::new();
    code.push_str("// Generated by build.rs from board.toml. Do not edit.\n\n");
    code.push_str("/// Board configuration, validated at build time\n");
    code.push_str("pub fn board_config() -> cadence_core::config::Config {\n");
    code.push_str("    use cadence_core::config::*;\n");
    code.push_str("    let mut remote = heapless::String::new();\n");
    let _ = writeln!(code, "    let _ = remote.push_str({:?});", t.remote.as_str());
    code.push_str("    Config {\n");
    let _ = writeln!(
        code,
        "        sensor: SensorConfig {{ address: {}, poll_interval_ms: {}, recovery_pulses: {} }},",
        s.address, s.poll_interval_ms, s.recovery_pulses
    );
    let _ = writeln!(
        code,
        "        display: DisplayConfig {{ chunk_bytes: {}, ui_interval_ms: {}, max_write_retries: {} }},",
        d.chunk_bytes, d.ui_interval_ms, retries
    );
    let _ = writeln!(
        code,
        "        telemetry: TelemetryConfig {{ remote, udp_port: {}, tcp_port: {}, \
         poll_interval_ms: {}, send_interval_ms: {}, reconnect_delay_ms: {}, connect_timeout_ms: {} }},",
        t.udp_port,
        t.tcp_port,
        t.poll_interval_ms,
        t.send_interval_ms,
        t.reconnect_delay_ms,
        t.connect_timeout_ms
    );
    let _ = writeln!(
        code,
        "        snapshot: SnapshotConfig {{ freshness_ms: {} }},",
        config.snapshot.freshness_ms
    );
    let _ = writeln!(
        code,
        "        console: ConsoleConfig {{ log_enabled: {}, log_period_ms: {} }},",
        config.console.log_enabled, config.console.log_period_ms
    );
    let _ = writeln!(
        code,
        "        layout: StatusLayout {{ sensor_row: {}, snapshot_a_row: {}, snapshot_b_row: {}, \
         stream_link_row: {}, stream_payload_row: {}, datagram_link_row: {}, datagram_payload_row: {} }},",
        l.sensor_row,
        l.snapshot_a_row,
        l.snapshot_b_row,
        l.stream_link_row,
        l.stream_payload_row,
        l.datagram_link_row,
        l.datagram_payload_row
    );
    code.push_str("    }\n}\n");

    let out_dir = PathBuf::from(env::var("OUT_DIR").expect("OUT_DIR is set by cargo"));
    fs::write(out_dir.join("board_config.rs"), code).expect("write board_config.rs");
}
