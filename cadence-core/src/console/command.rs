use core::fmt;
use core::net::Ipv4Addr;

use crate::config::{MAX_LOG_PERIOD_MS, MIN_LOG_PERIOD_MS};

/// Longest input line considered
pub const MAX_COMMAND_LEN: usize = 128;

/// Printed by `help`
pub const HELP_TEXT: &str = concat!(
    "Commands:\r\n",
    "  help\r\n",
    "  status\r\n",
    "  status json\r\n",
    "  get sensor\r\n",
    "  get a\r\n",
    "  get b\r\n",
    "  get net\r\n",
    "  uptime\r\n",
    "  log on|off\r\n",
    "  rate <ms>\r\n",
    "  remote <ip> [udp] [tcp]\r\n",
    "  version",
);

/// Parsed console command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    Help,
    /// One-line status
    Status,
    /// Status as a JSON object
    StatusJson,
    GetSensor,
    GetSnapshotA,
    GetSnapshotB,
    GetNet,
    Uptime,
    /// Turn the periodic status log on or off
    Log(bool),
    /// Periodic log period, already clamped
    Rate(u32),
    /// New telemetry remote; missing ports keep their current value
    Remote {
        ip: [u8; 4],
        udp_port: Option<u16>,
        tcp_port: Option<u16>,
    },
    Version,
}

/// Why a line was not understood
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandError {
    /// Blank line; ignored silently
    Empty,
    /// Not a known command
    Unknown,
    /// Known command with a bad argument
    BadArgument(&'static str),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::Empty => Ok(()),
            CommandError::Unknown => write!(f, "ERR: unknown cmd. Type 'help'"),
            CommandError::BadArgument(what) => write!(f, "ERR: bad {}", what),
        }
    }
}

impl core::error::Error for CommandError {}

impl Command {
    /// Parse one input line
    ///
    /// Leading and trailing whitespace is ignored; words are separated by
    /// any run of spaces or tabs.
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let mut words = line.split_ascii_whitespace();
        let Some(first) = words.next() else {
            return Err(CommandError::Empty);
        };
        let second = words.next();

        let command = match (first, second) {
            ("help", None) => Command::Help,
            ("status", None) => Command::Status,
            ("status", Some("json")) => Command::StatusJson,
            ("get", Some("sensor")) => Command::GetSensor,
            ("get", Some("a")) => Command::GetSnapshotA,
            ("get", Some("b")) => Command::GetSnapshotB,
            ("get", Some("net")) => Command::GetNet,
            ("uptime", None) => Command::Uptime,
            ("log", Some("on")) => Command::Log(true),
            ("log", Some("off")) => Command::Log(false),
            ("version", None) => Command::Version,
            ("rate", Some(ms)) => {
                let ms: u32 = ms.parse().map_err(|_| CommandError::BadArgument("rate"))?;
                Command::Rate(ms.clamp(MIN_LOG_PERIOD_MS, MAX_LOG_PERIOD_MS))
            }
            ("remote", Some(ip)) => {
                let ip: Ipv4Addr = ip
                    .parse()
                    .map_err(|_| CommandError::BadArgument("address"))?;
                let udp_port = words.next().map(parse_port).transpose()?;
                let tcp_port = words.next().map(parse_port).transpose()?;
                Command::Remote {
                    ip: ip.octets(),
                    udp_port,
                    tcp_port,
                }
            }
            _ => return Err(CommandError::Unknown),
        };

        if words.next().is_some() {
            return Err(CommandError::Unknown);
        }
        Ok(command)
    }
}

fn parse_port(word: &str) -> Result<u16, CommandError> {
    match word.parse::<u16>() {
        Ok(0) | Err(_) => Err(CommandError::BadArgument("port")),
        Ok(port) => Ok(port),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_commands() {
        assert_eq!(Command::parse("help"), Ok(Command::Help));
        assert_eq!(Command::parse("  status  "), Ok(Command::Status));
        assert_eq!(Command::parse("status json"), Ok(Command::StatusJson));
        assert_eq!(Command::parse("get\tsensor"), Ok(Command::GetSensor));
        assert_eq!(Command::parse("get a"), Ok(Command::GetSnapshotA));
        assert_eq!(Command::parse("get b"), Ok(Command::GetSnapshotB));
        assert_eq!(Command::parse("get net"), Ok(Command::GetNet));
        assert_eq!(Command::parse("uptime"), Ok(Command::Uptime));
        assert_eq!(Command::parse("log on"), Ok(Command::Log(true)));
        assert_eq!(Command::parse("log off"), Ok(Command::Log(false)));
        assert_eq!(Command::parse("version"), Ok(Command::Version));
    }

    #[test]
    fn test_rate_clamped() {
        assert_eq!(Command::parse("rate 1000"), Ok(Command::Rate(1000)));
        assert_eq!(Command::parse("rate 5"), Ok(Command::Rate(200)));
        assert_eq!(Command::parse("rate 999999"), Ok(Command::Rate(60_000)));
        assert_eq!(
            Command::parse("rate fast"),
            Err(CommandError::BadArgument("rate"))
        );
    }

    #[test]
    fn test_remote() {
        assert_eq!(
            Command::parse("remote 10.0.0.2"),
            Ok(Command::Remote {
                ip: [10, 0, 0, 2],
                udp_port: None,
                tcp_port: None,
            })
        );
        assert_eq!(
            Command::parse("remote 10.0.0.2 7000 7001"),
            Ok(Command::Remote {
                ip: [10, 0, 0, 2],
                udp_port: Some(7000),
                tcp_port: Some(7001),
            })
        );
        assert_eq!(
            Command::parse("remote 10.0.0"),
            Err(CommandError::BadArgument("address"))
        );
        assert_eq!(
            Command::parse("remote 10.0.0.2 0"),
            Err(CommandError::BadArgument("port"))
        );
    }

    #[test]
    fn test_unknown_and_empty() {
        assert_eq!(Command::parse(""), Err(CommandError::Empty));
        assert_eq!(Command::parse("   "), Err(CommandError::Empty));
        assert_eq!(Command::parse("reboot"), Err(CommandError::Unknown));
        assert_eq!(Command::parse("get c"), Err(CommandError::Unknown));
        assert_eq!(Command::parse("help me"), Err(CommandError::Unknown));
        assert_eq!(Command::parse("log on now"), Err(CommandError::Unknown));
    }

    #[test]
    fn test_error_text() {
        assert_eq!(
            format!("{}", CommandError::Unknown),
            "ERR: unknown cmd. Type 'help'"
        );
        assert_eq!(format!("{}", CommandError::BadArgument("port")), "ERR: bad port");
    }
}
