//! Stream connection state machine

/// Connection states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkState {
    /// No connection; a new attempt waits for the reconnect deadline
    Down,
    /// Handshake in flight
    Connecting,
    /// Connected, writes allowed
    Up,
}

/// Things that move the connection between states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConnEvent {
    /// The adapter accepted a connect request
    ConnectStarted,
    /// Handshake completed
    Connected,
    /// Handshake refused or failed
    ConnectFailed,
    /// Handshake did not complete in time
    TimedOut,
    /// Connection reset or a write failed
    Error,
    /// Peer closed
    Closed,
    /// Local teardown (remote changed)
    Reset,
}

impl LinkState {
    /// Short label for status lines
    pub const fn as_str(&self) -> &'static str {
        match self {
            LinkState::Down => "DOWN",
            LinkState::Connecting => "CONNECTING",
            LinkState::Up => "UP",
        }
    }

    /// True while writes may be issued
    pub fn is_up(&self) -> bool {
        matches!(self, LinkState::Up)
    }

    /// Process an event and return the next state
    pub fn transition(self, event: ConnEvent) -> Self {
        use ConnEvent::*;
        use LinkState::*;

        match (self, event) {
            (Down, ConnectStarted) => Connecting,

            (Connecting, Connected) => Up,
            (Connecting, ConnectFailed) => Down,
            (Connecting, TimedOut) => Down,

            (Connecting | Up, Error) => Down,
            (Connecting | Up, Closed) => Down,

            (_, Reset) => Down,

            // Stale events from an earlier connection are ignored
            _ => self,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path() {
        let state = LinkState::Down
            .transition(ConnEvent::ConnectStarted)
            .transition(ConnEvent::Connected);
        assert_eq!(state, LinkState::Up);
    }

    #[test]
    fn test_failures_go_down() {
        for event in [ConnEvent::ConnectFailed, ConnEvent::TimedOut, ConnEvent::Error, ConnEvent::Closed] {
            assert_eq!(LinkState::Connecting.transition(event), LinkState::Down);
        }
        for event in [ConnEvent::Error, ConnEvent::Closed, ConnEvent::Reset] {
            assert_eq!(LinkState::Up.transition(event), LinkState::Down);
        }
    }

    #[test]
    fn test_connect_only_from_down() {
        assert_eq!(
            LinkState::Up.transition(ConnEvent::ConnectStarted),
            LinkState::Up
        );
        assert_eq!(
            LinkState::Connecting.transition(ConnEvent::ConnectStarted),
            LinkState::Connecting
        );
    }

    #[test]
    fn test_stale_events_ignored() {
        assert_eq!(LinkState::Down.transition(ConnEvent::Connected), LinkState::Down);
        assert_eq!(LinkState::Down.transition(ConnEvent::Error), LinkState::Down);
        assert_eq!(LinkState::Up.transition(ConnEvent::TimedOut), LinkState::Up);
    }

    #[test]
    fn test_labels() {
        assert_eq!(LinkState::Down.as_str(), "DOWN");
        assert_eq!(LinkState::Connecting.as_str(), "CONNECTING");
        assert_eq!(LinkState::Up.as_str(), "UP");
    }
}
