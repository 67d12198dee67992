//! Publisher state management

/// Publisher lifecycle state machine.
///
/// States advance one way through the run: a publisher that reached
/// `Closed` can never be restarted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublisherState {
    /// No session established
    Disconnected,
    /// Session handshake (with bounded retry) in progress
    Connecting,
    /// Steady state: the capture loop is running
    Connected,
    /// Releasing the device and closing the session
    Draining,
    /// Terminal: no further operations permitted
    Closed,
}

impl PublisherState {
    /// Check if this state transition is valid
    pub fn can_transition_to(&self, target: &PublisherState) -> bool {
        use PublisherState::*;

        match (self, target) {
            (Disconnected, Connecting) => true,

            (Connecting, Connected) => true,
            // Connect failures and stop requests skip the steady state
            (Connecting, Draining) => true,

            (Connected, Draining) => true,

            (Draining, Closed) => true,

            // Closed is terminal
            (Closed, _) => false,

            // Self-transitions
            (a, b) if a == b => true,

            _ => false,
        }
    }

    /// Get a human-readable description of this state
    pub fn description(&self) -> &'static str {
        match self {
            PublisherState::Disconnected => "Disconnected",
            PublisherState::Connecting => "Connecting",
            PublisherState::Connected => "Connected",
            PublisherState::Draining => "Draining",
            PublisherState::Closed => "Closed",
        }
    }

    /// Check if the capture loop may run in this state
    pub fn is_connected(&self) -> bool {
        matches!(self, PublisherState::Connected)
    }

    /// Check if this is the terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, PublisherState::Closed)
    }
}

impl std::fmt::Display for PublisherState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}
