//! Reconnect scheduling for the `/events` stream
//!
//! Linear backoff in whole seconds: the first retry is immediate, each
//! further consecutive failure waits one second longer, up to
//! [`MAX_RECONNECT_DELAY_SECS`]. A successful open resets the delay.
//! Only one retry may be scheduled at a time.

use std::time::Duration;

/// Ceiling for the reconnect delay
pub const MAX_RECONNECT_DELAY_SECS: u32 = 10;

/// Event stream connection state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

#[derive(Debug, Clone, Default)]
pub struct ReconnectBackoff {
    state: ConnectionState,
    delay_secs: u32,
    pending: bool,
}

impl ReconnectBackoff {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn state(&self) -> ConnectionState {
        self.state
    }

    /// Delay the next scheduled retry will use
    pub const fn next_delay(&self) -> Duration {
        Duration::from_secs(self.delay_secs as u64)
    }

    /// Is a retry timer currently scheduled?
    pub const fn is_pending(&self) -> bool {
        self.pending
    }

    /// A connection attempt starts. Clears any pending retry: this is it.
    pub fn begin_connect(&mut self) {
        self.state = ConnectionState::Connecting;
        self.pending = false;
    }

    /// The stream opened
    pub fn on_open(&mut self) {
        self.state = ConnectionState::Connected;
        self.delay_secs = 0;
    }

    /// The stream closed. Returns the delay to schedule a retry with, or
    /// `None` if a retry is already pending.
    pub fn on_closed(&mut self) -> Option<Duration> {
        self.state = ConnectionState::Disconnected;
        if self.pending {
            return None;
        }

        let delay = self.next_delay();
        self.pending = true;
        if self.delay_secs < MAX_RECONNECT_DELAY_SECS {
            self.delay_secs += 1;
        }
        Some(delay)
    }
}
