use super::state::PlayerState;
use crate::backoff::Backoff;

use std::time::Duration;

/// Reconnection state machine of a player, free of any I/O.
///
/// ```text
/// connecting -> playing | error
/// playing    -> error
/// error      -> connecting   (backoff elapsed or manual retry)
/// *          -> offline      (dispose)
/// ```
#[derive(Debug, Clone)]
pub struct PlayerMachine {
    state: PlayerState,
    attempt: u32,
    backoff: Backoff,
}

impl PlayerMachine {
    pub fn new(backoff: Backoff) -> Self {
        Self {
            state: PlayerState::Connecting,
            attempt: 0,
            backoff,
        }
    }

    pub fn state(&self) -> PlayerState {
        self.state
    }

    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    pub fn is_disposed(&self) -> bool {
        self.state == PlayerState::Offline
    }

    /// Backoff elapsed: `error -> connecting`.
    pub fn reconnect(&mut self) -> bool {
        self.transition(PlayerState::Error, PlayerState::Connecting)
    }

    /// Decoder produced media: `connecting -> playing`, attempts reset.
    pub fn connected(&mut self) -> bool {
        let moved = self.transition(PlayerState::Connecting, PlayerState::Playing);
        if moved {
            self.attempt = 0;
        }
        moved
    }

    /// Transport or media fault. Returns the delay before the next attempt.
    pub fn fault(&mut self) -> Option<Duration> {
        match self.state {
            PlayerState::Connecting | PlayerState::Playing => {
                let delay = self.backoff.delay(self.attempt);
                self.attempt = self.attempt.saturating_add(1);
                self.state = PlayerState::Error;
                Some(delay)
            }
            PlayerState::Error | PlayerState::Offline => None,
        }
    }

    /// Operator asked for an immediate reconnect.
    pub fn manual_retry(&mut self) -> bool {
        if self.is_disposed() {
            return false;
        }
        self.attempt = 0;
        self.state = PlayerState::Connecting;
        true
    }

    pub fn dispose(&mut self) {
        self.state = PlayerState::Offline;
    }

    fn transition(&mut self, from: PlayerState, to: PlayerState) -> bool {
        if self.state != from {
            tracing::trace!(state = ?self.state, target = ?to, "ignored player transition");
            return false;
        }
        self.state = to;
        true
    }
}
