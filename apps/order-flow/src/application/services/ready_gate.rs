//! One-time readiness gate between logon and the send loop.

use std::time::Duration;

use tokio::sync::watch;

use crate::application::ports::SessionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GateState {
    Pending,
    Ready,
    Closed,
}

/// Blocks the send loop until the session has logged on.
///
/// Opens at most once. Closing before it opens releases waiters with
/// [`SessionError::Closed`] instead of leaving them blocked.
#[derive(Debug, Clone)]
pub struct ReadyGate {
    state: watch::Sender<GateState>,
}

impl Default for ReadyGate {
    fn default() -> Self {
        Self::new()
    }
}

impl ReadyGate {
    /// Create a pending gate.
    #[must_use]
    pub fn new() -> Self {
        let (state, _) = watch::channel(GateState::Pending);
        Self { state }
    }

    /// Signal logon. No effect after the first call or once closed.
    pub fn open(&self) {
        self.state.send_if_modified(|state| {
            if *state == GateState::Pending {
                *state = GateState::Ready;
                true
            } else {
                false
            }
        });
    }

    /// Signal logout.
    pub fn close(&self) {
        self.state.send_if_modified(|state| {
            if *state == GateState::Closed {
                false
            } else {
                *state = GateState::Closed;
                true
            }
        });
    }

    /// True once logon has been signalled.
    #[must_use]
    pub fn is_open(&self) -> bool {
        *self.state.borrow() == GateState::Ready
    }

    /// Wait until the gate opens.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Closed`] if the session closes before logon.
    pub async fn wait_ready(&self) -> Result<(), SessionError> {
        let mut receiver = self.state.subscribe();
        let state = *receiver
            .wait_for(|state| *state != GateState::Pending)
            .await
            .map_err(|_| SessionError::Closed)?;

        match state {
            GateState::Ready => Ok(()),
            GateState::Pending | GateState::Closed => Err(SessionError::Closed),
        }
    }

    /// Wait until the gate opens, giving up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::LogonTimeout`] on timeout, or
    /// [`SessionError::Closed`] if the session closes first.
    pub async fn wait_ready_for(&self, timeout: Duration) -> Result<(), SessionError> {
        tokio::time::timeout(timeout, self.wait_ready())
            .await
            .map_err(|_| SessionError::LogonTimeout {
                seconds: timeout.as_secs(),
            })?
    }
}
