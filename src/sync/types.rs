//! Controller state and configuration types.

use std::time::Duration;

use crate::domain::Cart;

/// Default quiet period before a quantity edit is sent.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Quiet period per (owner, sku) before a quantity edit is sent.
    pub debounce: Duration,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
        }
    }
}

/// Snapshot of what the controller knows about the remote cart.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ControllerState {
    /// `None` until the first successful remote call.
    pub cart: Option<Cart>,
    /// True while at least one remote call is in flight.
    pub is_syncing: bool,
    /// Message of the most recent remote failure.
    pub last_error: Option<String>,
    in_flight: usize,
}

impl ControllerState {
    pub(super) fn begin_sync(&mut self) {
        self.in_flight += 1;
        self.is_syncing = true;
    }

    pub(super) fn end_sync(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
        self.is_syncing = self.in_flight > 0;
    }
}
