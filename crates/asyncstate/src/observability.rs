//! Centralized structured logging for controller activity
//!
//! Every state transition a controller performs is logged through this layer
//! so the field names stay consistent across wrappers.

use crate::state::{CallToken, Settlement};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, trace, warn};
use uuid::Uuid;

/// Identity of a controller instance for structured logging
#[derive(Debug, Clone)]
pub struct ControllerMetadata {
    /// Unique instance id
    pub id: Uuid,
    /// Optional human-readable label
    pub label: Option<String>,
}

impl ControllerMetadata {
    /// Create metadata with a fresh id
    pub fn new(label: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            label,
        }
    }

    /// Label, or `"anonymous"` when none was configured
    pub fn name(&self) -> &str {
        self.label.as_deref().unwrap_or("anonymous")
    }

    /// Log a call being issued
    pub fn log_issued(&self, token: CallToken, mounted: bool) {
        debug!(
            controller = %self.name(),
            controller_id = %self.id,
            token = token.get(),
            mounted,
            "Async call issued"
        );
    }

    /// Log how a call settled
    pub fn log_settled<T>(&self, token: CallToken, settlement: &Settlement<T>, elapsed: Duration) {
        match settlement {
            Settlement::Applied(_) => debug!(
                controller = %self.name(),
                controller_id = %self.id,
                token = token.get(),
                elapsed_ms = elapsed.as_millis(),
                "Async call succeeded"
            ),
            Settlement::Failed(err) => warn!(
                controller = %self.name(),
                controller_id = %self.id,
                token = token.get(),
                elapsed_ms = elapsed.as_millis(),
                kind = %err.kind(),
                code = err.code(),
                error = %err,
                "Async call failed"
            ),
            Settlement::Superseded(_) | Settlement::Detached(_) => trace!(
                controller = %self.name(),
                controller_id = %self.id,
                token = token.get(),
                elapsed_ms = elapsed.as_millis(),
                outcome = settlement.describe(),
                "Dropping stale async result"
            ),
        }
    }

    /// Log a reset
    pub fn log_reset(&self) {
        debug!(controller = %self.name(), controller_id = %self.id, "Controller state reset");
    }

    /// Log the owning scope ending
    pub fn log_teardown(&self, in_flight: bool) {
        debug!(
            controller = %self.name(),
            controller_id = %self.id,
            in_flight,
            "Controller scope ended"
        );
    }
}

/// Timer for measuring call duration
///
/// Uses the tokio clock so paused-time tests report virtual durations.
#[derive(Debug, Clone, Copy)]
pub struct CallTimer {
    start: Instant,
}

impl CallTimer {
    /// Start a new timer
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Get elapsed duration
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}
