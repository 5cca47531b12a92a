//! Execution parameters: use case loop control.
//!
//! [`ExecutionParams`] groups the static parameters that control the
//! exploration loop in [`ExplorationEngine`](crate::use_cases::explore::ExplorationEngine).
//! These are application-layer concerns, not domain policy.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Exploration loop control parameters.
///
/// | Priority | Used for                                   |
/// |----------|--------------------------------------------|
/// | 0        | post-flow re-entry, chat exploration target |
/// | 1        | start URL                                  |
/// | 2        | URLs discovered by `act` navigation        |
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionParams {
    /// Safety cap on recorded steps per page; reaching it ends the page normally.
    pub max_steps_per_page: usize,
    /// How long `request_input` waits for the operator.
    pub input_timeout: Duration,
    /// Upper bound for a `standby` wait.
    pub max_standby_seconds: u32,
    /// `standby` wait when the decision gives none.
    pub default_standby_seconds: u32,
    pub start_priority: u8,
    pub discovery_priority: u8,
    pub flow_reentry_priority: u8,
}

impl Default for ExecutionParams {
    fn default() -> Self {
        Self {
            max_steps_per_page: 25,
            input_timeout: Duration::from_secs(300),
            max_standby_seconds: 30,
            default_standby_seconds: 3,
            start_priority: 1,
            discovery_priority: 2,
            flow_reentry_priority: 0,
        }
    }
}

impl ExecutionParams {
    // ==================== Builder Methods ====================

    pub fn with_max_steps_per_page(mut self, max: usize) -> Self {
        self.max_steps_per_page = max;
        self
    }

    pub fn with_input_timeout(mut self, timeout: Duration) -> Self {
        self.input_timeout = timeout;
        self
    }

    pub fn with_max_standby_seconds(mut self, max: u32) -> Self {
        self.max_standby_seconds = max;
        self
    }

    /// Clamp a requested standby to `[1, max_standby_seconds]`.
    pub fn standby_duration(&self, requested: Option<u32>) -> Duration {
        let secs = requested
            .unwrap_or(self.default_standby_seconds)
            .clamp(1, self.max_standby_seconds.max(1));
        Duration::from_secs(u64::from(secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let params = ExecutionParams::default();
        assert_eq!(params.max_steps_per_page, 25);
        assert_eq!(params.input_timeout, Duration::from_secs(300));
        assert_eq!(params.discovery_priority, 2);
        assert_eq!(params.start_priority, 1);
        assert_eq!(params.flow_reentry_priority, 0);
    }

    #[test]
    fn test_builder() {
        let params = ExecutionParams::default()
            .with_max_steps_per_page(5)
            .with_input_timeout(Duration::from_millis(50));

        assert_eq!(params.max_steps_per_page, 5);
        assert_eq!(params.input_timeout, Duration::from_millis(50));
    }

    #[test]
    fn test_standby_duration_is_clamped() {
        let params = ExecutionParams::default();
        assert_eq!(params.standby_duration(None), Duration::from_secs(3));
        assert_eq!(params.standby_duration(Some(0)), Duration::from_secs(1));
        assert_eq!(params.standby_duration(Some(600)), Duration::from_secs(30));
    }
}
