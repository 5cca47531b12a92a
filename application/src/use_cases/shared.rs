//! Shared utilities for use cases.
//!
//! Contains the suspension gate consulted at every suspension point of the
//! exploration loop (before popping a page, around decisions, around tool
//! dispatch, after each recorded step).

use crate::ports::session_registry::SessionRegistryPort;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// How often a blocking wait re-checks the registry.
const REGISTRY_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Why the loop must stop at a suspension point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Suspension {
    /// The session is no longer live (operator stopped or disconnected)
    Stopped,
    /// A chat message paused the loop; the session is resumable
    Interrupted,
}

/// Cooperative cancellation for one run of the queue engine.
///
/// Combines the liveness registry, the session-wide stop token and the
/// interrupt token of the current run. A chat interruption cancels only the
/// interrupt token; resuming creates a fresh gate with a new one.
#[derive(Clone)]
pub struct SuspensionGate {
    registry: Arc<dyn SessionRegistryPort>,
    user_name: String,
    stop: CancellationToken,
    interrupt: CancellationToken,
}

impl SuspensionGate {
    pub fn new(
        registry: Arc<dyn SessionRegistryPort>,
        user_name: impl Into<String>,
        stop: CancellationToken,
        interrupt: CancellationToken,
    ) -> Self {
        Self {
            registry,
            user_name: user_name.into(),
            stop,
            interrupt,
        }
    }

    pub fn is_live(&self) -> bool {
        !self.stop.is_cancelled() && self.registry.is_active(&self.user_name)
    }

    /// Check the gate. Liveness loss wins over interruption.
    pub fn check(&self) -> Result<(), Suspension> {
        if !self.is_live() {
            return Err(Suspension::Stopped);
        }
        if self.interrupt.is_cancelled() {
            return Err(Suspension::Interrupted);
        }
        Ok(())
    }

    /// Resolves once the gate trips. Used to abort bounded waits early.
    pub async fn tripped(&self) -> Suspension {
        tokio::select! {
            biased;
            _ = self.stop.cancelled() => Suspension::Stopped,
            _ = self.interrupt.cancelled() => Suspension::Interrupted,
            _ = self.registry_lost() => Suspension::Stopped,
        }
    }

    async fn registry_lost(&self) {
        while self.registry.is_active(&self.user_name) {
            tokio::time::sleep(REGISTRY_POLL_INTERVAL).await;
        }
    }
}
