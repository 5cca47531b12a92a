//! Sensitive-flow guard.
//!
//! Applied to every decision before dispatch. While a flow is active,
//! `act` navigation is not queued (see dispatch). When the flow ends, the
//! page the flow landed on is force-queued at the top and the current page
//! loop ends so that page is processed next.

use super::{ExplorationEngine, ExploreError};
use scout_domain::{FlowTransition, ToolDecision, normalize_url};
use tracing::info;

impl ExplorationEngine {
    /// Returns `true` when the flow just ended and the page loop must stop.
    pub(super) async fn apply_flow_guard(
        &self,
        decision: &ToolDecision,
        current_url: &str,
        step: u32,
    ) -> Result<bool, ExploreError> {
        let transition = self.session.lock().await.flow_context.apply(
            decision.is_in_sensitive_flow,
            current_url,
            step,
        );

        match transition {
            FlowTransition::Unchanged => Ok(false),
            FlowTransition::Entered => {
                info!("Sensitive flow started at {} (step {})", current_url, step);
                Ok(false)
            }
            FlowTransition::Exited => {
                let landed = normalize_url(&self.deps.browser.current_url().await?);
                info!("Sensitive flow ended on {}; queueing it next", landed);
                self.force_enqueue(
                    &landed,
                    self.params.flow_reentry_priority,
                    Some(current_url),
                )
                .await;
                Ok(true)
            }
        }
    }
}
