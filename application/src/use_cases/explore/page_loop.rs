//! Page loop: per-page step loop.
//!
//! ```text
//! queued ──> in_progress ──> completed
//!                │
//!                └── suspended (gate tripped): stays in_progress
//! ```

use super::{Dispatch, ExplorationEngine, ExploreError, PageOutcome};
use crate::ports::decision::{ConversationTurn, DecisionContext};
use crate::ports::event_sink::{EventPayload, PageScope};
use crate::use_cases::shared::SuspensionGate;
use scout_domain::{
    ExecutedStep, PageStatus, Screenshot, ScreenshotKind, StepTool, ToolDecision,
    page_repeat_counts,
};
use tracing::{debug, info, warn};

impl ExplorationEngine {
    /// Run the page loop for one page.
    ///
    /// A navigation or runtime failure is isolated here: the page is
    /// force-marked completed and the queue continues.
    pub(crate) async fn process_page(&self, gate: &SuspensionGate, key: &str) -> PageOutcome {
        match self.run_page(gate, key).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("Page {} failed, marking it completed: {}", key, e);
                self.finish_page(key, false).await;
                PageOutcome::Completed
            }
        }
    }

    async fn run_page(&self, gate: &SuspensionGate, key: &str) -> Result<PageOutcome, ExploreError> {
        let (url, priority, entry_step) = {
            let mut session = self.session.lock().await;
            let entry_step = session.global_step_counter;
            let page = session
                .page_mut(key)
                .ok_or_else(|| ExploreError::UnknownPage(key.to_string()))?;
            page.mark_in_progress();
            (page.url.clone(), page.priority, entry_step)
        };
        info!("Exploring {}", url);
        self.emit(EventPayload::PageStarted {
            page: PageScope::new(&url, key, entry_step),
            priority,
        });

        self.deps.browser.navigate(&url).await?;
        let initial = self.deps.browser.screenshot(true).await?;
        self.store_screenshot(key, entry_step, ScreenshotKind::Initial, &initial)
            .await;
        self.conversations
            .lock()
            .await
            .entry(key.to_string())
            .or_default();

        let mut budget_used = 0;
        loop {
            if budget_used >= self.params.max_steps_per_page {
                info!("Step cap reached on {}", url);
                break;
            }

            let step = self.session.lock().await.next_step();
            let screenshot = self.deps.browser.screenshot(false).await?;
            self.store_screenshot(key, step, ScreenshotKind::Step, &screenshot)
                .await;

            if let Err(reason) = gate.check() {
                return Ok(PageOutcome::Suspended(reason));
            }
            let current_url = self
                .deps
                .browser
                .current_url()
                .await
                .unwrap_or_else(|_| url.clone());
            let context = self.decision_context(key, &current_url, step, screenshot).await;
            let decision = match self.deps.decision.decide(&context).await {
                Ok(Some(decision)) => decision,
                Ok(None) => {
                    warn!("No decision for step {} on {}; ending page", step, url);
                    break;
                }
                Err(e) => {
                    warn!("Decision failed for step {} on {}: {}; ending page", step, url, e);
                    break;
                }
            };
            if let Err(reason) = gate.check() {
                return Ok(PageOutcome::Suspended(reason));
            }
            debug!("Step {}: {} {}", step, decision.tool(), decision.instruction());
            self.emit(EventPayload::DecisionMade {
                page: PageScope::new(&url, key, step),
                decision: decision.clone(),
            });

            if self.apply_flow_guard(&decision, &current_url, step).await? {
                break;
            }

            let executed = match self.dispatch(gate, &decision, key, &url, step).await? {
                Dispatch::Step(executed) => executed,
                Dispatch::Suspended(reason) => return Ok(PageOutcome::Suspended(reason)),
            };
            self.record_step(key, &url, &decision, &executed).await;
            if executed.tool == StepTool::Act && executed.success {
                self.enrichment.trigger(key);
            }
            if executed.tool != StepTool::Standby {
                budget_used += 1;
            }

            if executed.objective_achieved && !self.config.is_exploration {
                self.session.lock().await.metadata.objective_achieved = true;
                info!("Objective achieved at step {}", step);
                break;
            }
            if decision.is_current_page_execution_completed {
                break;
            }
            self.persist_metadata().await;
            if let Err(reason) = gate.check() {
                return Ok(PageOutcome::Suspended(reason));
            }
        }

        self.finish_page(key, true).await;
        Ok(PageOutcome::Completed)
    }

    async fn decision_context(
        &self,
        key: &str,
        page_url: &str,
        step: u32,
        screenshot: Vec<u8>,
    ) -> DecisionContext {
        let conversation = self
            .conversations
            .lock()
            .await
            .get(key)
            .cloned()
            .unwrap_or_default();
        let session = self.session.lock().await;
        DecisionContext {
            screenshot,
            page_url: page_url.to_string(),
            objective: self.config.objective.clone(),
            additional_context: self.config.additional_context.clone(),
            step_number: step,
            conversation,
            queued_urls: session.queued_urls(),
            is_exploration: self.config.is_exploration,
            max_pages_reached: session.max_pages_reached(),
            can_login: self.config.can_login,
            user_inputs: session.input_values(),
            flow_context: session.flow_context.clone(),
            action_history: session.action_history.clone(),
            repeated_actions: page_repeat_counts(&session.action_history, page_url),
        }
    }

    async fn record_step(&self, key: &str, url: &str, decision: &ToolDecision, step: &ExecutedStep) {
        self.session.lock().await.record_step(key, step.clone());
        self.conversations
            .lock()
            .await
            .entry(key.to_string())
            .or_default()
            .push(ConversationTurn {
                step_number: step.step_number,
                tool: step.tool,
                instruction: step.instruction.clone(),
                reasoning: decision.reasoning.clone(),
                result: step.result.clone(),
            });
        self.emit(EventPayload::ToolCompleted {
            page: PageScope::new(url, key, step.step_number),
            step: step.clone(),
        });
    }

    /// Persist a screenshot and attach it to the page.
    pub(super) async fn store_screenshot(
        &self,
        key: &str,
        step: u32,
        kind: ScreenshotKind,
        png: &[u8],
    ) {
        let location = match self
            .deps
            .store
            .save_screenshot(&self.config.user_name, key, step, kind, png)
            .await
        {
            Ok(location) => Some(location),
            Err(e) => {
                warn!("Failed to persist screenshot for step {}: {}", step, e);
                None
            }
        };
        if let Some(page) = self.session.lock().await.page_mut(key) {
            page.add_screenshot(Screenshot::new(step, kind, location));
        }
    }

    /// Mark the page completed, persist, optionally run the blocking
    /// enrichment pass, report completion.
    ///
    /// A page queued again while it ran (a flow that ended on it) is only
    /// persisted; it completes when the loop reaches it again.
    async fn finish_page(&self, key: &str, enrich: bool) {
        let summary = {
            let mut session = self.session.lock().await;
            session.complete_page(key).map(|page| {
                (
                    page.status,
                    page.url.clone(),
                    page.last_step_number,
                    page.executed_steps.len(),
                    page.successful_steps(),
                )
            })
        };
        let Some((status, url, last_step, steps_executed, successful_steps)) = summary else {
            return;
        };
        self.persist_session().await;

        if status == PageStatus::Queued {
            info!("{} re-queued after {} steps; completion deferred", url, steps_executed);
            return;
        }

        if enrich && let Err(e) = self.enrichment.complete(key).await {
            warn!("Enrichment for {} failed: {}", url, e);
        }

        info!(
            "Completed {} ({} steps, {} successful)",
            url, steps_executed, successful_steps
        );
        self.emit(EventPayload::PageCompleted {
            page: PageScope::new(&url, key, last_step),
            steps_executed,
            successful_steps,
        });
    }
}
