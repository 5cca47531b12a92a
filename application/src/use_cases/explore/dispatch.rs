//! Tool dispatcher: runs one decided tool and normalizes its outcome into
//! an [`ExecutedStep`].

use super::{Dispatch, ExplorationEngine, ExploreError};
use crate::ports::browser::ActOutcome;
use crate::ports::event_sink::{EventPayload, PageScope};
use crate::use_cases::input_broker::InputResponse;
use crate::use_cases::shared::{Suspension, SuspensionGate};
use scout_domain::step::markers;
use scout_domain::step::navigation::parse_navigate_instruction;
use scout_domain::{
    ActionHistoryEntry, ExecutedStep, InputSpec, InputType, ScreenshotKind, StepTool, ToolAction,
    ToolDecision, normalize_url, same_page,
};
use tracing::{debug, info, warn};

impl ExplorationEngine {
    /// Dispatch the decided tool.
    ///
    /// `Ok(Dispatch::Suspended)` means the gate tripped mid-dispatch and
    /// nothing must be recorded. `Err` is a page-level failure.
    pub(super) async fn dispatch(
        &self,
        gate: &SuspensionGate,
        decision: &ToolDecision,
        key: &str,
        page_url: &str,
        step: u32,
    ) -> Result<Dispatch, ExploreError> {
        let scope = PageScope::new(page_url, key, step);
        self.emit(EventPayload::ToolStarted {
            page: scope.clone(),
            tool: decision.tool(),
            instruction: decision.instruction().to_string(),
        });

        match &decision.action {
            ToolAction::Act { instruction } => {
                self.dispatch_act(gate, decision, instruction, scope).await
            }
            ToolAction::RequestInput {
                instruction,
                inputs,
            } => Ok(self
                .dispatch_request_input(gate, instruction, inputs, scope)
                .await),
            ToolAction::Standby {
                instruction,
                wait_seconds,
            } => Ok(self
                .dispatch_standby(gate, instruction, *wait_seconds, scope)
                .await),
        }
    }

    // ==================== act ====================

    async fn dispatch_act(
        &self,
        gate: &SuspensionGate,
        decision: &ToolDecision,
        instruction: &str,
        scope: PageScope,
    ) -> Result<Dispatch, ExploreError> {
        let browser = &self.deps.browser;
        let step = scope.step_number;
        let url_before = browser
            .current_url()
            .await
            .map(|u| normalize_url(&u))
            .unwrap_or_else(|_| scope.url.clone());

        let outcome = match parse_navigate_instruction(instruction, &url_before) {
            Some(target) => {
                debug!("Navigating directly to {}", target);
                browser
                    .navigate(&target)
                    .await
                    .map(|_| ActOutcome::success(format!("Navigated to {}", target)))
            }
            None => browser.act(instruction).await,
        };

        if !gate.is_live() {
            return Ok(Dispatch::Suspended(Suspension::Stopped));
        }

        let message = match outcome {
            Ok(outcome) if outcome.success => outcome.message,
            failed => {
                let executed = match failed {
                    Ok(outcome) => {
                        ExecutedStep::new(step, StepTool::Act, instruction, false, outcome.message)
                    }
                    Err(e) => ExecutedStep::failed(step, StepTool::Act, instruction, e),
                };
                warn!("Act failed at step {}: {}", step, executed.result);
                self.log_action(instruction, &url_before, None, step, false)
                    .await;
                self.emit(EventPayload::ActResult {
                    page: scope,
                    success: false,
                    url_changed: false,
                    new_url: None,
                    queued: false,
                });
                return Ok(Dispatch::Step(executed));
            }
        };

        let url_after = normalize_url(&browser.current_url().await?);
        let in_flow = self
            .session
            .lock()
            .await
            .flow_context
            .is_in_sensitive_flow;

        let (result, new_url, queued) = if same_page(&url_before, &url_after) {
            (markers::stayed_on_page(&message, &url_after), None, false)
        } else if in_flow {
            info!("URL changed to {} during sensitive flow; staying", url_after);
            (
                markers::navigated_in_flow(&message, &url_after),
                Some(url_after.clone()),
                false,
            )
        } else {
            let queued = self
                .enqueue(&url_after, self.params.discovery_priority, Some(&url_before))
                .await;
            browser.navigate(&url_before).await?;
            (
                markers::navigated_and_queued(&message, &url_after, &url_before),
                Some(url_after.clone()),
                queued,
            )
        };
        let url_changed = new_url.is_some();

        self.log_action(instruction, &url_before, Some(url_after), step, true)
            .await;
        self.emit(EventPayload::ActResult {
            page: scope,
            success: true,
            url_changed,
            new_url: new_url.clone(),
            queued,
        });

        Ok(Dispatch::Step(
            ExecutedStep::new(step, StepTool::Act, instruction, true, result)
                .with_url_change(url_changed, new_url)
                .with_objective_achieved(decision.objective_achieved),
        ))
    }

    async fn log_action(
        &self,
        instruction: &str,
        source_url: &str,
        target_url: Option<String>,
        step: u32,
        success: bool,
    ) {
        self.session.lock().await.record_action(ActionHistoryEntry::new(
            instruction,
            source_url,
            target_url,
            step,
            success,
        ));
    }

    // ==================== request_input ====================

    async fn dispatch_request_input(
        &self,
        gate: &SuspensionGate,
        instruction: &str,
        inputs: &[InputSpec],
        scope: PageScope,
    ) -> Dispatch {
        let step = scope.step_number;
        let requested: Vec<String> = inputs.iter().map(|i| i.key.clone()).collect();
        let timeout = self.params.input_timeout;

        let rx = self.inputs.open();
        self.emit(EventPayload::InputRequested {
            page: scope.clone(),
            inputs: inputs.to_vec(),
            timeout_seconds: timeout.as_secs(),
        });

        let response = tokio::select! {
            biased;
            reason = gate.tripped() => {
                self.inputs.cancel();
                return Dispatch::Suspended(reason);
            }
            response = tokio::time::timeout(timeout, rx) => response,
        };

        match response {
            Err(_) => {
                self.inputs.cancel();
                warn!("Input request at step {} timed out", step);
                Dispatch::Step(ExecutedStep::failed(
                    step,
                    StepTool::RequestInput,
                    instruction,
                    format!("input request timed out after {}s", timeout.as_secs()),
                ))
            }
            Ok(Err(_)) => Dispatch::Step(ExecutedStep::failed(
                step,
                StepTool::RequestInput,
                instruction,
                "input request was cancelled",
            )),
            Ok(Ok(InputResponse::Skipped)) => {
                info!("User skipped input for {:?}", requested);
                self.emit(EventPayload::InputReceived {
                    page: scope,
                    keys: requested.clone(),
                    skipped: true,
                });
                Dispatch::Step(ExecutedStep::new(
                    step,
                    StepTool::RequestInput,
                    instruction,
                    true,
                    markers::input_skipped(&requested),
                ))
            }
            Ok(Ok(InputResponse::Values(values))) => {
                let mut filled: Vec<String> = requested
                    .iter()
                    .filter(|k| values.contains_key(*k))
                    .cloned()
                    .collect();
                let mut extra: Vec<String> = values
                    .keys()
                    .filter(|k| !requested.contains(k))
                    .cloned()
                    .collect();
                extra.sort();
                filled.extend(extra);

                {
                    let mut session = self.session.lock().await;
                    for key in &filled {
                        let input_type = inputs
                            .iter()
                            .find(|i| &i.key == key)
                            .map(|i| i.input_type)
                            .unwrap_or(InputType::Text);
                        if let Some(value) = values.get(key) {
                            session.store_input(key, value, input_type);
                        }
                    }
                }

                info!("Received input for {:?}", filled);
                self.emit(EventPayload::InputReceived {
                    page: scope,
                    keys: filled.clone(),
                    skipped: false,
                });
                Dispatch::Step(
                    ExecutedStep::new(
                        step,
                        StepTool::RequestInput,
                        instruction,
                        true,
                        markers::input_received(&filled),
                    )
                    .with_input_keys(filled),
                )
            }
        }
    }

    // ==================== standby ====================

    async fn dispatch_standby(
        &self,
        gate: &SuspensionGate,
        instruction: &str,
        wait_seconds: Option<u32>,
        scope: PageScope,
    ) -> Dispatch {
        let step = scope.step_number;
        let duration = self.params.standby_duration(wait_seconds);

        match self.deps.browser.screenshot(false).await {
            Ok(png) => {
                self.store_screenshot(&scope.url_hash, step, ScreenshotKind::BeforeStandby, &png)
                    .await
            }
            Err(e) => {
                return Dispatch::Step(ExecutedStep::failed(step, StepTool::Standby, instruction, e));
            }
        }

        tokio::select! {
            biased;
            reason = gate.tripped() => return Dispatch::Suspended(reason),
            _ = tokio::time::sleep(duration) => {}
        }

        match self.deps.browser.screenshot(false).await {
            Ok(png) => {
                self.store_screenshot(&scope.url_hash, step, ScreenshotKind::AfterStandby, &png)
                    .await
            }
            Err(e) => {
                return Dispatch::Step(ExecutedStep::failed(step, StepTool::Standby, instruction, e));
            }
        }

        self.emit(EventPayload::StandbyCompleted {
            page: scope,
            waited_seconds: duration.as_secs(),
        });
        Dispatch::Step(ExecutedStep::new(
            step,
            StepTool::Standby,
            instruction,
            true,
            format!("Waited {}s", duration.as_secs()),
        ))
    }
}
