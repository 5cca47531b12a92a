//! Chat interrupt / checkpoint manager.
//!
//! ```text
//! chat message
//!   1. snapshot checkpoint, persist
//!   2. cancel interrupt token, wait for the loop to park
//!   3. classify with the chat collaborator
//!   4. navigate to the target (exploration / task_specific)
//!   5. resume from the checkpoint unless it says completed
//!      (task_specific stays on its target until the next message)
//! ```

use super::{ExplorationEngine, ExploreError};
use crate::ports::chat_decision::ChatContext;
use crate::ports::event_sink::{ChatRole, EventPayload};
use scout_domain::{
    ChatDecision, ChatRequestType, ExplorationCheckpoint, ExplorationPhase, resolve_against,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

impl ExplorationEngine {
    /// Handle an operator chat message.
    ///
    /// Messages are handled one at a time. The exploration is paused for
    /// the duration and resumed afterwards, also when classification fails.
    pub async fn handle_chat_message(
        self: &Arc<Self>,
        text: &str,
    ) -> Result<ChatDecision, ExploreError> {
        let _turn = self.chat_lock.lock().await;
        self.emit(EventPayload::ChatMessage {
            role: ChatRole::User,
            text: text.to_string(),
        });

        let checkpoint = self.interrupt_exploration().await;

        let context = self.chat_context(text).await;
        let decision = match self.deps.chat.classify(&context).await {
            Ok(decision) => decision,
            Err(e) => {
                warn!("Chat classification failed: {}", e);
                self.emit(EventPayload::ChatError {
                    message: e.to_string(),
                });
                self.resume(&checkpoint).await;
                return Err(e.into());
            }
        };
        info!("Chat classified as {}", decision.request_type);
        self.emit(EventPayload::ChatMessage {
            role: ChatRole::Assistant,
            text: decision.response.clone(),
        });

        let mut stay_on_target = false;
        if let Some(target) = decision.navigation_target() {
            match self.chat_navigate(decision.request_type, target).await {
                Ok(()) => stay_on_target = decision.request_type == ChatRequestType::TaskSpecific,
                Err(e) => {
                    warn!("Chat navigation to {} failed: {}", target, e);
                    self.emit(EventPayload::ChatError {
                        message: e.to_string(),
                    });
                }
            }
        }

        if stay_on_target {
            info!("Staying on the task page until the next chat message");
        } else {
            self.resume(&checkpoint).await;
        }
        Ok(decision)
    }

    /// Snapshot and persist a checkpoint, then pause the running loop.
    async fn interrupt_exploration(&self) -> ExplorationCheckpoint {
        let checkpoint = {
            let mut session = self.session.lock().await;
            let checkpoint = session.snapshot_checkpoint();
            session.checkpoint = Some(checkpoint.clone());
            if !session.metadata.phase.is_completed() {
                session.metadata.phase = ExplorationPhase::Paused;
            }
            checkpoint
        };
        if let Err(e) = self
            .deps
            .store
            .save_checkpoint(&self.config.user_name, &checkpoint)
            .await
        {
            warn!("Failed to persist checkpoint: {}", e);
        }
        self.persist_session().await;

        self.current_interrupt().cancel();
        if let Some(outcome) = self.wait().await {
            debug!("Loop parked for chat: {:?}", outcome);
        }
        checkpoint
    }

    async fn chat_context(&self, text: &str) -> ChatContext {
        let current_url = self.deps.browser.current_url().await.ok();
        let session = self.session.lock().await;
        let mut pages: Vec<_> = session.pages.values().cloned().collect();
        pages.sort_by_key(|p| p.discovered_at);
        ChatContext {
            user_name: self.config.user_name.clone(),
            message: text.to_string(),
            objective: self.config.objective.clone(),
            current_url,
            pages,
        }
    }

    async fn chat_navigate(
        &self,
        request_type: ChatRequestType,
        target: &str,
    ) -> Result<(), ExploreError> {
        let base = self
            .deps
            .browser
            .current_url()
            .await
            .unwrap_or_else(|_| self.config.start_url.clone());
        let url = resolve_against(&base, target)
            .ok_or_else(|| scout_domain::DomainError::InvalidUrl(target.to_string()))?;

        self.deps.browser.navigate(&url).await?;
        let queued = match request_type {
            ChatRequestType::Exploration => {
                self.enqueue(&url, self.params.flow_reentry_priority, Some(&base))
                    .await
            }
            _ => {
                // Known to the session, never handed to the page loop
                let registered = self.session.lock().await.register(
                    &url,
                    self.params.discovery_priority,
                    Some(&base),
                );
                if registered {
                    self.persist_session().await;
                }
                false
            }
        };
        info!("Chat navigated to {} (queued: {})", url, queued);
        self.emit(EventPayload::ChatNavigated {
            request_type,
            url,
            queued,
        });
        Ok(())
    }

    /// Resume the queue engine from a checkpoint.
    ///
    /// A checkpoint taken after the exploration completed leaves the session
    /// parked; it stays in the session for the next chat message.
    async fn resume(self: &Arc<Self>, checkpoint: &ExplorationCheckpoint) {
        if !self.gate().is_live() {
            debug!("Session stopped during chat; not resuming");
            return;
        }
        if !self.restore_from(checkpoint).await {
            info!("Exploration already completed; staying parked");
            return;
        }
        info!("Resuming exploration for {}", self.config.user_name);
        self.spawn_run().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::use_cases::explore::RunOutcome;
    use crate::use_cases::input_broker::InputResponse;
    use crate::use_cases::test_support::Harness;
    use scout_domain::{InputSpec, InputType, PageStatus, ToolDecision, url_hash};
    use std::time::Duration;

    const ROOT: &str = "https://example.com";

    async fn wait_for_pending_input(engine: &ExplorationEngine) {
        while !engine.inputs.has_pending() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }

    fn email_request() -> ToolDecision {
        ToolDecision::request_input(
            "Need an email",
            vec![InputSpec::new("email", InputType::Email, "Email")],
        )
    }

    #[tokio::test]
    async fn test_question_pauses_and_resumes_interrupted_page() {
        let harness = Harness::new();
        harness.chat.reply(ChatDecision::question("Pricing is on /pricing"));
        harness.decisions.push(email_request());
        harness
            .decisions
            .push(ToolDecision::act("Open menu").completing_page());
        let engine = harness.engine();
        engine.enqueue(ROOT, 1, None).await;
        engine.spawn_run().await;
        wait_for_pending_input(&engine).await;

        let decision = engine.handle_chat_message("where is pricing?").await.unwrap();

        assert_eq!(decision.request_type, ChatRequestType::Question);
        let outcome = engine.wait().await;
        assert_eq!(
            outcome,
            Some(RunOutcome::Finished {
                objective_achieved: false
            })
        );
        let session = engine.session.lock().await;
        let root = session.page(&url_hash(ROOT)).unwrap();
        assert_eq!(root.status, PageStatus::Completed);
        // The interrupted request_input was never recorded
        assert_eq!(root.executed_steps.len(), 1);
        assert_eq!(root.executed_steps[0].instruction, "Open menu");
        let checkpoint = session.checkpoint.as_ref().unwrap();
        assert_eq!(checkpoint.exploration_phase, ExplorationPhase::Completed);
        assert_eq!(harness.store.checkpoints_saved(), 1);
        assert_eq!(harness.events.count("chat_message"), 2);
        assert_eq!(harness.events.count("session_completed"), 1);
    }

    #[tokio::test]
    async fn test_chat_after_completion_stays_parked() {
        let harness = Harness::new();
        harness.chat.reply(ChatDecision::navigate(
            ChatRequestType::Exploration,
            "https://example.com/careers",
            "Opening careers",
        ));
        let engine = harness.engine();
        engine.enqueue(ROOT, 1, None).await;
        engine.spawn_run().await;
        engine.wait().await;

        engine.handle_chat_message("look at careers").await.unwrap();

        assert_eq!(harness.browser.url(), "https://example.com/careers");
        let session = engine.session.lock().await;
        assert_eq!(
            session.page_queue,
            vec![url_hash("https://example.com/careers")]
        );
        assert_eq!(session.metadata.phase, ExplorationPhase::Completed);
        assert!(!session.checkpoint.as_ref().unwrap().should_resume());
        drop(session);
        assert!(engine.wait().await.is_none());
        assert_eq!(harness.events.count("chat_navigated"), 1);
    }

    #[tokio::test]
    async fn test_exploration_target_is_processed_on_resume() {
        let harness = Harness::new();
        harness.chat.reply(ChatDecision::navigate(
            ChatRequestType::Exploration,
            "/careers",
            "Opening careers",
        ));
        harness.decisions.push(email_request());
        let engine = harness.engine();
        engine.enqueue(ROOT, 1, None).await;
        engine.enqueue("https://example.com/blog", 2, None).await;
        engine.spawn_run().await;
        wait_for_pending_input(&engine).await;

        engine.handle_chat_message("look at careers").await.unwrap();
        engine.wait().await;

        // Interrupted page first, then the chat target, then the rest
        let navigations = harness.browser.navigations();
        assert_eq!(
            navigations,
            vec![
                "https://example.com/",
                "https://example.com/careers",
                "https://example.com/",
                "https://example.com/careers",
                "https://example.com/blog",
            ]
        );
    }

    #[tokio::test]
    async fn test_task_target_stays_navigated_and_is_never_looped() {
        let harness = Harness::new();
        harness.chat.reply(ChatDecision::navigate(
            ChatRequestType::TaskSpecific,
            "https://example.com/account",
            "Opening your account",
        ));
        harness.decisions.push(email_request());
        let engine = harness.engine();
        engine.enqueue(ROOT, 1, None).await;
        engine.spawn_run().await;
        wait_for_pending_input(&engine).await;

        engine.handle_chat_message("show my account").await.unwrap();

        assert!(engine.wait().await.is_none());
        assert_eq!(harness.browser.url(), "https://example.com/account");
        let account = url_hash("https://example.com/account");
        {
            let session = engine.session.lock().await;
            assert_eq!(session.metadata.phase, ExplorationPhase::Paused);
            assert!(!session.page_queue.contains(&account));
            assert_eq!(session.page(&account).unwrap().status, PageStatus::Queued);
        }

        // The next message resumes the interrupted page only
        harness.chat.reply(ChatDecision::question("Back to it"));
        engine.handle_chat_message("carry on").await.unwrap();
        engine.wait().await;

        assert_eq!(
            harness.browser.navigations(),
            vec![
                "https://example.com/",
                "https://example.com/account",
                "https://example.com/",
            ]
        );
        let session = engine.session.lock().await;
        let page = session.page(&account).unwrap();
        assert!(page.executed_steps.is_empty());
        assert_ne!(page.status, PageStatus::Completed);
        assert_eq!(
            session.page(&url_hash(ROOT)).unwrap().status,
            PageStatus::Completed
        );
        drop(session);
        assert_eq!(harness.events.count("page_started"), 2);
    }

    #[tokio::test]
    async fn test_chat_right_after_pop_keeps_popped_page() {
        let harness = Harness::new();
        let engine = harness.engine();
        engine.enqueue(ROOT, 1, None).await;
        engine.enqueue("https://example.com/b", 2, None).await;
        // The loop has taken the root page but not started it yet
        let popped = engine.session.lock().await.pop_next().unwrap();

        engine.handle_chat_message("status?").await.unwrap();
        engine.wait().await;

        let session = engine.session.lock().await;
        let checkpoint = session.checkpoint.as_ref().unwrap();
        assert_eq!(checkpoint.current_page_hash.as_deref(), Some(popped.as_str()));
        assert_eq!(session.page(&popped).unwrap().status, PageStatus::Completed);
        drop(session);
        assert_eq!(
            harness.browser.navigations(),
            vec!["https://example.com/", "https://example.com/b"]
        );
    }

    #[tokio::test]
    async fn test_classification_error_still_resumes() {
        let harness = Harness::new();
        harness.chat.fail();
        harness.decisions.push(email_request());
        let engine = harness.engine();
        engine.enqueue(ROOT, 1, None).await;
        engine.spawn_run().await;
        wait_for_pending_input(&engine).await;

        let result = engine.handle_chat_message("hello?").await;

        assert!(matches!(result, Err(ExploreError::Chat(_))));
        assert_eq!(harness.events.count("chat_error"), 1);
        assert!(engine.wait().await.is_some());
        assert_eq!(
            engine.session.lock().await.metadata.phase,
            ExplorationPhase::Completed
        );
    }

    #[tokio::test]
    async fn test_repeated_chat_messages_keep_session_resumable() {
        let harness = Harness::new();
        harness.chat.reply(ChatDecision::question("ok"));
        harness.decisions.push(email_request());
        harness.decisions.push(email_request());
        let engine = harness.engine();
        engine.enqueue(ROOT, 1, None).await;
        engine.spawn_run().await;

        wait_for_pending_input(&engine).await;
        engine.handle_chat_message("first").await.unwrap();
        wait_for_pending_input(&engine).await;
        engine.handle_chat_message("second").await.unwrap();

        let session = engine.session.lock().await;
        let checkpoint = session.checkpoint.as_ref().unwrap();
        assert!(checkpoint.should_resume());
        assert_eq!(
            checkpoint.current_page_hash.as_deref(),
            Some(url_hash(ROOT).as_str())
        );
        drop(session);

        assert!(engine.inputs.submit(InputResponse::Skipped));
        engine.wait().await;
        assert_eq!(harness.store.checkpoints_saved(), 2);
    }
}
