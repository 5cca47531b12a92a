//! Exploration use case
//!
//! Drives a queue of pages through the per-page step loop:
//!
//! ```text
//! run()                               (queue.rs)
//!  └─ pop page ─> process_page()      (page_loop.rs)
//!                  ├─ decide
//!                  ├─ sensitive-flow guard   (flow_guard.rs)
//!                  ├─ dispatch act / request_input / standby   (dispatch.rs)
//!                  └─ record step, background enrichment
//! handle_chat_message()               (chat.rs)
//!  └─ checkpoint ─> interrupt ─> classify ─> navigate? ─> resume
//! ```
//!
//! The engine is the only writer of the session. Chat handling talks to the
//! running loop only through the interrupt token and the checkpoint.

mod chat;
mod dispatch;
mod flow_guard;
mod page_loop;
mod queue;
mod types;

pub use types::{ExploreError, RunOutcome};

pub(crate) use types::{Dispatch, PageOutcome};

use crate::config::{ExecutionParams, ExplorationConfig};
use crate::ports::browser::BrowserPort;
use crate::ports::chat_decision::ChatDecisionPort;
use crate::ports::decision::{ConversationTurn, DecisionPort};
use crate::ports::enrichment::EnrichmentPort;
use crate::ports::event_sink::{EventPayload, EventSink, ExplorationEvent};
use crate::ports::session_registry::SessionRegistryPort;
use crate::ports::session_store::SessionStorePort;
use crate::use_cases::enrichment::EnrichmentCoordinator;
use crate::use_cases::input_broker::InputBroker;
use crate::use_cases::shared::SuspensionGate;
use scout_domain::{ExplorationSession, SessionMetadata};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// External collaborators of one exploration session.
#[derive(Clone)]
pub struct Collaborators {
    pub browser: Arc<dyn BrowserPort>,
    pub decision: Arc<dyn DecisionPort>,
    pub chat: Arc<dyn ChatDecisionPort>,
    pub enrichment: Arc<dyn EnrichmentPort>,
    pub store: Arc<dyn SessionStorePort>,
    pub registry: Arc<dyn SessionRegistryPort>,
    pub events: Arc<dyn EventSink>,
}

/// Queue engine, page loop and chat interrupt handling for one session.
pub struct ExplorationEngine {
    pub(super) config: ExplorationConfig,
    pub(super) params: ExecutionParams,
    pub(super) deps: Collaborators,
    pub(super) session: Arc<Mutex<ExplorationSession>>,
    pub(super) inputs: Arc<InputBroker>,
    pub(super) enrichment: EnrichmentCoordinator,
    /// Session-wide; cancelled by `stop`
    pub(super) stop: CancellationToken,
    /// Interrupt token of the current run; replaced on every resume
    pub(super) interrupt: std::sync::Mutex<CancellationToken>,
    /// Per-page decision history keyed by `url_hash`
    pub(super) conversations: Mutex<HashMap<String, Vec<ConversationTurn>>>,
    pub(super) run_handle: Mutex<Option<JoinHandle<RunOutcome>>>,
    /// Serializes chat messages
    pub(super) chat_lock: Mutex<()>,
}

impl ExplorationEngine {
    pub fn new(config: ExplorationConfig, params: ExecutionParams, deps: Collaborators) -> Self {
        let metadata = SessionMetadata::new(
            &config.user_name,
            &config.objective,
            &config.start_url,
            config.is_exploration,
            config.max_pages_to_explore,
        )
        .with_login_context(config.additional_context.clone(), config.can_login);
        Self::from_session(config, params, deps, ExplorationSession::new(metadata))
    }

    /// Build an engine around an existing (e.g. recovered) session.
    pub fn from_session(
        config: ExplorationConfig,
        params: ExecutionParams,
        deps: Collaborators,
        session: ExplorationSession,
    ) -> Self {
        let session = Arc::new(Mutex::new(session));
        let enrichment = EnrichmentCoordinator::new(
            &config.user_name,
            deps.enrichment.clone(),
            deps.store.clone(),
            deps.events.clone(),
            session.clone(),
        );
        Self {
            config,
            params,
            deps,
            session,
            inputs: Arc::new(InputBroker::new()),
            enrichment,
            stop: CancellationToken::new(),
            interrupt: std::sync::Mutex::new(CancellationToken::new()),
            conversations: Mutex::new(HashMap::new()),
            run_handle: Mutex::new(None),
            chat_lock: Mutex::new(()),
        }
    }

    pub fn user_name(&self) -> &str {
        &self.config.user_name
    }

    pub fn config(&self) -> &ExplorationConfig {
        &self.config
    }

    pub fn session(&self) -> Arc<Mutex<ExplorationSession>> {
        self.session.clone()
    }

    pub fn inputs(&self) -> Arc<InputBroker> {
        self.inputs.clone()
    }

    pub fn enrichment(&self) -> &EnrichmentCoordinator {
        &self.enrichment
    }

    /// Gate for the current run.
    pub fn gate(&self) -> SuspensionGate {
        SuspensionGate::new(
            self.deps.registry.clone(),
            &self.config.user_name,
            self.stop.clone(),
            self.current_interrupt(),
        )
    }

    /// Start the queue engine in the background with a fresh interrupt token.
    pub async fn spawn_run(self: &Arc<Self>) {
        let gate = self.fresh_gate();
        let engine = Arc::clone(self);
        let handle = tokio::spawn(async move { engine.run(&gate).await });
        if let Some(previous) = self.run_handle.lock().await.replace(handle)
            && !previous.is_finished()
        {
            warn!("Replacing a run that is still live for {}", self.config.user_name);
        }
    }

    /// Wait for the background run, if any.
    pub async fn wait(&self) -> Option<RunOutcome> {
        let handle = self.run_handle.lock().await.take()?;
        match handle.await {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                warn!("Exploration task for {} failed: {}", self.config.user_name, e);
                None
            }
        }
    }

    /// Stop the session: every suspension point and pending wait aborts.
    pub fn shutdown(&self) {
        debug!("Shutting down exploration for {}", self.config.user_name);
        self.deps.registry.deactivate(&self.config.user_name);
        self.stop.cancel();
        self.inputs.cancel();
        self.enrichment.abort_all();
    }

    pub(crate) fn current_interrupt(&self) -> CancellationToken {
        self.interrupt
            .lock()
            .map(|t| t.clone())
            .unwrap_or_else(|_| CancellationToken::new())
    }

    fn fresh_gate(&self) -> SuspensionGate {
        let token = CancellationToken::new();
        if let Ok(mut current) = self.interrupt.lock() {
            *current = token.clone();
        }
        SuspensionGate::new(
            self.deps.registry.clone(),
            &self.config.user_name,
            self.stop.clone(),
            token,
        )
    }

    pub(super) fn emit(&self, payload: EventPayload) {
        self.deps
            .events
            .emit(ExplorationEvent::new(&self.config.user_name, payload));
    }

    /// Cheap per-step persistence.
    pub(super) async fn persist_metadata(&self) {
        let metadata = self.session.lock().await.metadata.clone();
        if let Err(e) = self
            .deps
            .store
            .save_metadata(&self.config.user_name, &metadata)
            .await
        {
            warn!("Failed to persist session metadata: {}", e);
        }
    }

    pub(crate) async fn persist_session(&self) {
        let snapshot = self.session.lock().await.clone();
        if let Err(e) = self
            .deps
            .store
            .save_session(&self.config.user_name, &snapshot)
            .await
        {
            warn!("Failed to persist session: {}", e);
        }
    }
}
