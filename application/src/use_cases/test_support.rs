//! Scripted collaborators shared by the use case tests.

use crate::config::{ExecutionParams, ExplorationConfig};
use crate::ports::browser::{ActOutcome, BrowserError, BrowserPort};
use crate::ports::chat_decision::{ChatContext, ChatDecisionPort, ChatError};
use crate::ports::decision::{DecisionContext, DecisionError, DecisionPort};
use crate::ports::enrichment::{EnrichmentError, EnrichmentPort, EnrichmentRequest};
use crate::ports::event_sink::{EventSink, ExplorationEvent};
use crate::ports::session_registry::SessionRegistryPort;
use crate::ports::session_store::{SessionStorePort, StoreError};
use crate::use_cases::controller::ExplorationController;
use crate::use_cases::explore::{Collaborators, ExplorationEngine};
use async_trait::async_trait;
use scout_domain::{
    ChatDecision, EnrichmentArtifact, ExplorationCheckpoint, ExplorationSession, ScreenshotKind,
    SessionMetadata, ToolDecision,
};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const USER: &str = "alice";

const FAKE_PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0, 0, 0, 0];

// ==================== Registry ====================

#[derive(Default)]
pub struct FakeRegistry {
    active: Mutex<HashSet<String>>,
}

impl FakeRegistry {
    pub fn with_active(user_name: &str) -> Self {
        let registry = Self::default();
        registry.activate(user_name);
        registry
    }
}

impl SessionRegistryPort for FakeRegistry {
    fn is_active(&self, user_name: &str) -> bool {
        self.active.lock().unwrap().contains(user_name)
    }

    fn activate(&self, user_name: &str) {
        self.active.lock().unwrap().insert(user_name.to_string());
    }

    fn deactivate(&self, user_name: &str) {
        self.active.lock().unwrap().remove(user_name);
    }
}

// ==================== Browser ====================

#[derive(Default)]
struct BrowserState {
    url: String,
    act_targets: HashMap<String, String>,
    failing_acts: HashSet<String>,
    failing_navigations: HashSet<String>,
    screenshots_fail: bool,
    navigations: Vec<String>,
    acts: Vec<String>,
}

/// Browser whose acts only change the URL when told to.
pub struct ScriptedBrowser {
    state: Mutex<BrowserState>,
}

impl Default for ScriptedBrowser {
    fn default() -> Self {
        Self {
            state: Mutex::new(BrowserState {
                url: "about:blank".to_string(),
                ..Default::default()
            }),
        }
    }
}

impl ScriptedBrowser {
    pub fn set_url(&self, url: &str) {
        self.state.lock().unwrap().url = url.to_string();
    }

    pub fn url(&self) -> String {
        self.state.lock().unwrap().url.clone()
    }

    /// Make `instruction` land on `url`.
    pub fn on_act(&self, instruction: &str, url: &str) {
        self.state
            .lock()
            .unwrap()
            .act_targets
            .insert(instruction.to_string(), url.to_string());
    }

    pub fn fail_act(&self, instruction: &str) {
        self.state
            .lock()
            .unwrap()
            .failing_acts
            .insert(instruction.to_string());
    }

    pub fn fail_navigation_to(&self, url: &str) {
        self.state
            .lock()
            .unwrap()
            .failing_navigations
            .insert(url.to_string());
    }

    pub fn fail_screenshots(&self) {
        self.state.lock().unwrap().screenshots_fail = true;
    }

    pub fn navigations(&self) -> Vec<String> {
        self.state.lock().unwrap().navigations.clone()
    }

    pub fn acts(&self) -> Vec<String> {
        self.state.lock().unwrap().acts.clone()
    }
}

#[async_trait]
impl BrowserPort for ScriptedBrowser {
    async fn navigate(&self, url: &str) -> Result<(), BrowserError> {
        let mut state = self.state.lock().unwrap();
        if state.failing_navigations.contains(url) {
            return Err(BrowserError::Navigation(format!("{} is unreachable", url)));
        }
        state.navigations.push(url.to_string());
        state.url = url.to_string();
        Ok(())
    }

    async fn act(&self, instruction: &str) -> Result<ActOutcome, BrowserError> {
        let mut state = self.state.lock().unwrap();
        state.acts.push(instruction.to_string());
        if state.failing_acts.contains(instruction) {
            return Ok(ActOutcome::failure("element not found"));
        }
        if let Some(target) = state.act_targets.get(instruction).cloned() {
            state.url = target;
        }
        Ok(ActOutcome::success(format!("Performed: {}", instruction)))
    }

    async fn current_url(&self) -> Result<String, BrowserError> {
        Ok(self.state.lock().unwrap().url.clone())
    }

    async fn screenshot(&self, _full_page: bool) -> Result<Vec<u8>, BrowserError> {
        if self.state.lock().unwrap().screenshots_fail {
            return Err(BrowserError::Screenshot("renderer crashed".to_string()));
        }
        Ok(FAKE_PNG.to_vec())
    }
}

// ==================== Decisions ====================

/// Replays queued decisions, then answers "no decision".
#[derive(Default)]
pub struct ScriptedDecisions {
    queue: Mutex<VecDeque<ToolDecision>>,
    contexts: Mutex<Vec<DecisionContext>>,
}

impl ScriptedDecisions {
    pub fn push(&self, decision: ToolDecision) {
        self.queue.lock().unwrap().push_back(decision);
    }

    pub fn calls(&self) -> usize {
        self.contexts.lock().unwrap().len()
    }

    pub fn contexts(&self) -> Vec<DecisionContext> {
        self.contexts.lock().unwrap().clone()
    }
}

#[async_trait]
impl DecisionPort for ScriptedDecisions {
    async fn decide(&self, context: &DecisionContext) -> Result<Option<ToolDecision>, DecisionError> {
        self.contexts.lock().unwrap().push(context.clone());
        Ok(self.queue.lock().unwrap().pop_front())
    }
}

#[derive(Default)]
pub struct ScriptedChat {
    reply: Mutex<Option<ChatDecision>>,
    failing: AtomicBool,
}

impl ScriptedChat {
    pub fn reply(&self, decision: ChatDecision) {
        *self.reply.lock().unwrap() = Some(decision);
    }

    pub fn fail(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl ChatDecisionPort for ScriptedChat {
    async fn classify(&self, _context: &ChatContext) -> Result<ChatDecision, ChatError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(ChatError::RequestFailed("chat model offline".to_string()));
        }
        Ok(self
            .reply
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| ChatDecision::question("Noted")))
    }
}

// ==================== Enrichment ====================

pub struct CountingEnrichment {
    delay: Duration,
    failing: bool,
    calls: AtomicUsize,
    running: AtomicUsize,
    max_running: AtomicUsize,
    step_counts: Mutex<Vec<usize>>,
}

impl CountingEnrichment {
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            failing: false,
            calls: AtomicUsize::new(0),
            running: AtomicUsize::new(0),
            max_running: AtomicUsize::new(0),
            step_counts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::with_delay(Duration::ZERO)
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_running.load(Ordering::SeqCst)
    }

    /// Number of recorded steps each request carried, in call order.
    pub fn step_counts(&self) -> Vec<usize> {
        self.step_counts.lock().unwrap().clone()
    }
}

#[async_trait]
impl EnrichmentPort for CountingEnrichment {
    async fn enrich(&self, request: EnrichmentRequest) -> Result<EnrichmentArtifact, EnrichmentError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.step_counts.lock().unwrap().push(request.steps.len());
        let running = self.running.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_running.fetch_max(running, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.running.fetch_sub(1, Ordering::SeqCst);

        if self.failing {
            return Err(EnrichmentError::RequestFailed("graph builder offline".to_string()));
        }
        let last_step = request.steps.last().map(|s| s.step_number).unwrap_or(0);
        Ok(EnrichmentArtifact::new(
            request.url_hash,
            last_step,
            serde_json::json!({ "nodes": request.steps.len() }),
        ))
    }
}

// ==================== Store ====================

#[derive(Default)]
pub struct RecordingStore {
    sessions: Mutex<HashMap<String, ExplorationSession>>,
    checkpoints: Mutex<HashMap<String, ExplorationCheckpoint>>,
    checkpoints_saved: AtomicUsize,
    metadata_saved: AtomicUsize,
    enrichments: Mutex<Vec<EnrichmentArtifact>>,
}

impl RecordingStore {
    pub fn session(&self, user_name: &str) -> Option<ExplorationSession> {
        self.sessions.lock().unwrap().get(user_name).cloned()
    }

    pub fn checkpoints_saved(&self) -> usize {
        self.checkpoints_saved.load(Ordering::SeqCst)
    }

    pub fn metadata_saved(&self) -> usize {
        self.metadata_saved.load(Ordering::SeqCst)
    }

    pub fn enrichments(&self) -> Vec<EnrichmentArtifact> {
        self.enrichments.lock().unwrap().clone()
    }
}

#[async_trait]
impl SessionStorePort for RecordingStore {
    async fn save_metadata(
        &self,
        _user_name: &str,
        _metadata: &SessionMetadata,
    ) -> Result<(), StoreError> {
        self.metadata_saved.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn save_session(
        &self,
        user_name: &str,
        session: &ExplorationSession,
    ) -> Result<(), StoreError> {
        self.sessions
            .lock()
            .unwrap()
            .insert(user_name.to_string(), session.clone());
        Ok(())
    }

    async fn load_session(&self, user_name: &str) -> Result<Option<ExplorationSession>, StoreError> {
        Ok(self.session(user_name))
    }

    async fn save_checkpoint(
        &self,
        user_name: &str,
        checkpoint: &ExplorationCheckpoint,
    ) -> Result<(), StoreError> {
        self.checkpoints_saved.fetch_add(1, Ordering::SeqCst);
        self.checkpoints
            .lock()
            .unwrap()
            .insert(user_name.to_string(), checkpoint.clone());
        Ok(())
    }

    async fn load_checkpoint(
        &self,
        user_name: &str,
    ) -> Result<Option<ExplorationCheckpoint>, StoreError> {
        Ok(self.checkpoints.lock().unwrap().get(user_name).cloned())
    }

    async fn save_screenshot(
        &self,
        user_name: &str,
        url_hash: &str,
        step_number: u32,
        kind: ScreenshotKind,
        _png: &[u8],
    ) -> Result<String, StoreError> {
        Ok(format!(
            "memory://{}/{}/step_{}_{:?}.png",
            user_name, url_hash, step_number, kind
        ))
    }

    async fn save_enrichment(
        &self,
        _user_name: &str,
        artifact: &EnrichmentArtifact,
    ) -> Result<(), StoreError> {
        self.enrichments.lock().unwrap().push(artifact.clone());
        Ok(())
    }
}

// ==================== Events ====================

#[derive(Default)]
pub struct RecordingEvents {
    events: Mutex<Vec<ExplorationEvent>>,
}

impl RecordingEvents {
    pub fn count(&self, kind: &str) -> usize {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.kind() == kind)
            .count()
    }

    pub fn kinds(&self) -> Vec<String> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .map(|e| e.kind().to_string())
            .collect()
    }

    pub fn events(&self) -> Vec<ExplorationEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl EventSink for RecordingEvents {
    fn emit(&self, event: ExplorationEvent) {
        self.events.lock().unwrap().push(event);
    }
}

// ==================== Harness ====================

/// A session with one page popped off the queue, ready for enrichment.
pub fn session_with_page(url: &str) -> (ExplorationSession, String) {
    let mut session = ExplorationSession::new(SessionMetadata::new(
        USER,
        "find pricing",
        url,
        false,
        10,
    ));
    session.enqueue(url, 1, None);
    let key = session.pop_next().unwrap();
    session.page_mut(&key).unwrap().mark_in_progress();
    (session, key)
}

pub struct Harness {
    pub browser: Arc<ScriptedBrowser>,
    pub decisions: Arc<ScriptedDecisions>,
    pub chat: Arc<ScriptedChat>,
    pub enrichment: Arc<CountingEnrichment>,
    pub store: Arc<RecordingStore>,
    pub registry: Arc<FakeRegistry>,
    pub events: Arc<RecordingEvents>,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            browser: Arc::new(ScriptedBrowser::default()),
            decisions: Arc::new(ScriptedDecisions::default()),
            chat: Arc::new(ScriptedChat::default()),
            enrichment: Arc::new(CountingEnrichment::with_delay(Duration::ZERO)),
            store: Arc::new(RecordingStore::default()),
            registry: Arc::new(FakeRegistry::default()),
            events: Arc::new(RecordingEvents::default()),
        }
    }

    pub fn deps(&self) -> Collaborators {
        Collaborators {
            browser: self.browser.clone(),
            decision: self.decisions.clone(),
            chat: self.chat.clone(),
            enrichment: self.enrichment.clone(),
            store: self.store.clone(),
            registry: self.registry.clone(),
            events: self.events.clone(),
        }
    }

    pub fn engine(&self) -> Arc<ExplorationEngine> {
        self.build(|c| c, |p| p)
    }

    pub fn engine_with(
        &self,
        configure: impl FnOnce(ExplorationConfig) -> ExplorationConfig,
    ) -> Arc<ExplorationEngine> {
        self.build(configure, |p| p)
    }

    pub fn engine_with_params(
        &self,
        configure: impl FnOnce(ExecutionParams) -> ExecutionParams,
    ) -> Arc<ExplorationEngine> {
        self.build(|c| c, configure)
    }

    pub fn controller(&self) -> ExplorationController {
        ExplorationController::new(self.deps(), ExecutionParams::default())
    }

    pub fn registry_deactivate(&self) {
        self.registry.deactivate(USER);
    }

    fn build(
        &self,
        configure: impl FnOnce(ExplorationConfig) -> ExplorationConfig,
        tune: impl FnOnce(ExecutionParams) -> ExecutionParams,
    ) -> Arc<ExplorationEngine> {
        self.registry.activate(USER);
        let config = configure(ExplorationConfig::new(
            USER,
            "find pricing",
            "https://example.com",
        ));
        Arc::new(ExplorationEngine::new(
            config,
            tune(ExecutionParams::default()),
            self.deps(),
        ))
    }
}
