//! Exploration controller
//!
//! Owns one [`ExplorationEngine`] per user and maps the external command
//! surface (start, stop, input, chat, recover) onto it.

use crate::config::{ExecutionParams, ExplorationConfig};
use crate::use_cases::explore::{Collaborators, ExplorationEngine, ExploreError};
use crate::use_cases::input_broker::InputResponse;
use futures::future::join_all;
use scout_domain::{ChatDecision, PageStatus, parse_http_url};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

pub struct ExplorationController {
    deps: Collaborators,
    params: ExecutionParams,
    sessions: Mutex<HashMap<String, Arc<ExplorationEngine>>>,
}

impl ExplorationController {
    pub fn new(deps: Collaborators, params: ExecutionParams) -> Self {
        Self {
            deps,
            params,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Start a new exploration. A running session for the same user is
    /// stopped first.
    pub async fn start(
        &self,
        config: ExplorationConfig,
    ) -> Result<Arc<ExplorationEngine>, ExploreError> {
        let start_url = parse_http_url(&config.start_url)?;
        let config = ExplorationConfig {
            start_url: start_url.clone(),
            ..config
        };
        let user_name = config.user_name.clone();

        let previous = self.sessions.lock().await.remove(&user_name);
        if let Some(previous) = previous {
            info!("Replacing running exploration for {}", user_name);
            previous.shutdown();
            previous.wait().await;
        }

        self.deps.registry.activate(&user_name);
        let engine = Arc::new(ExplorationEngine::new(
            config,
            self.params.clone(),
            self.deps.clone(),
        ));
        engine
            .enqueue(&start_url, self.params.start_priority, None)
            .await;
        engine.persist_session().await;
        engine.spawn_run().await;
        info!("Started exploration for {} at {}", user_name, start_url);

        self.sessions
            .lock()
            .await
            .insert(user_name, engine.clone());
        Ok(engine)
    }

    /// Stop a session and wait for its loop to finalize.
    ///
    /// Returns `false` when the user has no session.
    pub async fn stop(&self, user_name: &str) -> bool {
        let Some(engine) = self.sessions.lock().await.remove(user_name) else {
            return false;
        };
        engine.shutdown();
        let outcome = engine.wait().await;
        info!("Stopped exploration for {}: {:?}", user_name, outcome);
        true
    }

    /// Stop every session (process shutdown).
    pub async fn stop_all(&self) {
        let engines: Vec<_> = self.sessions.lock().await.drain().map(|(_, e)| e).collect();
        for engine in &engines {
            engine.shutdown();
        }
        join_all(engines.iter().map(|e| e.wait())).await;
    }

    /// Answer the pending `request_input` of a session.
    ///
    /// Returns `false` when nothing is waiting.
    pub async fn submit_user_input(&self, user_name: &str, response: InputResponse) -> bool {
        match self.engine(user_name).await {
            Some(engine) => engine.inputs().submit(response),
            None => false,
        }
    }

    pub async fn send_chat_message(
        &self,
        user_name: &str,
        text: &str,
    ) -> Result<ChatDecision, ExploreError> {
        let engine = self
            .engine(user_name)
            .await
            .ok_or_else(|| ExploreError::NoSession(user_name.to_string()))?;
        engine.handle_chat_message(text).await
    }

    pub async fn engine(&self, user_name: &str) -> Option<Arc<ExplorationEngine>> {
        self.sessions.lock().await.get(user_name).cloned()
    }

    /// Resume a persisted session after a restart.
    ///
    /// Uses the stored checkpoint, or one derived from the persisted queue
    /// when the process died without one. Returns `None` when there is
    /// nothing to resume.
    pub async fn recover(
        &self,
        user_name: &str,
    ) -> Result<Option<Arc<ExplorationEngine>>, ExploreError> {
        let Some(mut session) = self.deps.store.load_session(user_name).await? else {
            debug!("No persisted session for {}", user_name);
            return Ok(None);
        };
        if session.metadata.phase.is_completed() {
            info!("Persisted session for {} already completed", user_name);
            return Ok(None);
        }

        let checkpoint = match self.deps.store.load_checkpoint(user_name).await? {
            Some(checkpoint) => checkpoint,
            None => match session.checkpoint.clone() {
                Some(checkpoint) => checkpoint,
                None => {
                    if session.current_page.is_none() {
                        session.current_page = session
                            .pages
                            .values()
                            .find(|p| p.status == PageStatus::InProgress)
                            .map(|p| p.url_hash.clone());
                    }
                    session.snapshot_checkpoint()
                }
            },
        };
        if !checkpoint.should_resume() {
            return Ok(None);
        }

        let metadata = &session.metadata;
        let mut config =
            ExplorationConfig::new(&metadata.user_name, &metadata.objective, &metadata.start_url)
                .with_exploration(metadata.is_exploration)
                .with_max_pages(metadata.max_pages)
                .with_login(metadata.can_login);
        config.additional_context = metadata.additional_context.clone();

        let previous = self.sessions.lock().await.remove(user_name);
        if let Some(previous) = previous {
            previous.shutdown();
            previous.wait().await;
        }
        self.deps.registry.activate(user_name);
        let engine = Arc::new(ExplorationEngine::from_session(
            config,
            self.params.clone(),
            self.deps.clone(),
            session,
        ));
        if !engine.restore_from(&checkpoint).await {
            return Ok(None);
        }
        engine.persist_session().await;
        engine.spawn_run().await;
        info!("Recovered exploration for {}", user_name);

        self.sessions
            .lock()
            .await
            .insert(user_name.to_string(), engine.clone());
        Ok(Some(engine))
    }
}
