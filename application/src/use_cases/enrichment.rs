//! Background enrichment coordinator
//!
//! Runs the enrichment collaborator for a page either in the background
//! (fire-and-forget after an action) or inline at page completion. At most
//! one run per `url_hash` is live at any time: a page is "being enriched"
//! exactly when a live task handle is stored for it.

use crate::ports::enrichment::{EnrichmentError, EnrichmentPort, EnrichmentRequest};
use crate::ports::event_sink::{EventPayload, EventSink, ExplorationEvent};
use crate::ports::session_store::SessionStorePort;
use scout_domain::{EnrichmentArtifact, ExplorationSession, same_page};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

pub struct EnrichmentCoordinator {
    inner: Arc<EnrichmentRunner>,
    tasks: Mutex<HashMap<String, JoinHandle<()>>>,
}

struct EnrichmentRunner {
    user_name: String,
    port: Arc<dyn EnrichmentPort>,
    store: Arc<dyn SessionStorePort>,
    events: Arc<dyn EventSink>,
    session: Arc<tokio::sync::Mutex<ExplorationSession>>,
    artifacts: tokio::sync::Mutex<HashMap<String, EnrichmentArtifact>>,
}

impl EnrichmentCoordinator {
    pub fn new(
        user_name: impl Into<String>,
        port: Arc<dyn EnrichmentPort>,
        store: Arc<dyn SessionStorePort>,
        events: Arc<dyn EventSink>,
        session: Arc<tokio::sync::Mutex<ExplorationSession>>,
    ) -> Self {
        Self {
            inner: Arc::new(EnrichmentRunner {
                user_name: user_name.into(),
                port,
                store,
                events,
                session,
                artifacts: tokio::sync::Mutex::new(HashMap::new()),
            }),
            tasks: Mutex::new(HashMap::new()),
        }
    }

    /// Start a background run unless one is already live for this page.
    ///
    /// Returns whether a run was started. Failures are logged only.
    pub fn trigger(&self, url_hash: &str) -> bool {
        let Ok(mut tasks) = self.tasks.lock() else {
            return false;
        };
        if tasks.get(url_hash).is_some_and(|h| !h.is_finished()) {
            debug!("Enrichment already running for {}", url_hash);
            return false;
        }

        let runner = self.inner.clone();
        let key = url_hash.to_string();
        let handle = tokio::spawn(async move {
            if let Err(e) = runner.run(&key).await {
                warn!("Background enrichment for {} failed: {}", key, e);
            }
        });
        tasks.insert(url_hash.to_string(), handle);
        true
    }

    /// Blocking completion-time pass.
    ///
    /// Waits for a live background run to finish, then runs once more with
    /// the page's final state.
    pub async fn complete(&self, url_hash: &str) -> Result<EnrichmentArtifact, EnrichmentError> {
        let running = self.tasks.lock().ok().and_then(|mut t| t.remove(url_hash));
        if let Some(handle) = running
            && let Err(e) = handle.await
        {
            warn!("Background enrichment task for {} ended abnormally: {}", url_hash, e);
        }
        self.inner.run(url_hash).await
    }

    pub fn is_running(&self, url_hash: &str) -> bool {
        self.tasks
            .lock()
            .map(|t| t.get(url_hash).is_some_and(|h| !h.is_finished()))
            .unwrap_or(false)
    }

    pub async fn artifact(&self, url_hash: &str) -> Option<EnrichmentArtifact> {
        self.inner.artifacts.lock().await.get(url_hash).cloned()
    }

    /// Abort every background run (session stopped).
    pub fn abort_all(&self) {
        if let Ok(mut tasks) = self.tasks.lock() {
            for (_, handle) in tasks.drain() {
                handle.abort();
            }
        }
    }
}

impl EnrichmentRunner {
    async fn run(&self, url_hash: &str) -> Result<EnrichmentArtifact, EnrichmentError> {
        let previous = self.artifacts.lock().await.get(url_hash).cloned();
        let request = {
            let session = self.session.lock().await;
            let page = session.page(url_hash).ok_or_else(|| {
                EnrichmentError::TaskFailed(format!("unknown page {}", url_hash))
            })?;
            EnrichmentRequest {
                user_name: self.user_name.clone(),
                url: page.url.clone(),
                url_hash: page.url_hash.clone(),
                screenshots: page.screenshots.clone(),
                steps: page.executed_steps.clone(),
                actions: session
                    .action_history
                    .iter()
                    .filter(|a| same_page(&a.source_url, &page.url))
                    .cloned()
                    .collect(),
                previous: previous.clone(),
            }
        };
        let url = request.url.clone();

        self.events.emit(ExplorationEvent::new(
            &self.user_name,
            EventPayload::EnrichmentStarted {
                url: url.clone(),
                url_hash: url_hash.to_string(),
            },
        ));

        let artifact = self.port.enrich(request).await?.succeeding(previous.as_ref());

        self.artifacts
            .lock()
            .await
            .insert(url_hash.to_string(), artifact.clone());
        if let Err(e) = self.store.save_enrichment(&self.user_name, &artifact).await {
            warn!("Failed to persist enrichment for {}: {}", url_hash, e);
        }
        self.events.emit(ExplorationEvent::new(
            &self.user_name,
            EventPayload::EnrichmentUpdated {
                url,
                artifact: artifact.clone(),
            },
        ));
        Ok(artifact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::use_cases::test_support::{
        CountingEnrichment, RecordingEvents, RecordingStore, session_with_page,
    };
    use std::time::Duration;

    fn coordinator(
        port: Arc<CountingEnrichment>,
        events: Arc<RecordingEvents>,
    ) -> (EnrichmentCoordinator, String) {
        let (session, key) = session_with_page("https://example.com/");
        let coordinator = EnrichmentCoordinator::new(
            "alice",
            port,
            Arc::new(RecordingStore::default()),
            events,
            Arc::new(tokio::sync::Mutex::new(session)),
        );
        (coordinator, key)
    }

    #[tokio::test]
    async fn test_two_triggers_in_same_tick_run_once() {
        let port = Arc::new(CountingEnrichment::with_delay(Duration::from_millis(50)));
        let (coordinator, key) = coordinator(port.clone(), Arc::new(RecordingEvents::default()));

        assert!(coordinator.trigger(&key));
        assert!(!coordinator.trigger(&key));
        assert!(coordinator.is_running(&key));

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(port.calls(), 1);
        assert!(!coordinator.is_running(&key));
    }

    #[tokio::test]
    async fn test_finished_run_allows_new_trigger() {
        let port = Arc::new(CountingEnrichment::with_delay(Duration::ZERO));
        let (coordinator, key) = coordinator(port.clone(), Arc::new(RecordingEvents::default()));

        assert!(coordinator.trigger(&key));
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(coordinator.trigger(&key));
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(port.calls(), 2);
    }

    #[tokio::test]
    async fn test_complete_waits_for_background_run() {
        let port = Arc::new(CountingEnrichment::with_delay(Duration::from_millis(30)));
        let events = Arc::new(RecordingEvents::default());
        let (coordinator, key) = coordinator(port.clone(), events.clone());

        coordinator.trigger(&key);
        let artifact = coordinator.complete(&key).await.unwrap();

        assert_eq!(port.calls(), 2);
        assert_eq!(port.max_concurrent(), 1);
        assert_eq!(artifact.revision, 2);
        assert_eq!(coordinator.artifact(&key).await.unwrap().revision, 2);
        assert_eq!(events.count("enrichment_updated"), 2);
    }

    #[tokio::test]
    async fn test_background_failure_is_swallowed() {
        let port = Arc::new(CountingEnrichment::failing());
        let (coordinator, key) = coordinator(port.clone(), Arc::new(RecordingEvents::default()));

        coordinator.trigger(&key);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(port.calls(), 1);
        assert!(coordinator.artifact(&key).await.is_none());
        assert!(coordinator.complete(&key).await.is_err());
    }
}
