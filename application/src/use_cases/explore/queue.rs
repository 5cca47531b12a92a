//! Queue engine: enqueue, run, finalize.

use super::{ExplorationEngine, PageOutcome, RunOutcome};
use crate::ports::event_sink::EventPayload;
use crate::use_cases::shared::{Suspension, SuspensionGate};
use scout_domain::{EnqueueOutcome, ExplorationCheckpoint, ExplorationPhase};
use tracing::{debug, info, warn};

impl ExplorationEngine {
    /// Queue a discovered page.
    ///
    /// No-op when the page is already known or the page cap is reached.
    /// Returns whether the page was actually enqueued.
    pub async fn enqueue(&self, url: &str, priority: u8, source_url: Option<&str>) -> bool {
        let outcome = self.session.lock().await.enqueue(url, priority, source_url);
        self.announce(&outcome, source_url, priority);
        outcome.is_enqueued()
    }

    /// Queue a page even if known or over the cap; a queued page is only
    /// re-prioritized.
    pub(super) async fn force_enqueue(
        &self,
        url: &str,
        priority: u8,
        source_url: Option<&str>,
    ) -> bool {
        let outcome = self
            .session
            .lock()
            .await
            .force_enqueue(url, priority, source_url);
        self.announce(&outcome, source_url, priority);
        outcome.is_enqueued()
    }

    fn announce(&self, outcome: &EnqueueOutcome, source_url: Option<&str>, priority: u8) {
        match outcome {
            EnqueueOutcome::Enqueued { url, url_hash } => {
                info!("Queued {} (priority {})", url, priority);
                self.emit(EventPayload::UrlDiscovered {
                    url: url.clone(),
                    url_hash: url_hash.clone(),
                    source_url: source_url.map(str::to_string),
                    priority,
                });
            }
            EnqueueOutcome::Requeued { url, .. } => {
                info!("Re-queued {} (priority {})", url, priority);
            }
            EnqueueOutcome::AlreadyKnown => {}
            EnqueueOutcome::MaxPagesReached => {
                debug!("Page cap reached; not queueing");
            }
        }
    }

    /// Process the queue until it is exhausted, the objective is achieved,
    /// the session stops, or a chat message pauses it.
    pub async fn run(&self, gate: &SuspensionGate) -> RunOutcome {
        loop {
            match gate.check() {
                Err(Suspension::Interrupted) => {
                    info!("Exploration paused for {}", self.config.user_name);
                    return RunOutcome::Paused;
                }
                Err(Suspension::Stopped) => {
                    info!("Session for {} is no longer active", self.config.user_name);
                    return self.finalize(false).await;
                }
                Ok(()) => {}
            }

            let (achieved, next) = {
                let mut session = self.session.lock().await;
                let achieved = session.metadata.objective_achieved;
                let next = if achieved { None } else { session.pop_next() };
                (achieved, next)
            };
            if achieved {
                return self.finalize(true).await;
            }
            let Some(key) = next else {
                return self.finalize(false).await;
            };

            if let PageOutcome::Suspended(reason) = self.process_page(gate, &key).await {
                debug!("Page {} suspended: {:?}", key, reason);
            }
        }
    }

    /// Persist final metadata, report totals and mark the session completed.
    pub(super) async fn finalize(&self, objective_achieved: bool) -> RunOutcome {
        let metadata = {
            let mut session = self.session.lock().await;
            session.complete(objective_achieved);
            session.metadata.clone()
        };
        self.persist_session().await;

        let duration = metadata.duration();
        info!(
            "Exploration finished for {}: {} pages discovered, {} actions executed in {}s (objective achieved: {})",
            metadata.user_name,
            metadata.total_pages_discovered,
            metadata.total_actions_executed,
            duration.num_seconds(),
            metadata.objective_achieved
        );
        self.emit(EventPayload::SessionCompleted {
            objective_achieved: metadata.objective_achieved,
            total_pages_discovered: metadata.total_pages_discovered,
            total_actions_executed: metadata.total_actions_executed,
            duration_seconds: duration.num_seconds(),
        });

        RunOutcome::Finished {
            objective_achieved: metadata.objective_achieved,
        }
    }

    /// Rebuild the queue from a checkpoint and mark the exploration active.
    ///
    /// Returns `false` (and changes nothing) when the checkpoint says the
    /// exploration had already completed.
    pub(crate) async fn restore_from(&self, checkpoint: &ExplorationCheckpoint) -> bool {
        if !checkpoint.should_resume() {
            return false;
        }
        let mut session = self.session.lock().await;
        if session.metadata.phase.is_completed() {
            warn!("Session already completed; ignoring resumable checkpoint");
            return false;
        }
        session.restore_queue(checkpoint);
        if session.requeue_interrupted(checkpoint) {
            debug!("Interrupted page returned to the head of the queue");
        }
        session.metadata.phase = ExplorationPhase::Active;
        true
    }
}
