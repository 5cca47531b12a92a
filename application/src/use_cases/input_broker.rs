//! Input broker
//!
//! Single pending-request slot connecting `request_input` (which waits) to
//! the operator's `submit_user_input` command (which answers).

use std::collections::HashMap;
use std::sync::Mutex;
use tokio::sync::oneshot;

/// Operator answer to an input request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputResponse {
    Values(HashMap<String, String>),
    /// The operator declined; the decision collaborator must route around it
    Skipped,
}

#[derive(Default)]
pub struct InputBroker {
    pending: Mutex<Option<oneshot::Sender<InputResponse>>>,
}

impl InputBroker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a request slot. A stale pending request is dropped, which wakes
    /// its waiter with a closed channel.
    pub fn open(&self) -> oneshot::Receiver<InputResponse> {
        let (tx, rx) = oneshot::channel();
        if let Ok(mut pending) = self.pending.lock() {
            *pending = Some(tx);
        }
        rx
    }

    /// Deliver a response. Returns `false` when nothing is waiting.
    pub fn submit(&self, response: InputResponse) -> bool {
        let sender = match self.pending.lock() {
            Ok(mut pending) => pending.take(),
            Err(_) => None,
        };
        match sender {
            Some(tx) => tx.send(response).is_ok(),
            None => false,
        }
    }

    pub fn has_pending(&self) -> bool {
        self.pending
            .lock()
            .map(|p| p.as_ref().is_some_and(|tx| !tx.is_closed()))
            .unwrap_or(false)
    }

    /// Drop the pending request, if any.
    pub fn cancel(&self) {
        if let Ok(mut pending) = self.pending.lock() {
            pending.take();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submit_without_pending_request() {
        let broker = InputBroker::new();
        assert!(!broker.submit(InputResponse::Skipped));
    }

    #[tokio::test]
    async fn test_submit_reaches_waiter_once() {
        let broker = InputBroker::new();
        let rx = broker.open();
        assert!(broker.has_pending());

        let values = HashMap::from([("login_email".to_string(), "a@b.c".to_string())]);
        assert!(broker.submit(InputResponse::Values(values.clone())));
        assert!(!broker.submit(InputResponse::Skipped));
        assert_eq!(rx.await.unwrap(), InputResponse::Values(values));
    }

    #[tokio::test]
    async fn test_reopen_drops_stale_request() {
        let broker = InputBroker::new();
        let stale = broker.open();
        let fresh = broker.open();
        assert!(stale.await.is_err());

        assert!(broker.submit(InputResponse::Skipped));
        assert_eq!(fresh.await.unwrap(), InputResponse::Skipped);
    }

    #[test]
    fn test_submit_after_waiter_gone() {
        let broker = InputBroker::new();
        drop(broker.open());
        assert!(!broker.has_pending());
        assert!(!broker.submit(InputResponse::Skipped));
    }
}
