//! Composite event sink: delegates to multiple sinks.
//!
//! Used to fan events out to both the console presenter channel and the
//! JSONL event log.
//!
//! ```text
//! ExplorationEngine ── emit(event) ──> CompositeEventSink
//!                                            |
//!                     +----------------------+-------------------+
//!                     |                                          |
//!             ChannelEventSink                           JsonlEventLog
//!             → console presenter                        → events.jsonl
//! ```

use super::event_sink::{EventSink, ExplorationEvent};
use std::sync::Arc;

pub struct CompositeEventSink {
    delegates: Vec<Arc<dyn EventSink>>,
}

impl CompositeEventSink {
    pub fn new(delegates: Vec<Arc<dyn EventSink>>) -> Self {
        Self { delegates }
    }
}

impl EventSink for CompositeEventSink {
    fn emit(&self, event: ExplorationEvent) {
        for d in &self.delegates {
            d.emit(event.clone());
        }
    }
}
