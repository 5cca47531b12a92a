//! Logging infrastructure: structured event logging.
//!
//! Provides [`JsonlEventLog`], a JSONL file writer that implements the
//! [`EventSink`](scout_application::EventSink) port.

mod jsonl_event_log;

pub use jsonl_event_log::JsonlEventLog;
