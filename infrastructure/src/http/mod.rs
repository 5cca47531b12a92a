//! JSON-over-HTTP collaborator adapters
//!
//! Each adapter wraps a [`JsonClient`] bound to the collaborator's base URL.
//! Screenshots travel base64-encoded.

mod browser;
mod chat;
mod client;
mod decision;
mod enrichment;

pub use browser::HttpBrowser;
pub use chat::HttpChatClassifier;
pub use client::{HttpError, JsonClient, decode_png, encode_png};
pub use decision::HttpDecisionProvider;
pub use enrichment::HttpEnrichmentProvider;
