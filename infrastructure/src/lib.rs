//! Infrastructure layer for scout
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod config;
pub mod http;
pub mod logging;
pub mod registry;
pub mod storage;

// Re-export commonly used types
pub use config::{
    ConfigLoader, FileCollaboratorsConfig, FileConfig, FileExplorationConfig, FileLoggingConfig,
    FileStorageConfig,
};
pub use http::{
    HttpBrowser, HttpChatClassifier, HttpDecisionProvider, HttpEnrichmentProvider, HttpError,
    JsonClient,
};
pub use logging::JsonlEventLog;
pub use registry::InMemorySessionRegistry;
pub use storage::FileSessionStore;
