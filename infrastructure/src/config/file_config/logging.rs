//! Logging configuration from TOML (`[logging]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// Directory for the rolling diagnostic log; none disables file logging
    pub directory: Option<PathBuf>,
    pub file_prefix: String,
    /// Write every exploration event to `<directory>/<user>.events.jsonl`,
    /// or to `events.jsonl` in the session directory when no directory is set
    pub event_log: bool,
}

impl Default for FileLoggingConfig {
    fn default() -> Self {
        Self {
            directory: None,
            file_prefix: "scout.log".to_string(),
            event_log: true,
        }
    }
}
