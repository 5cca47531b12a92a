//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use application types where appropriate.

mod collaborators;
mod exploration;
mod logging;
mod storage;

pub use collaborators::FileCollaboratorsConfig;
pub use exploration::FileExplorationConfig;
pub use logging::FileLoggingConfig;
pub use storage::FileStorageConfig;

use scout_domain::{ConfigIssue, ConfigIssueCode, parse_http_url};
use serde::{Deserialize, Serialize};

/// `max_standby_seconds` above this is reported as a warning.
const LONG_STANDBY_SECONDS: u32 = 300;

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Exploration defaults and loop parameters
    pub exploration: FileExplorationConfig,
    /// Collaborator endpoints
    pub collaborators: FileCollaboratorsConfig,
    /// Session persistence
    pub storage: FileStorageConfig,
    /// Diagnostic log file
    pub logging: FileLoggingConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        for (field, endpoint) in self.collaborators.endpoints() {
            if endpoint.trim().is_empty() {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::EmptyEndpoint,
                    format!("{} is empty", field),
                ));
            } else if let Err(e) = parse_http_url(endpoint) {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::InvalidEndpoint,
                    format!("{}: {}", field, e),
                ));
            }
        }

        let exploration = &self.exploration;
        if exploration.max_pages_to_explore == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::ZeroMaxPages,
                "exploration.max_pages_to_explore is 0; not even the start page would be queued",
            ));
        }
        if exploration.max_steps_per_page == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::ZeroStepCap,
                "exploration.max_steps_per_page is 0; no page would run a single step",
            ));
        }
        if let Some(start_url) = &exploration.start_url
            && let Err(e) = parse_http_url(start_url)
        {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::InvalidStartUrl,
                format!("exploration.start_url: {}", e),
            ));
        }
        if exploration.max_standby_seconds > LONG_STANDBY_SECONDS {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::LongStandby,
                format!(
                    "exploration.max_standby_seconds is {}; a single standby may block a page for a long time",
                    exploration.max_standby_seconds
                ),
            ));
        }

        issues
    }
}
