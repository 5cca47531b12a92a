//! Exploration defaults from TOML (`[exploration]` section)

use scout_application::{ExecutionParams, ExplorationConfig};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw exploration configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileExplorationConfig {
    /// Operator name used when the CLI does not pass one
    pub user_name: String,
    pub start_url: Option<String>,
    pub objective: Option<String>,
    pub is_exploration: bool,
    pub max_pages_to_explore: usize,
    pub additional_context: Option<String>,
    pub can_login: bool,
    /// Safety cap on decisions per page
    pub max_steps_per_page: usize,
    pub input_timeout_seconds: u64,
    pub max_standby_seconds: u32,
}

impl Default for FileExplorationConfig {
    fn default() -> Self {
        let params = ExecutionParams::default();
        Self {
            user_name: "operator".to_string(),
            start_url: None,
            objective: None,
            is_exploration: false,
            max_pages_to_explore: 10,
            additional_context: None,
            can_login: false,
            max_steps_per_page: params.max_steps_per_page,
            input_timeout_seconds: params.input_timeout.as_secs(),
            max_standby_seconds: params.max_standby_seconds,
        }
    }
}

impl FileExplorationConfig {
    pub fn execution_params(&self) -> ExecutionParams {
        ExecutionParams::default()
            .with_max_steps_per_page(self.max_steps_per_page)
            .with_input_timeout(Duration::from_secs(self.input_timeout_seconds))
            .with_max_standby_seconds(self.max_standby_seconds)
    }

    /// Session settings for a run; the arguments override the file values.
    pub fn session_config(
        &self,
        user_name: Option<&str>,
        objective: Option<&str>,
        start_url: Option<&str>,
    ) -> ExplorationConfig {
        let mut config = ExplorationConfig::new(
            user_name.unwrap_or(&self.user_name),
            objective.or(self.objective.as_deref()).unwrap_or_default(),
            start_url.or(self.start_url.as_deref()).unwrap_or_default(),
        )
        .with_exploration(self.is_exploration)
        .with_max_pages(self.max_pages_to_explore)
        .with_login(self.can_login);
        config.additional_context = self.additional_context.clone();
        config
    }
}
