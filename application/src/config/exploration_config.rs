//! Per-session exploration settings (the `start` command payload).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplorationConfig {
    /// Correlates events, registry liveness and persisted files
    pub user_name: String,
    pub objective: String,
    pub start_url: String,
    /// Pure exploration: an achieved objective does not end the session
    pub is_exploration: bool,
    pub max_pages_to_explore: usize,
    pub additional_context: Option<String>,
    /// Whether the decision collaborator may attempt authentication flows
    pub can_login: bool,
}

impl ExplorationConfig {
    pub fn new(
        user_name: impl Into<String>,
        objective: impl Into<String>,
        start_url: impl Into<String>,
    ) -> Self {
        Self {
            user_name: user_name.into(),
            objective: objective.into(),
            start_url: start_url.into(),
            is_exploration: false,
            max_pages_to_explore: 10,
            additional_context: None,
            can_login: false,
        }
    }

    // ==================== Builder Methods ====================

    pub fn with_exploration(mut self, is_exploration: bool) -> Self {
        self.is_exploration = is_exploration;
        self
    }

    pub fn with_max_pages(mut self, max: usize) -> Self {
        self.max_pages_to_explore = max;
        self
    }

    pub fn with_additional_context(mut self, context: impl Into<String>) -> Self {
        self.additional_context = Some(context.into());
        self
    }

    pub fn with_login(mut self, can_login: bool) -> Self {
        self.can_login = can_login;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let config = ExplorationConfig::new("alice", "find pricing", "https://example.com")
            .with_exploration(true)
            .with_max_pages(3)
            .with_additional_context("prefer the annual plan")
            .with_login(true);

        assert_eq!(config.user_name, "alice");
        assert!(config.is_exploration);
        assert_eq!(config.max_pages_to_explore, 3);
        assert_eq!(
            config.additional_context.as_deref(),
            Some("prefer the annual plan")
        );
        assert!(config.can_login);
    }
}
