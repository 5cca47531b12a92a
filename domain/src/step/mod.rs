//! Executed steps and the result markers they carry.
//!
//! An [`ExecutedStep`] is the immutable record of one tool dispatch. Its
//! `result` string is fed back to the decision collaborator verbatim, so
//! outcomes that matter for the next decision (URL change, queueing,
//! skipped input) are embedded as machine-parseable markers (see [`markers`]).

pub mod markers;
pub mod navigation;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The tool a step ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepTool {
    Act,
    RequestInput,
    Standby,
}

impl StepTool {
    pub fn as_str(&self) -> &str {
        match self {
            StepTool::Act => "act",
            StepTool::RequestInput => "request_input",
            StepTool::Standby => "standby",
        }
    }
}

impl std::fmt::Display for StepTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Record of a single dispatched tool (immutable once recorded).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutedStep {
    pub step_number: u32,
    pub tool: StepTool,
    pub instruction: String,
    pub success: bool,
    pub result: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_changed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_url: Option<String>,
    #[serde(default)]
    pub objective_achieved: bool,
    /// Keys filled by a `request_input` step
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub input_keys: Vec<String>,
    pub recorded_at: DateTime<Utc>,
}

impl ExecutedStep {
    pub fn new(
        step_number: u32,
        tool: StepTool,
        instruction: impl Into<String>,
        success: bool,
        result: impl Into<String>,
    ) -> Self {
        Self {
            step_number,
            tool,
            instruction: instruction.into(),
            success,
            result: result.into(),
            url_changed: None,
            new_url: None,
            objective_achieved: false,
            input_keys: Vec::new(),
            recorded_at: Utc::now(),
        }
    }

    /// Failed step with the given error text as result.
    pub fn failed(
        step_number: u32,
        tool: StepTool,
        instruction: impl Into<String>,
        error: impl std::fmt::Display,
    ) -> Self {
        Self::new(step_number, tool, instruction, false, format!("Error: {}", error))
    }

    pub fn with_url_change(mut self, changed: bool, new_url: Option<String>) -> Self {
        self.url_changed = Some(changed);
        self.new_url = new_url;
        self
    }

    pub fn with_objective_achieved(mut self, achieved: bool) -> Self {
        self.objective_achieved = achieved;
        self
    }

    pub fn with_input_keys(mut self, keys: Vec<String>) -> Self {
        self.input_keys = keys;
        self
    }
}
