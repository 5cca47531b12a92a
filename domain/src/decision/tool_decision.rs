//! The decision collaborator's output, as a closed tagged union.

use crate::step::StepTool;
use serde::{Deserialize, Serialize};

/// Kind of value requested from the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum InputType {
    #[default]
    Text,
    Email,
    Password,
    Otp,
    Phone,
    Number,
    Url,
}

impl InputType {
    pub fn as_str(&self) -> &str {
        match self {
            InputType::Text => "text",
            InputType::Email => "email",
            InputType::Password => "password",
            InputType::Otp => "otp",
            InputType::Phone => "phone",
            InputType::Number => "number",
            InputType::Url => "url",
        }
    }

    /// Parse leniently; unknown kinds fall back to [`InputType::Text`].
    pub fn parse_lossy(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "email" | "e-mail" => InputType::Email,
            "password" | "pass" | "secret" => InputType::Password,
            "otp" | "2fa" | "code" | "verification_code" => InputType::Otp,
            "phone" | "tel" => InputType::Phone,
            "number" | "numeric" => InputType::Number,
            "url" => InputType::Url,
            _ => InputType::Text,
        }
    }

    pub fn is_secret(&self) -> bool {
        matches!(self, InputType::Password | InputType::Otp)
    }
}

impl std::fmt::Display for InputType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One named value requested in a `request_input` step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputSpec {
    pub key: String,
    pub input_type: InputType,
    pub prompt: String,
}

impl InputSpec {
    pub fn new(key: impl Into<String>, input_type: InputType, prompt: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            input_type,
            prompt: prompt.into(),
        }
    }
}

/// The tool-specific part of a decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "tool", rename_all = "snake_case")]
pub enum ToolAction {
    /// Perform a free-text browser instruction
    Act { instruction: String },
    /// Ask the user for one or more values in a single round-trip
    RequestInput {
        instruction: String,
        inputs: Vec<InputSpec>,
    },
    /// Wait, e.g. for a page to settle or an email to arrive
    Standby {
        instruction: String,
        wait_seconds: Option<u32>,
    },
}

impl ToolAction {
    pub fn tool(&self) -> StepTool {
        match self {
            ToolAction::Act { .. } => StepTool::Act,
            ToolAction::RequestInput { .. } => StepTool::RequestInput,
            ToolAction::Standby { .. } => StepTool::Standby,
        }
    }

    pub fn instruction(&self) -> &str {
        match self {
            ToolAction::Act { instruction }
            | ToolAction::RequestInput { instruction, .. }
            | ToolAction::Standby { instruction, .. } => instruction,
        }
    }
}

/// Decision produced for one step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDecision {
    pub action: ToolAction,
    pub reasoning: String,
    /// Ends this page's step loop after the step is recorded
    pub is_current_page_execution_completed: bool,
    /// `None` when the collaborator did not say; leaves the flow state untouched
    pub is_in_sensitive_flow: Option<bool>,
    /// The collaborator expects this action to fulfil the objective
    #[serde(default)]
    pub objective_achieved: bool,
}

impl ToolDecision {
    pub fn new(action: ToolAction, reasoning: impl Into<String>) -> Self {
        Self {
            action,
            reasoning: reasoning.into(),
            is_current_page_execution_completed: false,
            is_in_sensitive_flow: None,
            objective_achieved: false,
        }
    }

    pub fn act(instruction: impl Into<String>) -> Self {
        Self::new(
            ToolAction::Act {
                instruction: instruction.into(),
            },
            "",
        )
    }

    pub fn request_input(instruction: impl Into<String>, inputs: Vec<InputSpec>) -> Self {
        Self::new(
            ToolAction::RequestInput {
                instruction: instruction.into(),
                inputs,
            },
            "",
        )
    }

    pub fn standby(instruction: impl Into<String>, wait_seconds: Option<u32>) -> Self {
        Self::new(
            ToolAction::Standby {
                instruction: instruction.into(),
                wait_seconds,
            },
            "",
        )
    }

    pub fn with_reasoning(mut self, reasoning: impl Into<String>) -> Self {
        self.reasoning = reasoning.into();
        self
    }

    pub fn completing_page(mut self) -> Self {
        self.is_current_page_execution_completed = true;
        self
    }

    pub fn achieving_objective(mut self) -> Self {
        self.objective_achieved = true;
        self
    }

    pub fn with_sensitive_flow(mut self, in_flow: bool) -> Self {
        self.is_in_sensitive_flow = Some(in_flow);
        self
    }

    pub fn tool(&self) -> StepTool {
        self.action.tool()
    }

    pub fn instruction(&self) -> &str {
        self.action.instruction()
    }
}
