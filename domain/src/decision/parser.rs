//! Validation of raw decision payloads.
//!
//! Collaborators answer with loosely shaped JSON (camelCase or snake_case
//! keys, sometimes wrapped in prose or a fenced block). Everything is
//! funnelled into the closed [`ToolDecision`] / [`ChatDecision`] types
//! here; unknown tool names are rejected rather than guessed.

use super::chat::{ChatDecision, ChatRequestType};
use super::tool_decision::{InputSpec, InputType, ToolAction, ToolDecision};
use crate::core::error::DomainError;
use serde_json::Value;

/// Parse a decision from collaborator response text.
///
/// Accepts a ` ```json ` fenced block, raw JSON, or the first balanced
/// `{...}` object embedded in prose.
pub fn parse_tool_decision_text(text: &str) -> Result<ToolDecision, DomainError> {
    let value = extract_json_object(text)
        .ok_or_else(|| DomainError::InvalidDecision("no JSON object found".to_string()))?;
    parse_tool_decision(&value)
}

/// Parse a decision from a JSON value.
pub fn parse_tool_decision(value: &Value) -> Result<ToolDecision, DomainError> {
    if !value.is_object() {
        return Err(DomainError::InvalidDecision(
            "decision is not an object".to_string(),
        ));
    }

    let tool = get_str(value, &["tool", "toolName", "tool_name"])
        .ok_or_else(|| DomainError::InvalidDecision("missing `tool`".to_string()))?;
    let instruction = get_str(value, &["instruction"]).unwrap_or_default();
    let reasoning = get_str(value, &["reasoning", "reason"]).unwrap_or_default();

    let action = match tool.trim().to_ascii_lowercase().as_str() {
        "act" => {
            if instruction.trim().is_empty() {
                return Err(DomainError::InvalidDecision(
                    "`act` requires an instruction".to_string(),
                ));
            }
            ToolAction::Act { instruction }
        }
        "request_input" | "requestinput" => {
            let inputs = parse_inputs(value)?;
            ToolAction::RequestInput {
                instruction,
                inputs,
            }
        }
        "standby" | "wait" => ToolAction::Standby {
            instruction,
            wait_seconds: get_u32(value, &["waitSeconds", "wait_seconds"]),
        },
        other => return Err(DomainError::UnknownTool(other.to_string())),
    };

    Ok(ToolDecision {
        action,
        reasoning,
        is_current_page_execution_completed: get_bool(
            value,
            &[
                "isCurrentPageExecutionCompleted",
                "is_current_page_execution_completed",
            ],
        )
        .unwrap_or(false),
        is_in_sensitive_flow: get_bool(value, &["isInSensitiveFlow", "is_in_sensitive_flow"]),
        objective_achieved: get_bool(value, &["objectiveAchieved", "objective_achieved"])
            .unwrap_or(false),
    })
}

/// Parse a chat classification from collaborator response text.
pub fn parse_chat_decision_text(text: &str) -> Result<ChatDecision, DomainError> {
    let value = extract_json_object(text)
        .ok_or_else(|| DomainError::InvalidDecision("no JSON object found".to_string()))?;
    parse_chat_decision(&value)
}

/// Parse a chat classification from a JSON value.
pub fn parse_chat_decision(value: &Value) -> Result<ChatDecision, DomainError> {
    if !value.is_object() {
        return Err(DomainError::InvalidDecision(
            "chat decision is not an object".to_string(),
        ));
    }
    let raw_type = get_str(value, &["requestType", "request_type", "type"])
        .ok_or_else(|| DomainError::InvalidDecision("missing `requestType`".to_string()))?;
    let request_type = raw_type
        .parse::<ChatRequestType>()
        .map_err(DomainError::InvalidDecision)?;

    Ok(ChatDecision {
        request_type,
        target_url: get_str(value, &["targetUrl", "target_url"]).filter(|s| !s.trim().is_empty()),
        needs_user_input: get_bool(value, &["needsUserInput", "needs_user_input"]).unwrap_or(false),
        response: get_str(value, &["response", "answer"]).unwrap_or_default(),
    })
}

fn parse_inputs(value: &Value) -> Result<Vec<InputSpec>, DomainError> {
    let mut inputs = Vec::new();

    if let Some(list) = value.get("inputs").and_then(Value::as_array) {
        for item in list {
            let key = get_str(item, &["key", "inputKey", "input_key"]).ok_or_else(|| {
                DomainError::InvalidDecision("input entry without `key`".to_string())
            })?;
            let input_type = get_str(item, &["type", "inputType", "input_type"])
                .map(|t| InputType::parse_lossy(&t))
                .unwrap_or_default();
            let prompt = get_str(item, &["prompt", "inputPrompt", "input_prompt"])
                .unwrap_or_else(|| format!("Please provide {}", key));
            inputs.push(InputSpec::new(key, input_type, prompt));
        }
    } else if let Some(key) = get_str(value, &["inputKey", "input_key"]) {
        let input_type = get_str(value, &["inputType", "input_type"])
            .map(|t| InputType::parse_lossy(&t))
            .unwrap_or_default();
        let prompt = get_str(value, &["inputPrompt", "input_prompt"])
            .unwrap_or_else(|| format!("Please provide {}", key));
        inputs.push(InputSpec::new(key, input_type, prompt));
    }

    if inputs.is_empty() {
        return Err(DomainError::InvalidDecision(
            "`request_input` requires at least one input".to_string(),
        ));
    }
    Ok(inputs)
}

fn get_str(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| match value.get(*k) {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn get_bool(value: &Value, keys: &[&str]) -> Option<bool> {
    keys.iter().find_map(|k| match value.get(*k) {
        Some(Value::Bool(b)) => Some(*b),
        Some(Value::String(s)) => match s.to_ascii_lowercase().as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        _ => None,
    })
}

fn get_u32(value: &Value, keys: &[&str]) -> Option<u32> {
    keys.iter().find_map(|k| match value.get(*k) {
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f.round() as u64))
            .and_then(|n| u32::try_from(n).ok()),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

/// Find a JSON object in free text.
fn extract_json_object(text: &str) -> Option<Value> {
    let trimmed = text.trim();

    // ```json ... ``` block
    let mut in_block = false;
    let mut block = String::new();
    for line in trimmed.lines() {
        let l = line.trim();
        if !in_block && (l == "```json" || l == "```") {
            in_block = true;
            block.clear();
        } else if in_block && l == "```" {
            if let Ok(v @ Value::Object(_)) = serde_json::from_str::<Value>(&block) {
                return Some(v);
            }
            in_block = false;
        } else if in_block {
            block.push_str(line);
            block.push('\n');
        }
    }

    if let Ok(v @ Value::Object(_)) = serde_json::from_str::<Value>(trimmed) {
        return Some(v);
    }

    // First balanced {...} outside of strings
    let start = trimmed.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (i, c) in trimmed[start..].char_indices() {
        if in_string {
            match c {
                '\\' if !escaped => escaped = true,
                '"' if !escaped => in_string = false,
                _ => escaped = false,
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    let candidate = &trimmed[start..start + i + 1];
                    return serde_json::from_str(candidate).ok();
                }
            }
            _ => {}
        }
    }
    None
}
