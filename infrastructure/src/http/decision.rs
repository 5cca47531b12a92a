//! Decision service adapter
//!
//! `POST /decide` with the step context; the service answers with a
//! decision object, `{"decision": ...}`, `{"text": "..."}` (model output
//! with embedded JSON) or `null` when it has nothing to propose.

use super::client::{HttpError, JsonClient, encode_png};
use async_trait::async_trait;
use scout_application::{DecisionContext, DecisionError, DecisionPort};
use scout_domain::{DomainError, ToolDecision, parse_tool_decision, parse_tool_decision_text};
use serde_json::{Value, json};
use tracing::debug;

pub struct HttpDecisionProvider {
    client: JsonClient,
}

impl HttpDecisionProvider {
    pub fn new(client: JsonClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DecisionPort for HttpDecisionProvider {
    async fn decide(&self, context: &DecisionContext) -> Result<Option<ToolDecision>, DecisionError> {
        let value = self
            .client
            .post("decide", &decision_request(context))
            .await
            .map_err(decision_error)?;
        let decision = decision_from_response(&value)?;
        if let Some(decision) = &decision {
            debug!("Decision service chose {}", decision.tool());
        }
        Ok(decision)
    }
}

fn decision_request(ctx: &DecisionContext) -> Value {
    let conversation: Vec<Value> = ctx
        .conversation
        .iter()
        .map(|turn| {
            json!({
                "stepNumber": turn.step_number,
                "tool": turn.tool,
                "instruction": turn.instruction,
                "reasoning": turn.reasoning,
                "result": turn.result,
            })
        })
        .collect();
    let repeated: Vec<Value> = ctx
        .repeated_actions
        .iter()
        .map(|(instruction, count)| json!({ "instruction": instruction, "repeatCount": count }))
        .collect();

    json!({
        "screenshot": encode_png(&ctx.screenshot),
        "pageUrl": ctx.page_url,
        "objective": ctx.objective,
        "additionalContext": ctx.additional_context,
        "stepNumber": ctx.step_number,
        "conversation": conversation,
        "queuedUrls": ctx.queued_urls,
        "isExploration": ctx.is_exploration,
        "maxPagesReached": ctx.max_pages_reached,
        "canLogin": ctx.can_login,
        "userInputs": ctx.user_inputs,
        "flowContext": ctx.flow_context,
        "actionHistory": ctx.action_history,
        "repeatedActions": repeated,
    })
}

/// Unknown tool names and malformed payloads are rejected here.
fn decision_from_response(value: &Value) -> Result<Option<ToolDecision>, DomainError> {
    let payload = value.get("decision").unwrap_or(value);
    match payload {
        Value::Null => Ok(None),
        Value::String(text) => parse_tool_decision_text(text).map(Some),
        Value::Object(map) if map.len() == 1 && map.contains_key("text") => {
            match map.get("text").and_then(Value::as_str) {
                Some(text) => parse_tool_decision_text(text).map(Some),
                None => Ok(None),
            }
        }
        other => parse_tool_decision(other).map(Some),
    }
}

fn decision_error(e: HttpError) -> DecisionError {
    match e {
        HttpError::Transport { .. } | HttpError::Build(_) => DecisionError::Unavailable(e.to_string()),
        other => DecisionError::RequestFailed(other.to_string()),
    }
}
