//! Chat decision service adapter (`POST /classify`).

use super::client::{HttpError, JsonClient};
use async_trait::async_trait;
use scout_application::{ChatContext, ChatDecisionPort, ChatError};
use scout_domain::{ChatDecision, DomainError, parse_chat_decision, parse_chat_decision_text};
use serde_json::{Value, json};

pub struct HttpChatClassifier {
    client: JsonClient,
}

impl HttpChatClassifier {
    pub fn new(client: JsonClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ChatDecisionPort for HttpChatClassifier {
    async fn classify(&self, context: &ChatContext) -> Result<ChatDecision, ChatError> {
        let value = self
            .client
            .post("classify", &chat_request(context))
            .await
            .map_err(|e: HttpError| ChatError::RequestFailed(e.to_string()))?;
        Ok(chat_from_response(&value)?)
    }
}

fn chat_request(ctx: &ChatContext) -> Value {
    let pages: Vec<Value> = ctx
        .pages
        .iter()
        .map(|page| {
            json!({
                "url": page.url,
                "urlHash": page.url_hash,
                "status": page.status,
                "stepsExecuted": page.executed_steps.len(),
            })
        })
        .collect();
    json!({
        "userName": ctx.user_name,
        "message": ctx.message,
        "objective": ctx.objective,
        "currentUrl": ctx.current_url,
        "pages": pages,
    })
}

fn chat_from_response(value: &Value) -> Result<ChatDecision, DomainError> {
    match value.get("text").and_then(Value::as_str) {
        Some(text) if value.get("requestType").is_none() => parse_chat_decision_text(text),
        _ => parse_chat_decision(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scout_domain::{ChatRequestType, PageRecord};

    #[test]
    fn test_object_and_text_responses() {
        let object = json!({
            "requestType": "exploration",
            "targetUrl": "https://example.com/careers",
            "response": "Opening careers"
        });
        let decision = chat_from_response(&object).unwrap();
        assert_eq!(decision.request_type, ChatRequestType::Exploration);
        assert_eq!(
            decision.navigation_target(),
            Some("https://example.com/careers")
        );

        let text = json!({ "text": "{\"requestType\":\"question\",\"response\":\"$10\"}" });
        assert_eq!(
            chat_from_response(&text).unwrap(),
            ChatDecision::question("$10")
        );
    }

    #[test]
    fn test_missing_type_is_invalid() {
        assert!(chat_from_response(&json!({ "response": "hi" })).is_err());
    }

    #[test]
    fn test_request_lists_pages() {
        let ctx = ChatContext {
            user_name: "alice".to_string(),
            message: "where is pricing?".to_string(),
            objective: "find pricing".to_string(),
            current_url: Some("https://example.com/".to_string()),
            pages: vec![PageRecord::new("https://example.com/pricing", 2, None)],
        };

        let body = chat_request(&ctx);

        assert_eq!(body["pages"][0]["status"], "queued");
        assert_eq!(body["pages"][0]["url"], "https://example.com/pricing");
        assert_eq!(body["currentUrl"], "https://example.com/");
    }
}
