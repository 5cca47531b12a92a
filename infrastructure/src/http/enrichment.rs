//! Enrichment service adapter (`POST /enrich`).
//!
//! The service returns the interaction-graph document for the page, either
//! bare or as `{"content": ...}`. Revision numbering stays with the
//! coordinator.

use super::client::JsonClient;
use async_trait::async_trait;
use scout_application::{EnrichmentError, EnrichmentPort, EnrichmentRequest};
use scout_domain::EnrichmentArtifact;
use serde_json::{Value, json};

pub struct HttpEnrichmentProvider {
    client: JsonClient,
}

impl HttpEnrichmentProvider {
    pub fn new(client: JsonClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl EnrichmentPort for HttpEnrichmentProvider {
    async fn enrich(&self, request: EnrichmentRequest) -> Result<EnrichmentArtifact, EnrichmentError> {
        let value = self
            .client
            .post("enrich", &enrichment_request(&request))
            .await
            .map_err(|e| EnrichmentError::RequestFailed(e.to_string()))?;
        artifact_from_response(&request, value)
    }
}

fn enrichment_request(request: &EnrichmentRequest) -> Value {
    let screenshots: Vec<Value> = request
        .screenshots
        .iter()
        .map(|s| {
            json!({
                "stepNumber": s.step_number,
                "kind": s.kind,
                "location": s.location,
            })
        })
        .collect();
    json!({
        "userName": request.user_name,
        "url": request.url,
        "urlHash": request.url_hash,
        "screenshots": screenshots,
        "steps": request.steps,
        "actions": request.actions,
        "previous": request.previous.as_ref().map(|a| &a.content),
    })
}

fn artifact_from_response(
    request: &EnrichmentRequest,
    value: Value,
) -> Result<EnrichmentArtifact, EnrichmentError> {
    let content = match value {
        Value::Object(mut map) if map.contains_key("content") => {
            map.remove("content").unwrap_or(Value::Null)
        }
        other => other,
    };
    if content.is_null() {
        return Err(EnrichmentError::InvalidArtifact(format!(
            "empty artifact for {}",
            request.url
        )));
    }
    let step_number = request
        .steps
        .iter()
        .map(|s| s.step_number)
        .max()
        .unwrap_or(0);
    Ok(EnrichmentArtifact::new(&request.url_hash, step_number, content))
}
