//! Browser automation sidecar adapter
//!
//! | Port call        | Request                              | Response                     |
//! |------------------|--------------------------------------|------------------------------|
//! | `navigate`       | `POST /navigate {url}`               | any                          |
//! | `act`            | `POST /act {instruction}`            | `{success, message}`         |
//! | `current_url`    | `GET /url`                           | `{url}`                      |
//! | `screenshot`     | `POST /screenshot {fullPage}`        | `{data}` (base64 PNG)        |

use super::client::{HttpError, JsonClient, decode_png};
use async_trait::async_trait;
use scout_application::{ActOutcome, BrowserError, BrowserPort};
use serde_json::{Value, json};

pub struct HttpBrowser {
    client: JsonClient,
}

impl HttpBrowser {
    pub fn new(client: JsonClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl BrowserPort for HttpBrowser {
    async fn navigate(&self, url: &str) -> Result<(), BrowserError> {
        self.client
            .post("navigate", &json!({ "url": url }))
            .await
            .map(|_| ())
            .map_err(|e| browser_error(e, BrowserError::Navigation))
    }

    async fn act(&self, instruction: &str) -> Result<ActOutcome, BrowserError> {
        let value = self
            .client
            .post("act", &json!({ "instruction": instruction }))
            .await
            .map_err(|e| browser_error(e, BrowserError::Action))?;
        Ok(act_outcome(&value))
    }

    async fn current_url(&self) -> Result<String, BrowserError> {
        let value = self
            .client
            .get("url")
            .await
            .map_err(|e| browser_error(e, BrowserError::Other))?;
        value
            .get("url")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| BrowserError::Other("response has no `url`".to_string()))
    }

    async fn screenshot(&self, full_page: bool) -> Result<Vec<u8>, BrowserError> {
        let value = self
            .client
            .post("screenshot", &json!({ "fullPage": full_page }))
            .await
            .map_err(|e| browser_error(e, BrowserError::Screenshot))?;
        let data = value
            .get("data")
            .and_then(Value::as_str)
            .ok_or_else(|| BrowserError::Screenshot("response has no `data`".to_string()))?;
        decode_png(data).map_err(BrowserError::Screenshot)
    }
}

/// Missing `success` counts as success only when there is no `error`.
fn act_outcome(value: &Value) -> ActOutcome {
    let error = value.get("error").and_then(Value::as_str);
    let success = value
        .get("success")
        .and_then(Value::as_bool)
        .unwrap_or(error.is_none());
    let message = value
        .get("message")
        .and_then(Value::as_str)
        .or(error)
        .unwrap_or(if success { "done" } else { "action failed" })
        .to_string();
    ActOutcome { success, message }
}

fn browser_error(e: HttpError, kind: fn(String) -> BrowserError) -> BrowserError {
    if e.is_timeout() {
        return BrowserError::Timeout;
    }
    match e {
        HttpError::Transport { .. } | HttpError::Build(_) => BrowserError::Connection(e.to_string()),
        other => kind(other.to_string()),
    }
}
