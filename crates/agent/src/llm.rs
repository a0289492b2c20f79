//! Completion transport. The trait is the seam the rest of the agent is
//! tested against; the HTTP implementation targets an inference-style
//! completion endpoint.

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use slotty_core::config::LlmConfig;
use slotty_core::errors::UpstreamError;

#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, UpstreamError>;
}

/// Client for a `POST {base_url}/inference` completion API.
pub struct HttpCompletionClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    max_tokens: u32,
    temperature: f32,
}

impl HttpCompletionClient {
    pub fn new(config: &LlmConfig) -> Result<Self, UpstreamError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|err| UpstreamError::Completion(err.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.as_ref().map(|key| key.expose_secret().to_string()),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }
}

/// Pulls the completion text out of the provider payload. Providers disagree
/// on nesting, so the known shapes are tried in order.
fn completion_text(payload: &Value) -> Option<String> {
    payload["output"]["choices"][0]["text"]
        .as_str()
        .or_else(|| payload["choices"][0]["text"].as_str())
        .or_else(|| payload["text"].as_str())
        .map(|text| text.to_string())
}

#[async_trait]
impl CompletionClient for HttpCompletionClient {
    async fn complete(&self, prompt: &str) -> Result<String, UpstreamError> {
        let body = CompletionRequest {
            model: &self.model,
            prompt,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        let mut request = self.client.post(format!("{}/inference", self.base_url)).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response =
            request.send().await.map_err(|err| UpstreamError::Completion(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!(event_name = "llm.completion_failed", %status, "completion request rejected");
            return Err(UpstreamError::Completion(format!("inference returned {status}")));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|err| UpstreamError::MalformedCompletion(err.to_string()))?;

        let text = completion_text(&payload).ok_or_else(|| {
            UpstreamError::MalformedCompletion("no completion text in payload".to_string())
        })?;

        debug!(event_name = "llm.completion", chars = text.len(), "completion received");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::completion_text;

    #[test]
    fn nested_output_choices_shape_is_preferred() {
        let payload = json!({"output": {"choices": [{"text": "{\"intent\": \"unknown\"}"}]}});
        assert_eq!(completion_text(&payload), Some("{\"intent\": \"unknown\"}".to_string()));
    }

    #[test]
    fn flat_choices_and_text_shapes_are_fallbacks() {
        let flat = json!({"choices": [{"text": "hello"}]});
        assert_eq!(completion_text(&flat), Some("hello".to_string()));

        let bare = json!({"text": "hello"});
        assert_eq!(completion_text(&bare), Some("hello".to_string()));
    }

    #[test]
    fn unknown_shapes_yield_nothing() {
        assert_eq!(completion_text(&json!({"result": "hello"})), None);
        assert_eq!(completion_text(&json!({"choices": []})), None);
    }
}
