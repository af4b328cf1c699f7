//! OpenAI-compatible chat completions client
//!
//! Also covers self-hosted and gateway deployments that speak the same
//! `/v1/chat/completions` dialect; the API key is optional for those.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use core_kernel::{DomainPort, PortError};
use domain_claims::ports::CompletionService;

use crate::{status_to_port_error, transport_to_port_error};

const DEFAULT_BASE_URL: &str = "http://localhost:11434";

#[derive(Serialize)]
struct OpenAiRequest {
    model: String,
    messages: Vec<OpenAiMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
struct OpenAiMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Deserialize)]
struct OpenAiChoice {
    message: OpenAiMessage,
}

pub struct OpenAiClient {
    base_url: String,
    model: String,
    api_key: Option<String>,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
    http_client: reqwest::Client,
}

impl OpenAiClient {
    pub fn new(base_url: Option<String>, model: String, api_key: Option<String>) -> Self {
        Self {
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model,
            api_key,
            temperature: None,
            max_tokens: None,
            http_client: reqwest::Client::new(),
        }
    }

    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    fn build_request_body(&self, prompt: &str) -> OpenAiRequest {
        OpenAiRequest {
            model: self.model.clone(),
            messages: vec![OpenAiMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }
}

impl DomainPort for OpenAiClient {}

#[async_trait]
impl CompletionService for OpenAiClient {
    async fn complete(&self, prompt: &str) -> Result<String, PortError> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        let body = self.build_request_body(prompt);

        let mut request = self.http_client.post(&url).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| transport_to_port_error(e, "openai"))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(status_to_port_error(status, "openai", &body_text));
        }

        let parsed: OpenAiResponse = response
            .json()
            .await
            .map_err(|e| PortError::internal(format!("failed to parse openai response: {e}")))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| PortError::internal("openai response had no choices"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_matches_openai_format() {
        let client = OpenAiClient::new(None, "llama3".to_string(), None)
            .with_temperature(Some(0.1))
            .with_max_tokens(Some(256));

        let body = client.build_request_body("Validate these documents.");
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["model"], "llama3");
        assert_eq!(json["max_tokens"], 256);
        let messages = json["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0]["role"], "user");
        assert_eq!(messages[0]["content"], "Validate these documents.");
    }

    #[test]
    fn optional_fields_are_omitted() {
        let client = OpenAiClient::new(None, "llama3".to_string(), None);
        let json = serde_json::to_value(client.build_request_body("hi")).unwrap();
        assert!(json.get("temperature").is_none());
        assert!(json.get("max_tokens").is_none());
    }
}
