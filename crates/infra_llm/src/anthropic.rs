//! Anthropic Messages API client

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use core_kernel::{DomainPort, PortError};
use domain_claims::ports::CompletionService;

use crate::{status_to_port_error, transport_to_port_error};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_MAX_TOKENS: u32 = 1024;

#[derive(Serialize)]
struct AnthropicRequest {
    model: String,
    messages: Vec<AnthropicMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    max_tokens: u32,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
struct AnthropicMessage {
    role: String,
    content: Vec<AnthropicContent>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
struct AnthropicContent {
    #[serde(rename = "type")]
    content_type: String,
    text: String,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicContent>,
}

pub struct AnthropicClient {
    api_url: String,
    model: String,
    api_key: String,
    temperature: Option<f32>,
    max_tokens: u32,
    http_client: reqwest::Client,
}

impl AnthropicClient {
    pub fn new(model: String, api_key: String) -> Self {
        Self {
            api_url: ANTHROPIC_API_URL.to_string(),
            model,
            api_key,
            temperature: None,
            max_tokens: DEFAULT_MAX_TOKENS,
            http_client: reqwest::Client::new(),
        }
    }

    pub fn with_api_url(mut self, api_url: String) -> Self {
        self.api_url = api_url;
        self
    }

    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        if let Some(max_tokens) = max_tokens {
            self.max_tokens = max_tokens;
        }
        self
    }

    fn build_request_body(&self, prompt: &str) -> AnthropicRequest {
        AnthropicRequest {
            model: self.model.clone(),
            messages: vec![AnthropicMessage {
                role: "user".to_string(),
                content: vec![AnthropicContent {
                    content_type: "text".to_string(),
                    text: prompt.to_string(),
                }],
            }],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }
}

impl DomainPort for AnthropicClient {}

#[async_trait]
impl CompletionService for AnthropicClient {
    async fn complete(&self, prompt: &str) -> Result<String, PortError> {
        let body = self.build_request_body(prompt);

        let response = self
            .http_client
            .post(&self.api_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_to_port_error(e, "anthropic"))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(status_to_port_error(status, "anthropic", &body_text));
        }

        let parsed: AnthropicResponse = response
            .json()
            .await
            .map_err(|e| PortError::internal(format!("failed to parse anthropic response: {e}")))?;

        Ok(parsed
            .content
            .into_iter()
            .map(|c| c.text)
            .collect::<Vec<_>>()
            .join(""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_matches_anthropic_format() {
        let client = AnthropicClient::new(
            "claude-sonnet-4-20250514".to_string(),
            "sk-ant-test".to_string(),
        )
        .with_temperature(Some(0.2))
        .with_max_tokens(Some(512));

        let body = client.build_request_body("Score this claim.");
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["model"], "claude-sonnet-4-20250514");
        assert_eq!(json["max_tokens"], 512);
        let temperature = json["temperature"].as_f64().unwrap();
        assert!((temperature - 0.2).abs() < 0.001);

        let messages = json["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0]["role"], "user");
        assert_eq!(messages[0]["content"][0]["type"], "text");
        assert_eq!(messages[0]["content"][0]["text"], "Score this claim.");
    }

    #[test]
    fn default_max_tokens_when_unset() {
        let client = AnthropicClient::new("model".to_string(), "key".to_string());
        let body = client.build_request_body("hi");
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["max_tokens"], DEFAULT_MAX_TOKENS);
        assert!(json.get("temperature").is_none());
    }
}
