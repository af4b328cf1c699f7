//! Completion provider configuration and client construction

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use core_kernel::CoreError;
use domain_claims::ports::CompletionService;

use crate::anthropic::AnthropicClient;
use crate::openai::OpenAiClient;
use crate::timeout::TimeoutCompletion;

/// Completion service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionConfig {
    /// Provider name: "anthropic" or "openai"
    pub provider: String,
    pub model: String,
    pub api_key: Option<String>,
    pub api_url: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    /// Upper bound for a single completion call
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

/// Builds the configured completion client, wrapped in the mandatory
/// bounded timeout.
///
/// An Anthropic configuration without an API key is a configuration error:
/// the credential is required up front rather than failing on first use.
pub fn build_completion_service(
    config: &CompletionConfig,
) -> Result<Arc<dyn CompletionService>, CoreError> {
    let base: Arc<dyn CompletionService> = match config.provider.as_str() {
        "anthropic" => {
            let api_key = config.api_key.clone().ok_or_else(|| {
                CoreError::Configuration("anthropic provider requires an API key".to_string())
            })?;
            let mut client = AnthropicClient::new(config.model.clone(), api_key)
                .with_temperature(config.temperature)
                .with_max_tokens(config.max_tokens);
            if let Some(api_url) = config.api_url.clone() {
                client = client.with_api_url(api_url);
            }
            Arc::new(client)
        }
        "openai" => Arc::new(
            OpenAiClient::new(
                config.api_url.clone(),
                config.model.clone(),
                config.api_key.clone(),
            )
            .with_temperature(config.temperature)
            .with_max_tokens(config.max_tokens),
        ),
        other => {
            return Err(CoreError::Configuration(format!(
                "unknown completion provider: {other}"
            )))
        }
    };

    Ok(Arc::new(TimeoutCompletion::new(
        base,
        Duration::from_secs(config.timeout_secs),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(provider: &str, api_key: Option<&str>) -> CompletionConfig {
        CompletionConfig {
            provider: provider.to_string(),
            model: "test-model".to_string(),
            api_key: api_key.map(str::to_string),
            api_url: None,
            temperature: None,
            max_tokens: None,
            timeout_secs: 30,
        }
    }

    #[test]
    fn build_anthropic_client() {
        assert!(build_completion_service(&config("anthropic", Some("sk-ant-test"))).is_ok());
    }

    #[test]
    fn build_anthropic_without_key_fails() {
        assert!(build_completion_service(&config("anthropic", None)).is_err());
    }

    #[test]
    fn build_openai_without_key_is_allowed() {
        assert!(build_completion_service(&config("openai", None)).is_ok());
    }

    #[test]
    fn build_unknown_provider_fails() {
        assert!(build_completion_service(&config("gemini", None)).is_err());
    }

    #[test]
    fn timeout_defaults_when_absent() {
        let parsed: CompletionConfig = serde_json::from_str(
            r#"{"provider":"openai","model":"llama3","api_key":null,"api_url":null,"temperature":null,"max_tokens":null}"#,
        )
        .unwrap();
        assert_eq!(parsed.timeout_secs, 30);
    }
}
