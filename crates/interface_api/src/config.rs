//! API configuration

use serde::Deserialize;

/// API configuration, loaded from `API_`-prefixed environment variables
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Database URL
    pub database_url: String,
    /// Log level
    pub log_level: String,
    /// Completion provider ("anthropic" or "openai"); unset runs the
    /// pipeline on rule-based fallbacks only
    pub completion_provider: Option<String>,
    pub completion_model: Option<String>,
    pub completion_api_key: Option<String>,
    pub completion_api_url: Option<String>,
    /// Upper bound for a single completion call
    #[serde(default = "default_completion_timeout_secs")]
    pub completion_timeout_secs: u64,
}

fn default_completion_timeout_secs() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            database_url: "postgres://localhost/claims".to_string(),
            log_level: "info".to_string(),
            completion_provider: None,
            completion_model: None,
            completion_api_key: None,
            completion_api_url: None,
            completion_timeout_secs: default_completion_timeout_secs(),
        }
    }
}

impl ApiConfig {
    /// Loads configuration from environment
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Environment::with_prefix("API"))
            .build()?
            .try_deserialize()
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ApiConfig::default();
        assert_eq!(config.server_addr(), "0.0.0.0:8080");
        assert!(config.completion_provider.is_none());
        assert_eq!(config.completion_timeout_secs, 30);
    }
}
