//! Completion Service Infrastructure
//!
//! HTTP adapters implementing the claims domain's `CompletionService` port
//! against Anthropic and OpenAI-compatible endpoints. Every built client is
//! wrapped in a bounded timeout; HTTP failures map onto the typed
//! `PortError` taxonomy (429 to RateLimited, 5xx to ServiceUnavailable) so
//! the domain's fallback policy works per error kind.

pub mod anthropic;
pub mod config;
pub mod openai;
pub mod timeout;

pub use anthropic::AnthropicClient;
pub use config::{build_completion_service, CompletionConfig};
pub use openai::OpenAiClient;
pub use timeout::TimeoutCompletion;

use core_kernel::PortError;
use reqwest::StatusCode;

/// Maps a non-success HTTP status onto the port taxonomy.
pub(crate) fn status_to_port_error(status: StatusCode, provider: &str, body: &str) -> PortError {
    if status == StatusCode::TOO_MANY_REQUESTS {
        return PortError::rate_limited(format!("{provider}: {body}"));
    }
    if status.is_server_error() {
        return PortError::unavailable(format!("{provider} ({status})"));
    }
    PortError::internal(format!("{provider} API error {status}: {body}"))
}

/// Maps a transport-level failure onto the port taxonomy.
pub(crate) fn transport_to_port_error(error: reqwest::Error, provider: &str) -> PortError {
    if error.is_timeout() {
        PortError::timeout(format!("{provider} request"), 0)
    } else {
        PortError::connection(format!("{provider} request failed: {error}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let rate_limited =
            status_to_port_error(StatusCode::TOO_MANY_REQUESTS, "anthropic", "quota");
        assert!(rate_limited.is_transient());

        let unavailable = status_to_port_error(StatusCode::BAD_GATEWAY, "anthropic", "");
        assert!(unavailable.is_transient());

        let bad_request = status_to_port_error(StatusCode::BAD_REQUEST, "anthropic", "oops");
        assert!(!bad_request.is_transient());
    }
}
