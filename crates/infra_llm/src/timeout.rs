//! Bounded-timeout decorator for completion clients
//!
//! Every completion call must be bounded; a timeout is reported as a
//! transient port error and handled by the stages exactly like any other
//! completion failure.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use core_kernel::{DomainPort, PortError};
use domain_claims::ports::CompletionService;

pub struct TimeoutCompletion {
    inner: Arc<dyn CompletionService>,
    timeout: Duration,
}

impl TimeoutCompletion {
    pub fn new(inner: Arc<dyn CompletionService>, timeout: Duration) -> Self {
        Self { inner, timeout }
    }
}

impl DomainPort for TimeoutCompletion {}

#[async_trait]
impl CompletionService for TimeoutCompletion {
    async fn complete(&self, prompt: &str) -> Result<String, PortError> {
        match tokio::time::timeout(self.timeout, self.inner.complete(prompt)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(timeout_ms = self.timeout.as_millis() as u64, "completion call timed out");
                Err(PortError::timeout(
                    "completion request",
                    self.timeout.as_millis() as u64,
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct SlowCompletion {
        delay: Duration,
    }

    impl DomainPort for SlowCompletion {}

    #[async_trait]
    impl CompletionService for SlowCompletion {
        async fn complete(&self, _prompt: &str) -> Result<String, PortError> {
            tokio::time::sleep(self.delay).await;
            Ok("{}".to_string())
        }
    }

    #[tokio::test]
    async fn slow_call_times_out_as_transient() {
        let slow = Arc::new(SlowCompletion {
            delay: Duration::from_secs(10),
        });
        let bounded = TimeoutCompletion::new(slow, Duration::from_millis(20));

        let error = bounded.complete("prompt").await.unwrap_err();
        assert!(error.is_transient());
        assert!(matches!(error, PortError::Timeout { .. }));
    }

    #[tokio::test]
    async fn fast_call_passes_through() {
        let fast = Arc::new(SlowCompletion {
            delay: Duration::from_millis(1),
        });
        let bounded = TimeoutCompletion::new(fast, Duration::from_secs(5));

        assert_eq!(bounded.complete("prompt").await.unwrap(), "{}");
    }
}
