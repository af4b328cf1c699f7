//! Fraud scoring stage
//!
//! The primary path asks the completion service to score the claim; the
//! sanitizer guarantees the published invariants regardless of what comes
//! back: the score stays within [0, 1] (0.0 on anything non-numeric) and
//! the decision is Suspect only on an exact case-insensitive "suspect".
//! An unreachable or unconfigured completion service yields `{0.0, Safe}`
//! without propagating the error.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use core_kernel::json_extract::extract_json;

use crate::aggregate::{ClaimAggregate, FraudDecision};
use crate::ports::CompletionService;

pub struct FraudAgent {
    completion: Option<Arc<dyn CompletionService>>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FraudVerdict {
    pub score: f64,
    pub decision: FraudDecision,
}

impl FraudVerdict {
    fn fallback() -> Self {
        Self {
            score: 0.0,
            decision: FraudDecision::Safe,
        }
    }
}

impl FraudAgent {
    pub fn new(completion: Option<Arc<dyn CompletionService>>) -> Self {
        Self { completion }
    }

    pub async fn run(&self, aggregate: &mut ClaimAggregate) {
        let verdict = match self.completion.clone() {
            Some(client) => {
                let prompt = build_prompt(aggregate);
                match client.complete(&prompt).await {
                    Ok(raw) => {
                        debug!(%raw, "fraud scoring response");
                        sanitize(extract_json(&raw).unwrap_or(Value::Null))
                    }
                    Err(error) => {
                        aggregate.log(format!("[fraud] completion failed ({error}) -> fallback"));
                        FraudVerdict::fallback()
                    }
                }
            }
            None => {
                aggregate.log("[fraud] completion unconfigured -> fallback");
                FraudVerdict::fallback()
            }
        };

        aggregate.fraud_checked = true;
        aggregate.fraud_score = Some(verdict.score);
        aggregate.fraud_decision = Some(verdict.decision);
        aggregate.log(format!(
            "[fraud] score={:.2} decision={}",
            verdict.score, verdict.decision
        ));
    }
}

/// Sanitizes an arbitrary parsed value into a verdict that honors the stage
/// invariants. Accepts numeric or numeric-string scores.
pub fn sanitize(value: Value) -> FraudVerdict {
    let score = value.get("fraud_score").map(coerce_score).unwrap_or(0.0);
    let decision = value
        .get("fraud_decision")
        .and_then(Value::as_str)
        .map(FraudDecision::from_model_output)
        .unwrap_or(FraudDecision::Safe);

    FraudVerdict { score, decision }
}

fn coerce_score(value: &Value) -> f64 {
    let parsed = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed
        .filter(|score| score.is_finite())
        .map(|score| score.clamp(0.0, 1.0))
        .unwrap_or(0.0)
}

fn build_prompt(aggregate: &ClaimAggregate) -> String {
    format!(
        r#"You are an insurance fraud detection analyst.

Claim Amount: {amount}
Claim Text: {text}

Return ONLY a minified JSON object with keys:
- "fraud_score": float between 0.0 and 1.0
- "fraud_decision": "SAFE" or "SUSPECT"
"#,
        amount = aggregate
            .amount
            .map(|a| a.to_string())
            .unwrap_or_default(),
        text = aggregate.extracted_text.as_deref().unwrap_or(""),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sanitize_clamps_out_of_range() {
        assert_eq!(
            sanitize(json!({"fraud_score": 3.2, "fraud_decision": "SAFE"})).score,
            1.0
        );
        assert_eq!(
            sanitize(json!({"fraud_score": -0.4, "fraud_decision": "SAFE"})).score,
            0.0
        );
    }

    #[test]
    fn test_sanitize_defaults_non_numeric_to_zero() {
        assert_eq!(sanitize(json!({"fraud_score": "high"})).score, 0.0);
        assert_eq!(sanitize(json!({"fraud_score": null})).score, 0.0);
        assert_eq!(sanitize(json!({"fraud_score": [0.5]})).score, 0.0);
        assert_eq!(sanitize(json!({})).score, 0.0);
        assert_eq!(sanitize(Value::Null).score, 0.0);
    }

    #[test]
    fn test_sanitize_rejects_nan_and_infinity_strings() {
        assert_eq!(sanitize(json!({"fraud_score": "NaN"})).score, 0.0);
        assert_eq!(sanitize(json!({"fraud_score": "inf"})).score, 0.0);
    }

    #[test]
    fn test_sanitize_accepts_numeric_strings() {
        assert_eq!(sanitize(json!({"fraud_score": "0.55"})).score, 0.55);
    }

    #[test]
    fn test_decision_only_suspect_on_exact_word() {
        assert_eq!(
            sanitize(json!({"fraud_decision": "suspect"})).decision,
            FraudDecision::Suspect
        );
        assert_eq!(
            sanitize(json!({"fraud_decision": "SUSPECT"})).decision,
            FraudDecision::Suspect
        );
        assert_eq!(
            sanitize(json!({"fraud_decision": "suspected fraud"})).decision,
            FraudDecision::Safe
        );
        assert_eq!(
            sanitize(json!({"fraud_decision": 1})).decision,
            FraudDecision::Safe
        );
        assert_eq!(sanitize(json!({})).decision, FraudDecision::Safe);
    }
}
