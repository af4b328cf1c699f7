//! Workflow router
//!
//! Routing is a pure function of an aggregate snapshot: `next_stage`
//! recomputes the pending stage from the durable lifecycle flags every time
//! it is called, which makes restart-from-any-stage safe. Stage names are a
//! typed enum, never strings.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::aggregate::ClaimAggregate;

/// Pipeline stages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Registration,
    Validation,
    FraudScoring,
    InvestigatorAssignment,
    ManagerDecision,
    End,
}

/// Routing thresholds
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Fraud score at or above which the claim escalates to an investigator
    pub fraud_escalation_threshold: f64,
    /// Claim amount above which the claim escalates regardless of score
    pub high_amount_threshold: Decimal,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            fraud_escalation_threshold: 0.70,
            high_amount_threshold: dec!(300_000),
        }
    }
}

/// True when the claim qualifies for investigator escalation: high fraud
/// score or high amount.
pub fn requires_investigation(aggregate: &ClaimAggregate, config: &RouterConfig) -> bool {
    let score_high = aggregate
        .fraud_score
        .map(|score| score >= config.fraud_escalation_threshold)
        .unwrap_or(false);
    let amount_high = aggregate
        .amount
        .map(|amount| amount > config.high_amount_threshold)
        .unwrap_or(false);
    score_high || amount_high
}

/// Computes the next pending stage from the aggregate's current flags.
///
/// Transition rules, first match wins:
/// 1. Not yet registered -> Registration (always runs first).
/// 2. No validation result -> Validation.
/// 3. Validation blocked (missing documents or errors) -> Manager Decision
///    directly, skipping fraud scoring and assignment.
/// 4. Fraud not yet scored -> Fraud Scoring.
/// 5. Escalation criteria met and no investigator assigned -> Investigator
///    Assignment.
/// 6. No terminal decision yet -> Manager Decision; otherwise End.
pub fn next_stage(aggregate: &ClaimAggregate, config: &RouterConfig) -> Stage {
    if !aggregate.registered {
        return Stage::Registration;
    }
    if aggregate.validation.is_none() {
        return Stage::Validation;
    }
    if aggregate.validation_blocked() {
        return if aggregate.decision_made {
            Stage::End
        } else {
            Stage::ManagerDecision
        };
    }
    if !aggregate.fraud_checked {
        return Stage::FraudScoring;
    }
    if aggregate.decision_made {
        return Stage::End;
    }
    if requires_investigation(aggregate, config) && aggregate.assignment.investigator_id.is_none() {
        return Stage::InvestigatorAssignment;
    }
    Stage::ManagerDecision
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ValidationResult;

    fn config() -> RouterConfig {
        RouterConfig::default()
    }

    #[test]
    fn test_fresh_aggregate_starts_at_registration() {
        let aggregate = ClaimAggregate::default();
        assert_eq!(next_stage(&aggregate, &config()), Stage::Registration);
    }

    #[test]
    fn test_registered_aggregate_routes_to_validation() {
        let aggregate = ClaimAggregate {
            registered: true,
            ..Default::default()
        };
        assert_eq!(next_stage(&aggregate, &config()), Stage::Validation);
    }

    #[test]
    fn test_blocked_validation_skips_fraud() {
        let aggregate = ClaimAggregate {
            registered: true,
            validation: Some(ValidationResult::default()), // docs_ok = false
            ..Default::default()
        };
        assert_eq!(next_stage(&aggregate, &config()), Stage::ManagerDecision);
    }

    #[test]
    fn test_clean_validation_routes_to_fraud() {
        let aggregate = ClaimAggregate {
            registered: true,
            validation: Some(ValidationResult::passed()),
            ..Default::default()
        };
        assert_eq!(next_stage(&aggregate, &config()), Stage::FraudScoring);
    }

    #[test]
    fn test_high_score_routes_to_investigator() {
        let aggregate = ClaimAggregate {
            registered: true,
            validation: Some(ValidationResult::passed()),
            fraud_checked: true,
            fraud_score: Some(0.85),
            ..Default::default()
        };
        assert_eq!(
            next_stage(&aggregate, &config()),
            Stage::InvestigatorAssignment
        );
    }

    #[test]
    fn test_high_amount_routes_to_investigator_even_when_safe() {
        let aggregate = ClaimAggregate {
            registered: true,
            validation: Some(ValidationResult::passed()),
            fraud_checked: true,
            fraud_score: Some(0.1),
            amount: Some(dec!(500_000)),
            ..Default::default()
        };
        assert_eq!(
            next_stage(&aggregate, &config()),
            Stage::InvestigatorAssignment
        );
    }

    #[test]
    fn test_threshold_boundary() {
        let mut aggregate = ClaimAggregate {
            registered: true,
            validation: Some(ValidationResult::passed()),
            fraud_checked: true,
            fraud_score: Some(0.70),
            ..Default::default()
        };
        assert_eq!(
            next_stage(&aggregate, &config()),
            Stage::InvestigatorAssignment
        );

        aggregate.fraud_score = Some(0.6999);
        assert_eq!(next_stage(&aggregate, &config()), Stage::ManagerDecision);

        // Amount threshold is strictly greater-than
        aggregate.amount = Some(dec!(300_000));
        assert_eq!(next_stage(&aggregate, &config()), Stage::ManagerDecision);
    }

    #[test]
    fn test_decision_made_terminates() {
        let aggregate = ClaimAggregate {
            registered: true,
            validation: Some(ValidationResult::passed()),
            fraud_checked: true,
            fraud_score: Some(0.2),
            decision_made: true,
            ..Default::default()
        };
        assert_eq!(next_stage(&aggregate, &config()), Stage::End);
    }

    #[test]
    fn test_router_is_deterministic() {
        let aggregate = ClaimAggregate {
            registered: true,
            validation: Some(ValidationResult::passed()),
            fraud_checked: true,
            fraud_score: Some(0.9),
            ..Default::default()
        };
        let first = next_stage(&aggregate, &config());
        for _ in 0..100 {
            assert_eq!(next_stage(&aggregate, &config()), first);
        }
    }
}
