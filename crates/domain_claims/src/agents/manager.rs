//! Manager decision stage
//!
//! Terminal stage. The decision ladder is evaluated in order, first match
//! wins; the mirrored claim status and the decision are persisted together.
//! A persistence failure is audit-logged and the in-memory decision stands.

use std::sync::Arc;

use tracing::warn;

use crate::aggregate::{ClaimAggregate, ClaimStatus, FinalDecision};
use crate::ports::{ClaimStore, ClaimUpdate};
use crate::router::RouterConfig;

pub struct ManagerAgent {
    store: Arc<dyn ClaimStore>,
    config: RouterConfig,
}

impl ManagerAgent {
    pub fn new(store: Arc<dyn ClaimStore>, config: RouterConfig) -> Self {
        Self { store, config }
    }

    pub async fn run(&self, aggregate: &mut ClaimAggregate) {
        // The decision is set at most once per run; overrides go through a
        // separate operation that never re-enters the pipeline.
        if aggregate.decision_made {
            return;
        }

        let decision = decide(aggregate, &self.config);
        let status = mirror_status(decision);

        aggregate.final_decision = Some(decision);
        aggregate.decision_made = true;
        if decision == FinalDecision::Approved {
            aggregate.approved = true;
        }
        aggregate.log(format!("[manager] decision={decision}"));

        if let Some(transaction_id) = aggregate.transaction_id {
            let update = ClaimUpdate {
                final_decision: Some(decision),
                status: Some(status),
                fraud_score: aggregate.fraud_score,
                fraud_decision: aggregate.fraud_decision,
                claim_validated: Some(aggregate.validated),
                ..Default::default()
            };
            if let Err(error) = self.store.update_fields(transaction_id, update).await {
                warn!(%transaction_id, %error, "manager decision persistence failed");
                aggregate.log(format!("[manager] store_error={error}"));
            }
        }
    }
}

/// The decision ladder, first match wins.
pub fn decide(aggregate: &ClaimAggregate, config: &RouterConfig) -> FinalDecision {
    let docs_ok = aggregate
        .validation
        .as_ref()
        .map(|v| v.docs_ok)
        .unwrap_or(false);
    if !docs_ok {
        return FinalDecision::PendingDocuments;
    }
    if aggregate
        .fraud_score
        .map(|score| score >= config.fraud_escalation_threshold)
        .unwrap_or(false)
    {
        return FinalDecision::EscalatedToSiu;
    }
    if aggregate.approved {
        return FinalDecision::Approved;
    }
    FinalDecision::Rejected
}

/// The persisted status mirroring a decision. Claims escalated to the SIU
/// are shown as under investigation, not as decided.
pub fn mirror_status(decision: FinalDecision) -> ClaimStatus {
    match decision {
        FinalDecision::Approved => ClaimStatus::Approved,
        FinalDecision::Rejected => ClaimStatus::Rejected,
        FinalDecision::PendingDocuments => ClaimStatus::PendingDocuments,
        FinalDecision::EscalatedToSiu => ClaimStatus::UnderInvestigation,
        FinalDecision::UnderReview => ClaimStatus::UnderReview,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ValidationResult;

    fn config() -> RouterConfig {
        RouterConfig::default()
    }

    #[test]
    fn test_missing_validation_pends_documents() {
        let aggregate = ClaimAggregate::default();
        assert_eq!(decide(&aggregate, &config()), FinalDecision::PendingDocuments);
    }

    #[test]
    fn test_failed_validation_pends_documents() {
        let aggregate = ClaimAggregate {
            validation: Some(ValidationResult::default()),
            fraud_score: Some(0.95),
            ..Default::default()
        };
        assert_eq!(decide(&aggregate, &config()), FinalDecision::PendingDocuments);
    }

    #[test]
    fn test_high_score_escalates() {
        let aggregate = ClaimAggregate {
            validation: Some(ValidationResult::passed()),
            fraud_score: Some(0.85),
            ..Default::default()
        };
        assert_eq!(decide(&aggregate, &config()), FinalDecision::EscalatedToSiu);
    }

    #[test]
    fn test_approved_flag_wins_when_clean() {
        let aggregate = ClaimAggregate {
            validation: Some(ValidationResult::passed()),
            fraud_score: Some(0.1),
            approved: true,
            ..Default::default()
        };
        assert_eq!(decide(&aggregate, &config()), FinalDecision::Approved);
    }

    #[test]
    fn test_default_is_rejected() {
        let aggregate = ClaimAggregate {
            validation: Some(ValidationResult::passed()),
            fraud_score: Some(0.1),
            ..Default::default()
        };
        assert_eq!(decide(&aggregate, &config()), FinalDecision::Rejected);
    }

    #[test]
    fn test_siu_mirrors_to_under_investigation() {
        assert_eq!(
            mirror_status(FinalDecision::EscalatedToSiu),
            ClaimStatus::UnderInvestigation
        );
        assert_eq!(mirror_status(FinalDecision::Approved), ClaimStatus::Approved);
    }
}
