//! Claim aggregate
//!
//! The full mutable record of one insurance claim as it moves through the
//! pipeline. Each stage agent mutates exactly the fields it owns; the
//! lifecycle flags are monotonic and each is set exactly once on the
//! forward path.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use core_kernel::{InvestigatorId, TransactionId};

use crate::documents::DocType;
use crate::validation::ValidationResult;

/// Upper bound on aggregated narrative + OCR text, in characters.
pub const EXTRACTED_TEXT_MAX_CHARS: usize = 50_000;

/// Outcome of fraud scoring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FraudDecision {
    Safe,
    Suspect,
}

impl FraudDecision {
    /// Suspect only on a case-insensitive "suspect"; anything else is Safe.
    pub fn from_model_output(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("suspect") {
            FraudDecision::Suspect
        } else {
            FraudDecision::Safe
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FraudDecision::Safe => "SAFE",
            FraudDecision::Suspect => "SUSPECT",
        }
    }
}

impl fmt::Display for FraudDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FraudDecision {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SAFE" => Ok(FraudDecision::Safe),
            "SUSPECT" => Ok(FraudDecision::Suspect),
            _ => Err(()),
        }
    }
}

/// Terminal pipeline decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FinalDecision {
    Approved,
    Rejected,
    PendingDocuments,
    EscalatedToSiu,
    UnderReview,
}

impl FinalDecision {
    pub fn as_str(&self) -> &'static str {
        match self {
            FinalDecision::Approved => "APPROVED",
            FinalDecision::Rejected => "REJECTED",
            FinalDecision::PendingDocuments => "PENDING_DOCUMENTS",
            FinalDecision::EscalatedToSiu => "ESCALATED_TO_SIU",
            FinalDecision::UnderReview => "UNDER_REVIEW",
        }
    }
}

impl fmt::Display for FinalDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FinalDecision {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "APPROVED" => Ok(FinalDecision::Approved),
            "REJECTED" => Ok(FinalDecision::Rejected),
            "PENDING_DOCUMENTS" => Ok(FinalDecision::PendingDocuments),
            "ESCALATED_TO_SIU" => Ok(FinalDecision::EscalatedToSiu),
            "UNDER_REVIEW" => Ok(FinalDecision::UnderReview),
            _ => Err(()),
        }
    }
}

/// Persisted claim status, mirrored from the pipeline decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClaimStatus {
    Registered,
    UnderReview,
    PendingDocuments,
    UnderInvestigation,
    Approved,
    Rejected,
}

impl ClaimStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimStatus::Registered => "REGISTERED",
            ClaimStatus::UnderReview => "UNDER_REVIEW",
            ClaimStatus::PendingDocuments => "PENDING_DOCUMENTS",
            ClaimStatus::UnderInvestigation => "UNDER_INVESTIGATION",
            ClaimStatus::Approved => "APPROVED",
            ClaimStatus::Rejected => "REJECTED",
        }
    }
}

impl fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClaimStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "REGISTERED" => Ok(ClaimStatus::Registered),
            "UNDER_REVIEW" => Ok(ClaimStatus::UnderReview),
            "PENDING_DOCUMENTS" => Ok(ClaimStatus::PendingDocuments),
            "UNDER_INVESTIGATION" => Ok(ClaimStatus::UnderInvestigation),
            "APPROVED" => Ok(ClaimStatus::Approved),
            "REJECTED" => Ok(ClaimStatus::Rejected),
            _ => Err(()),
        }
    }
}

/// A document attached to a claim
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub filename: String,
    pub content_type: String,
    pub size_bytes: i64,
    /// None until classified
    pub doc_type: Option<DocType>,
    pub extracted_text: Option<String>,
}

/// Investigator assignment, empty until the assignment stage succeeds
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Assignment {
    pub investigator_id: Option<InvestigatorId>,
    pub sla_days: Option<u32>,
    pub reason: Option<String>,
    pub assigned_at: Option<DateTime<Utc>>,
}

/// The claim aggregate - the unit of work for the pipeline
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClaimAggregate {
    // Identity
    pub transaction_id: Option<TransactionId>,
    pub claim_id: Option<String>,
    pub customer_name: Option<String>,
    pub policy_number: Option<String>,

    // Facts
    pub amount: Option<Decimal>,
    pub claim_type: Option<String>,
    pub extracted_text: Option<String>,

    // Documents
    #[serde(default)]
    pub documents: Vec<DocumentRecord>,

    // Stage outputs
    pub validation: Option<ValidationResult>,
    pub fraud_score: Option<f64>,
    pub fraud_decision: Option<FraudDecision>,
    #[serde(default)]
    pub assignment: Assignment,
    pub final_decision: Option<FinalDecision>,

    // Lifecycle flags, monotonic
    #[serde(default)]
    pub registered: bool,
    pub registered_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub validated: bool,
    #[serde(default)]
    pub fraud_checked: bool,
    #[serde(default)]
    pub decision_made: bool,
    #[serde(default)]
    pub approved: bool,
    #[serde(default)]
    pub payment_processed: bool,
    #[serde(default)]
    pub closed: bool,

    // Audit trail, append-only
    #[serde(default)]
    pub logs: Vec<String>,
}

impl ClaimAggregate {
    /// Appends an audit entry. The trail is never truncated or reordered.
    pub fn log(&mut self, entry: impl Into<String>) {
        self.logs.push(entry.into());
    }

    /// True when validation ran and blocked the claim (missing documents or
    /// hard errors); drives the early route to the manager.
    pub fn validation_blocked(&self) -> bool {
        match &self.validation {
            Some(v) => !v.docs_ok || !v.errors.is_empty(),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fraud_decision_from_model_output() {
        assert_eq!(
            FraudDecision::from_model_output("suspect"),
            FraudDecision::Suspect
        );
        assert_eq!(
            FraudDecision::from_model_output(" SUSPECT "),
            FraudDecision::Suspect
        );
        assert_eq!(
            FraudDecision::from_model_output("Suspicious"),
            FraudDecision::Safe
        );
        assert_eq!(FraudDecision::from_model_output(""), FraudDecision::Safe);
    }

    #[test]
    fn test_final_decision_roundtrip() {
        for decision in [
            FinalDecision::Approved,
            FinalDecision::Rejected,
            FinalDecision::PendingDocuments,
            FinalDecision::EscalatedToSiu,
            FinalDecision::UnderReview,
        ] {
            let parsed: FinalDecision = decision.as_str().parse().unwrap();
            assert_eq!(parsed, decision);
        }
    }

    #[test]
    fn test_status_serializes_screaming_snake() {
        let json = serde_json::to_string(&ClaimStatus::UnderInvestigation).unwrap();
        assert_eq!(json, "\"UNDER_INVESTIGATION\"");
    }

    #[test]
    fn test_validation_blocked() {
        let mut aggregate = ClaimAggregate::default();
        assert!(!aggregate.validation_blocked());

        aggregate.validation = Some(crate::validation::ValidationResult {
            docs_ok: true,
            ..Default::default()
        });
        assert!(!aggregate.validation_blocked());

        aggregate.validation = Some(crate::validation::ValidationResult {
            docs_ok: true,
            errors: vec!["amount mismatch".to_string()],
            ..Default::default()
        });
        assert!(aggregate.validation_blocked());
    }
}
