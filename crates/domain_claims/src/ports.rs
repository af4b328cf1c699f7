//! Port traits for the pipeline's external collaborators
//!
//! The domain depends only on these traits; adapters live in `infra_db`
//! (PostgreSQL) and `infra_llm` (completion service), and tests substitute
//! in-memory fakes. All ports return [`PortError`] so callers can decide
//! recovery policy per error kind.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{DomainPort, InvestigatorId, PortError, TransactionId};

use crate::aggregate::{ClaimStatus, DocumentRecord, FinalDecision, FraudDecision};

/// Fields persisted when a claim is first registered
#[derive(Debug, Clone)]
pub struct NewRegistration {
    pub transaction_id: TransactionId,
    pub claim_id: Option<String>,
    pub customer_name: Option<String>,
    pub policy_number: Option<String>,
    pub amount: Option<Decimal>,
    pub claim_type: Option<String>,
    pub extracted_text: Option<String>,
    pub registered_at: DateTime<Utc>,
    pub status: ClaimStatus,
}

/// Durable claim row as read back from the store
#[derive(Debug, Clone)]
pub struct ClaimSnapshot {
    pub transaction_id: TransactionId,
    pub claim_id: Option<String>,
    pub customer_name: Option<String>,
    pub policy_number: Option<String>,
    pub amount: Option<Decimal>,
    pub claim_type: Option<String>,
    pub extracted_text: Option<String>,
    pub registered_at: Option<DateTime<Utc>>,
    pub status: Option<ClaimStatus>,
    pub final_decision: Option<FinalDecision>,
    pub fraud_score: Option<f64>,
    pub fraud_decision: Option<FraudDecision>,
    pub claim_validated: Option<bool>,
    pub manager_comment: Option<String>,
    pub investigator_id: Option<InvestigatorId>,
}

/// Partial-field update; `None` fields are left untouched
#[derive(Debug, Clone, Default)]
pub struct ClaimUpdate {
    pub extracted_text: Option<String>,
    pub status: Option<ClaimStatus>,
    pub final_decision: Option<FinalDecision>,
    pub fraud_score: Option<f64>,
    pub fraud_decision: Option<FraudDecision>,
    pub claim_validated: Option<bool>,
    pub manager_comment: Option<String>,
    pub investigator_id: Option<InvestigatorId>,
    pub assignment_reason: Option<String>,
    pub assignment_status: Option<String>,
    pub assigned_at: Option<DateTime<Utc>>,
}

impl ClaimUpdate {
    /// True when no field is set; adapters may skip the write entirely.
    pub fn is_empty(&self) -> bool {
        self.extracted_text.is_none()
            && self.status.is_none()
            && self.final_decision.is_none()
            && self.fraud_score.is_none()
            && self.fraud_decision.is_none()
            && self.claim_validated.is_none()
            && self.manager_comment.is_none()
            && self.investigator_id.is_none()
            && self.assignment_reason.is_none()
            && self.assignment_status.is_none()
            && self.assigned_at.is_none()
    }
}

/// Durable keyed storage for the claim aggregate and its documents
#[async_trait]
pub trait ClaimStore: DomainPort {
    /// Inserts or refreshes the registration row for a transaction.
    async fn upsert_registration(&self, registration: &NewRegistration) -> Result<(), PortError>;

    /// Appends the claim's documents. Order is preserved on read-back.
    async fn insert_documents(
        &self,
        transaction_id: TransactionId,
        documents: &[DocumentRecord],
    ) -> Result<(), PortError>;

    /// Point lookup; `None` when the transaction is unknown.
    async fn fetch_by_transaction_id(
        &self,
        transaction_id: TransactionId,
    ) -> Result<Option<(ClaimSnapshot, Vec<DocumentRecord>)>, PortError>;

    /// Partial-field update of the claim row.
    async fn update_fields(
        &self,
        transaction_id: TransactionId,
        update: ClaimUpdate,
    ) -> Result<(), PortError>;
}

/// Investigator availability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvestigatorStatus {
    Active,
    Inactive,
}

/// A capacity-bounded investigator record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvestigatorRecord {
    pub investigator_id: InvestigatorId,
    pub name: String,
    pub specialization: String,
    pub active_cases: i32,
    pub max_cases: i32,
    pub status: InvestigatorStatus,
}

impl InvestigatorRecord {
    /// Eligible for new assignments: active and under capacity.
    pub fn has_capacity(&self) -> bool {
        self.status == InvestigatorStatus::Active && self.active_cases < self.max_cases
    }
}

/// Durable storage of investigator capacity and load
///
/// `select_and_reserve` MUST be atomic: the capacity check and the load
/// increment happen in one storage-level operation, so two concurrent
/// claims can never both pass the check against the same stale count.
#[async_trait]
pub trait InvestigatorPool: DomainPort {
    /// Atomically picks the least-loaded active investigator matching the
    /// specialization (ties broken by identifier) and increments their
    /// caseload. `None` when no eligible investigator exists.
    async fn select_and_reserve(
        &self,
        specialization: &str,
    ) -> Result<Option<InvestigatorId>, PortError>;

    /// Decrements the investigator's caseload, floor-clamped at zero.
    async fn release(&self, investigator_id: &InvestigatorId) -> Result<(), PortError>;
}

/// External text-completion collaborator
///
/// No guarantee of structured output; an absent credential is a permanent
/// failure for every call. Adapters bound each call with a timeout.
#[async_trait]
pub trait CompletionService: DomainPort {
    async fn complete(&self, prompt: &str) -> Result<String, PortError>;
}
