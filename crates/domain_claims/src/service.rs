//! Claim application service
//!
//! The four operations exposed to transport layers: register, status check,
//! pipeline run, and the human decision override. The service owns the
//! wiring of agents to ports; transport crates hold an `Arc<ClaimService>`
//! and nothing else.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use core_kernel::TransactionId;

use crate::agents::RegistrationAgent;
use crate::aggregate::{ClaimAggregate, ClaimStatus, DocumentRecord, FinalDecision};
use crate::documents::classify_document;
use crate::error::ClaimError;
use crate::pipeline::ClaimPipeline;
use crate::ports::{ClaimSnapshot, ClaimStore, ClaimUpdate, CompletionService, InvestigatorPool};
use crate::router::RouterConfig;

/// Customer-supplied claim fields plus the uploaded documents (text already
/// extracted upstream; OCR is not this system's concern).
#[derive(Debug, Clone)]
pub struct RegisterClaim {
    pub claim_id: String,
    pub customer_name: String,
    pub policy_number: String,
    pub description: Option<String>,
    pub amount: Decimal,
    pub claim_type: String,
    pub documents: Vec<DocumentRecord>,
}

/// Registration confirmation
#[derive(Debug, Clone, Serialize)]
pub struct Registered {
    pub transaction_id: TransactionId,
    pub registered_at: DateTime<Utc>,
    pub documents_uploaded: usize,
    pub claim_id: String,
    pub policy_number: String,
    pub message: String,
}

/// Customer-facing status view. Internal stage errors are never exposed
/// here, only the persisted status and decision.
#[derive(Debug, Clone, Serialize)]
pub struct StatusView {
    pub transaction_id: TransactionId,
    pub claim_id: Option<String>,
    pub policy_number: Option<String>,
    pub status: Option<ClaimStatus>,
    pub registered_at: Option<DateTime<Utc>>,
    pub final_decision: Option<FinalDecision>,
    pub documents_uploaded: usize,
}

/// Decisions a manager may set directly, bypassing the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OverrideDecision {
    Approved,
    Rejected,
    PendingDocuments,
}

impl OverrideDecision {
    fn final_decision(&self) -> FinalDecision {
        match self {
            OverrideDecision::Approved => FinalDecision::Approved,
            OverrideDecision::Rejected => FinalDecision::Rejected,
            OverrideDecision::PendingDocuments => FinalDecision::PendingDocuments,
        }
    }

    fn status(&self) -> ClaimStatus {
        match self {
            OverrideDecision::Approved => ClaimStatus::Approved,
            OverrideDecision::Rejected => ClaimStatus::Rejected,
            OverrideDecision::PendingDocuments => ClaimStatus::PendingDocuments,
        }
    }
}

impl FromStr for OverrideDecision {
    type Err = ClaimError;

    /// Validates before any write; anything outside the allowed set is an
    /// `InvalidOverride`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "APPROVED" => Ok(OverrideDecision::Approved),
            "REJECTED" => Ok(OverrideDecision::Rejected),
            "PENDING_DOCUMENTS" => Ok(OverrideDecision::PendingDocuments),
            other => Err(ClaimError::InvalidOverride(other.to_string())),
        }
    }
}

pub struct ClaimService {
    store: Arc<dyn ClaimStore>,
    registration: RegistrationAgent,
    pipeline: ClaimPipeline,
}

impl ClaimService {
    pub fn new(
        store: Arc<dyn ClaimStore>,
        pool: Arc<dyn InvestigatorPool>,
        completion: Option<Arc<dyn CompletionService>>,
        config: RouterConfig,
    ) -> Self {
        Self {
            store: store.clone(),
            registration: RegistrationAgent::new(store.clone()),
            pipeline: ClaimPipeline::new(store, pool, completion, config),
        }
    }

    /// Registers a claim with its documents and returns the confirmation.
    /// Only the registration stage runs here; the decision pipeline is a
    /// separate, resumable invocation.
    pub async fn register(&self, input: RegisterClaim) -> Result<Registered, ClaimError> {
        let mut documents = input.documents;
        for document in &mut documents {
            if document.doc_type.is_none() {
                document.doc_type = Some(classify_document(
                    &document.filename,
                    &document.content_type,
                    document.extracted_text.as_deref().unwrap_or(""),
                ));
            }
        }

        let mut aggregate = ClaimAggregate {
            claim_id: Some(input.claim_id.clone()),
            customer_name: Some(input.customer_name),
            policy_number: Some(input.policy_number.clone()),
            amount: Some(input.amount),
            claim_type: Some(input.claim_type.to_ascii_lowercase()),
            extracted_text: input.description,
            documents,
            ..Default::default()
        };

        let transaction_id = self.registration.run(&mut aggregate).await;
        let registered_at = aggregate.registered_at.unwrap_or_else(Utc::now);

        Ok(Registered {
            transaction_id,
            registered_at,
            documents_uploaded: aggregate.documents.len(),
            message: confirmation_message(
                &input.claim_id,
                &input.policy_number,
                transaction_id,
                registered_at,
            ),
            claim_id: input.claim_id,
            policy_number: input.policy_number,
        })
    }

    /// Customer status check.
    pub async fn get_status(&self, transaction_id: TransactionId) -> Result<StatusView, ClaimError> {
        let (snapshot, documents) = self
            .store
            .fetch_by_transaction_id(transaction_id)
            .await?
            .ok_or(ClaimError::NotFound(transaction_id))?;

        Ok(StatusView {
            transaction_id: snapshot.transaction_id,
            claim_id: snapshot.claim_id,
            policy_number: snapshot.policy_number,
            status: snapshot.status,
            registered_at: snapshot.registered_at,
            final_decision: snapshot.final_decision,
            documents_uploaded: documents.len(),
        })
    }

    /// Rebuilds the aggregate from durable state and drives it to a
    /// terminal decision.
    pub async fn run_pipeline(
        &self,
        transaction_id: TransactionId,
    ) -> Result<ClaimAggregate, ClaimError> {
        let (snapshot, documents) = self
            .store
            .fetch_by_transaction_id(transaction_id)
            .await?
            .ok_or(ClaimError::NotFound(transaction_id))?;

        let aggregate = rehydrate(snapshot, documents);
        self.pipeline.run(aggregate).await
    }

    /// Directly overwrites the stored decision. Re-runs nothing.
    pub async fn override_decision(
        &self,
        transaction_id: TransactionId,
        decision: OverrideDecision,
        comment: Option<String>,
    ) -> Result<ClaimStatus, ClaimError> {
        if self
            .store
            .fetch_by_transaction_id(transaction_id)
            .await?
            .is_none()
        {
            return Err(ClaimError::NotFound(transaction_id));
        }

        let status = decision.status();
        let update = ClaimUpdate {
            final_decision: Some(decision.final_decision()),
            status: Some(status),
            manager_comment: comment,
            ..Default::default()
        };
        self.store.update_fields(transaction_id, update).await?;
        Ok(status)
    }
}

/// Rebuilds a runnable aggregate from the persisted row and documents.
/// Stage outputs (validation, fraud) are recomputed by the pipeline rather
/// than rehydrated: both stages overwrite their own prior output, so a
/// re-run is safe and picks up current documents.
fn rehydrate(snapshot: ClaimSnapshot, documents: Vec<DocumentRecord>) -> ClaimAggregate {
    ClaimAggregate {
        transaction_id: Some(snapshot.transaction_id),
        claim_id: snapshot.claim_id,
        customer_name: snapshot.customer_name,
        policy_number: snapshot.policy_number,
        amount: snapshot.amount,
        claim_type: snapshot.claim_type,
        extracted_text: snapshot.extracted_text,
        documents,
        registered: true,
        registered_at: snapshot.registered_at,
        ..Default::default()
    }
}

fn confirmation_message(
    claim_id: &str,
    policy_number: &str,
    transaction_id: TransactionId,
    registered_at: DateTime<Utc>,
) -> String {
    let date = registered_at.format("%B %d, %Y");
    let time = registered_at.format("%I:%M %p UTC");
    format!(
        "Thank you for registering your claim.\n\n\
         Your claim '{claim_id}' under policy '{policy_number}' was successfully \
         registered on {date} at {time}.\n\n\
         Your reference number for this transaction is:\n{transaction_id}\n\n\
         Our team will now validate and review your claim. You can use this \
         reference number to track the status anytime.\n\n\
         Thank you for choosing our insurance services."
    )
}
