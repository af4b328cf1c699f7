//! Claims DTOs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use core_kernel::TransactionId;
use domain_claims::aggregate::{
    Assignment, ClaimAggregate, ClaimStatus, DocumentRecord, FinalDecision, FraudDecision,
};
use domain_claims::documents::DocType;
use domain_claims::validation::ValidationResult;
use domain_claims::{Registered, StatusView};

/// Request to register a claim. Documents carry text extracted upstream.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterClaimRequest {
    #[validate(length(min = 1, message = "claim_id must not be empty"))]
    pub claim_id: String,
    #[validate(length(min = 1, message = "customer_name must not be empty"))]
    pub customer_name: String,
    #[validate(length(min = 1, message = "policy_number must not be empty"))]
    pub policy_number: String,
    pub description: Option<String>,
    pub amount: Decimal,
    #[validate(length(min = 1, message = "claim_type must not be empty"))]
    pub claim_type: String,
    #[serde(default)]
    pub documents: Vec<DocumentUpload>,
}

#[derive(Debug, Deserialize)]
pub struct DocumentUpload {
    pub filename: String,
    pub content_type: String,
    #[serde(default)]
    pub size_bytes: i64,
    pub doc_type: Option<String>,
    pub extracted_text: Option<String>,
}

impl From<DocumentUpload> for DocumentRecord {
    fn from(upload: DocumentUpload) -> Self {
        DocumentRecord {
            filename: upload.filename,
            content_type: upload.content_type,
            size_bytes: upload.size_bytes,
            doc_type: upload.doc_type.as_deref().and_then(DocType::parse),
            extracted_text: upload.extracted_text,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RegisterClaimResponse {
    pub transaction_id: TransactionId,
    pub registered_at: DateTime<Utc>,
    pub documents_uploaded: usize,
    pub claim_id: String,
    pub policy_number: String,
    pub message: String,
}

impl From<Registered> for RegisterClaimResponse {
    fn from(registered: Registered) -> Self {
        Self {
            transaction_id: registered.transaction_id,
            registered_at: registered.registered_at,
            documents_uploaded: registered.documents_uploaded,
            claim_id: registered.claim_id,
            policy_number: registered.policy_number,
            message: registered.message,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub transaction_id: TransactionId,
    pub claim_id: Option<String>,
    pub policy_number: Option<String>,
    pub status: Option<ClaimStatus>,
    pub registered_at: Option<DateTime<Utc>>,
    pub final_decision: Option<FinalDecision>,
    pub documents_uploaded: usize,
}

impl From<StatusView> for StatusResponse {
    fn from(view: StatusView) -> Self {
        Self {
            transaction_id: view.transaction_id,
            claim_id: view.claim_id,
            policy_number: view.policy_number,
            status: view.status,
            registered_at: view.registered_at,
            final_decision: view.final_decision,
            documents_uploaded: view.documents_uploaded,
        }
    }
}

/// Summary of a completed pipeline run
#[derive(Debug, Serialize)]
pub struct ProcessResponse {
    pub transaction_id: Option<TransactionId>,
    pub final_decision: Option<FinalDecision>,
    pub fraud_score: Option<f64>,
    pub fraud_decision: Option<FraudDecision>,
    pub validation: Option<ValidationResult>,
    pub assignment: Assignment,
}

impl From<ClaimAggregate> for ProcessResponse {
    fn from(aggregate: ClaimAggregate) -> Self {
        Self {
            transaction_id: aggregate.transaction_id,
            final_decision: aggregate.final_decision,
            fraud_score: aggregate.fraud_score,
            fraud_decision: aggregate.fraud_decision,
            validation: aggregate.validation,
            assignment: aggregate.assignment,
        }
    }
}

/// Manager decision override
#[derive(Debug, Deserialize)]
pub struct DecisionRequest {
    pub decision: String,
    pub comment: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DecisionResponse {
    pub transaction_id: TransactionId,
    pub status: ClaimStatus,
    pub message: String,
}
