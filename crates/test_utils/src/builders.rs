//! Test data builders
//!
//! Builder patterns for constructing test data with sensible defaults.
//! Tests specify only the relevant fields and use defaults for the rest.

use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{InvestigatorId, TransactionId};
use domain_claims::aggregate::{ClaimAggregate, DocumentRecord};
use domain_claims::documents::DocType;
use domain_claims::ports::{InvestigatorRecord, InvestigatorStatus};
use domain_claims::validation::ValidationResult;

/// Builds a claim aggregate positioned at an arbitrary pipeline point.
pub struct ClaimAggregateBuilder {
    aggregate: ClaimAggregate,
}

impl Default for ClaimAggregateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ClaimAggregateBuilder {
    /// A fresh motor claim with a plausible amount, not yet registered.
    pub fn new() -> Self {
        Self {
            aggregate: ClaimAggregate {
                claim_id: Some("CLM-1001".to_string()),
                customer_name: Some("Asha Verma".to_string()),
                policy_number: Some("POL-88421".to_string()),
                amount: Some(dec!(45_000)),
                claim_type: Some("motor".to_string()),
                ..Default::default()
            },
        }
    }

    pub fn with_amount(mut self, amount: Decimal) -> Self {
        self.aggregate.amount = Some(amount);
        self
    }

    pub fn with_claim_type(mut self, claim_type: impl Into<String>) -> Self {
        self.aggregate.claim_type = Some(claim_type.into());
        self
    }

    pub fn with_description(mut self, text: impl Into<String>) -> Self {
        self.aggregate.extracted_text = Some(text.into());
        self
    }

    pub fn with_documents(mut self, documents: Vec<DocumentRecord>) -> Self {
        self.aggregate.documents = documents;
        self
    }

    /// Marks the aggregate registered with a fixed identity, as if the
    /// registration stage had already run.
    pub fn registered(mut self) -> Self {
        self.aggregate.transaction_id = Some(TransactionId::new());
        self.aggregate.registered = true;
        self.aggregate.registered_at = Some(Utc::now());
        self
    }

    pub fn with_validation(mut self, validation: ValidationResult) -> Self {
        self.aggregate.validated = validation.docs_ok;
        self.aggregate.validation = Some(validation);
        self
    }

    pub fn fraud_scored(mut self, score: f64) -> Self {
        self.aggregate.fraud_checked = true;
        self.aggregate.fraud_score = Some(score);
        self
    }

    pub fn build(self) -> ClaimAggregate {
        self.aggregate
    }
}

/// A classified document with no text.
pub fn document(doc_type: DocType) -> DocumentRecord {
    DocumentRecord {
        filename: format!("{doc_type}.pdf"),
        content_type: "application/pdf".to_string(),
        size_bytes: 2048,
        doc_type: Some(doc_type),
        extracted_text: None,
    }
}

/// A classified document carrying extracted text.
pub fn document_with_text(doc_type: DocType, text: &str) -> DocumentRecord {
    DocumentRecord {
        extracted_text: Some(text.to_string()),
        ..document(doc_type)
    }
}

/// An active investigator record.
pub fn investigator(
    id: &str,
    specialization: &str,
    active_cases: i32,
    max_cases: i32,
) -> InvestigatorRecord {
    InvestigatorRecord {
        investigator_id: InvestigatorId::new(id),
        name: format!("Investigator {id}"),
        specialization: specialization.to_string(),
        active_cases,
        max_cases,
        status: InvestigatorStatus::Active,
    }
}

/// The full required document set for a motor claim.
pub fn complete_motor_documents() -> Vec<DocumentRecord> {
    vec![
        document(DocType::IncidentReport),
        document(DocType::ItemizedInvoice),
        document(DocType::PaymentReceipt),
        document(DocType::IdProof),
    ]
}
