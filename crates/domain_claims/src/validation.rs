//! Validation result and the rule-based strategy

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::aggregate::ClaimAggregate;
use crate::documents::{required_documents, DocType};

/// Outcome of the document validation stage
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Required document types not present across the claim's documents
    #[serde(default)]
    pub required_missing: BTreeSet<DocType>,
    #[serde(default)]
    pub warnings: Vec<String>,
    #[serde(default)]
    pub errors: Vec<String>,
    #[serde(default)]
    pub docs_ok: bool,
}

impl ValidationResult {
    pub fn passed() -> Self {
        ValidationResult {
            docs_ok: true,
            ..Default::default()
        }
    }
}

/// Rule-based validation: the required set for the claim's category minus
/// the document types actually present.
pub fn rule_based(aggregate: &ClaimAggregate) -> ValidationResult {
    let required = required_documents(aggregate.claim_type.as_deref());
    let present: BTreeSet<DocType> = aggregate
        .documents
        .iter()
        .filter_map(|d| d.doc_type)
        .collect();

    let required_missing: BTreeSet<DocType> = required
        .iter()
        .copied()
        .filter(|r| !present.contains(r))
        .collect();

    ValidationResult {
        docs_ok: required_missing.is_empty(),
        required_missing,
        warnings: Vec::new(),
        errors: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::DocumentRecord;

    fn doc(doc_type: DocType) -> DocumentRecord {
        DocumentRecord {
            filename: format!("{doc_type}.pdf"),
            content_type: "application/pdf".to_string(),
            size_bytes: 1024,
            doc_type: Some(doc_type),
            extracted_text: None,
        }
    }

    #[test]
    fn test_rule_based_complete_motor_claim() {
        let aggregate = ClaimAggregate {
            claim_type: Some("motor".to_string()),
            documents: vec![
                doc(DocType::IncidentReport),
                doc(DocType::ItemizedInvoice),
                doc(DocType::PaymentReceipt),
                doc(DocType::IdProof),
            ],
            ..Default::default()
        };

        let result = rule_based(&aggregate);
        assert!(result.docs_ok);
        assert!(result.required_missing.is_empty());
    }

    #[test]
    fn test_rule_based_missing_documents() {
        let aggregate = ClaimAggregate {
            claim_type: Some("health".to_string()),
            documents: vec![doc(DocType::ItemizedInvoice)],
            ..Default::default()
        };

        let result = rule_based(&aggregate);
        assert!(!result.docs_ok);
        assert!(result.required_missing.contains(&DocType::DischargeSummary));
        assert!(result.required_missing.contains(&DocType::PaymentReceipt));
        assert!(result.required_missing.contains(&DocType::IdProof));
        assert!(!result.required_missing.contains(&DocType::ItemizedInvoice));
    }

    #[test]
    fn test_rule_based_unknown_type_uses_default_set() {
        let aggregate = ClaimAggregate {
            claim_type: Some("travel".to_string()),
            documents: vec![
                doc(DocType::ItemizedInvoice),
                doc(DocType::PaymentReceipt),
                doc(DocType::IdProof),
            ],
            ..Default::default()
        };

        assert!(rule_based(&aggregate).docs_ok);
    }
}
