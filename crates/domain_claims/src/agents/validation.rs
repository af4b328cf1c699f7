//! Validation stage
//!
//! Two interchangeable strategies behind one contract: model-assisted when a
//! completion service is configured, rule-based otherwise. Every failure
//! mode of the model path (transport error, timeout, empty output, quota
//! signal in the raw text, unparsable output) falls back unconditionally to
//! the rule-based strategy; the fallback path never raises.

use std::sync::Arc;

use serde::Deserialize;
use tracing::debug;

use core_kernel::json_extract::extract_json;

use crate::aggregate::ClaimAggregate;
use crate::documents::DocType;
use crate::ports::CompletionService;
use crate::validation::{rule_based, ValidationResult};

/// Raw-text markers that indicate the provider rejected the call even though
/// it returned a 200-shaped body.
const QUOTA_MARKERS: [&str; 4] = ["resource_exhausted", "quota", "rate limit", "429"];

pub struct ValidationAgent {
    completion: Option<Arc<dyn CompletionService>>,
}

/// Shape the model is asked to return. Unknown fields are ignored; a body
/// that decodes to JSON but not to this shape triggers the fallback.
#[derive(Debug, Default, Deserialize)]
struct ModelValidation {
    #[serde(default)]
    missing_documents: Vec<String>,
    #[serde(default)]
    warnings: Vec<String>,
    #[serde(default)]
    errors: Vec<String>,
    #[serde(default)]
    validation_passed: bool,
    #[serde(default)]
    fields_extracted: serde_json::Value,
}

impl ValidationAgent {
    pub fn new(completion: Option<Arc<dyn CompletionService>>) -> Self {
        Self { completion }
    }

    pub fn rule_based_only() -> Self {
        Self { completion: None }
    }

    pub async fn run(&self, aggregate: &mut ClaimAggregate) {
        aggregate.log("[validation] start");

        let result = match self.completion.clone() {
            Some(client) => self.model_assisted(client.as_ref(), aggregate).await,
            None => {
                aggregate.log("[validation] rule-based strategy");
                rule_based(aggregate)
            }
        };

        aggregate.validated = result.docs_ok;
        aggregate.validation = Some(result);
    }

    async fn model_assisted(
        &self,
        client: &dyn CompletionService,
        aggregate: &mut ClaimAggregate,
    ) -> ValidationResult {
        let prompt = build_prompt(aggregate);

        let raw = match client.complete(&prompt).await {
            Ok(raw) => raw,
            Err(error) => {
                aggregate.log(format!("[validation] completion failed ({error}) -> fallback"));
                return fallback(aggregate);
            }
        };

        if raw.trim().is_empty() {
            aggregate.log("[validation] empty response -> fallback");
            return fallback(aggregate);
        }

        let lower = raw.to_lowercase();
        if QUOTA_MARKERS.iter().any(|marker| lower.contains(marker)) {
            aggregate.log("[validation] rate limit detected -> fallback");
            return fallback(aggregate);
        }

        let Some(value) = extract_json(&raw) else {
            aggregate.log("[validation] unparsable response -> fallback");
            debug!(%raw, "validation response had no extractable JSON");
            return fallback(aggregate);
        };

        let parsed: ModelValidation = match serde_json::from_value(value) {
            Ok(parsed) => parsed,
            Err(error) => {
                aggregate.log(format!("[validation] response shape mismatch ({error}) -> fallback"));
                return fallback(aggregate);
            }
        };

        // Structured invoice fields are logged for the audit trail only.
        if !parsed.fields_extracted.is_null() {
            aggregate.log(format!("[validation] extracted={}", parsed.fields_extracted));
        }

        let mut warnings = parsed.warnings;
        let mut required_missing = std::collections::BTreeSet::new();
        for name in &parsed.missing_documents {
            match DocType::parse(name) {
                Some(doc_type) => {
                    required_missing.insert(doc_type);
                }
                None => warnings.push(format!("unrecognized document type: {name}")),
            }
        }

        aggregate.log(format!(
            "[validation] missing={:?} errors={:?}",
            required_missing, parsed.errors
        ));

        ValidationResult {
            required_missing,
            warnings,
            errors: parsed.errors,
            docs_ok: parsed.validation_passed,
        }
    }
}

fn fallback(aggregate: &mut ClaimAggregate) -> ValidationResult {
    aggregate.log("[validation] fallback rule-based used");
    rule_based(aggregate)
}

fn build_prompt(aggregate: &ClaimAggregate) -> String {
    let mut prompt = format!(
        r#"You are an expert insurance claim validator.

Return STRICT minified JSON only (no markdown) with this shape:
{{"missing_documents":[],"fields_extracted":{{"invoice_number":null,"invoice_total":null,"invoice_date":null}},"validation_passed":false,"warnings":[],"errors":[]}}

Document types: itemized_invoice, payment_receipt, incident_report, discharge_summary, id_proof.

### CLAIM DETAILS ###
claim_type = "{claim_type}"
claim_amount = "{amount}"

### DOCUMENTS ###
"#,
        claim_type = aggregate.claim_type.as_deref().unwrap_or(""),
        amount = aggregate
            .amount
            .map(|a| a.to_string())
            .unwrap_or_default(),
    );

    for (index, document) in aggregate.documents.iter().enumerate() {
        let doc_type = document
            .doc_type
            .map(|t| t.to_string())
            .unwrap_or_else(|| "unclassified".to_string());
        prompt.push_str(&format!(
            "\n### DOC_{n} ({filename}, {doc_type}) ###\n{text}\n",
            n = index + 1,
            filename = document.filename,
            text = document.extracted_text.as_deref().unwrap_or(""),
        ));
    }

    prompt
}
