//! Registration stage
//!
//! Assigns the transaction identity exactly once, aggregates the narrative
//! and document texts, and persists the claim. A persistence failure is
//! recorded in the audit trail and does not abort the stage: the in-memory
//! aggregate still reflects registration.

use std::sync::Arc;

use chrono::Utc;
use tracing::warn;

use core_kernel::TransactionId;

use crate::aggregate::{ClaimAggregate, ClaimStatus, EXTRACTED_TEXT_MAX_CHARS};
use crate::ports::{ClaimStore, NewRegistration};

pub struct RegistrationAgent {
    store: Arc<dyn ClaimStore>,
}

impl RegistrationAgent {
    pub fn new(store: Arc<dyn ClaimStore>) -> Self {
        Self { store }
    }

    /// Runs registration. Idempotent: an existing `transaction_id` and
    /// `registered_at` are never changed by a re-run.
    pub async fn run(&self, aggregate: &mut ClaimAggregate) -> TransactionId {
        let transaction_id = *aggregate
            .transaction_id
            .get_or_insert_with(TransactionId::new);
        let registered_at = *aggregate.registered_at.get_or_insert_with(Utc::now);
        aggregate.registered = true;

        let combined = aggregate_extracted_text(aggregate);
        if !combined.is_empty() {
            aggregate.extracted_text = Some(combined);
        }

        let registration = NewRegistration {
            transaction_id,
            claim_id: aggregate.claim_id.clone(),
            customer_name: aggregate.customer_name.clone(),
            policy_number: aggregate.policy_number.clone(),
            amount: aggregate.amount,
            claim_type: aggregate.claim_type.clone(),
            extracted_text: aggregate.extracted_text.clone(),
            registered_at,
            status: ClaimStatus::Registered,
        };

        let persisted = match self.store.upsert_registration(&registration).await {
            Ok(()) => {
                self.store
                    .insert_documents(transaction_id, &aggregate.documents)
                    .await
            }
            Err(error) => Err(error),
        };

        match persisted {
            Ok(()) => aggregate.log(format!("[registration] saved tx={transaction_id}")),
            Err(error) => {
                warn!(%transaction_id, %error, "claim registration persistence failed");
                aggregate.log(format!("[registration] store_error={error}"));
            }
        }

        transaction_id
    }
}

/// Concatenates the free-text description with every document's extracted
/// text: trimmed, blank parts dropped, joined with a blank line, truncated
/// to the text cap on a character boundary.
fn aggregate_extracted_text(aggregate: &ClaimAggregate) -> String {
    let mut parts: Vec<&str> = Vec::new();
    if let Some(text) = aggregate.extracted_text.as_deref() {
        parts.push(text);
    }
    for document in &aggregate.documents {
        if let Some(text) = document.extracted_text.as_deref() {
            parts.push(text);
        }
    }

    let combined = parts
        .iter()
        .map(|part| part.trim())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n");

    truncate_chars(combined, EXTRACTED_TEXT_MAX_CHARS)
}

fn truncate_chars(text: String, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((offset, _)) => text[..offset].to_string(),
        None => text,
    }
}
