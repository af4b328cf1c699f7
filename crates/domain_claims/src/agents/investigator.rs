//! Investigator assignment stage
//!
//! Runs only for escalated claims (high fraud score or high amount) whose
//! fraud check has completed. Selection and load increment are one atomic
//! pool operation; an exhausted pool is not an error - the claim proceeds
//! unassigned.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use crate::aggregate::{Assignment, ClaimAggregate};
use crate::error::ClaimError;
use crate::ports::{ClaimStore, ClaimUpdate, InvestigatorPool};
use crate::router::{requires_investigation, RouterConfig};

/// Working days allotted to an assigned investigator.
pub const ASSIGNMENT_SLA_DAYS: u32 = 5;

const ASSIGNMENT_REASON: &str = "High fraud risk";

pub struct InvestigatorAgent {
    pool: Arc<dyn InvestigatorPool>,
    store: Arc<dyn ClaimStore>,
    config: RouterConfig,
}

impl InvestigatorAgent {
    pub fn new(
        pool: Arc<dyn InvestigatorPool>,
        store: Arc<dyn ClaimStore>,
        config: RouterConfig,
    ) -> Self {
        Self {
            pool,
            store,
            config,
        }
    }

    /// Attempts assignment. Pool errors surface to the caller; everything
    /// else (preconditions unmet, pool exhausted) is audit-logged and the
    /// claim continues.
    pub async fn run(&self, aggregate: &mut ClaimAggregate) -> Result<(), ClaimError> {
        if !aggregate.fraud_checked {
            aggregate.log("[investigator] fraud not checked");
            return Ok(());
        }
        if !requires_investigation(aggregate, &self.config) {
            aggregate.log("[investigator] no escalation required");
            return Ok(());
        }

        let specialization = aggregate
            .claim_type
            .as_deref()
            .unwrap_or_default()
            .to_ascii_lowercase();

        let Some(investigator_id) = self.pool.select_and_reserve(&specialization).await? else {
            aggregate.log("[investigator] no available investigator");
            return Ok(());
        };

        let assigned_at = Utc::now();
        aggregate.assignment = Assignment {
            investigator_id: Some(investigator_id.clone()),
            sla_days: Some(ASSIGNMENT_SLA_DAYS),
            reason: Some(ASSIGNMENT_REASON.to_string()),
            assigned_at: Some(assigned_at),
        };

        if let Some(transaction_id) = aggregate.transaction_id {
            let update = ClaimUpdate {
                investigator_id: Some(investigator_id.clone()),
                assignment_reason: Some(ASSIGNMENT_REASON.to_string()),
                assignment_status: Some("ASSIGNED".to_string()),
                assigned_at: Some(assigned_at),
                ..Default::default()
            };
            if let Err(error) = self.store.update_fields(transaction_id, update).await {
                aggregate.log(format!("[investigator] store_error={error}"));
            }
        }

        info!(%investigator_id, "investigator assigned");
        aggregate.log(format!("[investigator] assigned {investigator_id}"));
        Ok(())
    }
}
