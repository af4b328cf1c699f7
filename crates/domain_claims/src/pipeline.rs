//! Pipeline runner
//!
//! Sequences the stage agents according to the router. Each iteration runs
//! exactly one stage and recomputes the next one from the aggregate's flags,
//! with one fixed edge: investigator assignment always hands off to the
//! manager, whatever its outcome, so an exhausted pool cannot loop.

use std::sync::Arc;

use tracing::debug;

use crate::agents::{
    FraudAgent, InvestigatorAgent, ManagerAgent, RegistrationAgent, ValidationAgent,
};
use crate::aggregate::ClaimAggregate;
use crate::error::ClaimError;
use crate::ports::{ClaimStore, CompletionService, InvestigatorPool};
use crate::router::{next_stage, RouterConfig, Stage};

pub struct ClaimPipeline {
    registration: RegistrationAgent,
    validation: ValidationAgent,
    fraud: FraudAgent,
    investigator: InvestigatorAgent,
    manager: ManagerAgent,
    config: RouterConfig,
}

impl ClaimPipeline {
    pub fn new(
        store: Arc<dyn ClaimStore>,
        pool: Arc<dyn InvestigatorPool>,
        completion: Option<Arc<dyn CompletionService>>,
        config: RouterConfig,
    ) -> Self {
        Self {
            registration: RegistrationAgent::new(store.clone()),
            validation: ValidationAgent::new(completion.clone()),
            fraud: FraudAgent::new(completion),
            investigator: InvestigatorAgent::new(pool, store.clone(), config.clone()),
            manager: ManagerAgent::new(store, config.clone()),
            config,
        }
    }

    /// Drives the aggregate from its current durable flags to a terminal
    /// decision. Safe to re-invoke against a partially processed aggregate:
    /// the entry stage is recomputed, not remembered.
    ///
    /// A stage failure is recorded in the audit trail and surfaced without
    /// advancing the lifecycle flags; the pipeline never retries on its own.
    pub async fn run(&self, mut aggregate: ClaimAggregate) -> Result<ClaimAggregate, ClaimError> {
        let mut stage = next_stage(&aggregate, &self.config);

        while stage != Stage::End {
            debug!(?stage, "running pipeline stage");
            match stage {
                Stage::Registration => {
                    self.registration.run(&mut aggregate).await;
                }
                Stage::Validation => {
                    self.validation.run(&mut aggregate).await;
                }
                Stage::FraudScoring => {
                    self.fraud.run(&mut aggregate).await;
                }
                Stage::InvestigatorAssignment => {
                    if let Err(error) = self.investigator.run(&mut aggregate).await {
                        aggregate.log(format!("[router] investigator assignment failed: {error}"));
                        return Err(error);
                    }
                }
                Stage::ManagerDecision => {
                    self.manager.run(&mut aggregate).await;
                }
                Stage::End => break,
            }

            stage = if stage == Stage::InvestigatorAssignment {
                Stage::ManagerDecision
            } else {
                next_stage(&aggregate, &self.config)
            };
        }

        Ok(aggregate)
    }
}
