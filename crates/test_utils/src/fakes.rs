//! In-memory fakes for the domain ports
//!
//! The fakes honor the same contracts as the real adapters. In particular,
//! `MemoryInvestigatorPool` holds its lock across the capacity check and
//! the increment, matching the single-statement atomicity the PostgreSQL
//! adapter gets from its conditional UPDATE.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use core_kernel::{DomainPort, InvestigatorId, PortError, TransactionId};
use domain_claims::aggregate::DocumentRecord;
use domain_claims::ports::{
    ClaimSnapshot, ClaimStore, ClaimUpdate, CompletionService, InvestigatorPool,
    InvestigatorRecord, NewRegistration,
};

/// In-memory claim store keyed by transaction id.
#[derive(Default)]
pub struct MemoryClaimStore {
    claims: Mutex<HashMap<TransactionId, (ClaimSnapshot, Vec<DocumentRecord>)>>,
    fail_writes: AtomicBool,
}

impl MemoryClaimStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent write fail, simulating a persistence outage.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn snapshot(&self, transaction_id: TransactionId) -> Option<ClaimSnapshot> {
        self.claims
            .lock()
            .unwrap()
            .get(&transaction_id)
            .map(|(snapshot, _)| snapshot.clone())
    }

    fn check_writable(&self) -> Result<(), PortError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            Err(PortError::connection("claim store unavailable"))
        } else {
            Ok(())
        }
    }
}

impl DomainPort for MemoryClaimStore {}

#[async_trait]
impl ClaimStore for MemoryClaimStore {
    async fn upsert_registration(&self, registration: &NewRegistration) -> Result<(), PortError> {
        self.check_writable()?;
        let snapshot = ClaimSnapshot {
            transaction_id: registration.transaction_id,
            claim_id: registration.claim_id.clone(),
            customer_name: registration.customer_name.clone(),
            policy_number: registration.policy_number.clone(),
            amount: registration.amount,
            claim_type: registration.claim_type.clone(),
            extracted_text: registration.extracted_text.clone(),
            registered_at: Some(registration.registered_at),
            status: Some(registration.status),
            final_decision: None,
            fraud_score: None,
            fraud_decision: None,
            claim_validated: None,
            manager_comment: None,
            investigator_id: None,
        };
        let mut claims = self.claims.lock().unwrap();
        let documents = claims
            .remove(&registration.transaction_id)
            .map(|(_, docs)| docs)
            .unwrap_or_default();
        claims.insert(registration.transaction_id, (snapshot, documents));
        Ok(())
    }

    async fn insert_documents(
        &self,
        transaction_id: TransactionId,
        documents: &[DocumentRecord],
    ) -> Result<(), PortError> {
        self.check_writable()?;
        let mut claims = self.claims.lock().unwrap();
        let entry = claims
            .get_mut(&transaction_id)
            .ok_or_else(|| PortError::not_found("Claim", transaction_id))?;
        entry.1.extend_from_slice(documents);
        Ok(())
    }

    async fn fetch_by_transaction_id(
        &self,
        transaction_id: TransactionId,
    ) -> Result<Option<(ClaimSnapshot, Vec<DocumentRecord>)>, PortError> {
        Ok(self.claims.lock().unwrap().get(&transaction_id).cloned())
    }

    async fn update_fields(
        &self,
        transaction_id: TransactionId,
        update: ClaimUpdate,
    ) -> Result<(), PortError> {
        self.check_writable()?;
        if update.is_empty() {
            return Ok(());
        }
        let mut claims = self.claims.lock().unwrap();
        let (snapshot, _) = claims
            .get_mut(&transaction_id)
            .ok_or_else(|| PortError::not_found("Claim", transaction_id))?;

        if let Some(text) = update.extracted_text {
            snapshot.extracted_text = Some(text);
        }
        if let Some(status) = update.status {
            snapshot.status = Some(status);
        }
        if let Some(decision) = update.final_decision {
            snapshot.final_decision = Some(decision);
        }
        if let Some(score) = update.fraud_score {
            snapshot.fraud_score = Some(score);
        }
        if let Some(decision) = update.fraud_decision {
            snapshot.fraud_decision = Some(decision);
        }
        if let Some(validated) = update.claim_validated {
            snapshot.claim_validated = Some(validated);
        }
        if let Some(comment) = update.manager_comment {
            snapshot.manager_comment = Some(comment);
        }
        if let Some(investigator_id) = update.investigator_id {
            snapshot.investigator_id = Some(investigator_id);
        }
        Ok(())
    }
}

/// In-memory investigator pool with atomic select-and-reserve.
#[derive(Default)]
pub struct MemoryInvestigatorPool {
    records: Mutex<BTreeMap<InvestigatorId, InvestigatorRecord>>,
}

impl MemoryInvestigatorPool {
    pub fn with_records(records: Vec<InvestigatorRecord>) -> Self {
        Self {
            records: Mutex::new(
                records
                    .into_iter()
                    .map(|record| (record.investigator_id.clone(), record))
                    .collect(),
            ),
        }
    }

    pub fn active_cases(&self, investigator_id: &InvestigatorId) -> Option<i32> {
        self.records
            .lock()
            .unwrap()
            .get(investigator_id)
            .map(|record| record.active_cases)
    }

    pub fn records(&self) -> Vec<InvestigatorRecord> {
        self.records.lock().unwrap().values().cloned().collect()
    }
}

impl DomainPort for MemoryInvestigatorPool {}

#[async_trait]
impl InvestigatorPool for MemoryInvestigatorPool {
    async fn select_and_reserve(
        &self,
        specialization: &str,
    ) -> Result<Option<InvestigatorId>, PortError> {
        // One lock scope covers the check and the increment; nothing can
        // observe a stale count in between.
        let mut records = self.records.lock().unwrap();
        let chosen = records
            .values()
            .filter(|record| record.specialization == specialization && record.has_capacity())
            .min_by_key(|record| (record.active_cases, record.investigator_id.clone()))
            .map(|record| record.investigator_id.clone());

        if let Some(investigator_id) = &chosen {
            if let Some(record) = records.get_mut(investigator_id) {
                record.active_cases += 1;
            }
        }
        Ok(chosen)
    }

    async fn release(&self, investigator_id: &InvestigatorId) -> Result<(), PortError> {
        let mut records = self.records.lock().unwrap();
        if let Some(record) = records.get_mut(investigator_id) {
            record.active_cases = (record.active_cases - 1).max(0);
        }
        Ok(())
    }
}

enum ScriptMode {
    Always(String),
    Fail,
    Sequence(Mutex<VecDeque<String>>),
}

/// Completion service fake: fixed reply, scripted sequence, or permanent
/// failure. Counts calls so tests can assert a stage was never invoked.
pub struct ScriptedCompletion {
    mode: ScriptMode,
    calls: AtomicUsize,
}

impl ScriptedCompletion {
    /// Replies with the same text on every call.
    pub fn always(text: impl Into<String>) -> Self {
        Self {
            mode: ScriptMode::Always(text.into()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Fails every call, as an unreachable or unconfigured service would.
    pub fn failing() -> Self {
        Self {
            mode: ScriptMode::Fail,
            calls: AtomicUsize::new(0),
        }
    }

    /// Replies in order, then fails once exhausted.
    pub fn sequence(replies: Vec<String>) -> Self {
        Self {
            mode: ScriptMode::Sequence(Mutex::new(replies.into())),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl DomainPort for ScriptedCompletion {}

#[async_trait]
impl CompletionService for ScriptedCompletion {
    async fn complete(&self, _prompt: &str) -> Result<String, PortError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.mode {
            ScriptMode::Always(text) => Ok(text.clone()),
            ScriptMode::Fail => Err(PortError::unavailable("completion")),
            ScriptMode::Sequence(replies) => replies
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| PortError::unavailable("completion")),
        }
    }
}
