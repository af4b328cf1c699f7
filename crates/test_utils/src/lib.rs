//! Test utilities for the claims pipeline workspace
//!
//! Builders construct aggregates and documents with sensible defaults so
//! tests specify only the fields they care about; fakes implement the
//! domain ports in memory, honoring the same contracts as the real
//! adapters (including the atomic select-and-reserve of the investigator
//! pool).

pub mod builders;
pub mod fakes;

pub use builders::{document, document_with_text, investigator, ClaimAggregateBuilder};
pub use fakes::{MemoryClaimStore, MemoryInvestigatorPool, ScriptedCompletion};
