//! Claims Pipeline Domain
//!
//! This crate implements the claim decision pipeline: registration, document
//! validation, fraud scoring, capacity-constrained investigator assignment,
//! and the final manager decision.
//!
//! # Pipeline
//!
//! ```text
//! register -> validate -> (conditional) -> fraud -> (conditional) -> investigator? -> manager -> end
//! ```
//!
//! Routing is a pure function of the aggregate's durable flags, so an
//! abandoned run can always be resumed by re-invoking the pipeline against
//! the persisted aggregate.

pub mod agents;
pub mod aggregate;
pub mod documents;
pub mod error;
pub mod pipeline;
pub mod ports;
pub mod router;
pub mod service;
pub mod validation;

pub use aggregate::{
    Assignment, ClaimAggregate, ClaimStatus, DocumentRecord, FinalDecision, FraudDecision,
};
pub use documents::{classify_document, required_documents, DocType};
pub use error::ClaimError;
pub use pipeline::ClaimPipeline;
pub use router::{next_stage, requires_investigation, RouterConfig, Stage};
pub use service::{ClaimService, OverrideDecision, RegisterClaim, Registered, StatusView};
pub use validation::ValidationResult;
