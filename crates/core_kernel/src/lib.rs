//! Core Kernel - Foundational types and utilities for the claims pipeline
//!
//! This crate provides the building blocks used across all domain modules:
//! - Strongly-typed identifiers
//! - The shared port error taxonomy with transient-failure classification
//! - Tolerant JSON extraction for unstructured completion output

pub mod error;
pub mod identifiers;
pub mod json_extract;
pub mod ports;

pub use error::CoreError;
pub use identifiers::{InvestigatorId, TransactionId};
pub use ports::{DomainPort, PortError};
