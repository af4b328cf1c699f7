//! Claims domain errors

use core_kernel::{PortError, TransactionId};
use thiserror::Error;

/// Errors that can occur in the claims domain
#[derive(Debug, Error)]
pub enum ClaimError {
    #[error("Claim not found: {0}")]
    NotFound(TransactionId),

    #[error("Invalid decision override: {0}")]
    InvalidOverride(String),

    #[error("Store error: {0}")]
    Store(#[from] PortError),
}

impl ClaimError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClaimError::NotFound(_))
    }
}
