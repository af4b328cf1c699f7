//! Stage agents
//!
//! Each agent consumes and produces the claim aggregate at one pipeline
//! step. Agents that consult the completion service always fall back to
//! deterministic rule-based behavior on any failure; the fallback paths
//! never raise.

pub mod fraud;
pub mod investigator;
pub mod manager;
pub mod registration;
pub mod validation;

pub use fraud::FraudAgent;
pub use investigator::InvestigatorAgent;
pub use manager::ManagerAgent;
pub use registration::RegistrationAgent;
pub use validation::ValidationAgent;
