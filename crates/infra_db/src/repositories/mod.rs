//! Repository implementations of the claims domain ports

pub mod claims;
pub mod investigators;

pub use claims::ClaimsRepository;
pub use investigators::InvestigatorRepository;
