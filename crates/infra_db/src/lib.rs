//! Database Infrastructure
//!
//! PostgreSQL adapters implementing the claims domain ports:
//! [`repositories::ClaimsRepository`] for the claim store and
//! [`repositories::InvestigatorRepository`] for the capacity-constrained
//! investigator pool. Migrations are embedded and applied at startup.

pub mod error;
pub mod pool;
pub mod repositories;

pub use error::DatabaseError;
pub use pool::{create_pool, create_pool_from_url, DatabaseConfig, DatabasePool};
pub use repositories::{ClaimsRepository, InvestigatorRepository};

/// Applies the embedded migrations.
pub async fn run_migrations(pool: &DatabasePool) -> Result<(), DatabaseError> {
    tracing::info!("Running database migrations");
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
    Ok(())
}
