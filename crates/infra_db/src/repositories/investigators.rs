//! Investigator pool repository
//!
//! PostgreSQL implementation of the `InvestigatorPool` port. Selection and
//! load increment are one conditional UPDATE: the least-loaded eligible row
//! is picked under `FOR UPDATE SKIP LOCKED` and the capacity predicate is
//! re-checked by the UPDATE itself, so concurrent reservations can never
//! push a caseload past `max_cases`.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use core_kernel::{DomainPort, InvestigatorId, PortError};
use domain_claims::ports::InvestigatorPool;

use crate::error::{classify_sqlx_error, DatabaseError};

/// Repository for investigator capacity records
#[derive(Debug, Clone)]
pub struct InvestigatorRepository {
    pool: PgPool,
}

/// Initial roster, inserted once at system initialization.
const SEED_INVESTIGATORS: &[(&str, &str, &str, i32, i32, &str)] = &[
    ("INV001", "Ravi Kumar", "motor", 1, 5, "ACTIVE"),
    ("INV002", "Sneha Reddy", "health", 2, 5, "ACTIVE"),
    ("INV003", "Arjun Mehta", "motor", 0, 3, "ACTIVE"),
    ("INV004", "Priya Sharma", "health", 3, 4, "ACTIVE"),
    ("INV005", "Suresh Iyer", "fraud", 1, 2, "ACTIVE"),
    ("INV006", "Kiran Rao", "motor", 2, 5, "ACTIVE"),
    ("INV007", "Meena Das", "health", 0, 5, "ACTIVE"),
    ("INV008", "Rahul Verma", "fraud", 0, 3, "ACTIVE"),
    ("INV009", "Anita Singh", "motor", 4, 5, "ACTIVE"),
    ("INV010", "Vikram Patel", "health", 1, 4, "INACTIVE"),
];

impl InvestigatorRepository {
    /// Creates a new repository backed by the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Seeds the roster. Existing rows are left untouched, so re-running at
    /// startup never resets live caseloads.
    pub async fn seed(&self) -> Result<(), DatabaseError> {
        for (id, name, specialization, active_cases, max_cases, status) in SEED_INVESTIGATORS {
            sqlx::query(
                r#"
                INSERT INTO investigators (
                    investigator_id, name, specialization, active_cases, max_cases, status
                ) VALUES ($1, $2, $3, $4, $5, $6)
                ON CONFLICT (investigator_id) DO NOTHING
                "#,
            )
            .bind(id)
            .bind(name)
            .bind(specialization)
            .bind(active_cases)
            .bind(max_cases)
            .bind(status)
            .execute(&self.pool)
            .await
            .map_err(classify_sqlx_error)?;
        }
        Ok(())
    }
}

impl DomainPort for InvestigatorRepository {}

#[async_trait]
impl InvestigatorPool for InvestigatorRepository {
    async fn select_and_reserve(
        &self,
        specialization: &str,
    ) -> Result<Option<InvestigatorId>, PortError> {
        // One statement: pick, lock, re-check capacity, increment.
        let assigned: Option<String> = sqlx::query_scalar(
            r#"
            UPDATE investigators
            SET active_cases = active_cases + 1
            WHERE investigator_id = (
                SELECT investigator_id
                FROM investigators
                WHERE specialization = $1
                  AND status = 'ACTIVE'
                  AND active_cases < max_cases
                ORDER BY active_cases ASC, investigator_id ASC
                LIMIT 1
                FOR UPDATE SKIP LOCKED
            )
            AND active_cases < max_cases
            RETURNING investigator_id
            "#,
        )
        .bind(specialization)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| PortError::from(classify_sqlx_error(e)))?;

        debug!(specialization, ?assigned, "investigator reservation");
        Ok(assigned.map(InvestigatorId::new))
    }

    async fn release(&self, investigator_id: &InvestigatorId) -> Result<(), PortError> {
        sqlx::query(
            r#"
            UPDATE investigators
            SET active_cases = CASE
                WHEN active_cases > 0 THEN active_cases - 1
                ELSE 0
            END
            WHERE investigator_id = $1
            "#,
        )
        .bind(investigator_id.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| PortError::from(classify_sqlx_error(e)))?;

        Ok(())
    }
}
