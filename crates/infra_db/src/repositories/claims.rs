//! Claim store repository
//!
//! PostgreSQL implementation of the `ClaimStore` port. Uses the runtime
//! query API so the crate builds without a live database; row structs are
//! mapped with `FromRow` and converted into the domain's transfer types.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use core_kernel::{DomainPort, InvestigatorId, PortError, TransactionId};
use domain_claims::aggregate::DocumentRecord;
use domain_claims::documents::DocType;
use domain_claims::ports::{ClaimSnapshot, ClaimStore, ClaimUpdate, NewRegistration};

use crate::error::classify_sqlx_error;

/// Repository for claim aggregates and their documents
#[derive(Debug, Clone)]
pub struct ClaimsRepository {
    pool: PgPool,
}

impl ClaimsRepository {
    /// Creates a new repository backed by the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl DomainPort for ClaimsRepository {}

fn port_err(error: sqlx::Error) -> PortError {
    classify_sqlx_error(error).into()
}

#[derive(Debug, FromRow)]
struct ClaimRow {
    transaction_id: Uuid,
    claim_id: Option<String>,
    customer_name: Option<String>,
    policy_number: Option<String>,
    amount: Option<Decimal>,
    claim_type: Option<String>,
    extracted_text: Option<String>,
    registered_at: Option<DateTime<Utc>>,
    status: Option<String>,
    final_decision: Option<String>,
    fraud_score: Option<f64>,
    fraud_decision: Option<String>,
    claim_validated: Option<bool>,
    manager_comment: Option<String>,
    investigator_id: Option<String>,
}

impl From<ClaimRow> for ClaimSnapshot {
    fn from(row: ClaimRow) -> Self {
        ClaimSnapshot {
            transaction_id: TransactionId::from(row.transaction_id),
            claim_id: row.claim_id,
            customer_name: row.customer_name,
            policy_number: row.policy_number,
            amount: row.amount,
            claim_type: row.claim_type,
            extracted_text: row.extracted_text,
            registered_at: row.registered_at,
            status: row.status.and_then(|s| s.parse().ok()),
            final_decision: row.final_decision.and_then(|s| s.parse().ok()),
            fraud_score: row.fraud_score,
            fraud_decision: row.fraud_decision.and_then(|s| s.parse().ok()),
            claim_validated: row.claim_validated,
            manager_comment: row.manager_comment,
            investigator_id: row.investigator_id.map(InvestigatorId::new),
        }
    }
}

#[derive(Debug, FromRow)]
struct DocumentRow {
    filename: Option<String>,
    content_type: Option<String>,
    size_bytes: i64,
    doc_type: Option<String>,
    extracted_text: Option<String>,
}

impl From<DocumentRow> for DocumentRecord {
    fn from(row: DocumentRow) -> Self {
        DocumentRecord {
            filename: row.filename.unwrap_or_default(),
            content_type: row.content_type.unwrap_or_default(),
            size_bytes: row.size_bytes,
            doc_type: row.doc_type.as_deref().and_then(DocType::parse),
            extracted_text: row.extracted_text,
        }
    }
}

const CLAIM_COLUMNS: &str = "transaction_id, claim_id, customer_name, policy_number, amount, \
     claim_type, extracted_text, registered_at, status, final_decision, fraud_score, \
     fraud_decision, claim_validated, manager_comment, investigator_id";

/// Columns that the update touches, in bind order.
fn set_columns(update: &ClaimUpdate) -> Vec<&'static str> {
    let mut columns = Vec::new();
    if update.extracted_text.is_some() {
        columns.push("extracted_text");
    }
    if update.status.is_some() {
        columns.push("status");
    }
    if update.final_decision.is_some() {
        columns.push("final_decision");
    }
    if update.fraud_score.is_some() {
        columns.push("fraud_score");
    }
    if update.fraud_decision.is_some() {
        columns.push("fraud_decision");
    }
    if update.claim_validated.is_some() {
        columns.push("claim_validated");
    }
    if update.manager_comment.is_some() {
        columns.push("manager_comment");
    }
    if update.investigator_id.is_some() {
        columns.push("investigator_id");
    }
    if update.assignment_reason.is_some() {
        columns.push("assignment_reason");
    }
    if update.assignment_status.is_some() {
        columns.push("assignment_status");
    }
    if update.assigned_at.is_some() {
        columns.push("assigned_at");
    }
    columns
}

fn build_update_sql(columns: &[&str]) -> String {
    let mut sets: Vec<String> = columns
        .iter()
        .enumerate()
        .map(|(i, column)| format!("{column} = ${}", i + 1))
        .collect();
    sets.push(format!("updated_at = ${}", columns.len() + 1));
    format!(
        "UPDATE claims SET {} WHERE transaction_id = ${}",
        sets.join(", "),
        columns.len() + 2
    )
}

#[async_trait]
impl ClaimStore for ClaimsRepository {
    async fn upsert_registration(&self, registration: &NewRegistration) -> Result<(), PortError> {
        sqlx::query(
            r#"
            INSERT INTO claims (
                transaction_id, claim_id, customer_name, policy_number,
                amount, claim_type, extracted_text, registered_at, status, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (transaction_id) DO UPDATE SET
                claim_id = EXCLUDED.claim_id,
                customer_name = EXCLUDED.customer_name,
                policy_number = EXCLUDED.policy_number,
                amount = EXCLUDED.amount,
                claim_type = EXCLUDED.claim_type,
                extracted_text = EXCLUDED.extracted_text,
                registered_at = EXCLUDED.registered_at,
                status = EXCLUDED.status,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(Uuid::from(registration.transaction_id))
        .bind(&registration.claim_id)
        .bind(&registration.customer_name)
        .bind(&registration.policy_number)
        .bind(registration.amount)
        .bind(&registration.claim_type)
        .bind(&registration.extracted_text)
        .bind(registration.registered_at)
        .bind(registration.status.as_str())
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(port_err)?;

        Ok(())
    }

    async fn insert_documents(
        &self,
        transaction_id: TransactionId,
        documents: &[DocumentRecord],
    ) -> Result<(), PortError> {
        if documents.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await.map_err(port_err)?;
        for document in documents {
            sqlx::query(
                r#"
                INSERT INTO claim_documents (
                    transaction_id, filename, content_type, size_bytes, doc_type, extracted_text
                ) VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(Uuid::from(transaction_id))
            .bind(&document.filename)
            .bind(&document.content_type)
            .bind(document.size_bytes)
            .bind(document.doc_type.map(|t| t.as_str()))
            .bind(&document.extracted_text)
            .execute(&mut *tx)
            .await
            .map_err(port_err)?;
        }
        tx.commit().await.map_err(port_err)?;

        Ok(())
    }

    async fn fetch_by_transaction_id(
        &self,
        transaction_id: TransactionId,
    ) -> Result<Option<(ClaimSnapshot, Vec<DocumentRecord>)>, PortError> {
        let sql = format!("SELECT {CLAIM_COLUMNS} FROM claims WHERE transaction_id = $1");
        let row: Option<ClaimRow> = sqlx::query_as(&sql)
            .bind(Uuid::from(transaction_id))
            .fetch_optional(&self.pool)
            .await
            .map_err(port_err)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let documents: Vec<DocumentRow> = sqlx::query_as(
            r#"
            SELECT filename, content_type, size_bytes, doc_type, extracted_text
            FROM claim_documents
            WHERE transaction_id = $1
            ORDER BY id ASC
            "#,
        )
        .bind(Uuid::from(transaction_id))
        .fetch_all(&self.pool)
        .await
        .map_err(port_err)?;

        Ok(Some((
            ClaimSnapshot::from(row),
            documents.into_iter().map(DocumentRecord::from).collect(),
        )))
    }

    async fn update_fields(
        &self,
        transaction_id: TransactionId,
        update: ClaimUpdate,
    ) -> Result<(), PortError> {
        if update.is_empty() {
            return Ok(());
        }

        let columns = set_columns(&update);
        let sql = build_update_sql(&columns);

        // Bind order must match set_columns.
        let mut query = sqlx::query(&sql);
        if let Some(value) = update.extracted_text {
            query = query.bind(value);
        }
        if let Some(value) = update.status {
            query = query.bind(value.as_str());
        }
        if let Some(value) = update.final_decision {
            query = query.bind(value.as_str());
        }
        if let Some(value) = update.fraud_score {
            query = query.bind(value);
        }
        if let Some(value) = update.fraud_decision {
            query = query.bind(value.as_str());
        }
        if let Some(value) = update.claim_validated {
            query = query.bind(value);
        }
        if let Some(value) = update.manager_comment {
            query = query.bind(value);
        }
        if let Some(value) = update.investigator_id {
            query = query.bind(value.as_str().to_string());
        }
        if let Some(value) = update.assignment_reason {
            query = query.bind(value);
        }
        if let Some(value) = update.assignment_status {
            query = query.bind(value);
        }
        if let Some(value) = update.assigned_at {
            query = query.bind(value);
        }

        query
            .bind(Utc::now())
            .bind(Uuid::from(transaction_id))
            .execute(&self.pool)
            .await
            .map_err(port_err)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain_claims::aggregate::{ClaimStatus, FinalDecision};

    #[test]
    fn test_update_sql_shape() {
        let update = ClaimUpdate {
            status: Some(ClaimStatus::Approved),
            final_decision: Some(FinalDecision::Approved),
            manager_comment: Some("ok".to_string()),
            ..Default::default()
        };

        let columns = set_columns(&update);
        assert_eq!(columns, vec!["status", "final_decision", "manager_comment"]);

        let sql = build_update_sql(&columns);
        assert_eq!(
            sql,
            "UPDATE claims SET status = $1, final_decision = $2, manager_comment = $3, \
             updated_at = $4 WHERE transaction_id = $5"
        );
    }

    #[test]
    fn test_update_sql_single_column() {
        let update = ClaimUpdate {
            fraud_score: Some(0.4),
            ..Default::default()
        };
        let columns = set_columns(&update);
        let sql = build_update_sql(&columns);
        assert_eq!(
            sql,
            "UPDATE claims SET fraud_score = $1, updated_at = $2 WHERE transaction_id = $3"
        );
    }
}
