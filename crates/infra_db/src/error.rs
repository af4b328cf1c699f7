//! Database error types
//!
//! This module defines the error types that can occur during database
//! operations, providing meaningful error messages and proper error
//! chaining, plus the mapping into the domain's `PortError` taxonomy.

use core_kernel::PortError;
use thiserror::Error;

/// Errors that can occur during database operations
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Failed to establish a database connection
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Entity not found in database
    #[error("Entity not found: {0}")]
    NotFound(String),

    /// Unique constraint violation
    #[error("Duplicate entry: {0}")]
    DuplicateEntry(String),

    /// Foreign key constraint violation
    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),

    /// Check constraint violation
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// Migration error
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Pool exhaustion - no available connections
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Generic SQL error
    #[error("SQL error: {0}")]
    SqlError(#[from] sqlx::Error),
}

impl DatabaseError {
    /// Creates a not found error for a specific entity type and identifier
    pub fn not_found(entity: &str, id: impl std::fmt::Display) -> Self {
        DatabaseError::NotFound(format!("{} with id '{}' not found", entity, id))
    }

    /// Checks if this error indicates a record was not found
    pub fn is_not_found(&self) -> bool {
        matches!(self, DatabaseError::NotFound(_))
    }

    /// Checks if this error is a connection-related issue
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            DatabaseError::ConnectionFailed(_) | DatabaseError::PoolExhausted
        )
    }
}

/// Maps SQLx errors to more specific DatabaseError variants based on the
/// PostgreSQL error code.
pub fn classify_sqlx_error(error: sqlx::Error) -> DatabaseError {
    match &error {
        sqlx::Error::RowNotFound => DatabaseError::NotFound("Record not found".to_string()),
        sqlx::Error::PoolTimedOut => DatabaseError::PoolExhausted,
        sqlx::Error::Database(db_err) => {
            // https://www.postgresql.org/docs/current/errcodes-appendix.html
            if let Some(code) = db_err.code() {
                match code.as_ref() {
                    "23505" => DatabaseError::DuplicateEntry(db_err.message().to_string()),
                    "23503" => DatabaseError::ForeignKeyViolation(db_err.message().to_string()),
                    "23514" => DatabaseError::ConstraintViolation(db_err.message().to_string()),
                    _ => DatabaseError::QueryFailed(db_err.message().to_string()),
                }
            } else {
                DatabaseError::QueryFailed(db_err.message().to_string())
            }
        }
        _ => DatabaseError::QueryFailed(error.to_string()),
    }
}

/// Lifts database failures into the domain's port taxonomy, preserving the
/// transient/permanent distinction.
impl From<DatabaseError> for PortError {
    fn from(error: DatabaseError) -> Self {
        match &error {
            DatabaseError::NotFound(message) => PortError::NotFound {
                entity_type: "Record".to_string(),
                id: message.clone(),
            },
            DatabaseError::ConnectionFailed(message) => PortError::connection(message.clone()),
            DatabaseError::PoolExhausted => PortError::connection("connection pool exhausted"),
            _ => PortError::Internal {
                message: error.to_string(),
                source: Some(Box::new(error)),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_helper() {
        let error = DatabaseError::not_found("Claim", "TXN-1");
        assert!(error.is_not_found());
        assert!(error.to_string().contains("Claim"));
    }

    #[test]
    fn test_connection_errors_map_to_transient_port_errors() {
        let port: PortError = DatabaseError::PoolExhausted.into();
        assert!(port.is_transient());

        let port: PortError = DatabaseError::ConnectionFailed("refused".to_string()).into();
        assert!(port.is_transient());

        let port: PortError = DatabaseError::QueryFailed("syntax".to_string()).into();
        assert!(!port.is_transient());
    }
}
