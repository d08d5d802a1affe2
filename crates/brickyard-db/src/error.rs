//! # Database Error Types
//!
//! ## Error Flow
//! ```text
//!   SQLite error (sqlx::Error)
//!        │
//!        ▼
//!   DbError (this module)  ← adds context and categorization
//!        │
//!        ▼
//!   ApiError (apps/api)    ← mapped to HTTP status codes
//! ```
//!
//! Domain failures raised by the pricing pass travel through the
//! transparent [`DbError::Domain`] variant so the sale engine has one error
//! channel.

use thiserror::Error;

use brickyard_core::CoreError;

/// Database operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation (duplicate category name, duplicate
    /// sale number).
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Foreign key constraint violation, or an explicit referential guard
    /// (deleting a category with items, an item with sale history).
    #[error("{message}")]
    ForeignKeyViolation { message: String },

    /// A concurrent update invalidated this operation (e.g. the guarded
    /// stock decrement matched zero rows). The whole operation was rolled
    /// back and may be retried.
    #[error("Conflicting concurrent update: {0}")]
    Conflict(String),

    /// Database connection failed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Business rule violation from the pure pricing pass.
    #[error(transparent)]
    Domain(#[from] CoreError),

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Creates a referential-integrity rejection with a client-facing
    /// message.
    pub fn restricted(message: impl Into<String>) -> Self {
        DbError::ForeignKeyViolation {
            message: message.into(),
        }
    }

    /// True when the error is a unique violation on the named column
    /// (SQLite reports `<table>.<column>`). Used by the sale engine to
    /// retry on a sale-number collision.
    pub fn is_unique_violation_on(&self, column: &str) -> bool {
        matches!(self, DbError::UniqueViolation { field, .. } if field.contains(column))
    }
}

/// Convert sqlx errors to DbError.
///
/// SQLite constraint failures arrive as database errors with well-known
/// message prefixes; they are parsed into the matching variant.
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                if msg.contains("UNIQUE constraint failed") {
                    let field = msg
                        .split("UNIQUE constraint failed: ")
                        .nth(1)
                        .unwrap_or("unknown")
                        .to_string();
                    DbError::UniqueViolation {
                        field,
                        value: "unknown".to_string(),
                    }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_violation_column_match() {
        let err = DbError::UniqueViolation {
            field: "sales.sale_number".to_string(),
            value: "unknown".to_string(),
        };
        assert!(err.is_unique_violation_on("sale_number"));
        assert!(!err.is_unique_violation_on("name"));
    }

    #[test]
    fn domain_errors_pass_through_transparently() {
        let err: DbError = CoreError::ItemNotFound("abc".to_string()).into();
        assert_eq!(err.to_string(), "Item with ID abc not found");
    }
}
