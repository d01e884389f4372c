//! Error types for the database client

use sellerhub_common::SellerHubError;
use thiserror::Error;
use tracing::error;

/// Errors that can occur when working with the database client
#[derive(Debug, Error)]
pub enum DbError {
    /// Error from SQLx
    #[error("Database error: {0}")]
    SqlxError(#[from] sqlx::Error),

    /// Error with the database configuration
    #[error("Database configuration error: {0}")]
    ConfigError(String),

    /// Error with database URL parsing
    #[error("Database URL error: {0}")]
    UrlError(String),

    /// Error with database pool creation
    #[error("Database pool error: {0}")]
    PoolError(String),

    /// Error with database query
    #[error("Database query error: {0}")]
    QueryError(String),

    /// A unique index rejected the write
    #[error("Record already exists: {0}")]
    Conflict(String),

    /// The row addressed by an update does not exist
    #[error("Record not found: {0}")]
    NotFound(String),

    /// A stored value could not be turned back into an entity
    #[error("Row mapping error: {0}")]
    RowMapping(String),
}

impl DbError {
    /// Classifies a failed statement, turning unique-index violations into [`DbError::Conflict`].
    pub(crate) fn from_query(context: &str, err: sqlx::Error) -> Self {
        if is_unique_violation(&err) {
            return DbError::Conflict(format!("{}: {}", context, err));
        }
        error!("{}: {}", context, err);
        DbError::QueryError(format!("{}: {}", context, err))
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, DbError::Conflict(_))
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => {
            db_err.is_unique_violation() || {
                // some drivers behind `Any` only surface the message
                let message = db_err.message();
                message.contains("UNIQUE constraint failed") || message.contains("duplicate key")
            }
        }
        _ => false,
    }
}

impl From<DbError> for SellerHubError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Conflict(msg) => SellerHubError::ConflictError(msg),
            DbError::NotFound(msg) => SellerHubError::NotFoundError(msg),
            DbError::ConfigError(msg) | DbError::UrlError(msg) => SellerHubError::ConfigError(msg),
            other => SellerHubError::DatabaseError(other.to_string()),
        }
    }
}
