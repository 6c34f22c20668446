//! Error types for the SQL store

use optibook_common::StoreError;
use thiserror::Error;

/// Errors that can occur when working with the database client
#[derive(Debug, Error)]
pub enum DbError {
    /// Error from SQLx
    #[error("Database error: {0}")]
    SqlxError(#[from] sqlx::Error),

    /// Error with the database configuration
    #[error("Database configuration error: {0}")]
    ConfigError(String),

    /// Error with database pool creation
    #[error("Database pool error: {0}")]
    PoolError(String),

    /// Error with database query
    #[error("Database query error: {0}")]
    QueryError(String),
}

impl DbError {
    /// Maps a query failure, keeping the database's SQLSTATE for policy classification.
    pub fn from_query(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(_) => DbError::SqlxError(err),
            _ => DbError::QueryError(err.to_string()),
        }
    }
}

impl From<DbError> for StoreError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::SqlxError(sqlx::Error::Database(db)) => {
                let code = db.code().map(|c| c.into_owned());
                StoreError::from_backend(code.as_deref(), db.message())
            }
            DbError::ConfigError(_) => StoreError::NotConfigured,
            other => StoreError::Request(other.to_string()),
        }
    }
}
