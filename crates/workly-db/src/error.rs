//! Database error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database connection error: {0}")]
    Connection(#[from] sqlx::Error),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Duplicate entry: {0}")]
    Duplicate(String),

    #[error("Migration error: {0}")]
    Migration(String),
}

impl DbError {
    /// Map a UNIQUE constraint violation to `Duplicate`, leave anything else untouched.
    pub(crate) fn unique_violation(err: sqlx::Error, what: impl Into<String>) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => DbError::Duplicate(what.into()),
            _ => DbError::Connection(err),
        }
    }

    /// Map a FOREIGN KEY violation to `NotFound`.
    pub(crate) fn foreign_key_violation(err: sqlx::Error, what: impl Into<String>) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                DbError::NotFound(what.into())
            }
            _ => DbError::Connection(err),
        }
    }
}
