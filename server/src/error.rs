//! Error taxonomy shared by the repositories and the tournament engine.
//!
//! Nothing in here knows about HTTP; `http::error` maps each variant to a
//! status code at the boundary.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// Malformed or semantically invalid input.
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    /// Caller is authenticated but does not own the entity.
    #[error("{0}")]
    Forbidden(String),

    /// Uniqueness violation (names, friendships, a second winner).
    #[error("{0}")]
    Conflict(String),

    /// Advancing a tournament that already has a champion.
    #[error("tournament already finished")]
    AlreadyFinished { winner_id: Option<i64> },

    #[error("{0}")]
    Unauthorized(String),

    #[error("database error")]
    Persistence(#[from] sqlx::Error),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        AppError::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        AppError::Conflict(msg.into())
    }
}

/// Turn a unique-constraint violation into `Conflict(msg)`; anything else
/// stays a persistence error.
pub fn conflict_on_unique(err: sqlx::Error, msg: &str) -> AppError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => AppError::conflict(msg),
        _ => AppError::Persistence(err),
    }
}
