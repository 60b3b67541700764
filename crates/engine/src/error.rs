//! The module contains the errors the engine can throw.
//!
//! Every operation reports exactly one kind:
//!
//! - [`Validation`] the request was rejected before anything was written.
//! - [`Forbidden`] the actor is not a member of the target group.
//! - [`Conflict`] the store refused a write that passed the pre-checks.
//! - [`Transient`] the store was unreachable or the deadline expired; the whole
//!   operation can be retried from scratch.
//! - [`KeyNotFound`] a referenced group, expense or settlement does not exist.
//!
//!  [`Validation`]: EngineError::Validation
//!  [`Forbidden`]: EngineError::Forbidden
//!  [`Conflict`]: EngineError::Conflict
//!  [`Transient`]: EngineError::Transient
//!  [`KeyNotFound`]: EngineError::KeyNotFound
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;
use uuid::Uuid;

use crate::Money;

/// Reasons a write is rejected before touching the store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("malformed amount: {0}")]
    MalformedAmount(String),
    #[error("total amount must be greater than 0")]
    NonPositiveTotal,
    #[error("split amount cannot be negative")]
    NegativeSplit,
    #[error("at least one split is required")]
    EmptySplits,
    #[error("duplicate user in splits: {0}")]
    DuplicateParticipant(Uuid),
    #[error("splits sum {sum} does not match total amount {total}")]
    SplitSumMismatch { total: Money, sum: Money },
    #[error("split user {0} is not a member of the group")]
    NonMemberParticipant(Uuid),
    #[error("payer {0} is not a member of the group")]
    NonMemberPayer(Uuid),
    #[error("user {0} is not a member of the group")]
    NonMember(Uuid),
    #[error("cannot settle to self")]
    SelfSettlement,
    #[error("settlement amount must be greater than 0")]
    NonPositiveSettlement,
    #[error("{0} must not be empty")]
    EmptyName(&'static str),
    #[error("user {0} already in group")]
    AlreadyMember(Uuid),
    #[error("invalid page: {0}")]
    InvalidPage(String),
}

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Temporarily unavailable: {0}")]
    Transient(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error(transparent)]
    Database(DbErr),
}

impl EngineError {
    /// Classifies a store error.
    ///
    /// Constraint violations become [`EngineError::Conflict`], connectivity
    /// problems [`EngineError::Transient`]; anything else stays a database
    /// error.
    pub fn from_db(err: DbErr) -> Self {
        if let Some(sql_err) = err.sql_err() {
            return match sql_err {
                SqlErr::UniqueConstraintViolation(msg) => {
                    Self::Conflict(format!("unique constraint violated: {msg}"))
                }
                SqlErr::ForeignKeyConstraintViolation(msg) => {
                    Self::Conflict(format!("foreign key constraint violated: {msg}"))
                }
                other => Self::Conflict(other.to_string()),
            };
        }

        match err {
            DbErr::ConnectionAcquire(inner) => Self::Transient(inner.to_string()),
            DbErr::Conn(inner) => Self::Transient(inner.to_string()),
            other if is_check_violation(&other) => {
                Self::Conflict(format!("check constraint violated: {other}"))
            }
            other => Self::Database(other),
        }
    }

    /// Returns `true` if nothing was committed and the same operation can be
    /// retried from scratch.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}

fn is_check_violation(err: &DbErr) -> bool {
    let msg = err.to_string().to_lowercase();
    msg.contains("check constraint")
}

impl From<DbErr> for EngineError {
    fn from(value: DbErr) -> Self {
        Self::from_db(value)
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Validation(a), Self::Validation(b)) => a == b,
            (Self::Forbidden(a), Self::Forbidden(b)) => a == b,
            (Self::Conflict(a), Self::Conflict(b)) => a == b,
            (Self::Transient(a), Self::Transient(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
