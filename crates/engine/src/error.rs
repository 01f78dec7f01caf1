//! The module contains the errors the engine can throw.
//!
//! Lifecycle violations are reported as [`InvalidTransition`], collected
//! pre-submit violations as [`ValidationFailed`], and payment-predicate
//! failures as [`PaymentInvalid`]. All of them are recoverable by the
//! caller; none aborts the process.
//!
//!  [`InvalidTransition`]: EngineError::InvalidTransition
//!  [`ValidationFailed`]: EngineError::ValidationFailed
//!  [`PaymentInvalid`]: EngineError::PaymentInvalid
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
    #[error("Validation failed: {}", .0.join("; "))]
    ValidationFailed(Vec<String>),
    #[error("Invalid payment: {0}")]
    PaymentInvalid(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid id: {0}")]
    InvalidId(String),
    #[error("Currency mismatch: {0}")]
    CurrencyMismatch(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidTransition(a), Self::InvalidTransition(b)) => a == b,
            (Self::ValidationFailed(a), Self::ValidationFailed(b)) => a == b,
            (Self::PaymentInvalid(a), Self::PaymentInvalid(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::Forbidden(a), Self::Forbidden(b)) => a == b,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InvalidId(a), Self::InvalidId(b)) => a == b,
            (Self::CurrencyMismatch(a), Self::CurrencyMismatch(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
