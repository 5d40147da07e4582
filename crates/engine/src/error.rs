//! The module contains the errors the engine can return.
//!
//! Errors fall into a few families:
//!
//! - validation ([`InvalidAmount`], [`InvalidPeriod`], [`InvalidThreshold`],
//!   [`InvalidName`], [`InvalidDate`]) rejected before anything is written;
//! - [`KeyNotFound`] when a wallet, budget, category or transaction does not
//!   exist for the user;
//! - [`ExistingKey`] and [`InUse`] when a write would clash with existing
//!   rows;
//! - [`ConsistencyConflict`] when a balance write lost a race after the
//!   internal retry;
//! - [`Notification`] when the notification sink refused an alert.
//!
//!  [`InvalidAmount`]: EngineError::InvalidAmount
//!  [`InvalidPeriod`]: EngineError::InvalidPeriod
//!  [`InvalidThreshold`]: EngineError::InvalidThreshold
//!  [`InvalidName`]: EngineError::InvalidName
//!  [`InvalidDate`]: EngineError::InvalidDate
//!  [`KeyNotFound`]: EngineError::KeyNotFound
//!  [`ExistingKey`]: EngineError::ExistingKey
//!  [`InUse`]: EngineError::InUse
//!  [`ConsistencyConflict`]: EngineError::ConsistencyConflict
//!  [`Notification`]: EngineError::Notification
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid period: {0}")]
    InvalidPeriod(String),
    #[error("Invalid alert threshold: {0}")]
    InvalidThreshold(String),
    #[error("Invalid name: {0}")]
    InvalidName(String),
    #[error("Invalid date: {0}")]
    InvalidDate(String),
    #[error("Invalid id: {0}")]
    InvalidId(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("\"{0}\" is still in use")]
    InUse(String),
    #[error("Consistency conflict: {0}")]
    ConsistencyConflict(String),
    #[error("Notification not accepted: {0}")]
    Notification(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl EngineError {
    /// Returns `true` when the same request may succeed if sent again.
    ///
    /// Conflicts on balance writes and a busy/locked database are transient;
    /// everything else is a property of the request itself.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::ConsistencyConflict(_) | Self::Notification(_) => true,
            Self::Database(err) => {
                let message = err.to_string().to_lowercase();
                message.contains("database is locked")
                    || message.contains("busy")
                    || message.contains("timed out")
            }
            _ => false,
        }
    }

    /// Returns `true` for errors caused by invalid input.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidAmount(_)
                | Self::InvalidPeriod(_)
                | Self::InvalidThreshold(_)
                | Self::InvalidName(_)
                | Self::InvalidDate(_)
                | Self::InvalidId(_)
        )
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InvalidPeriod(a), Self::InvalidPeriod(b)) => a == b,
            (Self::InvalidThreshold(a), Self::InvalidThreshold(b)) => a == b,
            (Self::InvalidName(a), Self::InvalidName(b)) => a == b,
            (Self::InvalidDate(a), Self::InvalidDate(b)) => a == b,
            (Self::InvalidId(a), Self::InvalidId(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::InUse(a), Self::InUse(b)) => a == b,
            (Self::ConsistencyConflict(a), Self::ConsistencyConflict(b)) => a == b,
            (Self::Notification(a), Self::Notification(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflicts_are_retryable() {
        assert!(EngineError::ConsistencyConflict("wallet".to_string()).is_retryable());
        assert!(!EngineError::KeyNotFound("wallet".to_string()).is_retryable());
    }

    #[test]
    fn locked_database_is_retryable() {
        let err = EngineError::Database(DbErr::Custom("database is locked".to_string()));
        assert!(err.is_retryable());
        let err = EngineError::Database(DbErr::Custom("no such table: wallets".to_string()));
        assert!(!err.is_retryable());
    }

    #[test]
    fn validation_family() {
        assert!(EngineError::InvalidThreshold("-1".to_string()).is_validation());
        assert!(!EngineError::ExistingKey("Cash".to_string()).is_validation());
    }
}
