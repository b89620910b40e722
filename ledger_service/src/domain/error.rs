use thiserror::Error;

use crate::domain::types::WalletId;

// Códigos SQLSTATE de PostgreSQL que el motor distingue.
const UNIQUE_VIOLATION: &str = "23505";
const CHECK_VIOLATION: &str = "23514";
const SERIALIZATION_FAILURE: &str = "40001";
const DEADLOCK_DETECTED: &str = "40P01";
const QUERY_CANCELED: &str = "57014";

/// Taxonomía de errores del motor de transferencias.
///
/// Cada variante tiene un código máquina estable (`code()`) y una marca de
/// reintentabilidad (`is_retryable()`); la capa API los traduce a HTTP.
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Insufficient balance in wallet {wallet_id}: requested {requested}, available {available}")]
    InsufficientBalance {
        wallet_id: WalletId,
        requested: i64,
        available: i64,
    },

    #[error("Duplicate transaction for the supplied idempotency key")]
    DuplicateTransaction,

    #[error("Storage constraint violated: {0}")]
    ConstraintViolation(String),

    #[error("Deadlock detected, transaction aborted by the store")]
    DeadlockDetected,

    #[error("Serialization failure, transaction aborted by the store")]
    SerializationFailure,

    #[error("Timed out acquiring a store connection")]
    ConnectionAcquireTimeout,

    #[error("Statement cancelled by the store timeout")]
    StatementTimeout,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl LedgerError {
    /// Código máquina estable expuesto a los clientes.
    pub fn code(&self) -> &'static str {
        match self {
            LedgerError::Validation(_) => "VALIDATION",
            LedgerError::NotFound(_) => "NOT_FOUND",
            LedgerError::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            LedgerError::DuplicateTransaction => "DUPLICATE_TRANSACTION",
            LedgerError::ConstraintViolation(_) => "CONSTRAINT_VIOLATION",
            LedgerError::DeadlockDetected => "DEADLOCK_DETECTED",
            LedgerError::SerializationFailure => "SERIALIZATION_FAILURE",
            LedgerError::ConnectionAcquireTimeout => "CONNECTION_ACQUIRE_TIMEOUT",
            LedgerError::StatementTimeout => "STATEMENT_TIMEOUT",
            LedgerError::Internal(_) => "INTERNAL",
        }
    }

    /// El cliente puede reintentar la misma solicitud sin cambios.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            LedgerError::DeadlockDetected
                | LedgerError::SerializationFailure
                | LedgerError::ConnectionAcquireTimeout
        )
    }
}

/// Clasifica un error reportado por PostgreSQL hacia la taxonomía del motor.
///
/// La colisión de unicidad sobre la clave de idempotencia de `transactions`
/// se distingue por nombre de constraint: es la señal que dispara la
/// recuperación en dos fases del orquestador.
pub(crate) fn classify_database_error(
    code: Option<&str>,
    constraint: Option<&str>,
    message: &str,
) -> LedgerError {
    match code {
        Some(UNIQUE_VIOLATION) => {
            if constraint.is_some_and(|c| c.contains("idempotency_key")) {
                LedgerError::DuplicateTransaction
            } else {
                LedgerError::ConstraintViolation(
                    constraint.unwrap_or("unique constraint").to_string(),
                )
            }
        }
        Some(CHECK_VIOLATION) => {
            LedgerError::ConstraintViolation(constraint.unwrap_or("check constraint").to_string())
        }
        Some(DEADLOCK_DETECTED) => LedgerError::DeadlockDetected,
        Some(SERIALIZATION_FAILURE) => LedgerError::SerializationFailure,
        Some(QUERY_CANCELED) => LedgerError::StatementTimeout,
        _ => LedgerError::Internal(message.to_string()),
    }
}

impl From<sqlx::Error> for LedgerError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut => LedgerError::ConnectionAcquireTimeout,
            sqlx::Error::Database(db) => {
                let code = db.code().map(|c| c.into_owned());
                classify_database_error(code.as_deref(), db.constraint(), db.message())
            }
            other => LedgerError::Internal(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        LedgerError::Internal(format!("serialization error: {}", err))
    }
}
