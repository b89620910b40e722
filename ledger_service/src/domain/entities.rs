use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::error::LedgerError;
use crate::domain::types::{AccountId, AssetTypeId, TransactionId, WalletId};

/// Longitud máxima en bytes de una clave de idempotencia provista por el cliente.
pub const MAX_IDEMPOTENCY_KEY_LEN: usize = 255;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "transaction_kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionKind {
    TopUp,
    Bonus,
    Purchase,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "transaction_status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
    Reversed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "ledger_entry_type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LedgerEntryType {
    Debit,
    Credit,
}

/// Billetera: contenedor de balance por cuenta y por activo.
///
/// `balance` y `version` solo los muta el escritor del ledger, siempre bajo
/// lock exclusivo de fila. `version` es un contador monótono por escritura.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wallet {
    pub id: WalletId,
    pub account_id: AccountId,
    pub asset_type_id: AssetTypeId,
    pub balance: i64,
    pub allow_negative: bool,
    pub version: i64,
}

impl Wallet {
    /// Piso de balance: una billetera de usuario nunca queda en negativo.
    pub fn can_debit(&self, amount: i64) -> bool {
        self.allow_negative || self.balance >= amount
    }
}

/// Vista de balance que devuelve `getBalance`: billetera + activo, sin locks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletBalance {
    pub wallet_id: WalletId,
    pub asset_code: String,
    pub asset_name: String,
    pub balance: i64,
    pub version: i64,
}

/// Fila del historial: la transacción unida a la entrada del ledger que tocó
/// una billetera del usuario consultado.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub transaction_id: TransactionId,
    pub kind: TransactionKind,
    pub status: TransactionStatus,
    pub asset_code: String,
    pub wallet_id: WalletId,
    pub entry_type: LedgerEntryType,
    pub amount: i64,
    pub balance_before: i64,
    pub balance_after: i64,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Movimiento de una billetera dentro de un `TransferResult`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletMovement {
    pub wallet_id: WalletId,
    pub balance_before: i64,
    pub balance_after: i64,
}

/// Resultado de una transferencia comprometida.
///
/// Se serializa tal cual dentro del cache de idempotencia; un replay devuelve
/// el mismo payload con `idempotent = true`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferResult {
    pub transaction_id: TransactionId,
    pub kind: TransactionKind,
    pub asset_code: String,
    pub amount: i64,
    pub source: WalletMovement,
    pub destination: WalletMovement,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub idempotent: bool,
}

/// Solicitud de transferencia validada que consume el orquestador.
///
/// # Examples
/// ```
/// use ledger_service::domain::entities::TransferRequest;
/// use ledger_service::domain::types::AccountId;
///
/// let request = TransferRequest {
///     account_id: AccountId::new(),
///     asset_code: "GOLD_COINS".to_string(),
///     amount: 500,
///     idempotency_key: Some("req-1".to_string()),
///     description: None,
///     metadata: serde_json::json!({}),
/// };
/// assert!(request.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct TransferRequest {
    pub account_id: AccountId,
    pub asset_code: String,
    pub amount: i64,
    pub idempotency_key: Option<String>,
    pub description: Option<String>,
    pub metadata: serde_json::Value,
}

impl TransferRequest {
    /// Valida las precondiciones de entrada de toda operación mutadora.
    pub fn validate(&self) -> Result<(), LedgerError> {
        if self.asset_code.trim().is_empty() {
            return Err(LedgerError::Validation(
                "asset code must not be empty".to_string(),
            ));
        }
        if self.amount <= 0 {
            return Err(LedgerError::Validation(
                "amount must be a positive integer".to_string(),
            ));
        }
        if let Some(key) = &self.idempotency_key {
            if key.len() > MAX_IDEMPOTENCY_KEY_LEN {
                return Err(LedgerError::Validation(format!(
                    "idempotency key exceeds {} bytes",
                    MAX_IDEMPOTENCY_KEY_LEN
                )));
            }
        }
        Ok(())
    }
}
