use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::domain::entities::{
    HistoryEntry, LedgerEntryType, TransactionKind, TransactionStatus, Wallet, WalletBalance,
};
use crate::domain::types::{AccountId, AssetTypeId, TransactionId, WalletId};

// Modelo de Base de Datos para Wallet (especifico de SQLx).
// Solo las columnas que el motor lee; created_at queda en la tabla.
#[derive(Debug, FromRow)]
pub struct WalletModel {
    pub id: WalletId,
    pub account_id: AccountId,
    pub asset_type_id: AssetTypeId,
    pub balance: i64,
    pub allow_negative: bool,
    pub version: i64,
}

impl From<WalletModel> for Wallet {
    fn from(m: WalletModel) -> Self {
        Self {
            id: m.id,
            account_id: m.account_id,
            asset_type_id: m.asset_type_id,
            balance: m.balance,
            allow_negative: m.allow_negative,
            version: m.version,
        }
    }
}

// Fila de balance que produce la consulta de lectura (wallets ⋈ asset_types).
#[derive(Debug, FromRow)]
pub struct WalletBalanceModel {
    pub wallet_id: WalletId,
    pub asset_code: String,
    pub asset_name: String,
    pub balance: i64,
    pub version: i64,
}

impl From<WalletBalanceModel> for WalletBalance {
    fn from(m: WalletBalanceModel) -> Self {
        Self {
            wallet_id: m.wallet_id,
            asset_code: m.asset_code,
            asset_name: m.asset_name,
            balance: m.balance,
            version: m.version,
        }
    }
}

// Fila del historial (ledger_entries ⋈ transactions ⋈ asset_types).
#[derive(Debug, FromRow)]
pub struct HistoryEntryModel {
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

impl From<HistoryEntryModel> for HistoryEntry {
    fn from(m: HistoryEntryModel) -> Self {
        Self {
            transaction_id: m.transaction_id,
            kind: m.kind,
            status: m.status,
            asset_code: m.asset_code,
            wallet_id: m.wallet_id,
            entry_type: m.entry_type,
            amount: m.amount,
            balance_before: m.balance_before,
            balance_after: m.balance_after,
            description: m.description,
            created_at: m.created_at,
        }
    }
}

// Registro del cache de idempotencia tal como se persiste.
#[derive(Debug, FromRow)]
pub struct IdempotencyRecordModel {
    pub response: serde_json::Value,
    pub status_code: i16,
}
