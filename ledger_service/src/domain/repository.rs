use crate::domain::entities::{HistoryEntry, WalletBalance};
use crate::domain::error::LedgerError;
use crate::domain::types::AccountId;
use async_trait::async_trait;

/// Port de lectura del ledger (balances e historial).
///
/// Solo cubre lecturas sin locks; el camino de escritura no tiene port porque
/// sus operaciones participan de una transacción abierta por el orquestador y
/// reciben el handle de conexión de forma explícita.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LedgerReader: Send + Sync {
    /// Balances de todas las billeteras de la cuenta, opcionalmente filtrados
    /// por código de activo.
    async fn balances_for_account(
        &self,
        account_id: AccountId,
        asset_code: Option<String>,
    ) -> Result<Vec<WalletBalance>, LedgerError>;

    /// Historial de movimientos de la cuenta unido al ledger, del más
    /// reciente al más antiguo, paginado.
    async fn history_for_account(
        &self,
        account_id: AccountId,
        asset_code: Option<String>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<HistoryEntry>, LedgerError>;
}
