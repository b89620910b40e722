use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::entities::{HistoryEntry, WalletBalance};
use crate::domain::error::LedgerError;
use crate::domain::repository::LedgerReader;
use crate::domain::types::AccountId;
use crate::infrastructure::persistence::models::{HistoryEntryModel, WalletBalanceModel};

/// Lecturas del ledger sobre PostgreSQL: balances e historial, sin locks ni
/// transacción explícita (cada consulta es un snapshot consistente propio).
pub struct PostgresLedgerReader {
    pool: PgPool,
}

impl PostgresLedgerReader {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LedgerReader for PostgresLedgerReader {
    async fn balances_for_account(
        &self,
        account_id: AccountId,
        asset_code: Option<String>,
    ) -> Result<Vec<WalletBalance>, LedgerError> {
        let models = sqlx::query_as::<_, WalletBalanceModel>(
            r#"
            SELECT w.id AS wallet_id, a.code AS asset_code, a.name AS asset_name,
                   w.balance, w.version
            FROM wallets w
            JOIN asset_types a ON a.id = w.asset_type_id
            WHERE w.account_id = $1
              AND ($2::text IS NULL OR a.code = $2)
            ORDER BY a.code ASC
            "#,
        )
        .bind(account_id)
        .bind(asset_code)
        .fetch_all(&self.pool)
        .await?;

        Ok(models.into_iter().map(WalletBalance::from).collect())
    }

    /// Historial unido al ledger: cada fila es la entrada Debit/Credit que
    /// tocó una billetera de la cuenta, con su transacción. Más reciente
    /// primero; `seq` desempata entradas del mismo microsegundo.
    async fn history_for_account(
        &self,
        account_id: AccountId,
        asset_code: Option<String>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<HistoryEntry>, LedgerError> {
        let models = sqlx::query_as::<_, HistoryEntryModel>(
            r#"
            SELECT t.id AS transaction_id, t.kind, t.status, a.code AS asset_code,
                   e.wallet_id, e.entry_type, e.amount,
                   e.balance_before, e.balance_after,
                   t.description, e.created_at
            FROM ledger_entries e
            JOIN wallets w ON w.id = e.wallet_id
            JOIN transactions t ON t.id = e.transaction_id
            JOIN asset_types a ON a.id = t.asset_type_id
            WHERE w.account_id = $1
              AND ($2::text IS NULL OR a.code = $2)
            ORDER BY e.created_at DESC, e.seq DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(account_id)
        .bind(asset_code)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(models.into_iter().map(HistoryEntry::from).collect())
    }
}
