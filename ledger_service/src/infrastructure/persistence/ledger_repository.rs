use chrono::Utc;
use sqlx::PgConnection;
use uuid::Uuid;

use crate::domain::entities::{
    LedgerEntryType, TransactionKind, TransactionStatus, TransferResult, Wallet, WalletMovement,
};
use crate::domain::error::LedgerError;
use crate::domain::types::{AssetTypeId, TransactionId, WalletId};

/// Parámetros de la escritura de doble partida. Las billeteras origen y
/// destino ya fueron bloqueadas por el lock manager dentro de la misma
/// transacción; sus snapshots son la única verdad de balance que se usa.
pub struct TransferCommand<'a> {
    pub kind: TransactionKind,
    pub amount: i64,
    pub asset_type_id: AssetTypeId,
    pub asset_code: &'a str,
    pub description: Option<&'a str>,
    pub metadata: &'a serde_json::Value,
    pub idempotency_key: Option<&'a str>,
}

/// Ejecuta la transferencia: verifica el piso de balance contra el snapshot
/// bloqueado, muta ambas billeteras (origen primero, para trazas
/// deterministas), inserta la transacción y el par Debit/Credit del ledger,
/// todo dentro de la transacción del llamador.
///
/// La colisión de unicidad sobre `idempotency_key` y la violación del check
/// de piso de balance suben ya clasificadas (`DuplicateTransaction`,
/// `ConstraintViolation`); el orquestador decide la recuperación.
pub async fn execute_transfer(
    conn: &mut PgConnection,
    command: &TransferCommand<'_>,
    source: &Wallet,
    dest: &Wallet,
) -> Result<TransferResult, LedgerError> {
    if source.id == dest.id {
        return Err(LedgerError::Validation(
            "source and destination wallets must differ".to_string(),
        ));
    }
    if source.asset_type_id != dest.asset_type_id {
        return Err(LedgerError::Validation(
            "source and destination wallets must hold the same asset".to_string(),
        ));
    }
    if !source.can_debit(command.amount) {
        return Err(LedgerError::InsufficientBalance {
            wallet_id: source.id,
            requested: command.amount,
            available: source.balance,
        });
    }

    let source_after = source.balance - command.amount;
    let dest_after = dest.balance + command.amount;
    let now = Utc::now();

    update_wallet_balance(conn, source.id, source_after).await?;
    update_wallet_balance(conn, dest.id, dest_after).await?;

    let transaction_id = TransactionId::new();

    sqlx::query(
        r#"
        INSERT INTO transactions (
            id, idempotency_key, kind, status, source_wallet_id, dest_wallet_id,
            asset_type_id, amount, description, metadata, created_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        "#,
    )
    .bind(transaction_id)
    .bind(command.idempotency_key)
    .bind(command.kind)
    .bind(TransactionStatus::Completed)
    .bind(source.id)
    .bind(dest.id)
    .bind(command.asset_type_id)
    .bind(command.amount)
    .bind(command.description)
    .bind(command.metadata)
    .bind(now)
    .execute(&mut *conn)
    .await?;

    // Las dos entradas del ledger en una sola sentencia: Debit sobre el
    // origen, Credit sobre el destino, mismas cantidades y mismo timestamp.
    sqlx::query(
        r#"
        INSERT INTO ledger_entries (
            id, transaction_id, wallet_id, entry_type, amount,
            balance_before, balance_after, created_at
        )
        VALUES
            ($1, $2, $3, $4, $5, $6, $7, $8),
            ($9, $2, $10, $11, $5, $12, $13, $8)
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(transaction_id)
    .bind(source.id)
    .bind(LedgerEntryType::Debit)
    .bind(command.amount)
    .bind(source.balance)
    .bind(source_after)
    .bind(now)
    .bind(Uuid::new_v4())
    .bind(dest.id)
    .bind(LedgerEntryType::Credit)
    .bind(dest.balance)
    .bind(dest_after)
    .execute(&mut *conn)
    .await?;

    Ok(TransferResult {
        transaction_id,
        kind: command.kind,
        asset_code: command.asset_code.to_string(),
        amount: command.amount,
        source: WalletMovement {
            wallet_id: source.id,
            balance_before: source.balance,
            balance_after: source_after,
        },
        destination: WalletMovement {
            wallet_id: dest.id,
            balance_before: dest.balance,
            balance_after: dest_after,
        },
        description: command.description.map(str::to_string),
        created_at: now,
        idempotent: false,
    })
}

// La billetera está bloqueada por esta misma transacción: la fila existe y
// nadie más puede tocarla hasta el commit.
async fn update_wallet_balance(
    conn: &mut PgConnection,
    wallet_id: WalletId,
    new_balance: i64,
) -> Result<(), LedgerError> {
    let result = sqlx::query(
        r#"
        UPDATE wallets
        SET balance = $1,
            version = version + 1
        WHERE id = $2
        "#,
    )
    .bind(new_balance)
    .bind(wallet_id)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() != 1 {
        return Err(LedgerError::Internal(format!(
            "locked wallet {} missing during balance update",
            wallet_id
        )));
    }

    Ok(())
}
