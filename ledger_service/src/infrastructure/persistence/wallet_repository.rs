use sqlx::PgConnection;
use std::collections::HashMap;
use uuid::Uuid;

use crate::domain::entities::Wallet;
use crate::domain::error::LedgerError;
use crate::domain::types::{AccountId, WalletId};
use crate::infrastructure::persistence::models::WalletModel;

/// Resuelve la billetera de una cuenta para un activo dado (por código).
///
/// Es una lectura sin lock: el orquestador la usa para conocer los ids de
/// billetera antes de pedir los locks. Falla con `NotFound` si la cuenta no
/// tiene billetera para ese activo o el activo no está activo.
pub async fn find_wallet(
    conn: &mut PgConnection,
    account_id: AccountId,
    asset_code: &str,
) -> Result<Wallet, LedgerError> {
    let model = sqlx::query_as::<_, WalletModel>(
        r#"
        SELECT w.id, w.account_id, w.asset_type_id, w.balance, w.allow_negative, w.version
        FROM wallets w
        JOIN asset_types a ON a.id = w.asset_type_id
        WHERE w.account_id = $1 AND a.code = $2 AND a.is_active
        "#,
    )
    .bind(account_id)
    .bind(asset_code)
    .fetch_optional(&mut *conn)
    .await?;

    model.map(Wallet::from).ok_or_else(|| {
        LedgerError::NotFound(format!(
            "wallet for account {} and asset {}",
            account_id, asset_code
        ))
    })
}

/// Adquiere locks exclusivos de fila sobre el conjunto de billeteras y
/// devuelve su estado actual, indexado por id.
///
/// Los ids se deduplican y ordenan por su orden natural de bytes, y la
/// sentencia selecciona las filas en ese mismo orden ascendente con
/// `FOR UPDATE`: toda transferencia que toque las mismas billeteras las
/// bloquea en idéntica secuencia global, lo que elimina la espera circular
/// que precede a un deadlock. Si otra transacción sostiene un lock en
/// conflicto, la llamada se bloquea hasta su commit o rollback.
pub async fn lock_wallets(
    conn: &mut PgConnection,
    wallet_ids: &[WalletId],
) -> Result<HashMap<WalletId, Wallet>, LedgerError> {
    let ids = ordered_ids(wallet_ids);

    let rows = sqlx::query_as::<_, WalletModel>(
        r#"
        SELECT id, account_id, asset_type_id, balance, allow_negative, version
        FROM wallets
        WHERE id = ANY($1)
        ORDER BY id ASC
        FOR UPDATE
        "#,
    )
    .bind(&ids)
    .fetch_all(&mut *conn)
    .await?;

    if rows.len() != ids.len() {
        return Err(LedgerError::NotFound("wallet in lock set".to_string()));
    }

    Ok(rows
        .into_iter()
        .map(|m| {
            let wallet = Wallet::from(m);
            (wallet.id, wallet)
        })
        .collect())
}

// Orden total y determinista entre procesos: dedup + sort por bytes del UUID.
fn ordered_ids(wallet_ids: &[WalletId]) -> Vec<Uuid> {
    let mut ids: Vec<Uuid> = wallet_ids.iter().map(|id| id.0).collect();
    ids.sort();
    ids.dedup();
    ids
}
