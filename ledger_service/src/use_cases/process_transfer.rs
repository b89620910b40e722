use chrono::Duration;

use crate::domain::entities::{TransactionKind, TransferRequest, TransferResult};
use crate::domain::error::LedgerError;
use crate::domain::types::{AccountId, REVENUE_ACCOUNT_ID, TREASURY_ACCOUNT_ID};
use crate::infrastructure::persistence::ledger_repository::{self, TransferCommand};
use crate::infrastructure::persistence::store::Store;
use crate::infrastructure::persistence::{idempotency_repository, wallet_repository};

/// Código HTTP con el que se cacheó la respuesta original de una
/// transferencia recién creada.
const CREATED_STATUS: i16 = 201;

/// Caso de uso central: orquesta una transferencia de valor entre la
/// billetera del usuario y la billetera de sistema correspondiente.
///
/// Protocolo, todo dentro de una única transacción del store:
/// validar → consultar cache de idempotencia → resolver billeteras →
/// bloquearlas en orden global → escritura de doble partida → cachear la
/// respuesta → commit. Cualquier fallo deshace la transacción completa.
///
/// La recuperación de claves duplicadas corre fuera de esa transacción: si
/// dos solicitudes con la misma clave corren en paralelo, la perdedora choca
/// contra la restricción de unicidad de `transactions.idempotency_key`,
/// relee el cache ya comprometido por la ganadora y devuelve ese payload
/// como replay idempotente.
#[derive(Clone)]
pub struct ProcessTransferUseCase {
    store: Store,
    idempotency_ttl: Duration,
}

impl ProcessTransferUseCase {
    pub fn new(store: Store, idempotency_ttl: Duration) -> Self {
        Self {
            store,
            idempotency_ttl,
        }
    }

    /// Emite valor nuevo desde Treasury hacia la billetera del usuario.
    #[tracing::instrument(name = "ProcessTransferUseCase::top_up", skip(self))]
    pub async fn top_up(&self, request: TransferRequest) -> Result<TransferResult, LedgerError> {
        self.run(TransactionKind::TopUp, request).await
    }

    /// Igual que un top-up pero registrado como bono promocional.
    #[tracing::instrument(name = "ProcessTransferUseCase::issue_bonus", skip(self))]
    pub async fn issue_bonus(
        &self,
        request: TransferRequest,
    ) -> Result<TransferResult, LedgerError> {
        self.run(TransactionKind::Bonus, request).await
    }

    /// Mueve valor de la billetera del usuario hacia Revenue.
    #[tracing::instrument(name = "ProcessTransferUseCase::purchase", skip(self))]
    pub async fn purchase(&self, request: TransferRequest) -> Result<TransferResult, LedgerError> {
        self.run(TransactionKind::Purchase, request).await
    }

    async fn run(
        &self,
        kind: TransactionKind,
        request: TransferRequest,
    ) -> Result<TransferResult, LedgerError> {
        request.validate()?;

        match self.try_run(kind, &request).await {
            Err(LedgerError::DuplicateTransaction) => {
                // Recuperación en dos fases: nuestra transacción ya abortó,
                // pero la ganadora pudo haber comprometido su respuesta.
                if let Some(key) = request.idempotency_key.as_deref() {
                    if let Some(record) =
                        idempotency_repository::lookup(self.store.pool(), key).await?
                    {
                        let mut replay: TransferResult =
                            serde_json::from_value(record.response)?;
                        replay.idempotent = true;
                        return Ok(replay);
                    }
                }
                Err(LedgerError::DuplicateTransaction)
            }
            outcome => outcome,
        }
    }

    async fn try_run(
        &self,
        kind: TransactionKind,
        request: &TransferRequest,
    ) -> Result<TransferResult, LedgerError> {
        let mut tx = self.store.begin().await?;

        if let Some(key) = request.idempotency_key.as_deref() {
            if let Some(record) = idempotency_repository::lookup(&mut *tx, key).await? {
                tx.rollback().await.ok();
                let mut replay: TransferResult = serde_json::from_value(record.response)?;
                replay.idempotent = true;
                return Ok(replay);
            }
        }

        let user_wallet =
            wallet_repository::find_wallet(&mut tx, request.account_id, &request.asset_code)
                .await?;
        let system_wallet =
            wallet_repository::find_wallet(&mut tx, system_account_for(kind), &request.asset_code)
                .await?;

        let (source_id, dest_id) = if user_is_source(kind) {
            (user_wallet.id, system_wallet.id)
        } else {
            (system_wallet.id, user_wallet.id)
        };

        let locked = wallet_repository::lock_wallets(&mut tx, &[source_id, dest_id]).await?;
        let source = locked.get(&source_id).ok_or_else(|| {
            LedgerError::Internal(format!("wallet {} missing from lock result", source_id))
        })?;
        let dest = locked.get(&dest_id).ok_or_else(|| {
            LedgerError::Internal(format!("wallet {} missing from lock result", dest_id))
        })?;

        let command = TransferCommand {
            kind,
            amount: request.amount,
            asset_type_id: user_wallet.asset_type_id,
            asset_code: &request.asset_code,
            description: request.description.as_deref(),
            metadata: &request.metadata,
            idempotency_key: request.idempotency_key.as_deref(),
        };

        let result = ledger_repository::execute_transfer(&mut tx, &command, source, dest).await?;

        if let Some(key) = request.idempotency_key.as_deref() {
            let response = serde_json::to_value(&result)?;
            idempotency_repository::store(
                &mut *tx,
                key,
                &response,
                CREATED_STATUS,
                self.idempotency_ttl,
            )
            .await?;
        }

        tx.commit().await?;

        Ok(result)
    }
}

// Treasury emite valor (top-ups y bonos); Revenue lo recauda (compras).
fn system_account_for(kind: TransactionKind) -> AccountId {
    match kind {
        TransactionKind::TopUp | TransactionKind::Bonus => TREASURY_ACCOUNT_ID,
        TransactionKind::Purchase => REVENUE_ACCOUNT_ID,
    }
}

fn user_is_source(kind: TransactionKind) -> bool {
    matches!(kind, TransactionKind::Purchase)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_up_and_bonus_draw_from_treasury() {
        assert_eq!(system_account_for(TransactionKind::TopUp), TREASURY_ACCOUNT_ID);
        assert_eq!(system_account_for(TransactionKind::Bonus), TREASURY_ACCOUNT_ID);
        assert!(!user_is_source(TransactionKind::TopUp));
        assert!(!user_is_source(TransactionKind::Bonus));
    }

    #[test]
    fn purchase_debits_the_user_into_revenue() {
        assert_eq!(
            system_account_for(TransactionKind::Purchase),
            REVENUE_ACCOUNT_ID
        );
        assert!(user_is_source(TransactionKind::Purchase));
    }
}
