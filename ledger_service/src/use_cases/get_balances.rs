use crate::domain::entities::WalletBalance;
use crate::domain::error::LedgerError;
use crate::domain::repository::LedgerReader;
use crate::domain::types::AccountId;
use std::sync::Arc;

/// Caso de uso para consultar los balances de un usuario.
///
/// Lectura pura: no toma locks ni abre transacción. Devuelve todas las
/// billeteras de la cuenta, o solo la del activo indicado.
#[derive(Clone)]
pub struct GetBalancesUseCase {
    reader: Arc<dyn LedgerReader>,
}

impl GetBalancesUseCase {
    pub fn new(reader: Arc<dyn LedgerReader>) -> Self {
        Self { reader }
    }

    /// Una cuenta sin billeteras se reporta como `NotFound`, igual que una
    /// cuenta inexistente: el servicio no distingue ambos casos.
    #[tracing::instrument(name = "GetBalancesUseCase::execute", skip(self))]
    pub async fn execute(
        &self,
        account_id: AccountId,
        asset_code: Option<String>,
    ) -> Result<Vec<WalletBalance>, LedgerError> {
        let balances = self
            .reader
            .balances_for_account(account_id, asset_code)
            .await?;

        if balances.is_empty() {
            return Err(LedgerError::NotFound(format!(
                "wallets for account {}",
                account_id
            )));
        }

        Ok(balances)
    }
}
