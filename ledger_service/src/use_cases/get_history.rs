use crate::domain::entities::HistoryEntry;
use crate::domain::error::LedgerError;
use crate::domain::repository::LedgerReader;
use crate::domain::types::AccountId;
use std::sync::Arc;

/// Caso de uso para el historial de movimientos de una cuenta.
///
/// La paginación se ajusta a los límites configurados en lugar de fallar:
/// un `limit` fuera de rango se recorta y un `offset` negativo se eleva a 0.
#[derive(Clone)]
pub struct GetHistoryUseCase {
    reader: Arc<dyn LedgerReader>,
    default_limit: i64,
    max_limit: i64,
}

impl GetHistoryUseCase {
    pub fn new(reader: Arc<dyn LedgerReader>, default_limit: i64, max_limit: i64) -> Self {
        Self {
            reader,
            default_limit,
            max_limit,
        }
    }

    #[tracing::instrument(name = "GetHistoryUseCase::execute", skip(self))]
    pub async fn execute(
        &self,
        account_id: AccountId,
        asset_code: Option<String>,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<HistoryEntry>, LedgerError> {
        let (limit, offset) = clamp_page(limit, offset, self.default_limit, self.max_limit);

        self.reader
            .history_for_account(account_id, asset_code, limit, offset)
            .await
    }
}

pub(crate) fn clamp_page(
    limit: Option<i64>,
    offset: Option<i64>,
    default_limit: i64,
    max_limit: i64,
) -> (i64, i64) {
    let limit = limit.unwrap_or(default_limit).clamp(1, max_limit);
    let offset = offset.unwrap_or(0).max(0);
    (limit, offset)
}
