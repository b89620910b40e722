use tracing::{error, info};

use crate::infrastructure::persistence::idempotency_repository;
use crate::infrastructure::persistence::store::Store;

/// Job en segundo plano que barre los registros de idempotencia expirados.
///
/// Los registros expirados ya son invisibles para el lookup; este job solo
/// recupera espacio. Un fallo aquí no afecta la correctitud: se loguea y se
/// reintenta en la próxima ejecución.
pub struct PurgeIdempotencyJob {
    store: Store,
}

impl PurgeIdempotencyJob {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub async fn run(&self) {
        match idempotency_repository::purge_expired(self.store.pool()).await {
            Ok(0) => {}
            Ok(purged) => {
                info!("Purged {} expired idempotency records", purged);
            }
            Err(e) => {
                error!("Failed to purge expired idempotency records: {:?}", e);
            }
        }
    }
}
