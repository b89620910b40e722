use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{PgPool, Postgres, Transaction};
use std::time::Duration;

use crate::config::StoreConfig;
use crate::domain::error::LedgerError;

/// Gateway al store durable.
///
/// Envuelve el pool de conexiones y es el único punto donde se abren
/// transacciones: los repositorios de escritura reciben el handle de conexión
/// de una transacción ya abierta y nunca abren la suya propia. El rollback
/// ocurre al soltar (drop) una transacción sin commit, así que cualquier `?`
/// en el camino de una transferencia deshace todo el trabajo parcial.
#[derive(Clone)]
pub struct Store {
    pool: PgPool,
}

impl Store {
    /// Conecta el pool aplicando los límites y timeouts configurados.
    ///
    /// `statement_timeout` se fija del lado del servidor por conexión: el
    /// servidor cancela (SQLSTATE 57014) cualquier sentencia que lo exceda.
    pub async fn connect(database_url: &str, config: &StoreConfig) -> Result<Self, LedgerError> {
        let options = database_url
            .parse::<PgConnectOptions>()
            .map_err(|e| LedgerError::Internal(format!("invalid database url: {}", e)))?
            .options([("statement_timeout", config.statement_timeout_ms.to_string())]);

        let pool = PgPoolOptions::new()
            .max_connections(config.connection_limit)
            .acquire_timeout(Duration::from_millis(config.connection_acquire_timeout_ms))
            .idle_timeout(Duration::from_millis(config.idle_timeout_ms))
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    /// Construye el gateway sobre un pool ya creado (tests, tooling).
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Abre una transacción. Un pool agotado más allá del timeout de
    /// adquisición se reporta como `ConnectionAcquireTimeout`.
    pub async fn begin(&self) -> Result<Transaction<'static, Postgres>, LedgerError> {
        self.pool.begin().await.map_err(LedgerError::from)
    }
}
