use anyhow::{anyhow, Context};
use std::env;
use std::fmt::Display;
use std::str::FromStr;

/// Configuración del pool y de los timeouts del store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub connection_limit: u32,
    pub connection_acquire_timeout_ms: u64,
    pub statement_timeout_ms: u64,
    pub idle_timeout_ms: u64,
}

/// Configuración del cache de idempotencia.
#[derive(Debug, Clone)]
pub struct IdempotencyConfig {
    pub ttl_hours: i64,
}

/// Límites de paginación del historial de transacciones.
#[derive(Debug, Clone)]
pub struct TransactionsConfig {
    pub history_default_limit: i64,
    pub history_max_limit: i64,
}

/// Configuración completa de la aplicación, cargada desde variables de
/// entorno (con `.env` vía dotenvy). Inmutable después del arranque.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub store: StoreConfig,
    pub idempotency: IdempotencyConfig,
    pub transactions: TransactionsConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

        Ok(Self {
            database_url,
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env_parse("PORT", 3000)?,
            store: StoreConfig {
                connection_limit: env_parse("DB_CONNECTION_LIMIT", 20)?,
                connection_acquire_timeout_ms: env_parse("DB_ACQUIRE_TIMEOUT_MS", 5_000)?,
                statement_timeout_ms: env_parse("DB_STATEMENT_TIMEOUT_MS", 10_000)?,
                idle_timeout_ms: env_parse("DB_IDLE_TIMEOUT_MS", 30_000)?,
            },
            idempotency: IdempotencyConfig {
                ttl_hours: env_parse("IDEMPOTENCY_TTL_HOURS", 24)?,
            },
            transactions: TransactionsConfig {
                history_default_limit: env_parse("HISTORY_DEFAULT_LIMIT", 20)?,
                history_max_limit: env_parse("HISTORY_MAX_LIMIT", 100)?,
            },
        })
    }
}

impl IdempotencyConfig {
    pub fn ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.ttl_hours)
    }
}

/// Lee y parsea una variable de entorno, cayendo al default si está ausente.
/// Un valor presente pero mal formado es un error de arranque, no un default.
fn env_parse<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| anyhow!("invalid value for {}: {}", name, e)),
        Err(_) => Ok(default),
    }
}
