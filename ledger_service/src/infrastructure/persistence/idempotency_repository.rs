use chrono::{Duration, Utc};
use sqlx::{Executor, Postgres};

use crate::domain::error::LedgerError;
use crate::infrastructure::persistence::models::IdempotencyRecordModel;

/// Busca la respuesta cacheada para una clave de idempotencia no expirada.
///
/// Acepta cualquier executor: dentro de la transacción de una transferencia
/// (handle de conexión) o sobre el pool durante la recuperación de una
/// colisión de clave duplicada, que corre después del rollback.
pub async fn lookup<'e, E>(
    executor: E,
    key: &str,
) -> Result<Option<IdempotencyRecordModel>, LedgerError>
where
    E: Executor<'e, Database = Postgres>,
{
    let record = sqlx::query_as::<_, IdempotencyRecordModel>(
        r#"
        SELECT response, status_code
        FROM idempotency_records
        WHERE key = $1 AND expires_at > NOW()
        "#,
    )
    .bind(key)
    .fetch_optional(executor)
    .await?;

    Ok(record)
}

/// Inserta el registro de idempotencia. Una colisión de clave es un no-op
/// silencioso: el primer escritor gana y su respuesta queda cacheada.
pub async fn store<'e, E>(
    executor: E,
    key: &str,
    response: &serde_json::Value,
    status_code: i16,
    ttl: Duration,
) -> Result<(), LedgerError>
where
    E: Executor<'e, Database = Postgres>,
{
    let now = Utc::now();

    sqlx::query(
        r#"
        INSERT INTO idempotency_records (key, response, status_code, created_at, expires_at)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (key) DO NOTHING
        "#,
    )
    .bind(key)
    .bind(response)
    .bind(status_code)
    .bind(now)
    .bind(now + ttl)
    .execute(executor)
    .await?;

    Ok(())
}

/// Borra los registros expirados. Lo invoca el sweeper en segundo plano;
/// los registros expirados ya son lógicamente invisibles para `lookup`.
pub async fn purge_expired<'e, E>(executor: E) -> Result<u64, LedgerError>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query(r#"DELETE FROM idempotency_records WHERE expires_at <= NOW()"#)
        .execute(executor)
        .await?;

    Ok(result.rows_affected())
}
