//! Periodically drops idempotency rows past their retention window. Run as
//! a separate supervised task, outside the request path.

use std::time::Duration;

use sqlx::PgPool;

use crate::configuration::Settings;
use crate::startup::get_connection_pool;

async fn expire_old_keys(
    pool: &PgPool,
    ttl_hours: i64,
) -> Result<(), anyhow::Error> {
    sqlx::query!(
        r#"
        DELETE FROM idempotency
        WHERE now() - created_at > ($1 || ' hours')::interval
        "#,
        ttl_hours.to_string(),
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn expire_keys_loop(
    pool: &PgPool,
    ttl_hours: i64,
) -> Result<(), anyhow::Error> {
    loop {
        match expire_old_keys(pool, ttl_hours).await {
            Err(e) => {
                tracing::warn!(e.cause_chain = ?e, "idempotency expiry sweep failed");
                tokio::time::sleep(Duration::from_secs(60)).await;
            }
            Ok(_) => tokio::time::sleep(Duration::from_secs(600)).await,
        }
    }
}

pub async fn init_expiry_worker(settings: Settings) -> Result<(), anyhow::Error> {
    let pool = get_connection_pool(&settings.database);
    expire_keys_loop(&pool, settings.idempotency.ttl_hours).await
}
