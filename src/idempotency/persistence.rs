use actix_web::body::to_bytes;
use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use sqlx::postgres::PgHasArrayType;
use sqlx::Executor;
use sqlx::PgPool;
use sqlx::Postgres;
use sqlx::Transaction;

use super::IdempotencyKey;

#[derive(sqlx::Type, Debug)]
#[sqlx(type_name = "header_pair")]
struct HeaderPairRecord {
    name: String,
    value: Vec<u8>,
}

impl PgHasArrayType for HeaderPairRecord {
    fn array_type_info() -> sqlx::postgres::PgTypeInfo {
        sqlx::postgres::PgTypeInfo::with_name("_header_pair")
    }
}

/// The outcome of `begin`: what the caller should do next.
pub enum BeginOutcome {
    /// No prior attempt under this key; proceed, using the returned
    /// transaction to later call `complete`.
    New(Transaction<'static, Postgres>),
    /// A different payload was already submitted under this key.
    Conflict,
    /// A prior attempt under this key with the same payload is still
    /// running.
    DuplicateInFlight,
    /// A prior attempt under this key with the same payload already
    /// completed; here is its cached response.
    Completed(HttpResponse),
}

/// Synchronization happens at the database level (out-of-process), since the
/// API may be horizontally replicated: two requests racing on the same key
/// may land on different instances.
///
/// Inserts an `in_flight` row for `(key, payload_hash)`. On conflict, reads
/// back the existing row to decide between `Conflict`, `DuplicateInFlight`,
/// and `Completed`.
pub async fn begin(
    idempotency_key: &IdempotencyKey,
    payload_hash: &str,
    pool: &PgPool,
) -> Result<BeginOutcome, anyhow::Error> {
    let mut transaction = pool.begin().await?;

    let query = sqlx::query!(
        r#"
        INSERT INTO idempotency (idempotency_key, payload_hash, status, created_at)
        VALUES ($1, $2, 'in_flight', now())
        ON CONFLICT (idempotency_key) DO NOTHING
        "#,
        idempotency_key.as_ref(),
        payload_hash,
    );

    let inserted = transaction.execute(query).await?.rows_affected() > 0;
    if inserted {
        return Ok(BeginOutcome::New(transaction));
    }
    // another attempt already owns this key; release our transaction and
    // inspect the existing row outside of it.
    transaction.rollback().await?;

    let existing = sqlx::query!(
        r#"
        SELECT payload_hash, status,
            response_status_code as "response_status_code?",
            response_headers as "response_headers?: Vec<HeaderPairRecord>",
            response_body as "response_body?"
        FROM idempotency
        WHERE idempotency_key = $1
        "#,
        idempotency_key.as_ref(),
    )
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| anyhow::anyhow!("idempotency row vanished between insert and read"))?;

    if existing.payload_hash != payload_hash {
        return Ok(BeginOutcome::Conflict);
    }

    if existing.status != "completed" {
        return Ok(BeginOutcome::DuplicateInFlight);
    }

    let status_code = StatusCode::from_u16(
        existing
            .response_status_code
            .ok_or_else(|| anyhow::anyhow!("completed idempotency row missing status code"))?
            .try_into()?,
    )?;
    let mut builder = HttpResponse::build(status_code);
    for HeaderPairRecord { name, value } in existing.response_headers.unwrap_or_default() {
        builder.append_header((name, value));
    }
    let body = existing
        .response_body
        .ok_or_else(|| anyhow::anyhow!("completed idempotency row missing body"))?;
    Ok(BeginOutcome::Completed(builder.body(body)))
}

/// Transition `in_flight → completed`, storing the response so future
/// `begin` calls under this key can replay it. Commits the transaction.
pub async fn complete(
    idempotency_key: &IdempotencyKey,
    http_response: HttpResponse,
    mut transaction: Transaction<'static, Postgres>,
) -> Result<HttpResponse, anyhow::Error> {
    let status_code = http_response.status().as_u16() as i16;

    let mut raw_headers = Vec::with_capacity(http_response.headers().len());
    for (name, value) in http_response.headers() {
        raw_headers.push(HeaderPairRecord {
            name: name.as_str().to_owned(),
            value: value.as_bytes().to_vec(),
        });
    }

    let (head, body) = http_response.into_parts();
    let raw_body = to_bytes(body).await.map_err(|e| anyhow::anyhow!("{e}"))?;

    let query = sqlx::query_unchecked!(
        r#"
        UPDATE idempotency
        SET status = 'completed',
            response_status_code = $2,
            response_headers = $3,
            response_body = $4
        WHERE idempotency_key = $1
        "#,
        idempotency_key.as_ref(),
        status_code,
        raw_headers,
        raw_body.as_ref(),
    );
    transaction.execute(query).await?;
    transaction.commit().await?;

    let http_response = head.set_body(raw_body).map_into_boxed_body();
    Ok(http_response)
}

/// Delete the row for `idempotency_key`, allowing a future retry under the
/// same key to start fresh. Used when the coordinator fails before reaching
/// `complete`.
pub async fn abort(
    idempotency_key: &IdempotencyKey,
    pool: &PgPool,
) -> Result<(), anyhow::Error> {
    sqlx::query!(
        r#"DELETE FROM idempotency WHERE idempotency_key = $1"#,
        idempotency_key.as_ref(),
    )
    .execute(pool)
    .await?;
    Ok(())
}
