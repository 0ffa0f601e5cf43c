use actix_web::web;
use actix_web::HttpRequest;
use actix_web::HttpResponse;

use crate::coordinator::Coordinator;
use crate::errors::ApiError;
use crate::idempotency::IdempotencyKey;
use crate::payload;
use crate::payload::RawSubmission;

const IDEMPOTENCY_HEADER: &str = "X-Idempotency-Key";

/// `POST /api/register/team`
#[tracing::instrument(
    name = "Registering a team",
    skip(body, coordinator),
    fields(team_id = tracing::field::Empty)
)]
pub async fn register_team(
    request: HttpRequest,
    body: web::Json<RawSubmission>,
    coordinator: web::Data<Coordinator>,
) -> Result<HttpResponse, ApiError> {
    let idempotency_key = request
        .headers()
        .get(IDEMPOTENCY_HEADER)
        .map(|v| v.to_str().map_err(|_| ApiError::Validation {
            field: "X-Idempotency-Key".to_string(),
            message: "header value is not valid UTF-8".to_string(),
        }))
        .transpose()?
        .map(|raw| {
            IdempotencyKey::try_from(raw.to_string()).map_err(|e| ApiError::Validation {
                field: "X-Idempotency-Key".to_string(),
                message: e.to_string(),
            })
        })
        .transpose()?;

    let (team, artifacts) = payload::decode(body.into_inner())?;

    let response = coordinator.register(team, artifacts, idempotency_key).await?;

    Ok(HttpResponse::Created().json(response))
}
