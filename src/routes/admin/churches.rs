use actix_web::web;
use actix_web::HttpResponse;
use serde::Serialize;
use sqlx::PgPool;

use crate::configuration::RegistrationSettings;
use crate::errors::ApiError;
use crate::repository;

#[derive(Serialize)]
struct ChurchAvailabilityBody {
    church_name: String,
    team_count: i64,
    locked: bool,
}

/// `GET /api/admin/churches/availability`
pub async fn churches_availability(
    pool: web::Data<PgPool>,
    registration: web::Data<RegistrationSettings>,
) -> Result<HttpResponse, ApiError> {
    let counts = repository::list_church_counts(&pool).await.map_err(|e| ApiError::Unexpected(e.into()))?;

    let body: Vec<_> = counts
        .into_iter()
        .map(|c| ChurchAvailabilityBody {
            locked: c.team_count >= registration.max_teams_per_church,
            church_name: c.church_name,
            team_count: c.team_count,
        })
        .collect();

    Ok(HttpResponse::Ok().json(body))
}
