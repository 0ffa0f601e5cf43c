use actix_web::web;
use actix_web::HttpResponse;
use serde::Serialize;
use sqlx::PgPool;

use crate::errors::ApiError;
use crate::repository;

#[derive(Serialize)]
struct TeamSummaryBody {
    team_id: String,
    team_name: String,
    church_name: String,
    registration_status: &'static str,
}

#[derive(Serialize)]
struct PlayerBody {
    player_id: String,
    position: i16,
    name: String,
    role: Option<String>,
    aadhar_file_url: Option<String>,
    subscription_file_url: Option<String>,
    team: TeamSummaryBody,
}

/// `GET /api/admin/players/{playerId}`
pub async fn get_player(
    path: web::Path<String>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, ApiError> {
    let player_id = path.into_inner();
    let (player, team) = repository::get_player_by_player_id(&pool, &player_id).await.map_err(|e| match e {
        repository::RepositoryError::TeamNotFound { team_id } => ApiError::NotFound { team_id },
        repository::RepositoryError::Database(e) => ApiError::Unexpected(e.into()),
    })?;

    Ok(HttpResponse::Ok().json(PlayerBody {
        player_id: player.player_id,
        position: player.position,
        name: player.name,
        role: player.role,
        aadhar_file_url: player.aadhar_file_url,
        subscription_file_url: player.subscription_file_url,
        team: TeamSummaryBody {
            team_id: team.team_id,
            team_name: team.team_name,
            church_name: team.church_name,
            registration_status: team.registration_status.as_str(),
        },
    }))
}
