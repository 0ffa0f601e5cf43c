use std::sync::Arc;

use actix_web::web;
use actix_web::HttpResponse;
use serde::Deserialize;
use serde::Serialize;
use sqlx::PgPool;

use crate::artifacts::ArtifactMime;
use crate::artifacts::Slot;
use crate::configuration::RegistrationSettings;
use crate::domain::TeamId;
use crate::errors::ApiError;
use crate::repository;
use crate::repository::RegistrationStatus;
use crate::repository::TeamArtifactUrls;
use crate::storage::move_all;
use crate::storage::ObjectStore;

#[derive(Deserialize)]
pub struct ListQuery {
    status: Option<String>,
    #[serde(default)]
    skip: Option<i64>,
    #[serde(default)]
    limit: Option<i64>,
}

#[derive(Serialize)]
struct TeamSummaryBody {
    team_id: String,
    team_name: String,
    church_name: String,
    player_count: i64,
    registration_status: &'static str,
}

#[derive(Serialize)]
struct ListTeamsBody {
    total: i64,
    teams: Vec<TeamSummaryBody>,
}

fn parse_status(raw: &str) -> Result<RegistrationStatus, ApiError> {
    match raw {
        "pending" => Ok(RegistrationStatus::Pending),
        "confirmed" => Ok(RegistrationStatus::Confirmed),
        "rejected" => Ok(RegistrationStatus::Rejected),
        other => Err(ApiError::Validation {
            field: "status".to_string(),
            message: format!("{other:?} is not a known registration status"),
        }),
    }
}

/// `GET /api/admin/teams`
pub async fn list_teams(
    query: web::Query<ListQuery>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, ApiError> {
    let status = query.status.as_deref().map(parse_status).transpose()?;
    let skip = query.skip.unwrap_or(0).max(0);
    let limit = query.limit.unwrap_or(50).clamp(1, 200);

    let (total, teams) = repository::list_teams(&pool, status, skip, limit)
        .await
        .map_err(|e| ApiError::Unexpected(e.into()))?;

    let teams = teams
        .into_iter()
        .map(|t| TeamSummaryBody {
            team_id: t.team_id,
            team_name: t.team_name,
            church_name: t.church_name,
            player_count: t.player_count,
            registration_status: t.registration_status.as_str(),
        })
        .collect();

    Ok(HttpResponse::Ok().json(ListTeamsBody { total, teams }))
}

#[derive(Serialize)]
struct PlayerBody {
    player_id: String,
    position: i16,
    name: String,
    role: Option<String>,
    aadhar_file_url: Option<String>,
    subscription_file_url: Option<String>,
}

#[derive(Serialize)]
struct TeamBody {
    team_id: String,
    team_name: String,
    church_name: String,
    captain_name: String,
    captain_phone: String,
    captain_whatsapp: String,
    captain_email: String,
    vice_captain_name: String,
    vice_captain_phone: String,
    vice_captain_whatsapp: String,
    vice_captain_email: String,
    pastor_letter_url: Option<String>,
    payment_receipt_url: Option<String>,
    group_photo_url: Option<String>,
    registration_status: &'static str,
    players: Vec<PlayerBody>,
}

/// `GET /api/admin/teams/{teamId}`
pub async fn get_team(
    path: web::Path<String>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, ApiError> {
    let team_id = path.into_inner();
    let (team, players) = repository::get_by_team_id(&pool, &team_id).await.map_err(|e| match e {
        repository::RepositoryError::TeamNotFound { team_id } => ApiError::NotFound { team_id },
        repository::RepositoryError::Database(e) => ApiError::Unexpected(e.into()),
    })?;

    Ok(HttpResponse::Ok().json(TeamBody {
        team_id: team.team_id,
        team_name: team.team_name,
        church_name: team.church_name,
        captain_name: team.captain_name,
        captain_phone: team.captain_phone,
        captain_whatsapp: team.captain_whatsapp,
        captain_email: team.captain_email,
        vice_captain_name: team.vice_captain_name,
        vice_captain_phone: team.vice_captain_phone,
        vice_captain_whatsapp: team.vice_captain_whatsapp,
        vice_captain_email: team.vice_captain_email,
        pastor_letter_url: team.pastor_letter_url,
        payment_receipt_url: team.payment_receipt_url,
        group_photo_url: team.group_photo_url,
        registration_status: team.registration_status.as_str(),
        players: players
            .into_iter()
            .map(|p| PlayerBody {
                player_id: p.player_id,
                position: p.position,
                name: p.name,
                role: p.role,
                aadhar_file_url: p.aadhar_file_url,
                subscription_file_url: p.subscription_file_url,
            })
            .collect(),
    }))
}

#[derive(Serialize)]
struct TransitionBody {
    success: bool,
    team_id: String,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    already_confirmed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    already_rejected: Option<bool>,
    urls: TeamUrlsBody,
}

#[derive(Serialize, Default)]
struct TeamUrlsBody {
    pastor_letter_url: Option<String>,
    payment_receipt_url: Option<String>,
    group_photo_url: Option<String>,
}

fn extension_of(url: &str) -> Option<&str> {
    url.rsplit('.').next()
}

/// The team-level artifact slots eligible to move namespace on a status
/// transition. Player-level artifacts are never relocated post-insert.
fn movable_slots(
    pastor_letter_url: &Option<String>,
    payment_receipt_url: &Option<String>,
    group_photo_url: &Option<String>,
) -> Vec<(Slot, ArtifactMime)> {
    let mut slots = Vec::new();
    for (slot, url) in [
        (Slot::PastorLetter, pastor_letter_url),
        (Slot::PaymentReceipt, payment_receipt_url),
        (Slot::GroupPhoto, group_photo_url),
    ] {
        if let Some(mime) = url.as_deref().and_then(extension_of).and_then(ArtifactMime::from_extension) {
            slots.push((slot, mime));
        }
    }
    slots
}

fn urls_from_moved(
    moved: std::collections::HashMap<Slot, String>,
    existing: &TeamArtifactUrls,
) -> TeamArtifactUrls {
    TeamArtifactUrls {
        pastor_letter_url: moved.get(&Slot::PastorLetter).cloned().or_else(|| existing.pastor_letter_url.clone()),
        payment_receipt_url: moved
            .get(&Slot::PaymentReceipt)
            .cloned()
            .or_else(|| existing.payment_receipt_url.clone()),
        group_photo_url: moved.get(&Slot::GroupPhoto).cloned().or_else(|| existing.group_photo_url.clone()),
    }
}

async fn transition(
    team_id_raw: &str,
    target: RegistrationStatus,
    namespace: &'static str,
    pool: &PgPool,
    object_store: &Arc<dyn ObjectStore>,
    registration: &RegistrationSettings,
) -> Result<HttpResponse, ApiError> {
    let (team, _players) = repository::get_by_team_id(pool, team_id_raw).await.map_err(|e| match e {
        repository::RepositoryError::TeamNotFound { team_id } => ApiError::NotFound { team_id },
        repository::RepositoryError::Database(e) => ApiError::Unexpected(e.into()),
    })?;

    match (team.registration_status, target) {
        (RegistrationStatus::Confirmed, RegistrationStatus::Confirmed) => {
            return Ok(HttpResponse::Ok().json(TransitionBody {
                success: true,
                team_id: team.team_id,
                status: "confirmed",
                already_confirmed: Some(true),
                already_rejected: None,
                urls: TeamUrlsBody {
                    pastor_letter_url: team.pastor_letter_url,
                    payment_receipt_url: team.payment_receipt_url,
                    group_photo_url: team.group_photo_url,
                },
            }));
        }
        (RegistrationStatus::Rejected, RegistrationStatus::Rejected) => {
            return Ok(HttpResponse::Ok().json(TransitionBody {
                success: true,
                team_id: team.team_id,
                status: "rejected",
                already_confirmed: None,
                already_rejected: Some(true),
                urls: TeamUrlsBody {
                    pastor_letter_url: team.pastor_letter_url,
                    payment_receipt_url: team.payment_receipt_url,
                    group_photo_url: team.group_photo_url,
                },
            }));
        }
        (RegistrationStatus::Pending, _) => {}
        (_, _) => return Err(ApiError::InvalidTransition { team_id: team.team_id }),
    }

    let team_id = TeamId::parse(&team.team_id, &registration.team_id_prefix)
        .map_err(|e| ApiError::Unexpected(anyhow::anyhow!(e)))?;

    let slots = movable_slots(&team.pastor_letter_url, &team.payment_receipt_url, &team.group_photo_url);
    let moved = move_all(object_store.as_ref(), &team_id, "pending", namespace, &slots).await;
    let existing = TeamArtifactUrls {
        pastor_letter_url: team.pastor_letter_url,
        payment_receipt_url: team.payment_receipt_url,
        group_photo_url: team.group_photo_url,
    };
    let urls = urls_from_moved(moved, &existing);

    let mut tx = pool.begin().await.map_err(|e| ApiError::Unexpected(e.into()))?;
    repository::update_status(&mut tx, &team.team_id, target, Some(urls.clone())).await.map_err(|e| match e {
        repository::RepositoryError::TeamNotFound { team_id } => ApiError::NotFound { team_id },
        repository::RepositoryError::Database(e) => ApiError::Unexpected(e.into()),
    })?;
    tx.commit().await.map_err(|e| ApiError::Unexpected(e.into()))?;

    Ok(HttpResponse::Ok().json(TransitionBody {
        success: true,
        team_id: team.team_id,
        status: if namespace == "confirmed" { "confirmed" } else { "rejected" },
        already_confirmed: None,
        already_rejected: None,
        urls: TeamUrlsBody {
            pastor_letter_url: urls.pastor_letter_url,
            payment_receipt_url: urls.payment_receipt_url,
            group_photo_url: urls.group_photo_url,
        },
    }))
}

/// `PUT /api/admin/teams/{teamId}/confirm`
pub async fn confirm_team(
    path: web::Path<String>,
    pool: web::Data<PgPool>,
    object_store: web::Data<Arc<dyn ObjectStore>>,
    registration: web::Data<RegistrationSettings>,
) -> Result<HttpResponse, ApiError> {
    transition(&path.into_inner(), RegistrationStatus::Confirmed, "confirmed", &pool, &object_store, &registration)
        .await
}

/// `PUT /api/admin/teams/{teamId}/reject`
pub async fn reject_team(
    path: web::Path<String>,
    pool: web::Data<PgPool>,
    object_store: web::Data<Arc<dyn ObjectStore>>,
    registration: web::Data<RegistrationSettings>,
) -> Result<HttpResponse, ApiError> {
    transition(&path.into_inner(), RegistrationStatus::Rejected, "rejected", &pool, &object_store, &registration)
        .await
}
