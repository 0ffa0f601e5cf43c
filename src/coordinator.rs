//! Orchestrates decoding, quota/sequence allocation, artifact upload, team
//! persistence, and notification for one registration submission, inside an
//! overall end-to-end deadline.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use sha2::Digest;
use sha2::Sha256;
use sqlx::error::DatabaseError;
use sqlx::PgPool;

use crate::artifacts::ArtifactUpload;
use crate::configuration::RegistrationSettings;
use crate::configuration::RetrySettings;
use crate::domain::NewTeam;
use crate::domain::TeamId;
use crate::errors::ApiError;
use crate::idempotency;
use crate::idempotency::IdempotencyKey;
use crate::notifications::NotificationQueue;
use crate::notifications::RegistrationSubmittedEvent;
use crate::quota::check_church_quota;
use crate::repository::insert_team_with_players;
use crate::resilience::retry;
use crate::resilience::CircuitBreaker;
use crate::sequence::next_team_id;
use crate::storage::delete_all;
use crate::storage::upload_pending;
use crate::storage::ObjectStore;

#[derive(Serialize)]
pub struct RegistrationResponse {
    pub success: bool,
    pub team_name: String,
    pub player_count: usize,
    pub registration_status: &'static str,
    pub message: String,
}

pub struct Coordinator {
    pub pool: PgPool,
    pub object_store: Arc<dyn ObjectStore>,
    pub notifications: NotificationQueue,
    pub upload_breaker: Arc<CircuitBreaker>,
    pub registration: RegistrationSettings,
    pub retry: RetrySettings,
    pub end_to_end_deadline: Duration,
}

#[derive(Serialize)]
struct CanonicalPayload<'a> {
    team_name: &'a str,
    church_name: &'a str,
    captain_name: &'a str,
    captain_phone: &'a str,
    captain_whatsapp: &'a str,
    captain_email: &'a str,
    vice_captain_name: &'a str,
    vice_captain_phone: &'a str,
    vice_captain_whatsapp: &'a str,
    vice_captain_email: &'a str,
    players: Vec<(&'a str, Option<&'a str>)>,
    artifact_hashes: Vec<&'a str>,
}

fn payload_hash(
    team: &NewTeam,
    artifacts: &[ArtifactUpload],
) -> String {
    let mut artifact_hashes: Vec<&str> = artifacts.iter().map(|a| a.sha256.as_str()).collect();
    artifact_hashes.sort_unstable();

    let canonical = CanonicalPayload {
        team_name: team.team_name.as_ref(),
        church_name: team.church_name.as_ref(),
        captain_name: team.captain.name.as_ref(),
        captain_phone: team.captain.phone.as_ref(),
        captain_whatsapp: team.captain.whatsapp.as_ref(),
        captain_email: team.captain.email.as_ref(),
        vice_captain_name: team.vice_captain.name.as_ref(),
        vice_captain_phone: team.vice_captain.phone.as_ref(),
        vice_captain_whatsapp: team.vice_captain.whatsapp.as_ref(),
        vice_captain_email: team.vice_captain.email.as_ref(),
        players: team.players.iter().map(|p| (p.name.as_ref(), p.role.as_ref().map(|r| r.as_ref()))).collect(),
        artifact_hashes,
    };

    let bytes = serde_json::to_vec(&canonical).expect("canonical payload always serializes");
    hex::encode(Sha256::digest(bytes))
}

impl Coordinator {
    #[tracing::instrument(skip(self, team, artifacts), fields(team_id = tracing::field::Empty))]
    pub async fn register(
        &self,
        team: NewTeam,
        artifacts: Vec<ArtifactUpload>,
        idempotency_key: Option<IdempotencyKey>,
    ) -> Result<RegistrationResponse, ApiError> {
        match tokio::time::timeout(self.end_to_end_deadline, self.register_inner(team, artifacts, idempotency_key))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(ApiError::DeadlineExceeded),
        }
    }

    async fn register_inner(
        &self,
        team: NewTeam,
        artifacts: Vec<ArtifactUpload>,
        idempotency_key: Option<IdempotencyKey>,
    ) -> Result<RegistrationResponse, ApiError> {
        let hash = payload_hash(&team, &artifacts);

        let transaction = if let Some(key) = &idempotency_key {
            match idempotency::begin(key, &hash, &self.pool).await.map_err(ApiError::Unexpected)? {
                idempotency::BeginOutcome::New(tx) => Some(tx),
                idempotency::BeginOutcome::Conflict => return Err(ApiError::IdempotencyConflict),
                idempotency::BeginOutcome::DuplicateInFlight => return Err(ApiError::DuplicateRequest),
                idempotency::BeginOutcome::Completed(_) => {
                    return Ok(RegistrationResponse {
                        success: true,
                        team_name: team.team_name.as_ref().to_string(),
                        player_count: team.players.len(),
                        registration_status: "pending",
                        message: "Registration submitted successfully. Please wait for admin confirmation."
                            .to_string(),
                    });
                }
            }
        } else {
            None
        };

        let result = self.run_protocol(&team, &artifacts).await;

        match (result, transaction, &idempotency_key) {
            (Ok(response), Some(tx), Some(key)) => {
                let body = serde_json::to_vec(&response).expect("response always serializes");
                let http_response = actix_web::HttpResponse::Created()
                    .content_type("application/json")
                    .body(body);
                idempotency::complete(key, http_response, tx).await.map_err(ApiError::Unexpected)?;
                Ok(response)
            }
            (Ok(response), None, _) => Ok(response),
            (Err(e), _, Some(key)) => {
                idempotency::abort(key, &self.pool).await.map_err(ApiError::Unexpected)?;
                Err(e)
            }
            (Err(e), _, None) => Err(e),
            (Ok(response), Some(tx), None) => {
                // no idempotency key was supplied, so the earlier `begin` branch
                // never ran and no transaction should exist; kept exhaustive for
                // the compiler.
                tx.rollback().await.ok();
                Ok(response)
            }
        }
    }

    async fn run_protocol(
        &self,
        team: &NewTeam,
        artifacts: &[ArtifactUpload],
    ) -> Result<RegistrationResponse, ApiError> {
        let team_id = self.allocate_id(team).await?;

        tracing::Span::current().record("team_id", tracing::field::display(&team_id));

        if let Err(e) = self.upload_artifacts(&team_id, artifacts).await {
            delete_all(
                self.object_store.as_ref(),
                &team_id,
                "pending",
                &artifacts.iter().map(|a| (a.slot, a.mime)).collect::<Vec<_>>(),
            )
            .await;
            return Err(e);
        }

        let team_id = match self.persist_team(&team_id, team, artifacts).await {
            Ok(final_id) => final_id,
            Err(e) => {
                delete_all(
                    self.object_store.as_ref(),
                    &team_id,
                    "pending",
                    &artifacts.iter().map(|a| (a.slot, a.mime)).collect::<Vec<_>>(),
                )
                .await;
                return Err(e);
            }
        };

        self.notifications.send(RegistrationSubmittedEvent {
            team_name: team.team_name.as_ref().to_string(),
            recipient: team.captain.email.clone(),
        });

        Ok(RegistrationResponse {
            success: true,
            team_name: team.team_name.as_ref().to_string(),
            player_count: team.players.len(),
            registration_status: "pending",
            message: "Registration submitted successfully. Please wait for admin confirmation.".to_string(),
        })
    }

    async fn allocate_id(
        &self,
        team: &NewTeam,
    ) -> Result<TeamId, ApiError> {
        let mut tx = self.pool.begin().await.map_err(|e| ApiError::Unexpected(e.into()))?;
        check_church_quota(&mut tx, &team.church_name, self.registration.max_teams_per_church).await?;
        let team_id =
            next_team_id(&mut tx, &self.registration.team_id_prefix).await.map_err(|e| ApiError::Unexpected(e.into()))?;
        tx.commit().await.map_err(|e| ApiError::Unexpected(e.into()))?;
        Ok(team_id)
    }

    async fn upload_artifacts(
        &self,
        team_id: &TeamId,
        artifacts: &[ArtifactUpload],
    ) -> Result<(), ApiError> {
        let store = Arc::clone(&self.object_store);
        let team_id = team_id.clone();
        let artifacts = artifacts.to_vec();
        let concurrency = self.registration.upload_concurrency;
        let max_elapsed = Duration::from_millis(self.retry.max_backoff_millis * self.retry.upload_max_attempts as u64);
        let initial_backoff = Duration::from_millis(self.retry.initial_backoff_millis);

        self.upload_breaker
            .call(|| {
                retry(
                    max_elapsed,
                    initial_backoff,
                    || {
                        let store = Arc::clone(&store);
                        let team_id = team_id.clone();
                        let artifacts = artifacts.clone();
                        async move { upload_pending(store.as_ref(), &team_id, &artifacts, concurrency).await }
                    },
                    |e| backoff::Error::transient(e),
                )
            })
            .await
            .map_err(|e| match e {
                crate::resilience::CircuitCallError::Open(_) => ApiError::CircuitOpen,
                crate::resilience::CircuitCallError::Inner(e) => ApiError::UploadFailed(e.into()),
            })?;
        Ok(())
    }

    /// Insert `team` under `team_id`. On a rare `team_id` collision (the
    /// sequence having fallen out of sync with a concurrent committer that
    /// won the race despite the lock), re-allocate a fresh id, move the
    /// already-uploaded artifacts under it, and retry — up to 5 attempts.
    async fn persist_team(
        &self,
        team_id: &TeamId,
        team: &NewTeam,
        artifacts: &[ArtifactUpload],
    ) -> Result<TeamId, ApiError> {
        let mut team_id = team_id.clone();
        let mut attempts_left = 5;

        loop {
            let mut tx = self.pool.begin().await.map_err(|e| ApiError::Unexpected(e.into()))?;
            match insert_team_with_players(&mut tx, &team_id, team).await {
                Ok(_) => {
                    tx.commit().await.map_err(|e| ApiError::Unexpected(e.into()))?;
                    return Ok(team_id);
                }
                Err(crate::repository::RepositoryError::Database(sqlx::Error::Database(db_err)))
                    if db_err.constraint() == Some("teams_team_name_captain_phone_key") =>
                {
                    return Err(ApiError::DuplicateTeam);
                }
                Err(crate::repository::RepositoryError::Database(sqlx::Error::Database(db_err)))
                    if db_err.constraint() == Some("teams_team_id_key") && attempts_left > 0 =>
                {
                    attempts_left -= 1;
                    let new_team_id = self.allocate_id(team).await?;
                    // re-upload under the newly allocated id rather than attempt a
                    // cross-id store rename, then clean up the orphaned objects
                    // left under the old id.
                    self.upload_artifacts(&new_team_id, artifacts).await?;
                    let old_slots: Vec<_> = artifacts.iter().map(|a| (a.slot, a.mime)).collect();
                    delete_all(self.object_store.as_ref(), &team_id, "pending", &old_slots).await;
                    team_id = new_team_id;
                }
                Err(e) => return Err(ApiError::Unexpected(e.into())),
            }
        }
    }
}
