//! Persists teams and players, and serves the read/status-transition surface
//! the admin controller needs.

use chrono::DateTime;
use chrono::Utc;
use sqlx::Executor;
use sqlx::PgPool;
use sqlx::Postgres;
use sqlx::Transaction;
use uuid::Uuid;

use crate::domain::ChurchName;
use crate::domain::NewTeam;
use crate::domain::TeamId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "registration_status", rename_all = "lowercase")]
pub enum RegistrationStatus {
    Pending,
    Confirmed,
    Rejected,
}

impl RegistrationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Rejected => "rejected",
        }
    }
}

pub struct Team {
    pub id: Uuid,
    pub team_id: String,
    pub team_name: String,
    pub church_name: String,
    pub captain_name: String,
    pub captain_phone: String,
    pub captain_whatsapp: String,
    pub captain_email: String,
    pub vice_captain_name: String,
    pub vice_captain_phone: String,
    pub vice_captain_whatsapp: String,
    pub vice_captain_email: String,
    pub pastor_letter_url: Option<String>,
    pub payment_receipt_url: Option<String>,
    pub group_photo_url: Option<String>,
    pub registration_status: RegistrationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub struct Player {
    pub id: Uuid,
    pub player_id: String,
    pub position: i16,
    pub name: String,
    pub role: Option<String>,
    pub aadhar_file_url: Option<String>,
    pub subscription_file_url: Option<String>,
}

pub struct TeamSummary {
    pub team_id: String,
    pub team_name: String,
    pub church_name: String,
    pub player_count: i64,
    pub registration_status: RegistrationStatus,
}

/// URLs produced by `ArtifactUploader`, keyed by the team-level slot they
/// belong to. Player-level artifact URLs are updated separately (player rows
/// are never mutated by the core after insert, so only the three team-level
/// artifacts can move namespace post-confirmation).
#[derive(Default, Clone)]
pub struct TeamArtifactUrls {
    pub pastor_letter_url: Option<String>,
    pub payment_receipt_url: Option<String>,
    pub group_photo_url: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("team {team_id} not found")]
    TeamNotFound { team_id: String },
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Insert a team and its players inside the caller's transaction. The
/// `team_id` must already be allocated by the sequence allocator.
#[tracing::instrument(skip(tx, team))]
pub async fn insert_team_with_players(
    tx: &mut Transaction<'_, Postgres>,
    team_id: &TeamId,
    team: &NewTeam,
) -> Result<Uuid, RepositoryError> {
    let now = Utc::now();
    let church_normalized = team.church_name.normalized();

    let row = sqlx::query!(
        r#"
        INSERT INTO teams (
            id, team_id, team_name, church_name, church_name_normalized,
            captain_name, captain_phone, captain_whatsapp, captain_email,
            vice_captain_name, vice_captain_phone, vice_captain_whatsapp, vice_captain_email,
            registration_status, created_at, updated_at
        )
        VALUES (
            gen_random_uuid(), $1, $2, $3, $4,
            $5, $6, $7, $8,
            $9, $10, $11, $12,
            'pending', $13, $13
        )
        RETURNING id
        "#,
        team_id.as_ref(),
        team.team_name.as_ref(),
        team.church_name.as_ref(),
        church_normalized,
        team.captain.name.as_ref(),
        team.captain.phone.as_ref(),
        team.captain.whatsapp.as_ref(),
        team.captain.email.as_ref(),
        team.vice_captain.name.as_ref(),
        team.vice_captain.phone.as_ref(),
        team.vice_captain.whatsapp.as_ref(),
        team.vice_captain.email.as_ref(),
        now,
    )
    .fetch_one(&mut **tx)
    .await?;

    for (i, player) in team.players.iter().enumerate() {
        let position = (i + 1) as i16;
        let player_id = crate::domain::PlayerId::new(team_id, position as u8).to_string();
        let query = sqlx::query!(
            r#"
            INSERT INTO players (id, team_id, player_id, position, name, role)
            VALUES (gen_random_uuid(), $1, $2, $3, $4, $5)
            "#,
            row.id,
            player_id,
            position,
            player.name.as_ref(),
            player.role.as_ref().map(|r| r.as_ref()),
        );
        tx.execute(query).await?;
    }

    Ok(row.id)
}

pub async fn get_by_team_id(
    pool: &PgPool,
    team_id: &str,
) -> Result<(Team, Vec<Player>), RepositoryError> {
    let team = sqlx::query_as!(
        Team,
        r#"
        SELECT
            id, team_id, team_name, church_name,
            captain_name, captain_phone, captain_whatsapp, captain_email,
            vice_captain_name, vice_captain_phone, vice_captain_whatsapp, vice_captain_email,
            pastor_letter_url, payment_receipt_url, group_photo_url,
            registration_status as "registration_status: RegistrationStatus",
            created_at, updated_at
        FROM teams
        WHERE team_id = $1
        "#,
        team_id,
    )
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| RepositoryError::TeamNotFound { team_id: team_id.to_string() })?;

    let players = sqlx::query_as!(
        Player,
        r#"
        SELECT id, player_id, position, name, role, aadhar_file_url, subscription_file_url
        FROM players
        WHERE team_id = $1
        ORDER BY position
        "#,
        team.id,
    )
    .fetch_all(pool)
    .await?;

    Ok((team, players))
}

pub async fn get_player_by_player_id(
    pool: &PgPool,
    player_id: &str,
) -> Result<(Player, TeamSummary), RepositoryError> {
    let row = sqlx::query!(
        r#"
        SELECT
            players.id, players.player_id, players.position, players.name,
            players.role, players.aadhar_file_url, players.subscription_file_url,
            teams.team_id as team_team_id, teams.team_name, teams.church_name,
            teams.registration_status as "registration_status: RegistrationStatus"
        FROM players
        JOIN teams ON teams.id = players.team_id
        WHERE players.player_id = $1
        "#,
        player_id,
    )
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| RepositoryError::TeamNotFound { team_id: player_id.to_string() })?;

    let player = Player {
        id: row.id,
        player_id: row.player_id,
        position: row.position,
        name: row.name,
        role: row.role,
        aadhar_file_url: row.aadhar_file_url,
        subscription_file_url: row.subscription_file_url,
    };
    let summary = TeamSummary {
        team_id: row.team_team_id,
        team_name: row.team_name,
        church_name: row.church_name,
        player_count: 0,
        registration_status: row.registration_status,
    };
    Ok((player, summary))
}

pub async fn list_teams(
    pool: &PgPool,
    status: Option<RegistrationStatus>,
    skip: i64,
    limit: i64,
) -> Result<(i64, Vec<TeamSummary>), RepositoryError> {
    let total = sqlx::query!(
        r#"
        SELECT count(*) as "count!" FROM teams
        WHERE $1::registration_status IS NULL OR registration_status = $1
        "#,
        status as Option<RegistrationStatus>,
    )
    .fetch_one(pool)
    .await?
    .count;

    let rows = sqlx::query!(
        r#"
        SELECT
            teams.team_id, teams.team_name, teams.church_name,
            teams.registration_status as "registration_status: RegistrationStatus",
            (SELECT count(*) FROM players WHERE players.team_id = teams.id) as "player_count!"
        FROM teams
        WHERE $1::registration_status IS NULL OR registration_status = $1
        ORDER BY teams.created_at
        OFFSET $2 LIMIT $3
        "#,
        status as Option<RegistrationStatus>,
        skip,
        limit,
    )
    .fetch_all(pool)
    .await?;

    let summaries = rows
        .into_iter()
        .map(|r| TeamSummary {
            team_id: r.team_id,
            team_name: r.team_name,
            church_name: r.church_name,
            player_count: r.player_count,
            registration_status: r.registration_status,
        })
        .collect();

    Ok((total, summaries))
}

pub struct ChurchCount {
    pub church_name: String,
    pub team_count: i64,
}

/// One row per distinct church that has at least one team, with its current
/// team count. `church_name` is the most recently submitted casing for that
/// normalized name.
pub async fn list_church_counts(pool: &PgPool) -> Result<Vec<ChurchCount>, RepositoryError> {
    let rows = sqlx::query!(
        r#"
        SELECT DISTINCT ON (church_name_normalized)
            church_name,
            church_name_normalized,
            count(*) OVER (PARTITION BY church_name_normalized) as "team_count!"
        FROM teams
        ORDER BY church_name_normalized, created_at DESC
        "#
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|r| ChurchCount { church_name: r.church_name, team_count: r.team_count }).collect())
}

/// Transition `team_id` to `new_status`, optionally overwriting team-level
/// artifact URLs. The caller is responsible for enforcing that the
/// transition is legal (pending → confirmed/rejected, terminal otherwise).
pub async fn update_status(
    tx: &mut Transaction<'_, Postgres>,
    team_id: &str,
    new_status: RegistrationStatus,
    urls: Option<TeamArtifactUrls>,
) -> Result<(), RepositoryError> {
    let urls = urls.unwrap_or_default();
    let result = sqlx::query!(
        r#"
        UPDATE teams
        SET registration_status = $2,
            updated_at = now(),
            pastor_letter_url = COALESCE($3, pastor_letter_url),
            payment_receipt_url = COALESCE($4, payment_receipt_url),
            group_photo_url = COALESCE($5, group_photo_url)
        WHERE team_id = $1
        "#,
        team_id,
        new_status as RegistrationStatus,
        urls.pastor_letter_url,
        urls.payment_receipt_url,
        urls.group_photo_url,
    )
    .execute(&mut **tx)
    .await?;

    if result.rows_affected() == 0 {
        return Err(RepositoryError::TeamNotFound { team_id: team_id.to_string() });
    }
    Ok(())
}
