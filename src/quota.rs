//! Enforces the per-church team cap with a row-locked count, executed inside
//! the caller's transaction alongside sequence allocation.

use sqlx::Postgres;
use sqlx::Transaction;

use crate::domain::ChurchName;

#[derive(Debug, thiserror::Error)]
pub enum QuotaError {
    #[error("church {church_name:?} has already registered the maximum of {max} teams")]
    Exceeded { church_name: String, max: i64 },
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Lock every team row for `church_name` (compared in its normalized form)
/// and fail if the count has already reached `max_teams`.
pub async fn check_church_quota(
    tx: &mut Transaction<'_, Postgres>,
    church_name: &ChurchName,
    max_teams: i64,
) -> Result<(), QuotaError> {
    let normalized = church_name.normalized();

    // `FOR UPDATE` cannot be combined with an aggregate in the same query;
    // lock the church's rows first, then count what was locked.
    let count = sqlx::query!(
        r#"
        SELECT id
        FROM teams
        WHERE church_name_normalized = $1
        FOR UPDATE
        "#,
        normalized,
    )
    .fetch_all(&mut **tx)
    .await?
    .len() as i64;

    if count >= max_teams {
        return Err(QuotaError::Exceeded {
            church_name: church_name.as_ref().to_string(),
            max: max_teams,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    // `FOR UPDATE` serialization under concurrent submissions for the same
    // church is exercised in tests/api/quota.rs against a live database.
}
