//! Persistence for the per-session accepted location (`session_locations`).

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// Input record for [`upsert_session_location`].
#[derive(Debug, Clone)]
pub struct NewSessionLocation<'a> {
    pub city: &'a str,
    pub pincode: &'a str,
    pub state: &'a str,
    pub area: Option<&'a str>,
}

/// A row from the `session_locations` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SessionLocationRow {
    pub session_id: Uuid,
    pub city: String,
    pub pincode: String,
    pub state: String,
    pub area: Option<String>,
    pub accepted_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fetch the accepted location stored for `session_id`, if any.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn get_session_location(
    pool: &PgPool,
    session_id: Uuid,
) -> Result<Option<SessionLocationRow>, sqlx::Error> {
    sqlx::query_as::<_, SessionLocationRow>(
        "SELECT session_id, city, pincode, state, area, accepted_at, updated_at \
         FROM session_locations \
         WHERE session_id = $1",
    )
    .bind(session_id)
    .fetch_optional(pool)
    .await
}

/// Insert or overwrite the accepted location for `session_id`.
///
/// Re-selection replaces every field and resets `accepted_at`.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the upsert fails.
pub async fn upsert_session_location(
    pool: &PgPool,
    session_id: Uuid,
    location: &NewSessionLocation<'_>,
) -> Result<SessionLocationRow, sqlx::Error> {
    sqlx::query_as::<_, SessionLocationRow>(
        "INSERT INTO session_locations (session_id, city, pincode, state, area) \
         VALUES ($1, $2, $3, $4, $5) \
         ON CONFLICT (session_id) DO UPDATE SET \
             city        = EXCLUDED.city, \
             pincode     = EXCLUDED.pincode, \
             state       = EXCLUDED.state, \
             area        = EXCLUDED.area, \
             accepted_at = NOW(), \
             updated_at  = NOW() \
         RETURNING session_id, city, pincode, state, area, accepted_at, updated_at",
    )
    .bind(session_id)
    .bind(location.city)
    .bind(location.pincode)
    .bind(location.state)
    .bind(location.area)
    .fetch_one(pool)
    .await
}

/// Remove the accepted location for `session_id`.
///
/// Returns `true` if a row was deleted.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the delete fails.
pub async fn delete_session_location(pool: &PgPool, session_id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM session_locations WHERE session_id = $1")
        .bind(session_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
