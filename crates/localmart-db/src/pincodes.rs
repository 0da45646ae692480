//! Read operations for the `pincodes` lookup table.
//!
//! The table is reference data maintained outside this workspace; nothing
//! here writes to it except the seed loader.

use sqlx::PgPool;

/// A row from the `pincodes` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PincodeRow {
    pub id: i64,
    pub pincode: String,
    pub city: String,
    pub state: String,
    pub area_locality: Option<String>,
    pub is_active: bool,
}

impl From<PincodeRow> for localmart_core::LocationCandidate {
    fn from(row: PincodeRow) -> Self {
        Self {
            pincode: row.pincode,
            city: row.city,
            state: row.state,
            area_locality: row.area_locality,
        }
    }
}

/// Wrap `text` in `%…%` for an `ILIKE … ESCAPE '\'` match, escaping any
/// LIKE metacharacters the user typed.
pub(crate) fn contains_pattern(text: &str) -> String {
    let mut pattern = String::with_capacity(text.len() + 2);
    pattern.push('%');
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Case-insensitive partial match against pincode or city, active rows only.
///
/// Results are ordered by `pincode ASC` and capped at `limit`. Duplicate
/// pincodes are not removed here.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn search_active_pincodes(
    pool: &PgPool,
    query: &str,
    limit: i64,
) -> Result<Vec<PincodeRow>, sqlx::Error> {
    sqlx::query_as::<_, PincodeRow>(
        "SELECT id, pincode, city, state, area_locality, is_active \
         FROM pincodes \
         WHERE is_active = TRUE \
           AND (pincode ILIKE $1 ESCAPE '\\' OR city ILIKE $1 ESCAPE '\\') \
         ORDER BY pincode ASC \
         LIMIT $2",
    )
    .bind(contains_pattern(query))
    .bind(limit)
    .fetch_all(pool)
    .await
}

/// Fetch a single active pincode row by exact pincode.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn get_active_pincode(
    pool: &PgPool,
    pincode: &str,
) -> Result<Option<PincodeRow>, sqlx::Error> {
    sqlx::query_as::<_, PincodeRow>(
        "SELECT id, pincode, city, state, area_locality, is_active \
         FROM pincodes \
         WHERE pincode = $1 AND is_active = TRUE",
    )
    .bind(pincode.trim())
    .fetch_optional(pool)
    .await
}
