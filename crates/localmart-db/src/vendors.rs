//! Read operations for the `vendors` table.

use sqlx::PgPool;

/// Count vendors at `pincode` whose approval status is `approved`.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn count_approved_vendors_at_pincode(
    pool: &PgPool,
    pincode: &str,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM vendors \
         WHERE pincode = $1 AND approval_status = 'approved'",
    )
    .bind(pincode)
    .fetch_one(pool)
    .await
}
