//! `db` subcommand handlers.

use std::path::Path;

pub(crate) async fn run_db_ping(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    localmart_db::ping(pool).await?;
    println!("database reachable");
    Ok(())
}

pub(crate) async fn run_db_migrate(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let applied = localmart_db::run_migrations(pool).await?;
    println!("applied {applied} migration(s)");
    Ok(())
}

/// Load and upsert a seed file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or fails validation, or if
/// the seeding transaction fails. Nothing is written in that case.
pub(crate) async fn run_db_seed(pool: &sqlx::PgPool, path: &Path) -> anyhow::Result<()> {
    let seed = localmart_core::load_seed(path)?;
    let summary = localmart_db::seed_marketplace(pool, &seed).await?;
    tracing::info!(path = %path.display(), ?summary, "seed applied");
    println!(
        "seeded {} pincodes, {} categories, {} sub-categories, {} vendors, {} products",
        summary.pincodes,
        summary.categories,
        summary.sub_categories,
        summary.vendors,
        summary.products
    );
    Ok(())
}
