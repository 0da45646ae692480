use std::future::Future;

use localmart_core::{CatalogProduct, LocationCandidate};
use localmart_db::{CatalogQuery, DbError};
use sqlx::PgPool;

/// Read queries the discovery steps issue against marketplace data.
///
/// Implemented for [`PgPool`]; tests substitute an in-memory store.
pub trait MarketplaceStore: Send + Sync {
    /// Partial, case-insensitive match on pincode or city over active rows,
    /// at most `limit` rows, duplicates allowed.
    fn search_locations(
        &self,
        query: &str,
        limit: i64,
    ) -> impl Future<Output = Result<Vec<LocationCandidate>, DbError>> + Send;

    /// Number of approved vendors whose pincode is exactly `pincode`.
    fn count_approved_vendors(
        &self,
        pincode: &str,
    ) -> impl Future<Output = Result<i64, DbError>> + Send;

    fn list_catalog(
        &self,
        query: CatalogQuery<'_>,
    ) -> impl Future<Output = Result<Vec<CatalogProduct>, DbError>> + Send;
}

impl MarketplaceStore for PgPool {
    async fn search_locations(
        &self,
        query: &str,
        limit: i64,
    ) -> Result<Vec<LocationCandidate>, DbError> {
        let rows = localmart_db::search_active_pincodes(self, query, limit).await?;
        Ok(rows.into_iter().map(LocationCandidate::from).collect())
    }

    async fn count_approved_vendors(&self, pincode: &str) -> Result<i64, DbError> {
        Ok(localmart_db::count_approved_vendors_at_pincode(self, pincode).await?)
    }

    async fn list_catalog(&self, query: CatalogQuery<'_>) -> Result<Vec<CatalogProduct>, DbError> {
        let rows = localmart_db::list_catalog_products(self, query).await?;
        Ok(rows.into_iter().map(CatalogProduct::from).collect())
    }
}
