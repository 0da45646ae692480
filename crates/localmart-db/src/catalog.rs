//! Catalog read-model: active products of approved vendors, filtered and sorted.

use chrono::{DateTime, Utc};
use localmart_core::{CatalogFilters, CatalogProduct, SortOrder, VendorSummary};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::pincodes::contains_pattern;
use crate::DbError;

/// Flat product + vendor row as returned by [`list_catalog_products`].
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CatalogProductRow {
    pub product_id: i64,
    pub public_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub category_id: i64,
    pub category_name: String,
    pub sub_category_id: Option<i64>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub vendor_id: i64,
    pub vendor_business_name: String,
    pub vendor_business_type: Option<String>,
    pub vendor_city: String,
    pub vendor_pincode: String,
    pub vendor_state: String,
}

impl From<CatalogProductRow> for CatalogProduct {
    fn from(row: CatalogProductRow) -> Self {
        Self {
            product_id: row.product_id,
            public_id: row.public_id,
            name: row.name,
            description: row.description,
            price: row.price,
            category_id: row.category_id,
            category_name: row.category_name,
            sub_category_id: row.sub_category_id,
            image_url: row.image_url,
            created_at: row.created_at,
            vendor: VendorSummary {
                vendor_id: row.vendor_id,
                business_name: row.vendor_business_name,
                business_type: row.vendor_business_type,
                city: row.vendor_city,
                pincode: row.vendor_pincode,
                state: row.vendor_state,
            },
        }
    }
}

/// Input for [`list_catalog_products`].
///
/// `pincode` and `city` restrict by vendor location; both `None` means
/// unscoped. `limit` is `None` to return every match.
#[derive(Debug, Clone, Default)]
pub struct CatalogQuery<'a> {
    pub pincode: Option<&'a str>,
    pub city: Option<&'a str>,
    pub search: Option<&'a str>,
    pub category_id: Option<i64>,
    pub sub_category_id: Option<i64>,
    pub business_type: Option<&'a str>,
    pub price_floor: Decimal,
    pub price_ceiling: Option<Decimal>,
    pub sort: SortOrder,
    pub limit: Option<i64>,
}

impl<'a> CatalogQuery<'a> {
    /// Build an unscoped, unlimited query carrying every user filter.
    #[must_use]
    pub fn from_filters(filters: &'a CatalogFilters) -> Self {
        Self {
            pincode: None,
            city: None,
            search: filters.normalized_search(),
            category_id: filters.category_id,
            sub_category_id: filters.sub_category_id,
            business_type: filters.normalized_business_type(),
            price_floor: filters.effective_price_floor(),
            price_ceiling: filters.price_ceiling,
            sort: filters.sort_order,
            limit: None,
        }
    }
}

fn order_by_clause(sort: SortOrder) -> &'static str {
    match sort {
        SortOrder::PriceAsc => "p.price ASC",
        SortOrder::PriceDesc => "p.price DESC",
        SortOrder::Newest => "p.created_at DESC",
    }
}

/// Returns active products of approved vendors matching `query`.
///
/// The price window is inclusive on both ends. Ordering follows
/// `query.sort` only; ties come back in whatever order Postgres produces.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_catalog_products(
    pool: &PgPool,
    query: CatalogQuery<'_>,
) -> Result<Vec<CatalogProductRow>, DbError> {
    let sql = format!(
        "SELECT \
             p.id AS product_id, p.public_id, p.name, p.description, p.price, \
             p.category_id, c.name AS category_name, p.sub_category_id, \
             p.image_url, p.created_at, \
             v.id AS vendor_id, \
             v.business_name AS vendor_business_name, \
             v.business_type AS vendor_business_type, \
             v.city AS vendor_city, \
             v.pincode AS vendor_pincode, \
             v.state AS vendor_state \
         FROM products p \
         JOIN vendors v ON v.id = p.vendor_id \
         JOIN categories c ON c.id = p.category_id \
         WHERE v.approval_status = 'approved' \
           AND p.status = 'active' \
           AND ($1::TEXT IS NULL OR v.pincode = $1) \
           AND ($2::TEXT IS NULL OR LOWER(v.city) = LOWER($2)) \
           AND ($3::TEXT IS NULL OR p.name ILIKE $3 ESCAPE '\\') \
           AND ($4::BIGINT IS NULL OR p.category_id = $4) \
           AND ($5::BIGINT IS NULL OR p.sub_category_id = $5) \
           AND ($6::TEXT IS NULL OR v.business_type = $6) \
           AND p.price >= $7 \
           AND ($8::NUMERIC IS NULL OR p.price <= $8) \
         ORDER BY {} \
         LIMIT COALESCE($9, 9223372036854775807)",
        order_by_clause(query.sort)
    );

    let rows = sqlx::query_as::<_, CatalogProductRow>(&sql)
        .bind(query.pincode)
        .bind(query.city)
        .bind(query.search.map(contains_pattern))
        .bind(query.category_id)
        .bind(query.sub_category_id)
        .bind(query.business_type)
        .bind(query.price_floor)
        .bind(query.price_ceiling)
        .bind(query.limit)
        .fetch_all(pool)
        .await?;

    Ok(rows)
}
