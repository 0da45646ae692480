use std::collections::HashMap;

use localmart_core::SeedFile;
use sqlx::PgPool;

use crate::DbError;

/// Row counts processed by [`seed_marketplace`], per table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub pincodes: usize,
    pub categories: usize,
    pub sub_categories: usize,
    pub vendors: usize,
    pub products: usize,
}

/// Upsert pincodes, categories, vendors, and products from a seed file.
///
/// All upserts run inside a single transaction; if any operation fails the
/// entire batch is rolled back. Rows are matched on their natural keys
/// (pincode, category name, vendor business name, vendor + product name).
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any database operation fails, or
/// [`DbError::SeedReference`] if a product names a vendor, category, or
/// sub-category that is not in the file.
pub async fn seed_marketplace(pool: &PgPool, seed: &SeedFile) -> Result<SeedSummary, DbError> {
    let mut tx = pool.begin().await?;
    let mut summary = SeedSummary::default();

    for row in &seed.pincodes {
        sqlx::query(
            "INSERT INTO pincodes (pincode, city, state, area_locality, is_active) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (pincode) DO UPDATE SET \
                 city = EXCLUDED.city, \
                 state = EXCLUDED.state, \
                 area_locality = EXCLUDED.area_locality, \
                 is_active = EXCLUDED.is_active, \
                 updated_at = NOW()",
        )
        .bind(&row.pincode)
        .bind(&row.city)
        .bind(&row.state)
        .bind(&row.area_locality)
        .bind(row.is_active)
        .execute(&mut *tx)
        .await?;
        summary.pincodes += 1;
    }

    let mut category_ids: HashMap<String, i64> = HashMap::new();
    let mut sub_category_ids: HashMap<(i64, String), i64> = HashMap::new();
    for category in &seed.categories {
        let category_id: i64 = sqlx::query_scalar(
            "INSERT INTO categories (name) VALUES ($1) \
             ON CONFLICT (name) DO UPDATE SET updated_at = NOW() \
             RETURNING id",
        )
        .bind(&category.name)
        .fetch_one(&mut *tx)
        .await?;
        category_ids.insert(category.name.to_lowercase(), category_id);
        summary.categories += 1;

        for sub in &category.sub_categories {
            let sub_id: i64 = sqlx::query_scalar(
                "INSERT INTO sub_categories (category_id, name) VALUES ($1, $2) \
                 ON CONFLICT (category_id, name) DO UPDATE SET updated_at = NOW() \
                 RETURNING id",
            )
            .bind(category_id)
            .bind(sub)
            .fetch_one(&mut *tx)
            .await?;
            sub_category_ids.insert((category_id, sub.to_lowercase()), sub_id);
            summary.sub_categories += 1;
        }
    }

    let mut vendor_ids: HashMap<String, i64> = HashMap::new();
    for vendor in &seed.vendors {
        let vendor_id: i64 = sqlx::query_scalar(
            "INSERT INTO vendors (business_name, business_type, city, pincode, state, approval_status) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             ON CONFLICT (business_name) DO UPDATE SET \
                 business_type = EXCLUDED.business_type, \
                 city = EXCLUDED.city, \
                 pincode = EXCLUDED.pincode, \
                 state = EXCLUDED.state, \
                 approval_status = EXCLUDED.approval_status, \
                 updated_at = NOW() \
             RETURNING id",
        )
        .bind(&vendor.business_name)
        .bind(&vendor.business_type)
        .bind(&vendor.city)
        .bind(&vendor.pincode)
        .bind(&vendor.state)
        .bind(vendor.approval_status.to_string())
        .fetch_one(&mut *tx)
        .await?;
        vendor_ids.insert(vendor.business_name.to_lowercase(), vendor_id);
        summary.vendors += 1;
    }

    for product in &seed.products {
        let vendor_id = *vendor_ids
            .get(&product.vendor.to_lowercase())
            .ok_or_else(|| DbError::SeedReference {
                kind: "vendor",
                name: product.vendor.clone(),
            })?;
        let category_id = *category_ids
            .get(&product.category.to_lowercase())
            .ok_or_else(|| DbError::SeedReference {
                kind: "category",
                name: product.category.clone(),
            })?;
        let sub_category_id = match &product.sub_category {
            Some(sub) => Some(
                *sub_category_ids
                    .get(&(category_id, sub.to_lowercase()))
                    .ok_or_else(|| DbError::SeedReference {
                        kind: "sub-category",
                        name: sub.clone(),
                    })?,
            ),
            None => None,
        };

        sqlx::query(
            "INSERT INTO products \
                 (vendor_id, category_id, sub_category_id, name, description, price, image_url, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             ON CONFLICT (vendor_id, name) DO UPDATE SET \
                 category_id = EXCLUDED.category_id, \
                 sub_category_id = EXCLUDED.sub_category_id, \
                 description = EXCLUDED.description, \
                 price = EXCLUDED.price, \
                 image_url = EXCLUDED.image_url, \
                 status = EXCLUDED.status, \
                 updated_at = NOW()",
        )
        .bind(vendor_id)
        .bind(category_id)
        .bind(sub_category_id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .bind(&product.image_url)
        .bind(&product.status)
        .execute(&mut *tx)
        .await?;
        summary.products += 1;
    }

    tx.commit().await?;
    Ok(summary)
}
