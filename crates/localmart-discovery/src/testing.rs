//! In-memory [`MarketplaceStore`] for unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{TimeZone, Utc};
use localmart_core::{CatalogProduct, LocationCandidate, SortOrder, VendorSummary};
use localmart_db::{CatalogQuery, DbError};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::MarketplaceStore;

/// One recorded `list_catalog` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CatalogCall {
    pub pincode: Option<String>,
    pub city: Option<String>,
    pub search: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Debug, Default)]
struct Inner {
    locations: Vec<LocationCandidate>,
    vendor_counts: HashMap<String, i64>,
    products: Vec<CatalogProduct>,
    location_searches: AtomicUsize,
    vendor_counts_issued: AtomicUsize,
    catalog_calls: Mutex<Vec<CatalogCall>>,
    catalog_completed: AtomicUsize,
    catalog_delay: Mutex<Option<Duration>>,
    fail_locations: AtomicBool,
    fail_counts: AtomicBool,
    fail_catalog: AtomicBool,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct FakeStore {
    inner: Arc<Inner>,
}

fn store_error() -> DbError {
    DbError::Sqlx(sqlx::Error::PoolTimedOut)
}

impl FakeStore {
    pub fn new(
        locations: Vec<LocationCandidate>,
        vendor_counts: &[(&str, i64)],
        products: Vec<CatalogProduct>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                locations,
                vendor_counts: vendor_counts
                    .iter()
                    .map(|(p, c)| ((*p).to_string(), *c))
                    .collect(),
                products,
                ..Inner::default()
            }),
        }
    }

    pub fn fail_locations(&self) {
        self.inner.fail_locations.store(true, Ordering::SeqCst);
    }

    pub fn fail_counts(&self) {
        self.inner.fail_counts.store(true, Ordering::SeqCst);
    }

    pub fn fail_catalog(&self) {
        self.inner.fail_catalog.store(true, Ordering::SeqCst);
    }

    pub fn delay_catalog(&self, delay: Duration) {
        *self.inner.catalog_delay.lock().expect("delay lock") = Some(delay);
    }

    pub fn location_searches(&self) -> usize {
        self.inner.location_searches.load(Ordering::SeqCst)
    }

    pub fn vendor_counts_issued(&self) -> usize {
        self.inner.vendor_counts_issued.load(Ordering::SeqCst)
    }

    pub fn catalog_calls(&self) -> Vec<CatalogCall> {
        self.inner.catalog_calls.lock().expect("calls lock").clone()
    }

    pub fn catalog_completed(&self) -> usize {
        self.inner.catalog_completed.load(Ordering::SeqCst)
    }
}

fn matches(product: &CatalogProduct, query: &CatalogQuery<'_>) -> bool {
    query.pincode.is_none_or(|p| product.vendor.pincode == p)
        && query
            .city
            .is_none_or(|c| product.vendor.city.eq_ignore_ascii_case(c))
        && query.search.is_none_or(|s| {
            product
                .name
                .to_lowercase()
                .contains(&s.to_lowercase())
        })
        && query.category_id.is_none_or(|id| product.category_id == id)
        && query
            .sub_category_id
            .is_none_or(|id| product.sub_category_id == Some(id))
        && query
            .business_type
            .is_none_or(|t| product.vendor.business_type.as_deref() == Some(t))
        && product.price >= query.price_floor
        && query.price_ceiling.is_none_or(|max| product.price <= max)
}

impl MarketplaceStore for FakeStore {
    async fn search_locations(
        &self,
        query: &str,
        limit: i64,
    ) -> Result<Vec<LocationCandidate>, DbError> {
        self.inner.location_searches.fetch_add(1, Ordering::SeqCst);
        if self.inner.fail_locations.load(Ordering::SeqCst) {
            return Err(store_error());
        }
        let needle = query.to_lowercase();
        Ok(self
            .inner
            .locations
            .iter()
            .filter(|c| c.pincode.contains(&needle) || c.city.to_lowercase().contains(&needle))
            .take(usize::try_from(limit).unwrap_or(0))
            .cloned()
            .collect())
    }

    async fn count_approved_vendors(&self, pincode: &str) -> Result<i64, DbError> {
        self.inner.vendor_counts_issued.fetch_add(1, Ordering::SeqCst);
        if self.inner.fail_counts.load(Ordering::SeqCst) {
            return Err(store_error());
        }
        Ok(self.inner.vendor_counts.get(pincode).copied().unwrap_or(0))
    }

    async fn list_catalog(&self, query: CatalogQuery<'_>) -> Result<Vec<CatalogProduct>, DbError> {
        self.inner
            .catalog_calls
            .lock()
            .expect("calls lock")
            .push(CatalogCall {
                pincode: query.pincode.map(str::to_string),
                city: query.city.map(str::to_string),
                search: query.search.map(str::to_string),
                limit: query.limit,
            });

        let delay = *self.inner.catalog_delay.lock().expect("delay lock");
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.inner.fail_catalog.load(Ordering::SeqCst) {
            return Err(store_error());
        }

        let mut rows: Vec<CatalogProduct> = self
            .inner
            .products
            .iter()
            .filter(|p| matches(p, &query))
            .cloned()
            .collect();
        match query.sort {
            SortOrder::PriceAsc => rows.sort_by(|a, b| a.price.cmp(&b.price)),
            SortOrder::PriceDesc => rows.sort_by(|a, b| b.price.cmp(&a.price)),
            SortOrder::Newest => rows.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        }
        if let Some(limit) = query.limit {
            rows.truncate(usize::try_from(limit).unwrap_or(0));
        }

        self.inner.catalog_completed.fetch_add(1, Ordering::SeqCst);
        Ok(rows)
    }
}

pub(crate) fn candidate(pincode: &str, city: &str) -> LocationCandidate {
    LocationCandidate {
        pincode: pincode.to_string(),
        city: city.to_string(),
        state: "Test State".to_string(),
        area_locality: None,
    }
}

/// Products with a higher `id` are listed later.
pub(crate) fn product(
    id: i64,
    name: &str,
    price: i64,
    category_id: i64,
    pincode: &str,
    city: &str,
) -> CatalogProduct {
    let reference = Utc
        .with_ymd_and_hms(2026, 1, 1, 0, 0, 0)
        .single()
        .expect("valid timestamp");
    CatalogProduct {
        product_id: id,
        public_id: Uuid::new_v4(),
        name: name.to_string(),
        description: None,
        price: Decimal::new(price, 0),
        category_id,
        category_name: format!("category-{category_id}"),
        sub_category_id: None,
        image_url: None,
        created_at: reference + chrono::Duration::minutes(id),
        vendor: VendorSummary {
            vendor_id: 1,
            business_name: format!("Vendor {pincode}"),
            business_type: Some("retail".to_string()),
            city: city.to_string(),
            pincode: pincode.to_string(),
            state: "Test State".to_string(),
        },
    }
}
