use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::CoreError;

/// Requested ordering of a catalog result set.
///
/// Ties are left in database order; no secondary sort key is applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    PriceAsc,
    PriceDesc,
    /// Most recently listed first.
    #[default]
    Newest,
}

impl std::fmt::Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortOrder::PriceAsc => write!(f, "price_asc"),
            SortOrder::PriceDesc => write!(f, "price_desc"),
            SortOrder::Newest => write!(f, "newest"),
        }
    }
}

impl std::str::FromStr for SortOrder {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "price_asc" | "price-asc" => Ok(SortOrder::PriceAsc),
            "price_desc" | "price-desc" => Ok(SortOrder::PriceDesc),
            "newest" | "recent" => Ok(SortOrder::Newest),
            other => Err(CoreError::InvalidSortOrder(other.to_string())),
        }
    }
}

/// User-controlled catalog filters.
///
/// All fields are optional; `Default` is the "reset" state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogFilters {
    pub search_text: Option<String>,
    pub category_id: Option<i64>,
    pub sub_category_id: Option<i64>,
    pub business_type: Option<String>,
    /// Inclusive lower bound. `None` means zero.
    pub price_floor: Option<Decimal>,
    /// Inclusive upper bound.
    pub price_ceiling: Option<Decimal>,
    #[serde(default)]
    pub sort_order: SortOrder,
}

impl CatalogFilters {
    /// Restore every filter to its default.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    #[must_use]
    pub fn effective_price_floor(&self) -> Decimal {
        self.price_floor.unwrap_or(Decimal::ZERO)
    }

    /// Trimmed search text, or `None` when blank.
    #[must_use]
    pub fn normalized_search(&self) -> Option<&str> {
        self.search_text
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Trimmed business type, or `None` when blank.
    #[must_use]
    pub fn normalized_business_type(&self) -> Option<&str> {
        self.business_type
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// Geographic scope a catalog result set was produced under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum CatalogScope {
    Pincode(String),
    City(String),
    Unscoped,
}

impl CatalogScope {
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            CatalogScope::Pincode(_) => "pincode",
            CatalogScope::City(_) => "city",
            CatalogScope::Unscoped => "unscoped",
        }
    }
}

/// Vendor fields attached to every catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorSummary {
    pub vendor_id: i64,
    pub business_name: String,
    pub business_type: Option<String>,
    pub city: String,
    pub pincode: String,
    pub state: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogProduct {
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
    pub vendor: VendorSummary,
}
