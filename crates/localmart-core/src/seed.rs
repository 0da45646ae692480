use std::collections::HashSet;
use std::path::Path;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Vendor approval workflow state. Only `Approved` vendors count toward
/// serviceability or appear in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

impl std::fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApprovalStatus::Pending => write!(f, "pending"),
            ApprovalStatus::Approved => write!(f, "approved"),
            ApprovalStatus::Rejected => write!(f, "rejected"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PincodeSeed {
    pub pincode: String,
    pub city: String,
    pub state: String,
    pub area_locality: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategorySeed {
    pub name: String,
    #[serde(default)]
    pub sub_categories: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VendorSeed {
    pub business_name: String,
    pub business_type: Option<String>,
    pub city: String,
    pub pincode: String,
    pub state: String,
    pub approval_status: ApprovalStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductSeed {
    /// `business_name` of the owning vendor.
    pub vendor: String,
    pub category: String,
    pub sub_category: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub image_url: Option<String>,
    #[serde(default = "default_product_status")]
    pub status: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeedFile {
    #[serde(default)]
    pub pincodes: Vec<PincodeSeed>,
    #[serde(default)]
    pub categories: Vec<CategorySeed>,
    #[serde(default)]
    pub vendors: Vec<VendorSeed>,
    #[serde(default)]
    pub products: Vec<ProductSeed>,
}

fn default_true() -> bool {
    true
}

fn default_product_status() -> String {
    "active".to_string()
}

/// Load and validate marketplace seed data from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_seed(path: &Path) -> Result<SeedFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::SeedFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_seed(&content)
}

/// Parse and validate seed YAML already in memory.
///
/// # Errors
///
/// Returns `ConfigError` if the YAML is malformed or fails validation.
pub fn parse_seed(content: &str) -> Result<SeedFile, ConfigError> {
    let seed: SeedFile = serde_yaml::from_str(content).map_err(ConfigError::SeedFileParse)?;
    validate_seed(&seed)?;
    Ok(seed)
}

fn is_valid_pincode(pincode: &str) -> bool {
    pincode.len() == 6 && pincode.bytes().all(|b| b.is_ascii_digit())
}

fn validate_seed(seed: &SeedFile) -> Result<(), ConfigError> {
    let mut seen_pincodes = HashSet::new();
    for row in &seed.pincodes {
        if !is_valid_pincode(&row.pincode) {
            return Err(ConfigError::Validation(format!(
                "pincode '{}' must be exactly 6 digits",
                row.pincode
            )));
        }
        if row.city.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "pincode '{}' has an empty city",
                row.pincode
            )));
        }
        if !seen_pincodes.insert(row.pincode.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate pincode: '{}'",
                row.pincode
            )));
        }
    }

    let mut categories = HashSet::new();
    for category in &seed.categories {
        if category.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "category name must be non-empty".to_string(),
            ));
        }
        if !categories.insert(category.name.to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate category: '{}'",
                category.name
            )));
        }
    }

    let mut vendors = HashSet::new();
    for vendor in &seed.vendors {
        if vendor.business_name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "vendor business name must be non-empty".to_string(),
            ));
        }
        if !is_valid_pincode(&vendor.pincode) {
            return Err(ConfigError::Validation(format!(
                "vendor '{}' has invalid pincode '{}'",
                vendor.business_name, vendor.pincode
            )));
        }
        if !vendors.insert(vendor.business_name.to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate vendor: '{}'",
                vendor.business_name
            )));
        }
    }

    for product in &seed.products {
        if product.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "product name must be non-empty".to_string(),
            ));
        }
        if !vendors.contains(&product.vendor.to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "product '{}' references unknown vendor '{}'",
                product.name, product.vendor
            )));
        }
        let Some(category) = seed
            .categories
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(&product.category))
        else {
            return Err(ConfigError::Validation(format!(
                "product '{}' references unknown category '{}'",
                product.name, product.category
            )));
        };
        if let Some(sub) = &product.sub_category {
            if !category
                .sub_categories
                .iter()
                .any(|s| s.eq_ignore_ascii_case(sub))
            {
                return Err(ConfigError::Validation(format!(
                    "product '{}' references unknown sub-category '{}' of '{}'",
                    product.name, sub, category.name
                )));
            }
        }
        if product.price.is_sign_negative() {
            return Err(ConfigError::Validation(format!(
                "product '{}' has a negative price",
                product.name
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "seed_test.rs"]
mod tests;
