pub mod app_config;
pub mod catalog;
pub mod config;
pub mod location;
pub mod seed;

pub use app_config::{AppConfig, Environment};
pub use catalog::{CatalogFilters, CatalogProduct, CatalogScope, SortOrder, VendorSummary};
pub use config::{load_app_config, load_app_config_from_env};
pub use location::{
    dedupe_by_pincode, is_usable_pincode, LocationCandidate, NULL_PINCODE_SENTINEL,
};
pub use seed::{load_seed, parse_seed, ApprovalStatus, SeedFile};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read seed file {path}: {source}")]
    SeedFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse seed file: {0}")]
    SeedFileParse(#[source] serde_yaml::Error),

    #[error("seed validation failed: {0}")]
    Validation(String),
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid sort order: {0}")]
    InvalidSortOrder(String),
}
