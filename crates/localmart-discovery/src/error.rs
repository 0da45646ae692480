use localmart_db::DbError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("location lookup failed: {0}")]
    LocationLookup(#[source] DbError),

    #[error("no approved vendors at pincode {pincode}")]
    NotServiceable { pincode: String },

    #[error("serviceability check failed for pincode {pincode}: {source}")]
    ServiceabilityCheck {
        pincode: String,
        #[source]
        source: DbError,
    },

    #[error("catalog query failed in {scope} scope: {source}")]
    CatalogQuery {
        scope: &'static str,
        #[source]
        source: DbError,
    },

    #[error("session store failed: {0}")]
    SessionStore(#[source] DbError),
}

impl DiscoveryError {
    /// Generic text safe to show an end user. Never includes query details.
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        match self {
            DiscoveryError::LocationLookup(_) => "Could not find location",
            DiscoveryError::NotServiceable { .. } => "No shops available in this area yet",
            DiscoveryError::ServiceabilityCheck { .. } => {
                "Could not verify this area right now. Please try again."
            }
            DiscoveryError::CatalogQuery { .. } => "Could not load products",
            DiscoveryError::SessionStore(_) => "Could not save your location",
        }
    }

    /// `true` when the failure came from an upstream query rather than a
    /// confirmed business outcome.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        !matches!(self, DiscoveryError::NotServiceable { .. })
    }
}
