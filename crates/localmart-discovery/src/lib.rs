//! Location-based catalog discovery.
//!
//! Three steps, run in order by callers:
//!
//! 1. [`resolve_location`] turns free text into candidate serviceable areas.
//! 2. [`verify_and_accept`] accepts a candidate only if an approved vendor
//!    exists at its pincode, and stores it on the browsing session.
//! 3. [`resolve_catalog`] runs the pincode → city → unscoped fallback cascade.
//!
//! [`CatalogFeed`] drives step 3 from a stream of filter edits with debounce
//! and cancellation of superseded queries; [`RequestSequencer`] provides the
//! same stale-response guard to request/response callers.

mod cascade;
mod error;
mod feed;
mod resolver;
mod sequencer;
mod session;
mod store;
mod verifier;

#[cfg(test)]
pub(crate) mod testing;

use std::time::Duration;

pub use cascade::{resolve_catalog, CatalogResolution};
pub use error::DiscoveryError;
pub use feed::{CatalogFeed, FeedOutcome, FeedSnapshot};
pub use resolver::{resolve_location, MAX_CANDIDATES, MIN_QUERY_CHARS};
pub use sequencer::{RequestSequencer, RequestTicket};
pub use session::{
    AcceptedLocation, LocationSession, LocationSessionStore, MemorySessionStore, SessionId,
};
pub use store::MarketplaceStore;
pub use verifier::{check_serviceability, verify_and_accept, Serviceability};

const DEFAULT_DEBOUNCE_MS: u64 = 400;
const DEFAULT_UNSCOPED_LIMIT: i64 = 40;

/// Tunables for the catalog cascade and feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscoveryConfig {
    /// Quiet period after the last filter edit before the feed re-queries.
    pub debounce: Duration,
    /// Row cap applied when no location has been accepted.
    pub unscoped_limit: i64,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
            unscoped_limit: DEFAULT_UNSCOPED_LIMIT,
        }
    }
}

impl DiscoveryConfig {
    #[must_use]
    pub fn from_app_config(config: &localmart_core::AppConfig) -> Self {
        Self {
            debounce: Duration::from_millis(config.catalog_debounce_ms),
            unscoped_limit: config.unscoped_catalog_limit,
        }
    }
}
