//! Pincode → city → unscoped catalog fallback.

use localmart_core::{CatalogFilters, CatalogProduct, CatalogScope};
use localmart_db::CatalogQuery;
use serde::Serialize;

use crate::session::AcceptedLocation;
use crate::{DiscoveryConfig, DiscoveryError, MarketplaceStore};

/// Products plus the scope that produced them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogResolution {
    pub scope: CatalogScope,
    pub products: Vec<CatalogProduct>,
}

impl CatalogResolution {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

async fn run_scope<S: MarketplaceStore>(
    store: &S,
    scope: CatalogScope,
    filters: &CatalogFilters,
    limit: Option<i64>,
) -> Result<CatalogResolution, DiscoveryError> {
    let mut query = CatalogQuery::from_filters(filters);
    query.limit = limit;
    match &scope {
        CatalogScope::Pincode(p) => query.pincode = Some(p.as_str()),
        CatalogScope::City(c) => query.city = Some(c.as_str()),
        CatalogScope::Unscoped => {}
    }

    let products = store
        .list_catalog(query)
        .await
        .map_err(|source| DiscoveryError::CatalogQuery {
            scope: scope.label(),
            source,
        })?;

    tracing::debug!(
        scope = scope.label(),
        count = products.len(),
        sort = %filters.sort_order,
        "catalog scope queried"
    );
    Ok(CatalogResolution { scope, products })
}

/// Fetch the catalog for `accepted` under `filters`.
///
/// With a usable pincode the pincode scope runs first; if it returns nothing
/// and the location carries a city, the city scope runs next. A location
/// whose pincode is blank or the sentinel goes straight to the city scope.
/// With no accepted location, the unscoped listing runs, capped at
/// `config.unscoped_limit`. Scoped listings are not capped.
///
/// Every filter and the sort order apply identically in all scopes.
///
/// # Errors
///
/// Returns [`DiscoveryError::CatalogQuery`] naming the scope whose query
/// failed. A failing pincode query does not fall through to the city scope.
pub async fn resolve_catalog<S: MarketplaceStore>(
    store: &S,
    accepted: Option<&AcceptedLocation>,
    filters: &CatalogFilters,
    config: &DiscoveryConfig,
) -> Result<CatalogResolution, DiscoveryError> {
    let pincode = accepted.and_then(AcceptedLocation::scope_pincode);
    let city = accepted.and_then(AcceptedLocation::scope_city);

    match (pincode, city) {
        (Some(pincode), city) => {
            let by_pincode =
                run_scope(store, CatalogScope::Pincode(pincode.to_string()), filters, None)
                    .await?;
            match city {
                Some(city) if by_pincode.is_empty() => {
                    tracing::debug!(pincode, city, "pincode scope empty; falling back to city");
                    run_scope(store, CatalogScope::City(city.to_string()), filters, None).await
                }
                _ => Ok(by_pincode),
            }
        }
        (None, Some(city)) => {
            run_scope(store, CatalogScope::City(city.to_string()), filters, None).await
        }
        (None, None) => {
            run_scope(
                store,
                CatalogScope::Unscoped,
                filters,
                Some(config.unscoped_limit),
            )
            .await
        }
    }
}
