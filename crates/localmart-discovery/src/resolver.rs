use localmart_core::{dedupe_by_pincode, LocationCandidate};

use crate::{DiscoveryError, MarketplaceStore};

/// Queries shorter than this (after trimming) never reach the store.
pub const MIN_QUERY_CHARS: usize = 3;

/// Row cap applied to the lookup before de-duplication.
pub const MAX_CANDIDATES: i64 = 10;

/// Resolve free text to candidate serviceable locations.
///
/// Returns at most [`MAX_CANDIDATES`] candidates with unique pincodes; the
/// first row seen for a pincode wins. Short queries return an empty list
/// without a lookup.
///
/// # Errors
///
/// Returns [`DiscoveryError::LocationLookup`] if the store query fails.
pub async fn resolve_location<S: MarketplaceStore>(
    store: &S,
    query: &str,
) -> Result<Vec<LocationCandidate>, DiscoveryError> {
    let query = query.trim();
    if query.chars().count() < MIN_QUERY_CHARS {
        return Ok(Vec::new());
    }

    let rows = store
        .search_locations(query, MAX_CANDIDATES)
        .await
        .map_err(|e| {
            tracing::warn!(error = %e, "location lookup failed");
            DiscoveryError::LocationLookup(e)
        })?;

    let candidates = dedupe_by_pincode(rows);
    tracing::debug!(query, count = candidates.len(), "resolved location candidates");
    Ok(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{candidate, FakeStore};

    #[tokio::test]
    async fn short_query_skips_the_store() {
        let store = FakeStore::new(vec![candidate("110001", "New Delhi")], &[], vec![]);

        for query in ["", "11", "  de  ", "ab"] {
            let found = resolve_location(&store, query).await.expect("resolve");
            assert!(found.is_empty(), "query {query:?} should not match");
        }
        assert_eq!(store.location_searches(), 0);
    }

    #[tokio::test]
    async fn three_characters_trigger_a_lookup() {
        let store = FakeStore::new(vec![candidate("411001", "Pune")], &[], vec![]);

        let found = resolve_location(&store, "pun").await.expect("resolve");
        assert_eq!(store.location_searches(), 1);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].pincode, "411001");
    }

    #[tokio::test]
    async fn duplicate_pincodes_keep_first_row() {
        let mut second = candidate("110001", "New Delhi");
        second.area_locality = Some("Janpath".to_string());
        let mut first = candidate("110001", "New Delhi");
        first.area_locality = Some("Connaught Place".to_string());
        let store = FakeStore::new(
            vec![first, second, candidate("110002", "New Delhi")],
            &[],
            vec![],
        );

        let found = resolve_location(&store, "Delhi").await.expect("resolve");
        let pincodes: Vec<&str> = found.iter().map(|c| c.pincode.as_str()).collect();
        assert_eq!(pincodes, ["110001", "110002"]);
        assert_eq!(found[0].area_locality.as_deref(), Some("Connaught Place"));
    }

    #[tokio::test]
    async fn results_are_capped_before_dedupe() {
        let rows = (0..15)
            .map(|i| candidate(&format!("4110{i:02}"), "Pune"))
            .collect();
        let store = FakeStore::new(rows, &[], vec![]);

        let found = resolve_location(&store, "Pune").await.expect("resolve");
        assert_eq!(found.len(), 10);
    }

    #[tokio::test]
    async fn lookup_failure_is_reported() {
        let store = FakeStore::new(vec![], &[], vec![]);
        store.fail_locations();

        let err = resolve_location(&store, "Pune").await.unwrap_err();
        assert!(matches!(err, DiscoveryError::LocationLookup(_)));
        assert_eq!(err.user_message(), "Could not find location");
    }
}
