//! Live catalog view driven by filter and location edits.
//!
//! A background task owns the query. Filter edits are coalesced until the
//! input has been quiet for the debounce window; a location change re-queries
//! at once. Any edit that lands while a query is in flight drops that query,
//! so a slower, older result can never overwrite a newer one.

use localmart_core::CatalogFilters;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::timeout;

use crate::cascade::{resolve_catalog, CatalogResolution};
use crate::session::AcceptedLocation;
use crate::{DiscoveryConfig, MarketplaceStore};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct FeedInput {
    location: Option<AcceptedLocation>,
    filters: CatalogFilters,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedOutcome {
    /// No query has completed yet.
    Idle,
    Ready(CatalogResolution),
    /// User-facing message for the failed query.
    Failed(String),
}

/// Latest published result. `seq` increases with every query started, so
/// skipped values mark queries that were superseded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedSnapshot {
    pub seq: u64,
    pub outcome: FeedOutcome,
}

pub struct CatalogFeed {
    inputs: watch::Sender<FeedInput>,
    snapshots: watch::Receiver<FeedSnapshot>,
    task: JoinHandle<()>,
}

impl CatalogFeed {
    /// Start the feed. The first query runs immediately with default filters.
    pub fn spawn<S>(store: S, config: DiscoveryConfig, location: Option<AcceptedLocation>) -> Self
    where
        S: MarketplaceStore + Clone + 'static,
    {
        let (inputs, input_rx) = watch::channel(FeedInput {
            location,
            filters: CatalogFilters::default(),
        });
        let (snapshot_tx, snapshots) = watch::channel(FeedSnapshot {
            seq: 0,
            outcome: FeedOutcome::Idle,
        });
        let task = tokio::spawn(drive(store, config, input_rx, snapshot_tx));
        Self {
            inputs,
            snapshots,
            task,
        }
    }

    pub fn set_filters(&self, filters: CatalogFilters) {
        self.update_filters(|current| *current = filters);
    }

    /// Apply `edit` to the current filters. No-op edits do not re-query.
    pub fn update_filters(&self, edit: impl FnOnce(&mut CatalogFilters)) {
        self.inputs.send_if_modified(|input| {
            let before = input.filters.clone();
            edit(&mut input.filters);
            input.filters != before
        });
    }

    pub fn reset_filters(&self) {
        self.update_filters(CatalogFilters::reset);
    }

    pub fn set_location(&self, location: Option<AcceptedLocation>) {
        self.inputs.send_if_modified(|input| {
            if input.location == location {
                return false;
            }
            input.location = location;
            true
        });
    }

    #[must_use]
    pub fn filters(&self) -> CatalogFilters {
        self.inputs.borrow().filters.clone()
    }

    #[must_use]
    pub fn latest(&self) -> FeedSnapshot {
        self.snapshots.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<FeedSnapshot> {
        self.snapshots.clone()
    }
}

impl Drop for CatalogFeed {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn drive<S: MarketplaceStore>(
    store: S,
    config: DiscoveryConfig,
    mut inputs: watch::Receiver<FeedInput>,
    snapshots: watch::Sender<FeedSnapshot>,
) {
    let mut seq = 0_u64;
    let mut input = inputs.borrow_and_update().clone();

    loop {
        seq += 1;
        let work = resolve_catalog(&store, input.location.as_ref(), &input.filters, &config);

        let published = tokio::select! {
            result = work => {
                let outcome = match result {
                    Ok(resolution) => FeedOutcome::Ready(resolution),
                    Err(e) => {
                        tracing::warn!(seq, error = %e, "catalog feed query failed");
                        FeedOutcome::Failed(e.user_message().to_string())
                    }
                };
                snapshots.send_replace(FeedSnapshot { seq, outcome });
                if inputs.changed().await.is_err() {
                    return;
                }
                true
            }
            changed = inputs.changed() => {
                if changed.is_err() {
                    return;
                }
                tracing::debug!(seq, "catalog query superseded");
                false
            }
        };

        loop {
            if !location_changed(&inputs, &input) && !settle(&mut inputs, &input, &config).await {
                return;
            }
            let next = inputs.borrow_and_update().clone();
            if !published || next != input {
                input = next;
                break;
            }
            // Edits were undone before the window closed; the snapshot is current.
            if inputs.changed().await.is_err() {
                return;
            }
        }
    }
}

fn location_changed(inputs: &watch::Receiver<FeedInput>, queried: &FeedInput) -> bool {
    inputs.borrow().location != queried.location
}

/// Wait until the input has been quiet for the debounce window, or the
/// location changes. Returns `false` once the feed handle is gone.
async fn settle(
    inputs: &mut watch::Receiver<FeedInput>,
    queried: &FeedInput,
    config: &DiscoveryConfig,
) -> bool {
    loop {
        match timeout(config.debounce, inputs.changed()).await {
            Err(_elapsed) => return true,
            Ok(Err(_)) => return false,
            Ok(Ok(())) if location_changed(inputs, queried) => return true,
            Ok(Ok(())) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use localmart_core::{CatalogScope, LocationCandidate};
    use tokio::time::Instant;

    use super::*;
    use crate::testing::{product, FakeStore};

    fn pune() -> AcceptedLocation {
        AcceptedLocation::from_verified(LocationCandidate {
            pincode: "411001".to_string(),
            city: "Pune".to_string(),
            state: "Maharashtra".to_string(),
            area_locality: None,
        })
    }

    fn store() -> FakeStore {
        FakeStore::new(
            vec![],
            &[],
            vec![
                product(1, "Brass Lamp", 800, 1, "411001", "Pune"),
                product(2, "Rug", 600, 1, "560001", "Bengaluru"),
            ],
        )
    }

    async fn wait_for_seq(rx: &mut watch::Receiver<FeedSnapshot>, seq: u64) -> FeedSnapshot {
        rx.wait_for(|s| s.seq >= seq).await.expect("feed alive").clone()
    }

    #[tokio::test(start_paused = true)]
    async fn first_query_runs_without_waiting() {
        let store = store();
        let feed = CatalogFeed::spawn(store.clone(), DiscoveryConfig::default(), None);
        let mut rx = feed.subscribe();
        let started = Instant::now();

        let snapshot = wait_for_seq(&mut rx, 1).await;

        assert!(started.elapsed() < Duration::from_millis(400));
        match snapshot.outcome {
            FeedOutcome::Ready(resolution) => {
                assert_eq!(resolution.scope, CatalogScope::Unscoped);
                assert_eq!(resolution.products.len(), 2);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn rapid_filter_edits_coalesce_into_one_query() {
        let store = store();
        let feed = CatalogFeed::spawn(store.clone(), DiscoveryConfig::default(), None);
        let mut rx = feed.subscribe();
        wait_for_seq(&mut rx, 1).await;

        for text in ["l", "la", "lamp"] {
            feed.update_filters(|f| f.search_text = Some(text.to_string()));
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        let after_last_edit = Instant::now();
        let snapshot = wait_for_seq(&mut rx, 2).await;

        assert!(after_last_edit.elapsed() >= Duration::from_millis(300));
        assert_eq!(snapshot.seq, 2);
        let calls = store.catalog_calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].search.as_deref(), Some("lamp"));
    }

    #[tokio::test(start_paused = true)]
    async fn location_change_aborts_in_flight_query() {
        let store = store();
        store.delay_catalog(Duration::from_secs(2));
        let feed = CatalogFeed::spawn(store.clone(), DiscoveryConfig::default(), None);
        let mut rx = feed.subscribe();
        tokio::time::sleep(Duration::from_millis(100)).await;

        feed.set_location(Some(pune()));
        let snapshot = wait_for_seq(&mut rx, 1).await;

        assert_eq!(snapshot.seq, 2);
        assert_eq!(store.catalog_calls().len(), 2);
        assert_eq!(store.catalog_completed(), 1);
        match snapshot.outcome {
            FeedOutcome::Ready(resolution) => {
                assert_eq!(resolution.scope, CatalogScope::Pincode("411001".to_string()));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn identical_filters_do_not_requery() {
        let store = store();
        let feed = CatalogFeed::spawn(store.clone(), DiscoveryConfig::default(), None);
        let mut rx = feed.subscribe();
        wait_for_seq(&mut rx, 1).await;

        feed.set_filters(CatalogFilters::default());
        feed.reset_filters();
        tokio::time::sleep(Duration::from_secs(2)).await;

        assert_eq!(store.catalog_calls().len(), 1);
        assert_eq!(feed.latest().seq, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn reset_restores_defaults_and_requeries() {
        let store = store();
        let feed = CatalogFeed::spawn(store.clone(), DiscoveryConfig::default(), None);
        let mut rx = feed.subscribe();
        wait_for_seq(&mut rx, 1).await;

        feed.update_filters(|f| f.search_text = Some("rug".to_string()));
        wait_for_seq(&mut rx, 2).await;
        feed.reset_filters();
        let snapshot = wait_for_seq(&mut rx, 3).await;

        assert_eq!(feed.filters(), CatalogFilters::default());
        match snapshot.outcome {
            FeedOutcome::Ready(resolution) => assert_eq!(resolution.products.len(), 2),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn failures_publish_a_user_message() {
        let store = store();
        store.fail_catalog();
        let feed = CatalogFeed::spawn(store.clone(), DiscoveryConfig::default(), None);
        let mut rx = feed.subscribe();

        let snapshot = wait_for_seq(&mut rx, 1).await;

        assert_eq!(
            snapshot.outcome,
            FeedOutcome::Failed("Could not load products".to_string())
        );
    }

    #[tokio::test(start_paused = true)]
    async fn reverted_edit_keeps_published_result() {
        let store = store();
        let feed = CatalogFeed::spawn(store.clone(), DiscoveryConfig::default(), None);
        let mut rx = feed.subscribe();
        wait_for_seq(&mut rx, 1).await;

        feed.update_filters(|f| f.search_text = Some("lamp".to_string()));
        tokio::time::sleep(Duration::from_millis(100)).await;
        feed.update_filters(|f| f.search_text = None);
        tokio::time::sleep(Duration::from_secs(2)).await;

        assert_eq!(store.catalog_calls().len(), 1);
        assert_eq!(feed.latest().seq, 1);

        feed.update_filters(|f| f.search_text = Some("rug".to_string()));
        let snapshot = wait_for_seq(&mut rx, 2).await;
        assert_eq!(store.catalog_calls().len(), 2);
        match snapshot.outcome {
            FeedOutcome::Ready(resolution) => assert_eq!(resolution.products.len(), 1),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }
}
