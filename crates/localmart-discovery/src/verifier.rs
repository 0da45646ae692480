use localmart_core::{is_usable_pincode, LocationCandidate};

use crate::session::{AcceptedLocation, LocationSession, LocationSessionStore};
use crate::{DiscoveryError, MarketplaceStore};

/// Outcome of counting approved vendors at a pincode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Serviceability {
    Serviceable { approved_vendors: i64 },
    NoVendors,
}

impl Serviceability {
    #[must_use]
    pub fn is_serviceable(self) -> bool {
        matches!(self, Serviceability::Serviceable { .. })
    }
}

/// Count approved vendors at `pincode` and classify the area.
///
/// Blank and sentinel pincodes are [`Serviceability::NoVendors`] without a
/// query.
///
/// # Errors
///
/// Returns [`DiscoveryError::ServiceabilityCheck`] if the count query fails.
/// A failed query is never reported as zero vendors.
pub async fn check_serviceability<S: MarketplaceStore>(
    store: &S,
    pincode: &str,
) -> Result<Serviceability, DiscoveryError> {
    let pincode = pincode.trim();
    if !is_usable_pincode(pincode) {
        return Ok(Serviceability::NoVendors);
    }

    let count = store
        .count_approved_vendors(pincode)
        .await
        .map_err(|source| DiscoveryError::ServiceabilityCheck {
            pincode: pincode.to_string(),
            source,
        })?;

    if count > 0 {
        Ok(Serviceability::Serviceable {
            approved_vendors: count,
        })
    } else {
        Ok(Serviceability::NoVendors)
    }
}

/// Verify `candidate` and make it the session's accepted location.
///
/// On success the candidate replaces any previous location. When the area
/// has no approved vendors the previous location is invalidated and
/// [`DiscoveryError::NotServiceable`] is returned. When the check itself
/// fails, nothing is written and the previous location stays in place.
///
/// # Errors
///
/// See above; store write failures surface as
/// [`DiscoveryError::SessionStore`].
pub async fn verify_and_accept<S, T>(
    store: &S,
    session: &LocationSession<'_, T>,
    candidate: LocationCandidate,
) -> Result<AcceptedLocation, DiscoveryError>
where
    S: MarketplaceStore,
    T: LocationSessionStore,
{
    let serviceability = match check_serviceability(store, &candidate.pincode).await {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!(
                session = %session.id(),
                pincode = %candidate.pincode,
                error = %e,
                "serviceability check failed; keeping previous location"
            );
            return Err(e);
        }
    };

    match serviceability {
        Serviceability::Serviceable { approved_vendors } => {
            let accepted = AcceptedLocation::from_verified(candidate);
            session
                .replace(&accepted)
                .await
                .map_err(DiscoveryError::SessionStore)?;
            tracing::info!(
                session = %session.id(),
                pincode = accepted.pincode(),
                city = accepted.city(),
                approved_vendors,
                "location accepted"
            );
            Ok(accepted)
        }
        Serviceability::NoVendors => {
            let cleared = session
                .invalidate()
                .await
                .map_err(DiscoveryError::SessionStore)?;
            tracing::info!(
                session = %session.id(),
                pincode = %candidate.pincode,
                cleared_previous = cleared,
                "location rejected: no approved vendors"
            );
            Err(DiscoveryError::NotServiceable {
                pincode: candidate.pincode,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{candidate, FakeStore};
    use crate::{MemorySessionStore, SessionId};

    #[tokio::test]
    async fn positive_count_is_serviceable() {
        let store = FakeStore::new(vec![], &[("411001", 3)], vec![]);
        let result = check_serviceability(&store, "411001").await.expect("check");
        assert_eq!(
            result,
            Serviceability::Serviceable {
                approved_vendors: 3
            }
        );
        assert!(result.is_serviceable());
    }

    #[tokio::test]
    async fn sentinel_pincode_is_never_queried() {
        let store = FakeStore::new(vec![], &[("000000", 5)], vec![]);
        let result = check_serviceability(&store, "000000").await.expect("check");
        assert_eq!(result, Serviceability::NoVendors);
        assert_eq!(store.vendor_counts_issued(), 0);
    }

    #[tokio::test]
    async fn accepted_location_is_persisted() {
        let store = FakeStore::new(vec![], &[("411001", 2)], vec![]);
        let sessions = MemorySessionStore::new();
        let session = LocationSession::new(&sessions, SessionId::new());

        let accepted = verify_and_accept(&store, &session, candidate("411001", "Pune"))
            .await
            .expect("accept");
        assert_eq!(accepted.pincode(), "411001");

        let current = session.current().await.expect("load").expect("present");
        assert_eq!((current.city(), current.pincode()), ("Pune", "411001"));
    }

    #[tokio::test]
    async fn zero_vendors_rejects_and_clears_previous_location() {
        let store = FakeStore::new(vec![], &[("411001", 2), ("110001", 0)], vec![]);
        let sessions = MemorySessionStore::new();
        let session = LocationSession::new(&sessions, SessionId::new());
        verify_and_accept(&store, &session, candidate("411001", "Pune"))
            .await
            .expect("accept");

        let err = verify_and_accept(&store, &session, candidate("110001", "New Delhi"))
            .await
            .unwrap_err();

        assert!(matches!(err, DiscoveryError::NotServiceable { ref pincode } if pincode == "110001"));
        assert_eq!(err.user_message(), "No shops available in this area yet");
        assert!(session.current().await.expect("load").is_none());
    }

    #[tokio::test]
    async fn count_failure_keeps_previous_location() {
        let store = FakeStore::new(vec![], &[("411001", 2)], vec![]);
        let sessions = MemorySessionStore::new();
        let session = LocationSession::new(&sessions, SessionId::new());
        verify_and_accept(&store, &session, candidate("411001", "Pune"))
            .await
            .expect("accept");

        store.fail_counts();
        let err = verify_and_accept(&store, &session, candidate("110001", "New Delhi"))
            .await
            .unwrap_err();

        assert!(matches!(err, DiscoveryError::ServiceabilityCheck { .. }));
        assert_ne!(err.user_message(), "No shops available in this area yet");
        let current = session.current().await.expect("load").expect("kept");
        assert_eq!(current.pincode(), "411001");
    }
}
