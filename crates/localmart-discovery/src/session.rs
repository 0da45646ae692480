//! Session-scoped accepted location.
//!
//! An [`AcceptedLocation`] can only be produced by the serviceability
//! verifier or restored from a row the verifier persisted earlier, so every
//! value reaching the catalog cascade has passed verification.

use std::collections::HashMap;
use std::future::Future;

use localmart_core::{is_usable_pincode, LocationCandidate};
use localmart_db::{DbError, NewSessionLocation, SessionLocationRow};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Identifier of one browsing session (one browser profile).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub Uuid);

impl SessionId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::str::FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

/// A location that passed the serviceability check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AcceptedLocation {
    city: String,
    pincode: String,
    state: String,
    area: Option<String>,
}

impl AcceptedLocation {
    pub(crate) fn from_verified(candidate: LocationCandidate) -> Self {
        Self {
            city: candidate.city,
            pincode: candidate.pincode,
            state: candidate.state,
            area: candidate.area_locality,
        }
    }

    pub(crate) fn from_persisted(row: SessionLocationRow) -> Self {
        Self {
            city: row.city,
            pincode: row.pincode,
            state: row.state,
            area: row.area,
        }
    }

    #[must_use]
    pub fn city(&self) -> &str {
        &self.city
    }

    #[must_use]
    pub fn pincode(&self) -> &str {
        &self.pincode
    }

    #[must_use]
    pub fn state(&self) -> &str {
        &self.state
    }

    #[must_use]
    pub fn area(&self) -> Option<&str> {
        self.area.as_deref()
    }

    /// Pincode usable as a catalog scope, or `None` for blank / sentinel values.
    #[must_use]
    pub fn scope_pincode(&self) -> Option<&str> {
        Some(self.pincode.trim()).filter(|p| is_usable_pincode(p))
    }

    /// City usable as a catalog scope, or `None` when blank.
    #[must_use]
    pub fn scope_city(&self) -> Option<&str> {
        Some(self.city.trim()).filter(|c| !c.is_empty())
    }
}

/// Persistence for the accepted location of each session.
pub trait LocationSessionStore: Send + Sync {
    fn load(
        &self,
        session: SessionId,
    ) -> impl Future<Output = Result<Option<AcceptedLocation>, DbError>> + Send;

    fn save(
        &self,
        session: SessionId,
        location: &AcceptedLocation,
    ) -> impl Future<Output = Result<(), DbError>> + Send;

    /// Returns `true` if a location was removed.
    fn clear(&self, session: SessionId) -> impl Future<Output = Result<bool, DbError>> + Send;
}

impl LocationSessionStore for PgPool {
    async fn load(&self, session: SessionId) -> Result<Option<AcceptedLocation>, DbError> {
        let row = localmart_db::get_session_location(self, session.0).await?;
        Ok(row.map(AcceptedLocation::from_persisted))
    }

    async fn save(&self, session: SessionId, location: &AcceptedLocation) -> Result<(), DbError> {
        localmart_db::upsert_session_location(
            self,
            session.0,
            &NewSessionLocation {
                city: &location.city,
                pincode: &location.pincode,
                state: &location.state,
                area: location.area.as_deref(),
            },
        )
        .await?;
        Ok(())
    }

    async fn clear(&self, session: SessionId) -> Result<bool, DbError> {
        Ok(localmart_db::delete_session_location(self, session.0).await?)
    }
}

/// Process-local session store, for the CLI and tests.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    locations: Mutex<HashMap<SessionId, AcceptedLocation>>,
}

impl MemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl LocationSessionStore for MemorySessionStore {
    async fn load(&self, session: SessionId) -> Result<Option<AcceptedLocation>, DbError> {
        Ok(self.locations.lock().await.get(&session).cloned())
    }

    async fn save(&self, session: SessionId, location: &AcceptedLocation) -> Result<(), DbError> {
        self.locations
            .lock()
            .await
            .insert(session, location.clone());
        Ok(())
    }

    async fn clear(&self, session: SessionId) -> Result<bool, DbError> {
        Ok(self.locations.lock().await.remove(&session).is_some())
    }
}

/// Accessor/mutator pair over one session's accepted location.
pub struct LocationSession<'a, T> {
    store: &'a T,
    id: SessionId,
}

impl<'a, T: LocationSessionStore> LocationSession<'a, T> {
    #[must_use]
    pub fn new(store: &'a T, id: SessionId) -> Self {
        Self { store, id }
    }

    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// The currently accepted location, re-derived from the store.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the store cannot be read.
    pub async fn current(&self) -> Result<Option<AcceptedLocation>, DbError> {
        self.store.load(self.id).await
    }

    /// Overwrite the accepted location.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the store cannot be written.
    pub async fn replace(&self, location: &AcceptedLocation) -> Result<(), DbError> {
        self.store.save(self.id, location).await
    }

    /// Drop the accepted location. Returns `true` if one was present.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the store cannot be written.
    pub async fn invalidate(&self) -> Result<bool, DbError> {
        self.store.clear(self.id).await
    }
}
