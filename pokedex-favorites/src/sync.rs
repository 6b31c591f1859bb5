//! Local mirror of the remote favorites relation.
//!
//! The remote store is the single source of truth for the relation; the
//! local list is always re-derived by resolving the remote creature numbers
//! against the catalog. Writes go to the store first and are followed by a
//! full re-fetch, so a failed write never changes local state.
//!
//! Each authenticated session is identified by a generation number. Fetch
//! results that come back after their session ended are discarded.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use pokedex_catalog::{Catalog, Creature};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::backend::{RelationStore, Subscription};
use crate::error::FavoritesError;
use crate::types::{ChangeEvent, FavoriteRow};

/// Soft cap enforced when adding a favorite.
pub const MAX_FAVORITES: usize = 10;

/// Notifications for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    /// The local list was replaced by a fresh fetch.
    Updated(Vec<Creature>),
    /// A fetch failed; the previous list is still in place.
    FetchFailed(String),
    /// The session ended and the local list was emptied.
    Cleared,
}

/// What happened to a fetch result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The local list now holds this many records.
    Applied(usize),
    /// The session changed while the request was in flight.
    Discarded,
}

/// Result of [`FavoritesSync::toggle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggled {
    Added,
    Removed,
}

#[derive(Debug, Default)]
struct SyncState {
    user_id: Option<String>,
    generation: u64,
    favorites: Vec<Creature>,
    /// A fetch has been applied in the current session.
    loaded: bool,
}

struct Inner<S> {
    store: S,
    catalog: Arc<Catalog>,
    state: Mutex<SyncState>,
    events: Option<mpsc::UnboundedSender<SyncEvent>>,
}

/// Favorites of the signed-in user, kept in step with a [`RelationStore`].
///
/// Clones share state.
pub struct FavoritesSync<S> {
    inner: Arc<Inner<S>>,
}

impl<S> Clone for FavoritesSync<S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<S: RelationStore> FavoritesSync<S> {
    pub fn new(store: S, catalog: Arc<Catalog>) -> Self {
        Self::build(store, catalog, None)
    }

    /// Like [`FavoritesSync::new`], also reporting [`SyncEvent`]s on `events`.
    pub fn with_events(
        store: S,
        catalog: Arc<Catalog>,
        events: mpsc::UnboundedSender<SyncEvent>,
    ) -> Self {
        Self::build(store, catalog, Some(events))
    }

    fn build(
        store: S,
        catalog: Arc<Catalog>,
        events: Option<mpsc::UnboundedSender<SyncEvent>>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                store,
                catalog,
                state: Mutex::new(SyncState::default()),
                events,
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, SyncState> {
        self.inner.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event: SyncEvent) {
        if let Some(tx) = &self.inner.events {
            let _ = tx.send(event);
        }
    }

    fn is_current(&self, user_id: &str, generation: u64) -> bool {
        let state = self.state();
        state.generation == generation && state.user_id.as_deref() == Some(user_id)
    }

    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    /// The signed-in user, if any.
    pub fn user_id(&self) -> Option<String> {
        self.state().user_id.clone()
    }

    /// Snapshot of the local favorites list.
    pub fn favorites(&self) -> Vec<Creature> {
        self.state().favorites.clone()
    }

    pub fn is_favorite(&self, number: u32) -> bool {
        self.state().favorites.iter().any(|c| c.number == number)
    }

    /// Start a session for `user_id`: subscribe to change notifications,
    /// load the initial list, and return the handle that owns both.
    ///
    /// A failed subscription or initial fetch is reported but does not
    /// prevent the session from starting; the fetch error is kept on the
    /// handle, and adds are refused until a later fetch succeeds.
    pub async fn begin_session(&self, user_id: &str) -> SessionHandle<S> {
        let generation = {
            let mut state = self.state();
            state.generation += 1;
            state.user_id = Some(user_id.to_string());
            state.favorites.clear();
            state.loaded = false;
            state.generation
        };
        log::debug!("Favorites session {} started for {}", generation, user_id);

        let (listener, subscription) = match self.inner.store.subscribe_changes().await {
            Ok(feed) => {
                let (events, subscription) = feed.into_parts();
                let task = tokio::spawn(self.clone().listen(user_id.to_string(), generation, events));
                (Some(task), Some(subscription))
            }
            Err(e) => {
                log::warn!("Could not subscribe to favorites changes: {}", e);
                (None, None)
            }
        };

        let load_error = self.fetch(user_id).await.err();

        SessionHandle {
            sync: self.clone(),
            user_id: user_id.to_string(),
            generation,
            listener,
            subscription,
            load_error,
        }
    }

    /// Re-fetch on every change notification until the feed closes or the
    /// session ends.
    async fn listen(
        self,
        user_id: String,
        generation: u64,
        mut events: mpsc::UnboundedReceiver<ChangeEvent>,
    ) {
        while let Some(event) = events.recv().await {
            if !self.is_current(&user_id, generation) {
                break;
            }
            log::debug!(
                "Change on {} ({}), refetching favorites",
                event.table,
                event.kind
            );
            if let Err(e) = self.fetch(&user_id).await {
                log::debug!("Refetch after change failed: {}", e);
            }
        }
        log::debug!("Favorites listener for session {} stopped", generation);
    }

    fn end_session(&self, generation: u64) {
        let cleared = {
            let mut state = self.state();
            if state.generation == generation && state.user_id.is_some() {
                state.user_id = None;
                state.favorites.clear();
                state.loaded = false;
                state.generation += 1;
                true
            } else {
                false
            }
        };
        if cleared {
            log::debug!("Favorites session {} ended", generation);
            self.emit(SyncEvent::Cleared);
        }
    }

    /// Replace the local list with the remote relation for `user_id`.
    ///
    /// On failure the previous list is kept. A result for a user that is no
    /// longer signed in (or whose session was restarted meanwhile) is
    /// discarded.
    pub async fn fetch(&self, user_id: &str) -> Result<FetchOutcome, FavoritesError> {
        let generation = {
            let state = self.state();
            if state.user_id.as_deref() != Some(user_id) {
                log::debug!("Skipping favorites fetch for inactive user {}", user_id);
                return Ok(FetchOutcome::Discarded);
            }
            state.generation
        };

        let numbers = match self.inner.store.select_favorites(user_id).await {
            Ok(numbers) => numbers,
            Err(e) => {
                if self.is_current(user_id, generation) {
                    log::warn!("Error fetching favorites: {}", e);
                    self.emit(SyncEvent::FetchFailed(e.to_string()));
                }
                return Err(e);
            }
        };
        let records = self.inner.catalog.resolve(&numbers);

        {
            let mut state = self.state();
            if state.generation != generation || state.user_id.as_deref() != Some(user_id) {
                log::debug!("Discarding favorites fetched for ended session {}", generation);
                return Ok(FetchOutcome::Discarded);
            }
            state.favorites = records.clone();
            state.loaded = true;
        }

        let count = records.len();
        self.emit(SyncEvent::Updated(records));
        Ok(FetchOutcome::Applied(count))
    }

    /// Add `creature` for the signed-in user.
    ///
    /// Rejected locally when nobody is signed in, when the list has not been
    /// loaded yet, when it already holds [`MAX_FAVORITES`] entries, or when
    /// `creature` is already present.
    pub async fn add(&self, creature: &Creature) -> Result<(), FavoritesError> {
        let user_id = {
            let state = self.state();
            let user_id = state.user_id.clone().ok_or(FavoritesError::NotAuthenticated)?;
            if !state.loaded {
                return Err(FavoritesError::NotLoaded);
            }
            if state.favorites.len() >= MAX_FAVORITES {
                return Err(FavoritesError::CapacityReached { max: MAX_FAVORITES });
            }
            if state.favorites.iter().any(|c| c.number == creature.number) {
                return Err(FavoritesError::AlreadyFavorite {
                    number: creature.number,
                });
            }
            user_id
        };

        let row = FavoriteRow::new(user_id.as_str(), creature.number);
        if let Err(e) = self.inner.store.insert_favorite(&row).await {
            log::warn!("Error adding favorite: {}", e);
            return Err(e);
        }
        self.refetch_after_write(&user_id).await;
        Ok(())
    }

    /// Remove `creature` for the signed-in user.
    pub async fn remove(&self, creature: &Creature) -> Result<(), FavoritesError> {
        let user_id = self.user_id().ok_or(FavoritesError::NotAuthenticated)?;

        if let Err(e) = self
            .inner
            .store
            .delete_favorite(&user_id, creature.number)
            .await
        {
            log::warn!("Error removing favorite: {}", e);
            return Err(e);
        }
        self.refetch_after_write(&user_id).await;
        Ok(())
    }

    /// Remove `creature` if it is a favorite, add it otherwise.
    pub async fn toggle(&self, creature: &Creature) -> Result<Toggled, FavoritesError> {
        if self.is_favorite(creature.number) {
            self.remove(creature).await.map(|()| Toggled::Removed)
        } else {
            self.add(creature).await.map(|()| Toggled::Added)
        }
    }

    // The write already succeeded; a failed refresh is reported by `fetch`.
    async fn refetch_after_write(&self, user_id: &str) {
        if let Err(e) = self.fetch(user_id).await {
            log::debug!("Refetch after write failed: {}", e);
        }
    }
}

/// Owns one authenticated session's change subscription and listener.
///
/// Closing (or dropping) the handle clears the local list, stops the
/// listener and releases the subscription. Teardown runs once.
pub struct SessionHandle<S: RelationStore> {
    sync: FavoritesSync<S>,
    user_id: String,
    generation: u64,
    listener: Option<JoinHandle<()>>,
    subscription: Option<Subscription>,
    load_error: Option<FavoritesError>,
}

impl<S: RelationStore> SessionHandle<S> {
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// The error from the initial fetch, if it failed. Returned once.
    pub fn take_load_error(&mut self) -> Option<FavoritesError> {
        self.load_error.take()
    }

    /// Whether change notifications are being received.
    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }

    /// End the session.
    pub fn close(mut self) {
        self.teardown();
    }

    fn teardown(&mut self) {
        if let Some(listener) = self.listener.take() {
            listener.abort();
        }
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
        self.sync.end_session(self.generation);
    }
}

impl<S: RelationStore> Drop for SessionHandle<S> {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl<S: RelationStore> std::fmt::Debug for SessionHandle<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHandle")
            .field("user_id", &self.user_id)
            .field("generation", &self.generation)
            .field("subscribed", &self.subscription.is_some())
            .finish()
    }
}
