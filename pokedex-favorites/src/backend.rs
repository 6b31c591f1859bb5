//! Boundaries to the hosted services.
//!
//! The auth provider and the relation store are consumed only through these
//! traits. Methods return `Send` futures so the synchronization module can
//! drive them from spawned tokio tasks; implementors may write them as plain
//! `async fn`.

use std::fmt;
use std::future::Future;

use tokio::sync::{mpsc, watch};

use crate::error::FavoritesError;
use crate::types::{ChangeEvent, EmailCredentials, FavoriteRow, Session, SignUpOutcome};

/// Email/password authentication with an observable current session.
pub trait AuthProvider: Send + Sync {
    fn sign_in(
        &self,
        credentials: &EmailCredentials,
    ) -> impl Future<Output = Result<Session, FavoritesError>> + Send;

    fn sign_up(
        &self,
        credentials: &EmailCredentials,
    ) -> impl Future<Output = Result<SignUpOutcome, FavoritesError>> + Send;

    /// End the current session. The local session is cleared even when the
    /// remote call fails.
    fn sign_out(&self) -> impl Future<Output = Result<(), FavoritesError>> + Send;

    fn current_session(&self) -> Option<Session>;

    /// Receiver that observes every sign-in and sign-out.
    fn session_changes(&self) -> watch::Receiver<Option<Session>>;
}

/// The remote `(user_id, pokemon_number)` relation.
pub trait RelationStore: Send + Sync + 'static {
    /// Creature numbers favorited by `user_id`.
    fn select_favorites(
        &self,
        user_id: &str,
    ) -> impl Future<Output = Result<Vec<u32>, FavoritesError>> + Send;

    fn insert_favorite(
        &self,
        row: &FavoriteRow,
    ) -> impl Future<Output = Result<(), FavoritesError>> + Send;

    /// Delete every row matching `(user_id, number)`.
    fn delete_favorite(
        &self,
        user_id: &str,
        number: u32,
    ) -> impl Future<Output = Result<(), FavoritesError>> + Send;

    /// Start receiving table-level change notifications.
    fn subscribe_changes(&self) -> impl Future<Output = Result<ChangeFeed, FavoritesError>> + Send;
}

/// A registration with a remote notification source.
///
/// The release callback runs exactly once: on [`Subscription::unsubscribe`]
/// or when the value is dropped, whichever happens first.
pub struct Subscription {
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    pub fn unsubscribe(mut self) {
        self.release_now();
    }

    fn release_now(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release_now();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.release.is_some())
            .finish()
    }
}

/// Change notifications plus the subscription that keeps them flowing.
#[derive(Debug)]
pub struct ChangeFeed {
    pub events: mpsc::UnboundedReceiver<ChangeEvent>,
    pub subscription: Subscription,
}

impl ChangeFeed {
    pub fn into_parts(self) -> (mpsc::UnboundedReceiver<ChangeEvent>, Subscription) {
        (self.events, self.subscription)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_subscription() -> (Subscription, Arc<AtomicUsize>) {
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        let sub = Subscription::new(move || {
            c.fetch_add(1, Ordering::SeqCst);
        });
        (sub, count)
    }

    #[test]
    fn unsubscribe_releases_once() {
        let (sub, count) = counting_subscription();
        sub.unsubscribe();
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn drop_releases_once() {
        let (sub, count) = counting_subscription();
        drop(sub);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
