//! Ties favorites sessions to the auth provider's session channel.

use tokio::sync::watch;

use crate::backend::RelationStore;
use crate::sync::{FavoritesSync, SessionHandle};
use crate::types::Session;

/// Follow sign-in and sign-out events until the session channel closes.
///
/// Signing in begins a favorites session (initial fetch + change
/// subscription); signing out, or signing in as someone else, closes the
/// previous one. The active session is closed when the channel ends.
pub async fn drive_sessions<S: RelationStore>(
    sync: FavoritesSync<S>,
    mut sessions: watch::Receiver<Option<Session>>,
) {
    let mut active: Option<SessionHandle<S>> = None;

    loop {
        let current_user = sessions
            .borrow_and_update()
            .as_ref()
            .map(|s| s.user.id.clone());
        let active_user = active.as_ref().map(|h| h.user_id().to_string());

        if current_user != active_user {
            if let Some(handle) = active.take() {
                log::debug!("Closing favorites session for {}", handle.user_id());
                handle.close();
            }
            if let Some(user_id) = current_user {
                active = Some(sync.begin_session(&user_id).await);
            }
        }

        if sessions.changed().await.is_err() {
            break;
        }
    }

    if let Some(handle) = active.take() {
        handle.close();
    }
    log::debug!("Session channel closed, favorites driver stopped");
}
