use std::sync::Arc;
use std::time::Duration;

use pokedex_catalog::Catalog;
use pokedex_favorites::{
    AuthProvider, EmailCredentials, FavoriteRow, FavoritesSync, MemoryBackend, RelationStore,
    Session, SyncEvent, drive_sessions,
};
use tokio::sync::{mpsc, watch};
use tokio::time::{sleep, timeout};

fn catalog() -> Arc<Catalog> {
    Arc::new(Catalog::bundled().unwrap())
}

async fn wait_until(mut cond: impl FnMut() -> bool) {
    timeout(Duration::from_secs(2), async {
        while !cond() {
            sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}

async fn next_event(rx: &mut mpsc::UnboundedReceiver<SyncEvent>) -> SyncEvent {
    timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("timed out waiting for an event")
        .expect("event channel closed")
}

#[tokio::test]
async fn sign_in_and_out_drive_the_favorites_session() {
    let backend = MemoryBackend::new();
    let user = backend.register("ash@example.com", "pikachu");
    backend
        .insert_favorite(&FavoriteRow::new(user.id.as_str(), 4))
        .await
        .unwrap();

    let (tx, mut rx) = mpsc::unbounded_channel();
    let sync = FavoritesSync::with_events(backend.clone(), catalog(), tx);
    let driver = tokio::spawn(drive_sessions(sync.clone(), backend.session_changes()));

    backend
        .sign_in(&EmailCredentials::new("ash@example.com", "pikachu"))
        .await
        .unwrap();

    let SyncEvent::Updated(records) = next_event(&mut rx).await else {
        panic!("expected the initial fetch");
    };
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].name, "Charmander");
    assert_eq!(backend.subscriber_count(), 1);

    backend.sign_out().await.unwrap();
    assert_eq!(next_event(&mut rx).await, SyncEvent::Cleared);
    assert!(sync.favorites().is_empty());
    assert_eq!(backend.subscriber_count(), 0);

    driver.abort();
}

#[tokio::test]
async fn switching_users_replaces_the_session() {
    let backend = MemoryBackend::new();
    let ash = backend.register("ash@example.com", "pikachu");
    let misty = backend.register("misty@example.com", "starmie");
    backend
        .insert_favorite(&FavoriteRow::new(misty.id.as_str(), 7))
        .await
        .unwrap();

    let sync = FavoritesSync::new(backend.clone(), catalog());
    let driver = tokio::spawn(drive_sessions(sync.clone(), backend.session_changes()));

    backend
        .sign_in(&EmailCredentials::new("ash@example.com", "pikachu"))
        .await
        .unwrap();
    wait_until(|| sync.user_id().as_deref() == Some(ash.id.as_str())).await;

    backend
        .sign_in(&EmailCredentials::new("misty@example.com", "starmie"))
        .await
        .unwrap();
    wait_until(|| sync.is_favorite(7)).await;

    assert_eq!(sync.user_id().as_deref(), Some(misty.id.as_str()));
    assert_eq!(backend.subscriber_count(), 1);

    driver.abort();
}

#[tokio::test]
async fn closed_channel_ends_the_active_session() {
    let backend = MemoryBackend::new();
    let user = backend.register("ash@example.com", "pikachu");
    let sync = FavoritesSync::new(backend.clone(), catalog());

    let session = Session {
        user: user.clone(),
        access_token: "token".to_string(),
        refresh_token: None,
        expires_at: None,
    };
    let (tx, rx) = watch::channel(Some(session));
    let driver = tokio::spawn(drive_sessions(sync.clone(), rx));

    wait_until(|| backend.subscriber_count() == 1).await;
    drop(tx);
    driver.await.unwrap();

    assert!(sync.user_id().is_none());
    assert_eq!(backend.subscriber_count(), 0);
}
