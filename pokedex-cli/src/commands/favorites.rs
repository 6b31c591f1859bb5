use std::sync::Arc;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;
use tokio::sync::mpsc;

use pokedex_catalog::Catalog;
use pokedex_favorites::{
    AuthProvider, FavoritesError, FavoritesSync, SupabaseClient, SyncEvent, Toggled,
    drive_sessions,
};

use crate::CliError;
use crate::cli_types::FavoritesAction;
use crate::render;

pub(crate) fn run_favorites(
    catalog: Catalog,
    action: &FavoritesAction,
    quiet: bool,
) -> Result<(), CliError> {
    let client = super::open_client()?;
    let catalog = Arc::new(catalog);
    let rt = super::runtime()?;

    if let FavoritesAction::Watch = action {
        return rt.block_on(watch(client, catalog));
    }

    let user_id = client
        .current_session()
        .map(|s| s.user.id)
        .ok_or(FavoritesError::NotAuthenticated)?;

    rt.block_on(async {
        let sync = FavoritesSync::new(client, catalog.clone());
        let pb = super::spinner(quiet, "Loading favorites...");
        let mut session = sync.begin_session(&user_id).await;
        pb.finish_and_clear();

        // Removing does not depend on the local list; everything else does.
        if let Some(e) = session.take_load_error()
            && !matches!(action, FavoritesAction::Remove { .. })
        {
            return Err(CliError::other(format!("Error fetching favorites: {}", e)));
        }

        let result = match action {
            FavoritesAction::List => {
                print_favorites(&sync.favorites());
                Ok(())
            }
            FavoritesAction::Add { number } => {
                let creature = catalog.find(*number).ok_or(CliError::UnknownNumber(*number))?;
                sync.add(creature).await.map(|()| {
                    log::info!(
                        "{} Favorite added successfully",
                        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
                    );
                })
            }
            FavoritesAction::Remove { number } => {
                let creature = catalog.find(*number).ok_or(CliError::UnknownNumber(*number))?;
                sync.remove(creature).await.map(|()| {
                    log::info!(
                        "{} Favorite removed successfully",
                        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
                    );
                })
            }
            FavoritesAction::Toggle { number } => {
                let creature = catalog.find(*number).ok_or(CliError::UnknownNumber(*number))?;
                sync.toggle(creature).await.map(|toggled| {
                    let msg = match toggled {
                        Toggled::Added => "Favorite added successfully",
                        Toggled::Removed => "Favorite removed successfully",
                    };
                    log::info!(
                        "{} {}",
                        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
                        msg
                    );
                })
            }
            FavoritesAction::Watch => Ok(()),
        };

        session.close();
        match result {
            // Rejected locally; nothing was sent, so report it as a notice.
            Err(e) if e.is_precondition() => {
                log::warn!("{}", e);
                Ok(())
            }
            other => other.map_err(CliError::from),
        }
    })
}

fn print_favorites(favorites: &[pokedex_catalog::Creature]) {
    let mut lines = render::favorites_table(favorites).into_iter();
    if let Some(header) = lines.next() {
        if favorites.is_empty() {
            log::info!("{}", header.if_supports_color(Stdout, |t| t.dimmed()));
        } else {
            log::info!("{}", header.if_supports_color(Stdout, |t| t.bold()));
        }
    }
    for line in lines {
        log::info!("{}", line);
    }
}

/// Follow the signed-in user's favorites until Ctrl-C.
async fn watch(client: SupabaseClient, catalog: Arc<Catalog>) -> Result<(), CliError> {
    if client.current_session().is_none() {
        return Err(FavoritesError::NotAuthenticated.into());
    }

    let (tx, mut rx) = mpsc::unbounded_channel();
    let sync = FavoritesSync::with_events(client.clone(), catalog, tx);
    let driver = tokio::spawn(drive_sessions(sync, client.session_changes()));

    log::info!(
        "Watching favorites every {}s (Ctrl-C to stop)",
        client.config().poll_interval_secs
    );

    loop {
        tokio::select! {
            event = rx.recv() => match event {
                Some(SyncEvent::Updated(records)) => {
                    crate::log_blank();
                    log::info!(
                        "{}",
                        chrono::Local::now()
                            .format("%H:%M:%S")
                            .if_supports_color(Stdout, |t| t.dimmed())
                    );
                    print_favorites(&records);
                }
                Some(SyncEvent::FetchFailed(msg)) => {
                    log::warn!("Error fetching favorites: {}", msg);
                }
                Some(SyncEvent::Cleared) | None => break,
            },
            signal = tokio::signal::ctrl_c() => {
                if let Err(e) = signal {
                    log::warn!("Could not listen for Ctrl-C: {}", e);
                }
                break;
            }
        }
    }

    // Dropping the driver drops its session handle, which stops polling.
    driver.abort();
    if let Err(e) = driver.await
        && !e.is_cancelled()
    {
        log::debug!("Favorites driver ended abnormally: {}", e);
    }
    Ok(())
}
