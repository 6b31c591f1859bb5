pub(crate) mod account;
pub(crate) mod browse;
pub(crate) mod config;
pub(crate) mod favorites;

use indicatif::{ProgressBar, ProgressStyle};
use pokedex_favorites::{BackendConfig, Session, SupabaseClient};

use crate::CliError;

pub(crate) fn runtime() -> Result<tokio::runtime::Runtime, CliError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| CliError::runtime(format!("Failed to create tokio runtime: {}", e)))
}

/// Spinner for a network wait; hidden in quiet mode.
pub(crate) fn spinner(quiet: bool, msg: &'static str) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("  {spinner:.cyan} {msg}") {
        pb.set_style(style.tick_chars("/-\\|"));
    }
    pb.set_message(msg);
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

/// Backend client with the saved session restored, if still valid.
pub(crate) fn open_client() -> Result<SupabaseClient, CliError> {
    let config = BackendConfig::load()?;
    let session = saved_session();
    Ok(SupabaseClient::new(config)?.with_session(session))
}

fn saved_session() -> Option<Session> {
    let session = pokedex_favorites::load_saved_session()?;
    if session.is_expired(chrono::Utc::now()) {
        log::warn!("Saved session has expired, please log in again.");
        return None;
    }
    Some(session)
}

fn mask_value(s: &str) -> String {
    let mut chars = s.chars();
    match (chars.next(), chars.next(), chars.next()) {
        (Some(a), Some(b), Some(_)) => format!("{}{}****", a, b),
        _ => "****".to_string(),
    }
}
