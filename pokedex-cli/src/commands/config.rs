use std::io::Write;
use std::path::Path;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use pokedex_favorites::{BackendConfig, ConfigSource};

use crate::CliError;

/// Show the backend configuration and where each value comes from.
pub(crate) fn run_config_show(data_dir: Option<&Path>) -> Result<(), CliError> {
    let path = pokedex_favorites::config_path();
    let sources = pokedex_favorites::config_sources();

    log::info!(
        "{}",
        "Pokédex Configuration".if_supports_color(Stdout, |t| t.bold()),
    );
    crate::log_blank();

    match &path {
        Some(p) if p.exists() => {
            log::info!(
                "  Config file: {} {}",
                p.display().if_supports_color(Stdout, |t| t.cyan()),
                "(exists)".if_supports_color(Stdout, |t| t.green()),
            );
        }
        Some(p) => {
            log::info!(
                "  Config file: {} {}",
                p.display().if_supports_color(Stdout, |t| t.cyan()),
                "(not found)".if_supports_color(Stdout, |t| t.dimmed()),
            );
        }
        None => {
            log::info!(
                "  Config file: {}",
                "could not determine path".if_supports_color(Stdout, |t| t.red()),
            );
        }
    }
    crate::log_blank();

    let values = pokedex_favorites::config_values();
    let poll_interval = values
        .poll_interval_secs
        .unwrap_or(pokedex_favorites::config::DEFAULT_POLL_INTERVAL_SECS);

    let fields: [(&str, &ConfigSource, Option<String>); 3] = [
        ("url", &sources.url, values.url.clone()),
        (
            "anon_key",
            &sources.anon_key,
            values.anon_key.as_deref().map(super::mask_value),
        ),
        (
            "poll_interval_secs",
            &sources.poll_interval,
            Some(poll_interval.to_string()),
        ),
    ];

    for (name, source, value) in &fields {
        let source_str = format!("({})", source);
        match value {
            Some(v) => {
                log::info!(
                    "  {} {} {}",
                    format!("{}:", name).if_supports_color(Stdout, |t| t.cyan()),
                    v,
                    source_str.if_supports_color(Stdout, |t| t.dimmed()),
                );
            }
            None => {
                log::info!(
                    "  {} {} {}",
                    format!("{}:", name).if_supports_color(Stdout, |t| t.cyan()),
                    "not set".if_supports_color(Stdout, |t| t.yellow()),
                    source_str.if_supports_color(Stdout, |t| t.dimmed()),
                );
            }
        }
    }

    crate::log_blank();
    log::info!(
        "  {} {}",
        "Dataset:".if_supports_color(Stdout, |t| t.cyan()),
        crate::settings::resolve_data_source(data_dir),
    );
    let signed_in = pokedex_favorites::load_saved_session()
        .and_then(|s| s.user.email)
        .map(|email| format!("signed in as {}", email))
        .unwrap_or_else(|| "signed out".to_string());
    log::info!(
        "  {} {}",
        "Session:".if_supports_color(Stdout, |t| t.cyan()),
        signed_in,
    );

    Ok(())
}

/// Interactively set up the backend connection.
pub(crate) fn run_config_setup() -> Result<(), CliError> {
    println!(
        "{}",
        "Pokédex Backend Setup".if_supports_color(Stdout, |t| t.bold()),
    );
    println!();

    let existing = pokedex_favorites::config_values();

    let read_line = |prompt: &str, default: Option<&str>| -> Result<String, CliError> {
        loop {
            if let Some(def) = default {
                print!("  {} [{}]: ", prompt, def);
            } else {
                print!("  {}: ", prompt);
            }
            std::io::stdout().flush()?;

            let mut input = String::new();
            if std::io::stdin().read_line(&mut input)? == 0 {
                return Err(CliError::config("Setup aborted"));
            }
            let trimmed = input.trim();

            if !trimmed.is_empty() {
                return Ok(trimmed.to_string());
            }
            if let Some(def) = default {
                return Ok(def.to_string());
            }
            println!(
                "    {}",
                "This field is required.".if_supports_color(Stdout, |t| t.yellow()),
            );
        }
    };

    let url = read_line("Project URL", existing.url.as_deref())?;
    let anon_key = read_line("Anon key", existing.anon_key.as_deref())?;
    let default_poll = existing
        .poll_interval_secs
        .unwrap_or(pokedex_favorites::config::DEFAULT_POLL_INTERVAL_SECS)
        .to_string();
    let poll = read_line("Poll interval (seconds)", Some(&default_poll))?;
    let poll_interval_secs: u64 = poll
        .parse()
        .map_err(|_| CliError::config(format!("Not a number of seconds: '{}'", poll)))?;

    let mut config = BackendConfig::new(url, anon_key);
    config.poll_interval_secs = poll_interval_secs.max(1);

    let path = pokedex_favorites::save_to_file(&config)
        .map_err(|e| CliError::config(format!("Failed to save config: {}", e)))?;

    println!();
    log::info!(
        "{} Configuration saved to {}",
        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        path.display().if_supports_color(Stdout, |t| t.cyan()),
    );

    Ok(())
}

/// Print the config file path.
pub(crate) fn run_config_path() -> Result<(), CliError> {
    match pokedex_favorites::config_path() {
        Some(path) => log::info!("{}", path.display()),
        None => {
            return Err(CliError::config("Could not determine config directory"));
        }
    }

    Ok(())
}

/// Set or clear the default dataset directory.
pub(crate) fn run_config_data_dir(dir: Option<&Path>) -> Result<(), CliError> {
    if let Some(dir) = dir {
        // Refuse a directory that would not load.
        pokedex_catalog::load_catalog(dir)?;
    }
    let path = crate::settings::save_data_dir(dir)?;
    match dir {
        Some(dir) => log::info!(
            "{} Dataset directory set to {} in {}",
            "\u{2714}".if_supports_color(Stdout, |t| t.green()),
            dir.display().if_supports_color(Stdout, |t| t.cyan()),
            path.display(),
        ),
        None => log::info!(
            "{} Using the bundled dataset",
            "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        ),
    }
    Ok(())
}
