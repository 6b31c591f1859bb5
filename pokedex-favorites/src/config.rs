//! Backend configuration and the persisted session.
//!
//! Both live under `~/.config/pokedex/`: `config.toml` holds the backend
//! location (and a `[catalog]` table owned by the CLI), `session.json` holds
//! the signed-in session between CLI invocations.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::FavoritesError;
use crate::types::Session;

pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;

const ENV_URL: &str = "POKEDEX_BACKEND_URL";
const ENV_KEY: &str = "POKEDEX_BACKEND_KEY";
const ENV_POLL: &str = "POKEDEX_POLL_INTERVAL";

/// Where the hosted backend lives and how to reach it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    /// Project base URL, without trailing slash.
    pub url: String,
    /// Public (anon) API key sent with every request.
    pub anon_key: String,
    /// Interval between change-detection polls.
    pub poll_interval_secs: u64,
}

/// Where a config field's value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Loaded from an environment variable.
    EnvVar(&'static str),
    /// Loaded from the config file.
    ConfigFile,
    /// Hard-coded default value.
    Default,
    /// Not set anywhere.
    Missing,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EnvVar(var) => write!(f, "env ${}", var),
            Self::ConfigFile => write!(f, "config file"),
            Self::Default => write!(f, "default"),
            Self::Missing => write!(f, "not set"),
        }
    }
}

/// Provenance of each config field.
#[derive(Debug)]
pub struct ConfigSources {
    pub url: ConfigSource,
    pub anon_key: ConfigSource,
    pub poll_interval: ConfigSource,
}

/// `[backend]` table of the config file.
#[derive(Debug, Default, Clone, serde::Deserialize, serde::Serialize)]
struct BackendSection {
    url: Option<String>,
    anon_key: Option<String>,
    poll_interval_secs: Option<u64>,
}

#[derive(Debug, Default, serde::Deserialize)]
struct ConfigFile {
    backend: Option<BackendSection>,
}

impl BackendConfig {
    pub fn new(url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            url: url.into().trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
        }
    }

    /// Load from environment variables and the config file.
    ///
    /// Priority: env vars > config file. `url` and `anon_key` are required.
    pub fn load() -> Result<Self, FavoritesError> {
        Self::resolve(|var| std::env::var(var).ok(), load_config_file())
    }

    fn resolve(
        env: impl Fn(&str) -> Option<String>,
        file: Option<BackendSection>,
    ) -> Result<Self, FavoritesError> {
        let url = env(ENV_URL)
            .or_else(|| file.as_ref().and_then(|f| f.url.clone()))
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| {
                FavoritesError::Config(format!(
                    "Missing backend url. Set {ENV_URL} or run 'pokedex config setup'"
                ))
            })?;

        let anon_key = env(ENV_KEY)
            .or_else(|| file.as_ref().and_then(|f| f.anon_key.clone()))
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| {
                FavoritesError::Config(format!(
                    "Missing backend anon key. Set {ENV_KEY} or run 'pokedex config setup'"
                ))
            })?;

        let poll_interval_secs = match env(ENV_POLL) {
            Some(v) => v.trim().parse().map_err(|_| {
                FavoritesError::Config(format!("{ENV_POLL} must be a number of seconds, got '{v}'"))
            })?,
            None => file
                .as_ref()
                .and_then(|f| f.poll_interval_secs)
                .unwrap_or(DEFAULT_POLL_INTERVAL_SECS),
        };

        let mut config = Self::new(url, anon_key);
        config.poll_interval_secs = poll_interval_secs.max(1);
        Ok(config)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

/// Path to the config file: `~/.config/pokedex/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("pokedex").join("config.toml"))
}

/// Path to the persisted session: `~/.config/pokedex/session.json`.
pub fn session_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("pokedex").join("session.json"))
}

/// Save the backend settings into the `[backend]` table of the config file.
///
/// Other tables are preserved. Returns the path written to.
pub fn save_to_file(config: &BackendConfig) -> Result<PathBuf, FavoritesError> {
    let path = config_path()
        .ok_or_else(|| FavoritesError::Config("Could not determine config directory".to_string()))?;
    write_backend_section(&path, config)?;
    Ok(path)
}

fn write_backend_section(path: &Path, config: &BackendConfig) -> Result<(), FavoritesError> {
    let mut doc: toml::Value = match std::fs::read_to_string(path) {
        Ok(contents) => contents.parse().map_err(|e| {
            FavoritesError::Config(format!("config.toml is not valid TOML: {}", e))
        })?,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            toml::Value::Table(Default::default())
        }
        Err(e) => return Err(e.into()),
    };

    let section = BackendSection {
        url: Some(config.url.clone()),
        anon_key: Some(config.anon_key.clone()),
        poll_interval_secs: if config.poll_interval_secs == DEFAULT_POLL_INTERVAL_SECS {
            None
        } else {
            Some(config.poll_interval_secs)
        },
    };
    let section = toml::Value::try_from(section)
        .map_err(|e| FavoritesError::Config(format!("Failed to serialize config: {}", e)))?;

    let table = doc
        .as_table_mut()
        .ok_or_else(|| FavoritesError::Config("config.toml root is not a table".to_string()))?;
    table.insert("backend".to_string(), section);

    let serialized = toml::to_string_pretty(&doc)
        .map_err(|e| FavoritesError::Config(format!("Failed to serialize config: {}", e)))?;
    write_atomic(path, &serialized)
}

/// Each field resolved on its own, so one missing value does not hide the
/// others. Unparseable numbers count as unset.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigValues {
    pub url: Option<String>,
    pub anon_key: Option<String>,
    pub poll_interval_secs: Option<u64>,
}

/// Current value of each config field, env vars first.
pub fn config_values() -> ConfigValues {
    values_from(|var| std::env::var(var).ok(), load_config_file())
}

fn values_from(env: impl Fn(&str) -> Option<String>, file: Option<BackendSection>) -> ConfigValues {
    let non_blank = |v: String| (!v.trim().is_empty()).then_some(v);
    ConfigValues {
        url: env(ENV_URL)
            .or_else(|| file.as_ref().and_then(|f| f.url.clone()))
            .and_then(non_blank)
            .map(|u| u.trim_end_matches('/').to_string()),
        anon_key: env(ENV_KEY)
            .or_else(|| file.as_ref().and_then(|f| f.anon_key.clone()))
            .and_then(non_blank),
        poll_interval_secs: match env(ENV_POLL) {
            Some(v) => v.trim().parse().ok(),
            None => file.as_ref().and_then(|f| f.poll_interval_secs),
        },
    }
}

/// Determine where each config field is coming from.
pub fn config_sources() -> ConfigSources {
    sources_from(|var| std::env::var(var).ok(), load_config_file())
}

fn sources_from(
    env: impl Fn(&str) -> Option<String>,
    file: Option<BackendSection>,
) -> ConfigSources {
    let pick = |var: &'static str, in_file: bool, fallback: ConfigSource| {
        if env(var).is_some() {
            ConfigSource::EnvVar(var)
        } else if in_file {
            ConfigSource::ConfigFile
        } else {
            fallback
        }
    };

    ConfigSources {
        url: pick(
            ENV_URL,
            file.as_ref().is_some_and(|f| f.url.is_some()),
            ConfigSource::Missing,
        ),
        anon_key: pick(
            ENV_KEY,
            file.as_ref().is_some_and(|f| f.anon_key.is_some()),
            ConfigSource::Missing,
        ),
        poll_interval: pick(
            ENV_POLL,
            file.as_ref().is_some_and(|f| f.poll_interval_secs.is_some()),
            ConfigSource::Default,
        ),
    }
}

fn load_config_file() -> Option<BackendSection> {
    let path = config_path()?;
    load_backend_section(&path)
}

fn load_backend_section(path: &Path) -> Option<BackendSection> {
    let content = std::fs::read_to_string(path).ok()?;
    let config: ConfigFile = toml::from_str(&content).ok()?;
    config.backend
}

// ── Session persistence ─────────────────────────────────────────────────────

/// Persist the signed-in session. Returns the path written to.
pub fn save_session(session: &Session) -> Result<PathBuf, FavoritesError> {
    let path = session_path()
        .ok_or_else(|| FavoritesError::Config("Could not determine config directory".to_string()))?;
    write_session(&path, session)?;
    Ok(path)
}

/// The persisted session, if one exists and parses.
pub fn load_saved_session() -> Option<Session> {
    read_session(&session_path()?)
}

/// Delete the persisted session. Returns whether a file was removed.
pub fn clear_saved_session() -> Result<bool, FavoritesError> {
    match session_path() {
        Some(path) => remove_session(&path),
        None => Ok(false),
    }
}

fn write_session(path: &Path, session: &Session) -> Result<(), FavoritesError> {
    let json = serde_json::to_string_pretty(session)?;
    write_atomic(path, &json)
}

fn read_session(path: &Path) -> Option<Session> {
    let content = std::fs::read_to_string(path).ok()?;
    match serde_json::from_str(&content) {
        Ok(session) => Some(session),
        Err(e) => {
            log::warn!("Ignoring unreadable session file {}: {}", path.display(), e);
            None
        }
    }
}

fn remove_session(path: &Path) -> Result<bool, FavoritesError> {
    if !path.exists() {
        return Ok(false);
    }
    std::fs::remove_file(path)?;
    Ok(true)
}

fn write_atomic(path: &Path, contents: &str) -> Result<(), FavoritesError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, contents)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
