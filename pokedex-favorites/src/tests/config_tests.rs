use super::*;

use std::collections::HashMap;

use tempfile::TempDir;

use crate::types::User;

fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |var| map.get(var).cloned()
}

fn file_section(url: &str, key: &str) -> Option<BackendSection> {
    Some(BackendSection {
        url: Some(url.to_string()),
        anon_key: Some(key.to_string()),
        poll_interval_secs: None,
    })
}

#[test]
fn env_overrides_config_file() {
    let config = BackendConfig::resolve(
        env_of(&[(ENV_URL, "https://env.example.co/")]),
        file_section("https://file.example.co", "file-key"),
    )
    .unwrap();
    assert_eq!(config.url, "https://env.example.co");
    assert_eq!(config.anon_key, "file-key");
    assert_eq!(config.poll_interval_secs, DEFAULT_POLL_INTERVAL_SECS);
}

#[test]
fn missing_url_is_a_config_error() {
    let err = BackendConfig::resolve(env_of(&[(ENV_KEY, "k")]), None).unwrap_err();
    assert!(matches!(err, FavoritesError::Config(msg) if msg.contains(ENV_URL)));
}

#[test]
fn blank_key_counts_as_missing() {
    let err = BackendConfig::resolve(env_of(&[(ENV_URL, "https://x.co"), (ENV_KEY, "  ")]), None)
        .unwrap_err();
    assert!(matches!(err, FavoritesError::Config(_)));
}

#[test]
fn poll_interval_from_env_and_file() {
    let mut section = file_section("https://x.co", "k");
    if let Some(s) = section.as_mut() {
        s.poll_interval_secs = Some(12);
    }
    let from_file = BackendConfig::resolve(env_of(&[]), section.clone()).unwrap();
    assert_eq!(from_file.poll_interval(), Duration::from_secs(12));

    let from_env = BackendConfig::resolve(env_of(&[(ENV_POLL, "0")]), section.clone()).unwrap();
    assert_eq!(from_env.poll_interval_secs, 1);

    assert!(BackendConfig::resolve(env_of(&[(ENV_POLL, "soon")]), section).is_err());
}

#[test]
fn sources_report_provenance() {
    let sources = sources_from(
        env_of(&[(ENV_KEY, "k")]),
        file_section("https://file.example.co", "file-key"),
    );
    assert_eq!(sources.url, ConfigSource::ConfigFile);
    assert_eq!(sources.anon_key, ConfigSource::EnvVar(ENV_KEY));
    assert_eq!(sources.poll_interval, ConfigSource::Default);

    let empty = sources_from(env_of(&[]), None);
    assert_eq!(empty.url, ConfigSource::Missing);
    assert_eq!(empty.url.to_string(), "not set");
}

#[test]
fn saving_backend_preserves_other_tables() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("pokedex").join("config.toml");
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, "[catalog]\ndata_dir = \"/srv/pokedex\"\n").unwrap();

    let mut config = BackendConfig::new("https://abc.supabase.co", "anon");
    config.poll_interval_secs = 9;
    write_backend_section(&path, &config).unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    let doc: toml::Value = content.parse().unwrap();
    assert_eq!(
        doc.get("catalog").and_then(|c| c.get("data_dir")).and_then(|v| v.as_str()),
        Some("/srv/pokedex")
    );

    let section = load_backend_section(&path).unwrap();
    assert_eq!(section.url.as_deref(), Some("https://abc.supabase.co"));
    assert_eq!(section.anon_key.as_deref(), Some("anon"));
    assert_eq!(section.poll_interval_secs, Some(9));
}

#[test]
fn session_file_lifecycle() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("session.json");
    let session = Session {
        user: User {
            id: "8d0f".to_string(),
            email: Some("ash@example.com".to_string()),
        },
        access_token: "token".to_string(),
        refresh_token: Some("refresh".to_string()),
        expires_at: None,
    };

    write_session(&path, &session).unwrap();
    assert_eq!(read_session(&path), Some(session));

    assert!(remove_session(&path).unwrap());
    assert!(!remove_session(&path).unwrap());
    assert_eq!(read_session(&path), None);
}

#[test]
fn corrupt_session_file_is_ignored() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("session.json");
    std::fs::write(&path, "{ not json").unwrap();
    assert_eq!(read_session(&path), None);
}

#[test]
fn invalid_config_file_is_not_overwritten() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("config.toml");
    let broken = "[catalog]\ndata_dir = \"/data\"\n[backend\nurl = \"x\"\n";
    std::fs::write(&path, broken).unwrap();

    let config = BackendConfig::new("https://a.supabase.co", "k");
    let err = write_backend_section(&path, &config).unwrap_err();

    assert!(matches!(err, FavoritesError::Config(msg) if msg.contains("not valid TOML")));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), broken);
}

#[test]
fn missing_config_file_starts_empty() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("pokedex").join("config.toml");

    write_backend_section(&path, &BackendConfig::new("https://a.supabase.co", "k")).unwrap();
    let section = load_backend_section(&path).unwrap();
    assert_eq!(section.url.as_deref(), Some("https://a.supabase.co"));
}

#[test]
fn values_resolve_per_field() {
    let section = Some(BackendSection {
        url: Some("https://file.example.co/".to_string()),
        anon_key: None,
        poll_interval_secs: Some(7),
    });
    let values = values_from(env_of(&[]), section.clone());
    assert_eq!(values.url.as_deref(), Some("https://file.example.co"));
    assert_eq!(values.anon_key, None);
    assert_eq!(values.poll_interval_secs, Some(7));

    // The full load fails, but the url is still known.
    assert!(BackendConfig::resolve(env_of(&[]), section.clone()).is_err());

    let values = values_from(env_of(&[(ENV_KEY, "k"), (ENV_POLL, "soon")]), section);
    assert_eq!(values.anon_key.as_deref(), Some("k"));
    assert_eq!(values.poll_interval_secs, None);
}
