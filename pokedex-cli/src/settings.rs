//! `[catalog]` settings owned by the CLI, stored next to the backend settings
//! in `config.toml`.

use std::path::{Path, PathBuf};

use pokedex_catalog::Catalog;

use crate::CliError;

/// Where the catalog is loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DataSource {
    /// `--data-dir` on the command line.
    Flag(PathBuf),
    /// `[catalog] data_dir` in the config file.
    ConfigFile(PathBuf),
    /// Dataset compiled into the binary.
    Bundled,
}

impl std::fmt::Display for DataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Flag(p) => write!(f, "{} (--data-dir)", p.display()),
            Self::ConfigFile(p) => write!(f, "{} (config file)", p.display()),
            Self::Bundled => write!(f, "bundled dataset"),
        }
    }
}

/// Priority: `--data-dir` > `[catalog] data_dir` > bundled.
pub(crate) fn resolve_data_source(flag: Option<&Path>) -> DataSource {
    resolve_from(flag, pokedex_favorites::config_path().as_deref())
}

fn resolve_from(flag: Option<&Path>, config_file: Option<&Path>) -> DataSource {
    if let Some(dir) = flag {
        return DataSource::Flag(dir.to_path_buf());
    }
    match config_file.and_then(read_data_dir) {
        Some(dir) => DataSource::ConfigFile(dir),
        None => DataSource::Bundled,
    }
}

pub(crate) fn load_catalog(flag: Option<&Path>) -> Result<Catalog, CliError> {
    let source = resolve_data_source(flag);
    log::debug!("Loading catalog from {}", source);
    let catalog = match source {
        DataSource::Flag(dir) | DataSource::ConfigFile(dir) => {
            pokedex_catalog::load_catalog(&dir)?
        }
        DataSource::Bundled => Catalog::bundled()?,
    };
    if catalog.is_empty() {
        log::warn!("The dataset contains no Pokémon");
    } else {
        log::debug!("Loaded {} Pokémon", catalog.len());
    }
    Ok(catalog)
}

fn read_data_dir(path: &Path) -> Option<PathBuf> {
    let contents = std::fs::read_to_string(path).ok()?;
    let doc: toml::Table = contents.parse().ok()?;
    let dir = doc.get("catalog")?.get("data_dir")?.as_str()?;
    if dir.trim().is_empty() {
        None
    } else {
        Some(PathBuf::from(dir))
    }
}

/// Set or clear `[catalog] data_dir`. Other tables are preserved.
pub(crate) fn save_data_dir(dir: Option<&Path>) -> Result<PathBuf, CliError> {
    let path = pokedex_favorites::config_path()
        .ok_or_else(|| CliError::config("Could not determine config directory"))?;
    write_data_dir(&path, dir)?;
    Ok(path)
}

fn write_data_dir(path: &Path, dir: Option<&Path>) -> Result<(), CliError> {
    let mut doc: toml::Table = match std::fs::read_to_string(path) {
        Ok(contents) => contents
            .parse()
            .map_err(|e| CliError::config(format!("config.toml is not valid TOML: {}", e)))?,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => toml::Table::new(),
        Err(e) => return Err(e.into()),
    };

    let catalog = doc
        .entry("catalog")
        .or_insert_with(|| toml::Value::Table(toml::Table::new()));
    let table = catalog
        .as_table_mut()
        .ok_or_else(|| CliError::config("[catalog] in config.toml is not a table"))?;

    match dir {
        Some(dir) => {
            let dir = dir
                .to_str()
                .ok_or_else(|| CliError::config("Data directory path is not valid UTF-8"))?;
            table.insert("data_dir".to_string(), toml::Value::String(dir.to_string()));
        }
        None => {
            table.remove("data_dir");
        }
    }
    if table.is_empty() {
        doc.remove("catalog");
    }

    let serialized = toml::to_string_pretty(&doc)
        .map_err(|e| CliError::config(format!("Failed to serialize config: {}", e)))?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, serialized)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_wins_over_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("config.toml");
        std::fs::write(&config, "[catalog]\ndata_dir = \"/from/config\"\n").unwrap();

        let flag = Path::new("/from/flag");
        assert_eq!(
            resolve_from(Some(flag), Some(&config)),
            DataSource::Flag(flag.to_path_buf())
        );
        assert_eq!(
            resolve_from(None, Some(&config)),
            DataSource::ConfigFile(PathBuf::from("/from/config"))
        );
    }

    #[test]
    fn falls_back_to_bundled() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("config.toml");
        assert_eq!(resolve_from(None, Some(&config)), DataSource::Bundled);
        assert_eq!(resolve_from(None, None), DataSource::Bundled);

        std::fs::write(&config, "[catalog]\ndata_dir = \"  \"\n").unwrap();
        assert_eq!(resolve_from(None, Some(&config)), DataSource::Bundled);
    }

    #[test]
    fn writing_data_dir_keeps_backend_table() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("config.toml");
        std::fs::write(
            &config,
            "[backend]\nurl = \"https://example.supabase.co\"\nanon_key = \"key\"\n",
        )
        .unwrap();

        write_data_dir(&config, Some(Path::new("/data/pokedex"))).unwrap();
        let doc: toml::Table = std::fs::read_to_string(&config).unwrap().parse().unwrap();
        assert_eq!(doc["backend"]["anon_key"].as_str(), Some("key"));
        assert_eq!(doc["catalog"]["data_dir"].as_str(), Some("/data/pokedex"));

        write_data_dir(&config, None).unwrap();
        let doc: toml::Table = std::fs::read_to_string(&config).unwrap().parse().unwrap();
        assert!(doc.get("catalog").is_none());
        assert_eq!(
            doc["backend"]["url"].as_str(),
            Some("https://example.supabase.co")
        );
    }

    #[test]
    fn invalid_config_is_left_alone() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("config.toml");
        let broken = "[backend]\nurl = \"https://example.supabase.co\"\n[catalog\n";
        std::fs::write(&config, broken).unwrap();

        let err = write_data_dir(&config, Some(Path::new("/data/pokedex"))).unwrap_err();
        assert!(matches!(err, CliError::Config(msg) if msg.contains("not valid TOML")));
        assert_eq!(std::fs::read_to_string(&config).unwrap(), broken);
    }

    #[test]
    fn missing_config_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("pokedex").join("config.toml");

        write_data_dir(&config, Some(Path::new("/data/pokedex"))).unwrap();
        assert_eq!(
            resolve_from(None, Some(&config)),
            DataSource::ConfigFile(PathBuf::from("/data/pokedex"))
        );
    }
}
