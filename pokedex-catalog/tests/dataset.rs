use pokedex_catalog::{Catalog, DatasetError, load_catalog, load_creatures, load_regions};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write_json(dir: &Path, name: &str, content: &str) {
    fs::write(dir.join(name), content).unwrap();
}

#[test]
fn load_catalog_from_directory() {
    let tmp = TempDir::new().unwrap();
    write_json(
        tmp.path(),
        "pokemon.json",
        r#"[
  {"name": "Bulbasaur", "number": 1, "type": ["grass", "poison"], "region": "kanto"},
  {"name": "Chikorita", "number": 152, "type": ["grass"], "region": "johto",
   "image": "https://assets.pokemon.com/152.png"}
]"#,
    );
    write_json(
        tmp.path(),
        "types.json",
        r#"[{"name": "grass", "image": "https://example.com/grass.svg"}, {"name": "poison"}]"#,
    );
    write_json(tmp.path(), "regions.json", r#"[{"name": "kanto"}, {"name": "johto"}]"#);

    let catalog = load_catalog(tmp.path()).unwrap();
    assert_eq!(catalog.len(), 2);
    assert_eq!(catalog.creatures[0].types, vec!["grass", "poison"]);
    assert_eq!(
        catalog.creatures[1].image.as_deref(),
        Some("https://assets.pokemon.com/152.png")
    );
    assert_eq!(catalog.types.len(), 2);
    assert_eq!(catalog.types[0].image.as_deref(), Some("https://example.com/grass.svg"));
    assert!(catalog.types[1].image.is_none());
    assert_eq!(catalog.regions[1].name, "johto");
}

#[test]
fn missing_option_files_yield_empty_lists() {
    let tmp = TempDir::new().unwrap();
    write_json(
        tmp.path(),
        "pokemon.json",
        r#"[{"name": "Pikachu", "number": 25, "type": ["electric"], "region": "kanto"}]"#,
    );

    let catalog = load_catalog(tmp.path()).unwrap();
    assert_eq!(catalog.len(), 1);
    assert!(catalog.types.is_empty());
    assert!(catalog.regions.is_empty());
}

#[test]
fn missing_creature_file_is_an_error() {
    let tmp = TempDir::new().unwrap();
    let err = load_catalog(tmp.path()).unwrap_err();
    assert!(matches!(err, DatasetError::Io { .. }));
}

#[test]
fn missing_directory_is_an_error() {
    let tmp = TempDir::new().unwrap();
    let err = load_catalog(&tmp.path().join("nope")).unwrap_err();
    assert!(matches!(err, DatasetError::DirNotFound(_)));
}

#[test]
fn malformed_json_reports_path() {
    let tmp = TempDir::new().unwrap();
    write_json(tmp.path(), "pokemon.json", "[{\"name\": ");
    let err = load_creatures(&tmp.path().join("pokemon.json")).unwrap_err();
    match err {
        DatasetError::Parse { path, .. } => assert!(path.ends_with("pokemon.json")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn duplicate_numbers_are_rejected() {
    let tmp = TempDir::new().unwrap();
    write_json(
        tmp.path(),
        "pokemon.json",
        r#"[
  {"name": "Pikachu", "number": 25, "type": ["electric"], "region": "kanto"},
  {"name": "Pikachu Copy", "number": 25, "type": ["electric"], "region": "kanto"}
]"#,
    );
    let err = load_catalog(tmp.path()).unwrap_err();
    assert!(matches!(err, DatasetError::DuplicateNumber(25)));
}

#[test]
fn load_regions_from_missing_file_is_empty() {
    let tmp = TempDir::new().unwrap();
    assert!(load_regions(&tmp.path().join("regions.json")).unwrap().is_empty());
}

#[test]
fn bundled_dataset_parses() {
    let catalog = Catalog::bundled().unwrap();
    assert!(catalog.len() >= 25);
    assert_eq!(catalog.types.len(), 18);
    assert!(catalog.regions.iter().any(|r| r.name == "kanto"));
    assert_eq!(catalog.find(25).map(|c| c.name.as_str()), Some("Pikachu"));
}

#[test]
fn resolve_keeps_catalog_order_and_skips_unknown() {
    let catalog = Catalog::bundled().unwrap();
    let resolved = catalog.resolve(&[25, 4, 99_999, 1]);
    let numbers: Vec<u32> = resolved.iter().map(|c| c.number).collect();
    assert_eq!(numbers, vec![1, 4, 25]);
}
