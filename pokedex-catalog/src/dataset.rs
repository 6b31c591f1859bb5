//! JSON loading for the static creature dataset.
//!
//! The dataset is three files in one directory: `pokemon.json`,
//! `types.json` and `regions.json`. A copy is compiled into the crate and
//! exposed through [`Catalog::bundled`].

use std::collections::HashSet;
use std::path::Path;

use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::types::{Creature, RegionTag, TypeTag};

const CREATURES_FILE: &str = "pokemon.json";
const TYPES_FILE: &str = "types.json";
const REGIONS_FILE: &str = "regions.json";

const BUNDLED_CREATURES: &str = include_str!("../data/pokemon.json");
const BUNDLED_TYPES: &str = include_str!("../data/types.json");
const BUNDLED_REGIONS: &str = include_str!("../data/regions.json");

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("JSON parse error in {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
    #[error("Directory not found: {0}")]
    DirNotFound(String),
    #[error("Duplicate creature number {0}")]
    DuplicateNumber(u32),
}

/// The in-memory catalog: every creature plus the filter option lists.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub creatures: Vec<Creature>,
    pub types: Vec<TypeTag>,
    pub regions: Vec<RegionTag>,
}

impl Catalog {
    /// Build a catalog, rejecting duplicate creature numbers.
    pub fn new(
        creatures: Vec<Creature>,
        types: Vec<TypeTag>,
        regions: Vec<RegionTag>,
    ) -> Result<Self, DatasetError> {
        let mut seen = HashSet::with_capacity(creatures.len());
        for c in &creatures {
            if !seen.insert(c.number) {
                return Err(DatasetError::DuplicateNumber(c.number));
            }
        }
        Ok(Self {
            creatures,
            types,
            regions,
        })
    }

    /// The dataset compiled into the crate.
    pub fn bundled() -> Result<Self, DatasetError> {
        let creatures = parse_json(BUNDLED_CREATURES, "<bundled>/pokemon.json")?;
        let types = parse_json(BUNDLED_TYPES, "<bundled>/types.json")?;
        let regions = parse_json(BUNDLED_REGIONS, "<bundled>/regions.json")?;
        Self::new(creatures, types, regions)
    }

    pub fn len(&self) -> usize {
        self.creatures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.creatures.is_empty()
    }

    pub fn find(&self, number: u32) -> Option<&Creature> {
        self.creatures.iter().find(|c| c.number == number)
    }

    /// Records whose number appears in `numbers`, in catalog order.
    ///
    /// Numbers with no catalog entry are skipped.
    pub fn resolve(&self, numbers: &[u32]) -> Vec<Creature> {
        let wanted: HashSet<u32> = numbers.iter().copied().collect();
        self.creatures
            .iter()
            .filter(|c| wanted.contains(&c.number))
            .cloned()
            .collect()
    }
}

/// Load creature records from a JSON array file.
pub fn load_creatures(path: &Path) -> Result<Vec<Creature>, DatasetError> {
    load_json_file(path)
}

/// Load type tags. A missing file yields an empty option list.
pub fn load_types(path: &Path) -> Result<Vec<TypeTag>, DatasetError> {
    load_optional_json_file(path)
}

/// Load region tags. A missing file yields an empty option list.
pub fn load_regions(path: &Path) -> Result<Vec<RegionTag>, DatasetError> {
    load_optional_json_file(path)
}

/// Load the full catalog from a data directory.
///
/// Expected structure:
/// ```text
/// data_dir/
///   pokemon.json
///   types.json
///   regions.json
/// ```
pub fn load_catalog(data_dir: &Path) -> Result<Catalog, DatasetError> {
    if !data_dir.is_dir() {
        return Err(DatasetError::DirNotFound(data_dir.display().to_string()));
    }
    let creatures = load_creatures(&data_dir.join(CREATURES_FILE))?;
    let types = load_types(&data_dir.join(TYPES_FILE))?;
    let regions = load_regions(&data_dir.join(REGIONS_FILE))?;
    Catalog::new(creatures, types, regions)
}

fn load_optional_json_file<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, DatasetError> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    load_json_file(path)
}

fn load_json_file<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, DatasetError> {
    let contents = std::fs::read_to_string(path).map_err(|e| DatasetError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_json(&contents, &path.display().to_string())
}

fn parse_json<T: DeserializeOwned>(contents: &str, path: &str) -> Result<Vec<T>, DatasetError> {
    serde_json::from_str(contents).map_err(|e| DatasetError::Parse {
        path: path.to_string(),
        source: e,
    })
}
