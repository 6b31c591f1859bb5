//! Data model types for the creature catalog.
//!
//! Records are loaded once from the static dataset and never mutated.

use serde::{Deserialize, Serialize};

/// Base URL of the artwork CDN used when a record carries no explicit image.
pub const ARTWORK_BASE_URL: &str =
    "https://raw.githubusercontent.com/PokeAPI/sprites/master/sprites/pokemon/other/official-artwork";

// ── Creature ────────────────────────────────────────────────────────────────

/// A single catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Creature {
    pub name: String,
    pub number: u32,
    /// Ordered type tags, e.g. `["grass", "poison"]`.
    #[serde(rename = "type", default)]
    pub types: Vec<String>,
    pub region: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl Creature {
    /// Explicit image, or the CDN artwork derived from the number.
    pub fn image_url(&self) -> String {
        match &self.image {
            Some(url) if !url.is_empty() => url.clone(),
            _ => artwork_url(self.number),
        }
    }

    pub fn has_type(&self, tag: &str) -> bool {
        self.types.iter().any(|t| t == tag)
    }

    /// Type tags joined for display: `"grass, poison"`.
    pub fn type_list(&self) -> String {
        self.types.join(", ")
    }
}

/// CDN artwork URL for a creature number.
pub fn artwork_url(number: u32) -> String {
    format!("{}/{}.png", ARTWORK_BASE_URL, number)
}

// ── Filter options ──────────────────────────────────────────────────────────

/// A type tag offered by the type filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeTag {
    pub name: String,
    /// Icon for the tag, when the dataset provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// A region tag offered by the region filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionTag {
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pikachu() -> Creature {
        Creature {
            name: "Pikachu".to_string(),
            number: 25,
            types: vec!["electric".to_string()],
            region: "kanto".to_string(),
            image: None,
        }
    }

    #[test]
    fn image_url_defaults_to_artwork_cdn() {
        assert_eq!(
            pikachu().image_url(),
            "https://raw.githubusercontent.com/PokeAPI/sprites/master/sprites/pokemon/other/official-artwork/25.png"
        );
    }

    #[test]
    fn explicit_image_wins() {
        let mut c = pikachu();
        c.image = Some("https://assets.pokemon.com/025.png".to_string());
        assert_eq!(c.image_url(), "https://assets.pokemon.com/025.png");
    }

    #[test]
    fn empty_image_falls_back() {
        let mut c = pikachu();
        c.image = Some(String::new());
        assert!(c.image_url().ends_with("/25.png"));
    }

    #[test]
    fn type_field_uses_json_key_type() {
        let c: Creature = serde_json::from_str(
            r#"{"name":"Bulbasaur","number":1,"type":["grass","poison"],"region":"kanto"}"#,
        )
        .unwrap();
        assert!(c.has_type("poison"));
        assert!(!c.has_type("fire"));
        assert_eq!(c.type_list(), "grass, poison");
    }
}
