//! Catalog of story settings, characters, and themes.
//!
//! The catalog maps the names a user picks to the descriptions fed into the
//! prompts. Each setting lists the characters that belong in it.

use crate::error::{Result, StoryError};
use crate::story::{Descriptor, StoryRequest};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Most characters a single story may feature.
pub const MAX_CHARACTERS: usize = 3;

const BUILTIN_CATALOG: &str = include_str!("../../data/catalog.json");

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingEntry {
    pub icon: String,
    pub description: String,
    pub compatible_characters: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub icon: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    pub settings: BTreeMap<String, SettingEntry>,
    pub characters: BTreeMap<String, CatalogEntry>,
    pub themes: BTreeMap<String, CatalogEntry>,
}

impl Catalog {
    /// The catalog shipped with Storyteller.
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_CATALOG)
    }

    /// Load from a JSON file, or the built-in catalog when `path` is None.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => {
                let content = std::fs::read_to_string(p).map_err(|e| {
                    StoryError::Catalog(format!("Cannot read {}: {}", p.display(), e))
                })?;
                Self::from_json(&content)
            }
            None => Self::builtin(),
        }
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let catalog: Catalog = serde_json::from_str(content)?;
        catalog.check_references()?;
        Ok(catalog)
    }

    /// Every compatible character must exist in the character list.
    fn check_references(&self) -> Result<()> {
        for (setting, entry) in &self.settings {
            for character in &entry.compatible_characters {
                if !self.characters.contains_key(character) {
                    return Err(StoryError::Catalog(format!(
                        "Setting '{}' lists unknown character '{}'",
                        setting, character
                    )));
                }
            }
        }
        Ok(())
    }

    /// Characters that may appear in a setting.
    pub fn characters_for(&self, setting: &str) -> Vec<&str> {
        self.settings
            .get(setting)
            .map(|s| s.compatible_characters.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Turn user choices into a story request.
    pub fn resolve(
        &self,
        setting: &str,
        characters: &[String],
        theme: &str,
    ) -> Result<StoryRequest> {
        let setting = setting.trim();
        let theme = theme.trim();

        if setting.is_empty() {
            return Err(StoryError::InvalidInput("Please select a setting.".to_string()));
        }
        if characters.is_empty() {
            return Err(StoryError::InvalidInput(
                "Please select at least one character.".to_string(),
            ));
        }
        if characters.len() > MAX_CHARACTERS {
            return Err(StoryError::InvalidInput(format!(
                "Please select at most {} characters.",
                MAX_CHARACTERS
            )));
        }
        if theme.is_empty() {
            return Err(StoryError::InvalidInput("Please select a theme.".to_string()));
        }

        let setting_entry = self
            .settings
            .get(setting)
            .ok_or_else(|| StoryError::InvalidInput(format!("Unknown setting: {}", setting)))?;

        let theme_entry = self
            .themes
            .get(theme)
            .ok_or_else(|| StoryError::InvalidInput(format!("Unknown theme: {}", theme)))?;

        let mut resolved = Vec::with_capacity(characters.len());
        for name in characters {
            let name = name.trim();
            let entry = self
                .characters
                .get(name)
                .ok_or_else(|| StoryError::InvalidInput(format!("Unknown character: {}", name)))?;
            if resolved.iter().any(|c: &Descriptor| c.name == name) {
                return Err(StoryError::InvalidInput(format!(
                    "{} was selected more than once",
                    name
                )));
            }
            if !setting_entry.compatible_characters.iter().any(|c| c == name) {
                return Err(StoryError::InvalidInput(format!(
                    "{} does not belong in {}",
                    name, setting
                )));
            }
            resolved.push(Descriptor::new(name, &entry.description));
        }

        Ok(StoryRequest {
            setting: Descriptor::new(setting, &setting_entry.description),
            characters: resolved,
            theme: Descriptor::new(theme, &theme_entry.description),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_builtin_catalog_is_consistent() {
        let catalog = Catalog::builtin().unwrap();
        assert!(catalog.settings.contains_key("Magical Forest"));
        assert!(catalog.themes.contains_key("Friendship"));
        assert!(catalog.characters_for("Magical Forest").len() >= 2);
    }

    #[test]
    fn test_resolve_magical_forest() {
        let catalog = Catalog::builtin().unwrap();
        let characters: Vec<String> = catalog
            .characters_for("Magical Forest")
            .into_iter()
            .take(2)
            .map(String::from)
            .collect();

        let request = catalog
            .resolve("Magical Forest", &characters, "Friendship")
            .unwrap();
        assert_eq!(request.setting.name, "Magical Forest");
        assert_eq!(request.characters.len(), 2);
        assert!(!request.theme.description.is_empty());
    }

    #[test]
    fn test_resolve_rejects_bad_input() {
        let catalog = Catalog::builtin().unwrap();
        let forest = catalog.characters_for("Magical Forest");
        let one = names(&forest[..1]);

        assert!(catalog.resolve("", &one, "Friendship").is_err());
        assert!(catalog.resolve("Magical Forest", &[], "Friendship").is_err());
        assert!(catalog.resolve("Magical Forest", &one, " ").is_err());
        assert!(catalog.resolve("Moon Base", &one, "Friendship").is_err());
        assert!(catalog.resolve("Magical Forest", &one, "Revenge").is_err());
        assert!(catalog
            .resolve("Magical Forest", &names(&["Nobody"]), "Friendship")
            .is_err());

        let four = names(&[forest[0], forest[0], forest[0], forest[0]]);
        assert!(matches!(
            catalog.resolve("Magical Forest", &four, "Friendship"),
            Err(StoryError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_resolve_rejects_duplicate_characters() {
        let catalog = Catalog::builtin().unwrap();
        let twice = names(&["Brave Fox", " Brave Fox "]);
        assert!(matches!(
            catalog.resolve("Magical Forest", &twice, "Friendship"),
            Err(StoryError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_resolve_rejects_incompatible_character() {
        let json = r#"{
            "settings": {
                "Forest": {"icon": "F", "description": "Trees.", "compatible_characters": ["Fox"]},
                "Sea": {"icon": "S", "description": "Waves.", "compatible_characters": ["Crab"]}
            },
            "characters": {
                "Fox": {"icon": "f", "description": "A fox."},
                "Crab": {"icon": "c", "description": "A crab."}
            },
            "themes": {"Kindness": {"icon": "k", "description": "Be kind."}}
        }"#;
        let catalog = Catalog::from_json(json).unwrap();

        assert!(catalog.resolve("Forest", &names(&["Fox"]), "Kindness").is_ok());
        assert!(catalog.resolve("Forest", &names(&["Crab"]), "Kindness").is_err());
    }

    #[test]
    fn test_dangling_character_reference_is_rejected() {
        let json = r#"{
            "settings": {"Forest": {"icon": "F", "description": "Trees.", "compatible_characters": ["Ghost Fox"]}},
            "characters": {},
            "themes": {}
        }"#;
        assert!(matches!(Catalog::from_json(json), Err(StoryError::Catalog(_))));
    }
}
