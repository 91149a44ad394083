//! Catalog command implementation.

use crate::cli::Output;
use crate::config::{Catalog, Settings, MAX_CHARACTERS};
use anyhow::Result;

/// List settings with their characters, then themes.
pub fn run_catalog(settings: &Settings) -> Result<()> {
    let catalog = Catalog::load(settings.catalog_path().as_deref())?;

    Output::header("Settings");
    for (name, setting) in &catalog.settings {
        Output::catalog_entry(&setting.icon, name, &setting.description);
        for character in &setting.compatible_characters {
            if let Some(entry) = catalog.characters.get(character) {
                println!("      {} {}", entry.icon, character);
            }
        }
    }

    Output::header("Themes");
    for (name, theme) in &catalog.themes {
        Output::catalog_entry(&theme.icon, name, &theme.description);
    }

    println!();
    Output::info(&format!(
        "Pick one setting, 1-{} of its characters, and one theme.",
        MAX_CHARACTERS
    ));
    Ok(())
}
