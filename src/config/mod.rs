//! Configuration module for Storyteller.
//!
//! Handles application settings, prompt templates, and the story catalog.

mod catalog;
mod prompts;
mod settings;

pub use catalog::{Catalog, CatalogEntry, SettingEntry, MAX_CHARACTERS};
pub use prompts::{MusicPrompts, Prompts, StoryPrompts};
pub use settings::{
    AssemblySettings, GeneralSettings, InstrumentSettings, LlmSettings, MusicSettings,
    PromptSettings, RetrySettings, Settings, TtsSettings, ValidationSettings,
};
