//! Error types for Storyteller.

use crate::retry::Stage;
use thiserror::Error;

/// Library-level error type for Storyteller operations.
#[derive(Error, Debug)]
pub enum StoryError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Generation failed: {0}")]
    Generation(String),

    #[error("Audio error: {0}")]
    Audio(String),

    #[error("{stage} stage exhausted after {attempts} attempts")]
    StageExhausted { stage: Stage, attempts: u32 },

    #[error("Audio assembly failed: {0}")]
    Assembly(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),
}

/// Result type alias for Storyteller operations.
pub type Result<T> = std::result::Result<T, StoryError>;
