//! Pre-flight checks before expensive operations.
//!
//! Validates configuration before a run that would otherwise fail midway,
//! after minutes of story and audio generation.

use crate::config::Settings;
use crate::error::{Result, StoryError};
use url::Url;

/// Run pre-flight checks for `generate`.
///
/// Returns Ok(()) if all checks pass, or an error describing what's wrong.
pub fn check_generate(settings: &Settings) -> Result<()> {
    check_url("llm.api_base", &settings.llm.api_base)?;
    check_url("tts.url", &settings.tts.url)?;
    check_url("music.url", &settings.music.url)?;

    if settings.llm.model.trim().is_empty() {
        return Err(StoryError::Config("llm.model is empty".to_string()));
    }

    let attempts = [
        ("retry.narrative_attempts", settings.retry.narrative_attempts),
        ("retry.narration_attempts", settings.retry.narration_attempts),
        ("retry.music_attempts", settings.retry.music_attempts),
    ];
    for (key, value) in attempts {
        if value == 0 {
            return Err(StoryError::Config(format!("{} must be at least 1", key)));
        }
    }

    check_output_dir(settings)
}

/// Check that a configured endpoint is an http(s) URL.
pub fn check_url(key: &str, value: &str) -> Result<Url> {
    let url = Url::parse(value)
        .map_err(|e| StoryError::Config(format!("{} is not a valid URL ({}): {}", key, value, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(StoryError::Config(format!(
            "{} must use http or https, not {}",
            key, other
        ))),
    }
}

/// Check that the output directory exists or can be created.
fn check_output_dir(settings: &Settings) -> Result<()> {
    let dir = settings.output_dir();
    std::fs::create_dir_all(&dir).map_err(|e| {
        StoryError::Config(format!(
            "Output directory {} is not writable: {}",
            dir.display(),
            e
        ))
    })
}
