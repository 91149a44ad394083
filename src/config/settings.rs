//! Configuration settings for Storyteller.

use crate::retry::RetryPolicy;
use crate::validation::{MusicThresholds, NarrationThresholds, TextThresholds};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub llm: LlmSettings,
    pub tts: TtsSettings,
    pub music: MusicSettings,
    pub retry: RetrySettings,
    pub validation: ValidationSettings,
    pub assembly: AssemblySettings,
    pub instruments: InstrumentSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Root directory for generated stories, narration, music, and final audio.
    pub output_dir: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
    /// Catalog of settings/characters/themes (JSON). Built-in catalog if unset.
    pub catalog_path: Option<String>,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            output_dir: "~/.storyteller/generated".to_string(),
            log_level: "info".to_string(),
            catalog_path: None,
        }
    }
}

/// Story text generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    /// Model name passed to the chat completions endpoint.
    pub model: String,
    /// OpenAI-compatible API base (Ollama serves one at /v1).
    pub api_base: String,
    /// Environment variable holding the API key, if the endpoint needs one.
    pub api_key_env: String,
    pub temperature: f32,
    pub timeout_secs: u64,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            model: "llama3.1".to_string(),
            api_base: "http://localhost:11434/v1".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            temperature: 0.8,
            timeout_secs: 300,
        }
    }
}

impl LlmSettings {
    /// API key from the configured environment variable. Local servers accept any value.
    pub fn api_key(&self) -> String {
        std::env::var(&self.api_key_env).unwrap_or_else(|_| "ollama".to_string())
    }
}

/// Narration (text-to-speech) service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TtsSettings {
    /// Endpoint accepting `{"text": ...}` and returning WAV bytes.
    pub url: String,
    pub timeout_secs: u64,
}

impl Default for TtsSettings {
    fn default() -> Self {
        Self {
            url: "http://localhost:8888/convert/tts".to_string(),
            timeout_secs: 300,
        }
    }
}

/// Music generation service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MusicSettings {
    /// Endpoint accepting `{"prompt": ...}` and returning WAV bytes.
    pub url: String,
    /// How closely output follows the prompt.
    pub guidance_scale: f32,
    /// Limits the length of generated audio.
    pub max_new_tokens: u32,
    pub timeout_secs: u64,
}

impl Default for MusicSettings {
    fn default() -> Self {
        Self {
            url: "http://localhost:8890/generate".to_string(),
            guidance_scale: 3.0,
            max_new_tokens: 100,
            timeout_secs: 600,
        }
    }
}

/// Attempt limits per stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    pub narrative_attempts: u32,
    pub narration_attempts: u32,
    pub music_attempts: u32,
    /// Wait after a failed service call before retrying.
    pub backoff_secs: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            narrative_attempts: RetryPolicy::narrative().max_attempts,
            narration_attempts: RetryPolicy::narration().max_attempts,
            music_attempts: RetryPolicy::music().max_attempts,
            backoff_secs: RetryPolicy::DEFAULT_BACKOFF.as_secs(),
        }
    }
}

impl RetrySettings {
    fn backoff(&self) -> Duration {
        Duration::from_secs(self.backoff_secs)
    }

    pub fn narrative_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.narrative_attempts, self.backoff())
    }

    pub fn narration_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.narration_attempts, self.backoff())
    }

    pub fn music_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.music_attempts, self.backoff())
    }
}

/// Acceptance thresholds for each stage.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ValidationSettings {
    pub text: TextThresholds,
    pub narration: NarrationThresholds,
    pub music: MusicThresholds,
}

/// Final mix timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssemblySettings {
    /// Silence between adjacent slots.
    pub gap_seconds: f64,
    /// Silence substituted for a missing slot.
    pub fallback_seconds: f64,
}

impl Default for AssemblySettings {
    fn default() -> Self {
        Self {
            gap_seconds: crate::audio::DEFAULT_GAP_SECONDS,
            fallback_seconds: crate::audio::DEFAULT_FALLBACK_SECONDS,
        }
    }
}

/// Instruments used in music prompts, per story setting.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InstrumentSettings {
    /// Used when a setting has no entry in `by_setting`.
    pub default: Vec<String>,
    pub by_setting: HashMap<String, Vec<String>>,
}

impl Default for InstrumentSettings {
    fn default() -> Self {
        let by_setting = [
            ("Magical Forest", ["flute", "harp", "chimes"]),
            ("Small Kingdom", ["violin", "horns", "drums"]),
            ("Desert Oasis", ["oud", "darbuka drums", "flute"]),
            ("Underwater World", ["synth pads", "harp", "bubble sounds"]),
            ("Flower Meadow", ["acoustic guitar", "soft piano", "wind chimes"]),
            ("Snowy Land", ["celesta", "soft piano", "bells"]),
            ("Sky Island", ["airy synth", "harp", "angelic choir"]),
            ("Crystal Cave", ["glass harmonica", "chimes", "echoing pads"]),
        ]
        .into_iter()
        .map(|(setting, instruments)| {
            (
                setting.to_string(),
                instruments.iter().map(|i| i.to_string()).collect(),
            )
        })
        .collect();

        Self {
            default: vec![
                "soft piano".to_string(),
                "harp".to_string(),
                "strings".to_string(),
            ],
            by_setting,
        }
    }
}

impl InstrumentSettings {
    /// Instruments for a setting, falling back to the default list.
    pub fn for_setting(&self, setting: &str) -> &[String] {
        self.by_setting
            .get(setting)
            .map(Vec::as_slice)
            .unwrap_or(&self.default)
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: HashMap<String, String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to the default configuration file.
    pub fn save(&self) -> crate::error::Result<()> {
        self.save_to(&Self::default_config_path())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::StoryError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("storyteller")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded output root.
    pub fn output_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.output_dir)
    }

    pub fn stories_dir(&self) -> PathBuf {
        self.output_dir().join("stories")
    }

    pub fn narrations_dir(&self) -> PathBuf {
        self.output_dir().join("narrations")
    }

    pub fn music_dir(&self) -> PathBuf {
        self.output_dir().join("music")
    }

    pub fn final_audio_dir(&self) -> PathBuf {
        self.output_dir().join("final_audio")
    }

    /// Get the expanded catalog path, if one is configured.
    pub fn catalog_path(&self) -> Option<PathBuf> {
        self.general.catalog_path.as_deref().map(Self::expand_path)
    }
}
