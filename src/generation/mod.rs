//! Content generators: story text, narration, and music.
//!
//! Each generator is a trait so pipelines can run against local services in
//! production and deterministic fakes in tests.

mod music;
mod speech;
mod text;

pub use music::HttpMusicGenerator;
pub use speech::HttpSpeechSynthesizer;
pub use text::OpenAiTextGenerator;

use crate::audio::AudioBuffer;
use crate::error::Result;
use async_trait::async_trait;

/// Produces story prose from a prompt.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
}

/// Speaks a piece of text.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, text: &str) -> Result<AudioBuffer>;
}

/// Composes a short instrumental clip from a description.
#[async_trait]
pub trait MusicGenerator: Send + Sync {
    async fn compose(&self, prompt: &str) -> Result<AudioBuffer>;
}
