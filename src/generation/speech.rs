//! Narration through an HTTP text-to-speech service.

use super::SpeechSynthesizer;
use crate::audio::{decode_wav, AudioBuffer};
use crate::config::TtsSettings;
use crate::error::{Result, StoryError};
use crate::openai::http_client;
use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, instrument};

#[derive(Serialize)]
struct TtsRequest<'a> {
    text: &'a str,
}

/// Posts `{"text": ...}` and decodes the WAV body of the reply.
pub struct HttpSpeechSynthesizer {
    client: reqwest::Client,
    url: String,
}

impl HttpSpeechSynthesizer {
    pub fn new(settings: &TtsSettings) -> Result<Self> {
        Ok(Self {
            client: http_client(settings.timeout_secs)?,
            url: settings.url.clone(),
        })
    }
}

#[async_trait]
impl SpeechSynthesizer for HttpSpeechSynthesizer {
    #[instrument(skip(self, text), fields(url = %self.url, chars = text.len()))]
    async fn synthesize(&self, text: &str) -> Result<AudioBuffer> {
        let response = self
            .client
            .post(&self.url)
            .json(&TtsRequest { text })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(StoryError::Generation(format!(
                "TTS service returned {}: {}",
                status, message
            )));
        }

        let bytes = response.bytes().await?;
        let audio = decode_wav(&bytes)?;
        debug!(
            seconds = audio.duration_seconds(),
            sample_rate = audio.sample_rate,
            "Received narration"
        );
        Ok(audio)
    }
}
