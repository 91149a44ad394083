//! Background music through an HTTP generation service.

use super::MusicGenerator;
use crate::audio::{decode_wav, AudioBuffer};
use crate::config::MusicSettings;
use crate::error::{Result, StoryError};
use crate::openai::http_client;
use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, instrument};

#[derive(Serialize)]
struct MusicRequest<'a> {
    prompt: &'a str,
    guidance_scale: f32,
    max_new_tokens: u32,
}

pub struct HttpMusicGenerator {
    client: reqwest::Client,
    url: String,
    guidance_scale: f32,
    max_new_tokens: u32,
}

impl HttpMusicGenerator {
    pub fn new(settings: &MusicSettings) -> Result<Self> {
        Ok(Self {
            client: http_client(settings.timeout_secs)?,
            url: settings.url.clone(),
            guidance_scale: settings.guidance_scale,
            max_new_tokens: settings.max_new_tokens,
        })
    }
}

#[async_trait]
impl MusicGenerator for HttpMusicGenerator {
    #[instrument(skip(self, prompt), fields(url = %self.url))]
    async fn compose(&self, prompt: &str) -> Result<AudioBuffer> {
        let request = MusicRequest {
            prompt,
            guidance_scale: self.guidance_scale,
            max_new_tokens: self.max_new_tokens,
        };

        let response = self.client.post(&self.url).json(&request).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(StoryError::Generation(format!(
                "Music service returned {}: {}",
                status, message
            )));
        }

        let bytes = response.bytes().await?;
        let audio = decode_wav(&bytes)?;
        debug!(
            seconds = audio.duration_seconds(),
            sample_rate = audio.sample_rate,
            "Received music clip"
        );
        Ok(audio)
    }
}
