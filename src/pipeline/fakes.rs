//! Deterministic collaborators for tests.

use crate::audio::AudioBuffer;
use crate::config::Catalog;
use crate::error::{Result, StoryError};
use crate::generation::{MusicGenerator, SpeechSynthesizer, TextGenerator};
use crate::story::StoryRequest;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

/// 10 words, 14 syllables. Readable enough for every default threshold.
pub const EASY_SENTENCE: &str = "The little rabbit found a happy friend in the garden.";
const FLAGGED_SENTENCE: &str = "The little rabbit found a happy ghost in the garden.";

/// Sentences per section: three sections land at 1020 words.
const SENTENCES_PER_SECTION: usize = 34;

pub fn forest_request() -> StoryRequest {
    let catalog = Catalog::builtin().unwrap();
    catalog
        .resolve(
            "Magical Forest",
            &["Brave Fox".to_string(), "Wise Owl".to_string()],
            "Friendship",
        )
        .unwrap()
}

/// A sine tone at 440 Hz.
pub fn tone(sample_rate: u32, seconds: f64, amplitude: f32) -> AudioBuffer {
    let len = (seconds * sample_rate as f64) as usize;
    let step = 2.0 * std::f32::consts::PI * 440.0 / sample_rate as f32;
    let samples = (0..len).map(|i| amplitude * (step * i as f32).sin()).collect();
    AudioBuffer::new(sample_rate, samples)
}

/// Writes identical easy sections and records every prompt.
pub struct FakeText {
    calls: AtomicU32,
    flagged_calls: u32,
    failing_calls: Vec<u32>,
    prompts: Mutex<Vec<String>>,
}

impl FakeText {
    pub fn new() -> Self {
        Self {
            calls: AtomicU32::new(0),
            flagged_calls: 0,
            failing_calls: Vec::new(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// The first `attempts` stories contain a prohibited word.
    pub fn with_flagged_attempts(mut self, attempts: u32) -> Self {
        self.flagged_calls = attempts.saturating_mul(3);
        self
    }

    /// These 1-based calls return an error.
    pub fn with_failing_calls(mut self, calls: &[u32]) -> Self {
        self.failing_calls = calls.to_vec();
        self
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for FakeText {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.prompts.lock().unwrap().push(prompt.to_string());

        if self.failing_calls.contains(&call) {
            return Err(StoryError::Generation("model unavailable".to_string()));
        }

        let mut sentences = vec![EASY_SENTENCE; SENTENCES_PER_SECTION];
        if call <= self.flagged_calls {
            sentences[0] = FLAGGED_SENTENCE;
        }
        Ok(sentences.join(" "))
    }
}

/// Produces a tone per call; earlier calls can be made quiet or failing.
pub struct FakeAudio {
    sample_rate: u32,
    seconds: f64,
    amplitude: f32,
    quiet_calls: u32,
    failing_calls: u32,
    calls: AtomicU32,
}

impl FakeAudio {
    pub fn new(sample_rate: u32, seconds: f64, amplitude: f32) -> Self {
        Self {
            sample_rate,
            seconds,
            amplitude,
            quiet_calls: 0,
            failing_calls: 0,
            calls: AtomicU32::new(0),
        }
    }

    /// Narration that passes the default narration checks.
    pub fn narrator() -> Self {
        Self::new(44100, 10.5, 0.3)
    }

    /// Music that passes the default music checks.
    pub fn composer() -> Self {
        Self::new(32000, 2.0, 0.5)
    }

    /// The first `n` calls return near-silent audio.
    pub fn with_quiet_calls(mut self, n: u32) -> Self {
        self.quiet_calls = n;
        self
    }

    /// The first `n` calls fail.
    pub fn with_failing_calls(mut self, n: u32) -> Self {
        self.failing_calls = n;
        self
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    fn next(&self) -> Result<AudioBuffer> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call <= self.failing_calls {
            return Err(StoryError::Generation("service returned 503".to_string()));
        }
        let amplitude = if call <= self.failing_calls + self.quiet_calls {
            0.001
        } else {
            self.amplitude
        };
        Ok(tone(self.sample_rate, self.seconds, amplitude))
    }
}

#[async_trait]
impl SpeechSynthesizer for FakeAudio {
    async fn synthesize(&self, _text: &str) -> Result<AudioBuffer> {
        self.next()
    }
}

#[async_trait]
impl MusicGenerator for FakeAudio {
    async fn compose(&self, _prompt: &str) -> Result<AudioBuffer> {
        self.next()
    }
}

/// Records music prompts and always succeeds.
pub struct PromptRecorder {
    prompts: Mutex<Vec<String>>,
}

impl PromptRecorder {
    pub fn new() -> Self {
        Self {
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl MusicGenerator for PromptRecorder {
    async fn compose(&self, prompt: &str) -> Result<AudioBuffer> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok(tone(32000, 1.0, 0.5))
    }
}
