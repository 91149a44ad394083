//! Pipeline orchestrator for Storyteller.
//!
//! Coordinates the entire process from story text to the final mixed track.

use crate::audio::{
    write_wav, AssembledTrack, AssemblyInputs, AudioAssembler, AudioBuffer, SlotSource,
};
use crate::config::{Prompts, Settings};
use crate::error::{Result, StoryError};
use crate::generation::{
    HttpMusicGenerator, HttpSpeechSynthesizer, MusicGenerator, OpenAiTextGenerator,
    SpeechSynthesizer, TextGenerator,
};
use crate::pipeline::{MusicPipeline, NarrationPipeline, NarrativePipeline};
use crate::retry::Stage;
use crate::story::{Narrative, SectionId, StoryRequest};
use crate::validation::{TextMetrics, TextValidator};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Timestamp format shared by every file of one run.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// The main orchestrator for the Storyteller pipeline.
pub struct Orchestrator {
    settings: Settings,
    narrative: NarrativePipeline,
    narration: NarrationPipeline,
    music: MusicPipeline,
    assembler: AudioAssembler,
}

/// A slot that ended up silent in the final mix.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotWarning {
    pub stage: Stage,
    pub slot: String,
    pub reason: String,
}

impl std::fmt::Display for SlotWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}: {}", self.stage, self.slot, self.reason)
    }
}

/// Result of a complete run.
#[derive(Debug, Clone)]
pub struct StoryRun {
    pub timestamp: String,
    pub narrative: Narrative,
    pub metrics: TextMetrics,
    /// Attempts the narrative stage needed.
    pub narrative_attempts: u32,
    /// The full story text file.
    pub story_path: PathBuf,
    pub track: AssembledTrack,
    pub warnings: Vec<SlotWarning>,
}

impl Orchestrator {
    /// Create a new orchestrator talking to the configured services.
    pub fn new(settings: Settings) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        let text: Arc<dyn TextGenerator> = Arc::new(OpenAiTextGenerator::new(&settings.llm)?);
        let speech: Arc<dyn SpeechSynthesizer> =
            Arc::new(HttpSpeechSynthesizer::new(&settings.tts)?);
        let music: Arc<dyn MusicGenerator> = Arc::new(HttpMusicGenerator::new(&settings.music)?);

        info!(
            "Using {} at {} for story text",
            settings.llm.model, settings.llm.api_base
        );

        Self::with_components(settings, prompts, text, speech, music)
    }

    /// Create an orchestrator with custom components.
    pub fn with_components(
        settings: Settings,
        prompts: Prompts,
        text: Arc<dyn TextGenerator>,
        speech: Arc<dyn SpeechSynthesizer>,
        music: Arc<dyn MusicGenerator>,
    ) -> Result<Self> {
        let validator = TextValidator::new(settings.validation.text.clone())?;

        let narrative = NarrativePipeline::new(
            text,
            prompts.clone(),
            validator,
            settings.retry.narrative_policy(),
        );
        let narration = NarrationPipeline::new(
            speech,
            settings.validation.narration.clone(),
            settings.retry.narration_policy(),
        );
        let music = MusicPipeline::new(
            music,
            prompts,
            settings.instruments.clone(),
            settings.validation.music.clone(),
            settings.retry.music_policy(),
        );
        let assembler = AudioAssembler::new(settings.final_audio_dir()).with_timing(
            settings.assembly.gap_seconds,
            settings.assembly.fallback_seconds,
        );

        Ok(Self {
            settings,
            narrative,
            narration,
            music,
            assembler,
        })
    }

    /// Get the settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Run every stage, naming outputs with the current local time.
    pub async fn generate(&self, request: &StoryRequest) -> Result<StoryRun> {
        let timestamp = chrono::Local::now().format(TIMESTAMP_FORMAT).to_string();
        self.generate_at(request, &timestamp).await
    }

    /// Run every stage, naming outputs with `timestamp`.
    #[instrument(skip(self, request), fields(setting = %request.setting.name))]
    pub async fn generate_at(&self, request: &StoryRequest, timestamp: &str) -> Result<StoryRun> {
        let story = self.narrative.run(request).await;
        let narrative_attempts = story.attempts;
        let candidate = story.into_value().ok_or(StoryError::StageExhausted {
            stage: Stage::Narrative,
            attempts: narrative_attempts,
        })?;
        info!(
            words = candidate.metrics.word_count,
            reading_ease = candidate.metrics.reading_ease,
            grade_level = candidate.metrics.grade_level,
            "Story accepted"
        );

        let story_path = self.save_story(&candidate.narrative, timestamp)?;

        let (narrations, clips) = tokio::join!(
            self.narration.run(&candidate.narrative),
            self.music.run(request)
        );

        let mut inputs = AssemblyInputs::new();
        let mut warnings = Vec::new();

        for outcome in narrations {
            let slot = outcome.section.to_string();
            let filename = format!(
                "narration_part_{}_{}.wav",
                outcome.section.index() + 1,
                timestamp
            );
            let source = self.persist_slot(
                Stage::Narration,
                &slot,
                outcome.result.value,
                outcome.result.attempts,
                &self.settings.narrations_dir(),
                &filename,
                &mut warnings,
            );
            inputs.set_narration(outcome.section, source);
        }

        for outcome in clips {
            let slot = outcome.cue.to_string();
            let filename = format!("music_{}_{}.wav", slot, timestamp);
            let source = self.persist_slot(
                Stage::Music,
                &slot,
                outcome.result.value,
                outcome.result.attempts,
                &self.settings.music_dir(),
                &filename,
                &mut warnings,
            );
            inputs.set_music(outcome.cue, source);
        }

        let track = self.assembler.assemble(&inputs, timestamp)?;

        Ok(StoryRun {
            timestamp: timestamp.to_string(),
            narrative: candidate.narrative,
            metrics: candidate.metrics,
            narrative_attempts,
            story_path,
            track,
            warnings,
        })
    }

    /// Write the three sections and the full story. Returns the full story path.
    fn save_story(&self, narrative: &Narrative, timestamp: &str) -> Result<PathBuf> {
        let dir = self.settings.stories_dir();
        std::fs::create_dir_all(&dir)?;

        for id in SectionId::ALL {
            let path = dir.join(format!("story_{}_{}.txt", timestamp, id.file_suffix()));
            std::fs::write(&path, &narrative.section(id).text)?;
        }

        let full_path = dir.join(format!("story_{}_full.txt", timestamp));
        std::fs::write(&full_path, narrative.full_text())?;
        info!("Story saved to {}", full_path.display());
        Ok(full_path)
    }

    /// Save an accepted buffer and hand its path to the assembler.
    ///
    /// Exhausted slots and failed writes both become [`SlotSource::Missing`].
    #[allow(clippy::too_many_arguments)]
    fn persist_slot(
        &self,
        stage: Stage,
        slot: &str,
        buffer: Option<AudioBuffer>,
        attempts: u32,
        dir: &Path,
        filename: &str,
        warnings: &mut Vec<SlotWarning>,
    ) -> SlotSource {
        let Some(buffer) = buffer else {
            warn!(%stage, slot, attempts, "No accepted audio, the slot will be silent");
            warnings.push(SlotWarning {
                stage,
                slot: slot.to_string(),
                reason: format!("exhausted after {} attempts", attempts),
            });
            return SlotSource::Missing;
        };

        let path = dir.join(filename);
        let written = std::fs::create_dir_all(dir)
            .map_err(StoryError::from)
            .and_then(|_| write_wav(&path, &buffer));

        match written {
            Ok(()) => {
                info!(%stage, slot, "Saved {}", path.display());
                SlotSource::File(path)
            }
            Err(e) => {
                warn!(%stage, slot, "Could not save {}: {}", path.display(), e);
                warnings.push(SlotWarning {
                    stage,
                    slot: slot.to_string(),
                    reason: format!("could not be saved: {}", e),
                });
                SlotSource::Missing
            }
        }
    }
}
