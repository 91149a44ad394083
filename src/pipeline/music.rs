//! Music stage: four cues shaped by the story's setting.

use crate::audio::AudioBuffer;
use crate::config::{InstrumentSettings, Prompts};
use crate::generation::MusicGenerator;
use crate::retry::{run_with_retry, RetryPolicy, Stage, StageResult};
use crate::story::{MusicCue, StoryRequest};
use crate::validation::{validate_music, MusicThresholds};
use futures::future::join_all;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, instrument};

#[derive(Debug, Clone)]
pub struct MusicOutcome {
    pub cue: MusicCue,
    pub result: StageResult<AudioBuffer>,
}

pub struct MusicPipeline {
    generator: Arc<dyn MusicGenerator>,
    prompts: Prompts,
    instruments: InstrumentSettings,
    thresholds: MusicThresholds,
    policy: RetryPolicy,
}

impl MusicPipeline {
    pub fn new(
        generator: Arc<dyn MusicGenerator>,
        prompts: Prompts,
        instruments: InstrumentSettings,
        thresholds: MusicThresholds,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            generator,
            prompts,
            instruments,
            thresholds,
            policy,
        }
    }

    /// The prompt for one cue.
    pub fn prompt_for(&self, cue: MusicCue, request: &StoryRequest) -> String {
        let mut vars = HashMap::new();
        vars.insert("setting".to_string(), request.setting.name.clone());
        vars.insert(
            "setting_description".to_string(),
            request.setting.description.clone(),
        );
        vars.insert(
            "instruments".to_string(),
            self.instruments
                .for_setting(&request.setting.name)
                .join(", "),
        );
        self.prompts
            .render_with_custom(self.prompts.music.for_cue(cue), &vars)
    }

    /// Compose all four cues concurrently. Outcomes are in cue order.
    #[instrument(skip_all, fields(setting = %request.setting.name))]
    pub async fn run(&self, request: &StoryRequest) -> Vec<MusicOutcome> {
        let tasks = MusicCue::ALL.into_iter().map(|cue| {
            let prompt = self.prompt_for(cue, request);
            async move {
                debug!(%cue, "Music prompt: {}", prompt);
                let label = cue.to_string();
                let result = run_with_retry(
                    Stage::Music,
                    &label,
                    self.policy,
                    |_| self.generator.compose(&prompt),
                    |audio| validate_music(audio, &self.thresholds),
                )
                .await;
                MusicOutcome { cue, result }
            }
        });
        join_all(tasks).await
    }
}
