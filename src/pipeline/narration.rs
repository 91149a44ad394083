//! Narration stage: one spoken buffer per story section.

use crate::audio::AudioBuffer;
use crate::generation::SpeechSynthesizer;
use crate::retry::{run_with_retry, RetryPolicy, Stage, StageResult};
use crate::story::{Narrative, SectionId};
use crate::validation::{validate_narration, NarrationThresholds};
use futures::future::join_all;
use std::sync::Arc;
use tracing::instrument;

/// Result for one section. An exhausted section has no buffer.
#[derive(Debug, Clone)]
pub struct NarrationOutcome {
    pub section: SectionId,
    pub result: StageResult<AudioBuffer>,
}

pub struct NarrationPipeline {
    synthesizer: Arc<dyn SpeechSynthesizer>,
    thresholds: NarrationThresholds,
    policy: RetryPolicy,
}

impl NarrationPipeline {
    pub fn new(
        synthesizer: Arc<dyn SpeechSynthesizer>,
        thresholds: NarrationThresholds,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            synthesizer,
            thresholds,
            policy,
        }
    }

    /// Narrate every section concurrently. Outcomes are in section order.
    #[instrument(skip_all)]
    pub async fn run(&self, narrative: &Narrative) -> Vec<NarrationOutcome> {
        let tasks = narrative.sections().iter().map(|section| async move {
            let label = section.id.to_string();
            let result = run_with_retry(
                Stage::Narration,
                &label,
                self.policy,
                |_| self.synthesizer.synthesize(&section.text),
                |audio| validate_narration(audio, &self.thresholds),
            )
            .await;
            NarrationOutcome {
                section: section.id,
                result,
            }
        });
        join_all(tasks).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::fakes::FakeAudio;
    use std::time::Duration;

    fn narrative() -> Narrative {
        Narrative::new(
            "Once upon a time.".to_string(),
            "Then a thing happened.".to_string(),
            "And they slept.".to_string(),
        )
    }

    fn pipeline(audio: Arc<FakeAudio>) -> NarrationPipeline {
        NarrationPipeline::new(
            audio,
            NarrationThresholds::default(),
            RetryPolicy::narration().with_backoff(Duration::ZERO),
        )
    }

    #[tokio::test]
    async fn test_narrates_each_section_in_order() {
        let audio = Arc::new(FakeAudio::narrator());
        let outcomes = pipeline(audio.clone()).run(&narrative()).await;

        let order: Vec<SectionId> = outcomes.iter().map(|o| o.section).collect();
        assert_eq!(order, SectionId::ALL.to_vec());
        for outcome in &outcomes {
            assert!(outcome.result.accepted);
            let buffer = outcome.result.value.as_ref().unwrap();
            assert_eq!(buffer.sample_rate, 44100);
            assert!(buffer.duration_seconds() >= 10.0);
        }
        assert_eq!(audio.calls(), 3);
    }

    #[tokio::test]
    async fn test_quiet_takes_are_regenerated() {
        let audio = Arc::new(FakeAudio::narrator().with_quiet_calls(2));
        let outcomes = pipeline(audio.clone()).run(&narrative()).await;

        assert!(outcomes.iter().all(|o| o.result.accepted));
        assert_eq!(audio.calls(), 5);
    }

    #[tokio::test]
    async fn test_wrong_rate_is_rejected() {
        let audio = Arc::new(FakeAudio::new(22050, 12.0, 0.3));
        let outcomes = pipeline(audio.clone()).run(&narrative()).await;

        for outcome in &outcomes {
            assert!(!outcome.result.accepted);
            assert_eq!(outcome.result.attempts, 3);
        }
        assert_eq!(audio.calls(), 9);
    }

    #[tokio::test]
    async fn test_exhausted_slot_is_missing_not_fatal() {
        let audio = Arc::new(FakeAudio::narrator().with_failing_calls(3));
        let outcomes = pipeline(audio.clone()).run(&narrative()).await;

        let missing = outcomes.iter().filter(|o| o.result.value.is_none()).count();
        assert_eq!(missing, 1);
        assert_eq!(audio.calls(), 5);
    }
}
