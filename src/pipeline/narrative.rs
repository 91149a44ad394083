//! Story text stage.

use crate::config::Prompts;
use crate::error::Result;
use crate::generation::TextGenerator;
use crate::retry::{run_with_retry, RetryPolicy, Stage, StageResult};
use crate::story::{Narrative, StoryRequest};
use crate::validation::{TextMetrics, TextValidator};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, instrument};

/// One generated story with the metrics it was judged on.
#[derive(Debug, Clone)]
pub struct NarrativeCandidate {
    pub narrative: Narrative,
    pub metrics: TextMetrics,
}

/// Writes beginning, middle, and ending as one unit.
///
/// The middle prompt carries the beginning and the ending prompt carries
/// both, so a rejected story is always rewritten from the beginning.
pub struct NarrativePipeline {
    generator: Arc<dyn TextGenerator>,
    prompts: Prompts,
    validator: TextValidator,
    policy: RetryPolicy,
}

impl NarrativePipeline {
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        prompts: Prompts,
        validator: TextValidator,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            generator,
            prompts,
            validator,
            policy,
        }
    }

    #[instrument(
        skip(self, request),
        fields(setting = %request.setting.name, theme = %request.theme.name)
    )]
    pub async fn run(&self, request: &StoryRequest) -> StageResult<NarrativeCandidate> {
        let vars = request_variables(request);
        run_with_retry(
            Stage::Narrative,
            "story",
            self.policy,
            |_| self.write_story(&vars),
            |candidate| self.validator.judge(&candidate.metrics),
        )
        .await
    }

    async fn write_story(&self, base: &HashMap<String, String>) -> Result<NarrativeCandidate> {
        let story = &self.prompts.story;
        let mut vars = base.clone();

        let beginning = self
            .generator
            .complete(&self.prompts.render_with_custom(&story.beginning, &vars))
            .await?;
        debug!(words = beginning.split_whitespace().count(), "Wrote beginning");
        vars.insert("beginning".to_string(), beginning.clone());

        let middle = self
            .generator
            .complete(&self.prompts.render_with_custom(&story.middle, &vars))
            .await?;
        debug!(words = middle.split_whitespace().count(), "Wrote middle");
        vars.insert("middle".to_string(), middle.clone());

        let ending = self
            .generator
            .complete(&self.prompts.render_with_custom(&story.ending, &vars))
            .await?;
        debug!(words = ending.split_whitespace().count(), "Wrote ending");

        let narrative = Narrative::new(beginning, middle, ending);
        let metrics = self.validator.measure(&narrative.full_text());
        Ok(NarrativeCandidate { narrative, metrics })
    }
}

fn request_variables(request: &StoryRequest) -> HashMap<String, String> {
    let mut vars = HashMap::new();
    vars.insert("setting".to_string(), request.setting.name.clone());
    vars.insert(
        "setting_description".to_string(),
        request.setting.description.clone(),
    );
    vars.insert("characters".to_string(), request.character_names());
    vars.insert(
        "character_descriptions".to_string(),
        request.character_descriptions(),
    );
    vars.insert("theme".to_string(), request.theme.name.clone());
    vars.insert(
        "theme_description".to_string(),
        request.theme.description.clone(),
    );
    vars
}
