//! Generate command implementation.

use crate::cli::preflight;
use crate::cli::{format_duration, Output};
use crate::config::{Catalog, Settings};
use crate::error::StoryError;
use crate::orchestrator::Orchestrator;
use anyhow::Result;

/// Run the generate command.
pub async fn run_generate(
    setting: &str,
    characters: &[String],
    theme: &str,
    print: bool,
    settings: Settings,
) -> Result<()> {
    let catalog = Catalog::load(settings.catalog_path().as_deref())?;
    let request = match catalog.resolve(setting, characters, theme) {
        Ok(request) => request,
        Err(e) => {
            Output::error(&e.to_string());
            Output::info("Run 'storyteller catalog' to see the available choices.");
            return Err(e.into());
        }
    };

    if let Err(e) = preflight::check_generate(&settings) {
        Output::error(&e.to_string());
        Output::info("Run 'storyteller doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    Output::info(&format!(
        "Writing a {} story in {} with {}",
        request.theme.name,
        request.setting.name,
        request.character_names()
    ));

    let orchestrator = Orchestrator::new(settings)?;
    let spinner = Output::spinner("Writing, narrating, and scoring the story...");
    let result = orchestrator.generate(&request).await;
    spinner.finish_and_clear();

    let run = match result {
        Ok(run) => run,
        Err(e @ StoryError::StageExhausted { .. }) => {
            Output::error(&format!("No story could be generated: {}", e));
            Output::info("Try again, or relax the thresholds under [validation.text].");
            return Err(e.into());
        }
        Err(e @ StoryError::Assembly(_)) => {
            Output::error(&format!("Final audio could not be assembled: {}", e));
            return Err(e.into());
        }
        Err(e) => {
            Output::error(&e.to_string());
            return Err(e.into());
        }
    };

    for warning in &run.warnings {
        Output::warning(&format!("{} (replaced with silence)", warning));
    }

    if print {
        Output::header("Story");
        println!("\n{}\n", run.narrative.full_text());
    }

    Output::success("Story generated");
    Output::kv("Story", &run.story_path.display().to_string());
    Output::kv("Audio", &run.track.path.display().to_string());
    Output::kv("Duration", &format_duration(run.track.duration_seconds));
    Output::kv(
        "Readability",
        &format!(
            "ease {:.1}, grade {:.1}, {} words",
            run.metrics.reading_ease, run.metrics.grade_level, run.metrics.word_count
        ),
    );
    if run.narrative_attempts > 1 {
        Output::kv("Attempts", &run.narrative_attempts.to_string());
    }

    Ok(())
}
