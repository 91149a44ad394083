//! Doctor command - verify configuration and service reachability.

use crate::cli::preflight::check_url;
use crate::cli::Output;
use crate::config::{Catalog, Settings};
use console::style;
use std::path::Path;
use std::time::Duration;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

/// Run all diagnostic checks.
pub async fn run_doctor(settings: &Settings, config_path: &Path) -> anyhow::Result<()> {
    Output::header("Storyteller Doctor");
    println!();
    println!("Checking configuration and services...\n");

    let mut checks = Vec::new();

    println!("{}", style("Services").bold());
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()?;
    let services = [
        ("Story model", settings.llm.api_base.as_str(), "Start Ollama with: ollama serve"),
        ("Narration", settings.tts.url.as_str(), "Start the text-to-speech service or set tts.url"),
        ("Music", settings.music.url.as_str(), "Start the music service or set music.url"),
    ];
    for (name, url, hint) in services {
        let check = check_service(&client, name, url, hint).await;
        check.print();
        checks.push(check);
    }

    println!();

    println!("{}", style("Catalog").bold());
    let catalog_check = check_catalog(settings);
    catalog_check.print();
    checks.push(catalog_check);

    println!();

    println!("{}", style("Directories").bold());
    let dir_check = check_output_dir(&settings.output_dir());
    dir_check.print();
    checks.push(dir_check);

    println!();

    println!("{}", style("Configuration").bold());
    let config_check = check_config_file(config_path);
    config_check.print();
    checks.push(config_check);

    println!();

    // Summary
    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Please fix them before generating stories.",
            errors
        ));
        std::process::exit(1);
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed! Storyteller is ready to use.");
    }

    Ok(())
}

/// Any HTTP answer means the service is up; only connection failures count.
async fn check_service(client: &reqwest::Client, name: &str, url: &str, hint: &str) -> CheckResult {
    let parsed = match check_url(name, url) {
        Ok(parsed) => parsed,
        Err(e) => return CheckResult::error(name, &e.to_string(), "Fix the URL in your config"),
    };

    match client.get(parsed).send().await {
        Ok(response) => CheckResult::ok(name, &format!("{} ({})", url, response.status())),
        Err(e) if e.is_timeout() => CheckResult::warning(name, &format!("{} timed out", url), hint),
        Err(_) => CheckResult::error(name, &format!("{} unreachable", url), hint),
    }
}

fn check_catalog(settings: &Settings) -> CheckResult {
    let source = settings
        .catalog_path()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "built-in".to_string());

    match Catalog::load(settings.catalog_path().as_deref()) {
        Ok(catalog) => CheckResult::ok(
            "Catalog",
            &format!(
                "{} ({} settings, {} characters, {} themes)",
                source,
                catalog.settings.len(),
                catalog.characters.len(),
                catalog.themes.len()
            ),
        ),
        Err(e) => CheckResult::error(
            "Catalog",
            &e.to_string(),
            "Fix or remove general.catalog_path",
        ),
    }
}

fn check_output_dir(dir: &Path) -> CheckResult {
    if dir.exists() {
        let stories = std::fs::read_dir(dir.join("final_audio"))
            .map(|entries| entries.count())
            .unwrap_or(0);
        CheckResult::ok(
            "Output directory",
            &format!("{} ({} finished stories)", dir.display(), stories),
        )
    } else {
        CheckResult::warning(
            "Output directory",
            &format!("{} (will be created)", dir.display()),
            "Directory will be created on first use",
        )
    }
}

fn check_config_file(config_path: &Path) -> CheckResult {
    if config_path.exists() {
        CheckResult::ok("Config file", &format!("{}", config_path.display()))
    } else {
        CheckResult::warning(
            "Config file",
            "using defaults",
            "Create with: storyteller init (or storyteller config edit)",
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_result_ok() {
        let result = CheckResult::ok("test", "passed");
        assert_eq!(result.status, CheckStatus::Ok);
        assert!(result.hint.is_none());
    }

    #[test]
    fn test_check_result_error() {
        let result = CheckResult::error("test", "failed", "fix it");
        assert_eq!(result.status, CheckStatus::Error);
        assert_eq!(result.hint, Some("fix it".to_string()));
    }

    #[test]
    fn test_builtin_catalog_check_passes() {
        let result = check_catalog(&Settings::default());
        assert_eq!(result.status, CheckStatus::Ok);
        assert!(result.message.starts_with("built-in"));
    }

    #[test]
    fn test_missing_output_dir_is_warning() {
        let dir = tempfile::tempdir().unwrap();
        let result = check_output_dir(&dir.path().join("missing"));
        assert_eq!(result.status, CheckStatus::Warning);
    }

    #[tokio::test]
    async fn test_invalid_service_url_is_error() {
        let client = reqwest::Client::new();
        let result = check_service(&client, "Narration", "not a url", "hint").await;
        assert_eq!(result.status, CheckStatus::Error);
    }
}
