//! Storyteller CLI entry point.

use anyhow::Result;
use clap::Parser;
use storyteller::cli::{commands, Cli, Commands};
use storyteller::config::Settings;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config_path = cli
        .config
        .as_deref()
        .map(Settings::expand_path)
        .unwrap_or_else(Settings::default_config_path);
    let settings = Settings::load_from(Some(&config_path))?;

    // Initialize logging
    let log_level = match cli.verbose {
        0 => settings.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("storyteller={}", log_level)),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    // Execute command
    match &cli.command {
        Commands::Init => {
            commands::run_init(&settings, &config_path)?;
        }

        Commands::Doctor => {
            commands::run_doctor(&settings, &config_path).await?;
        }

        Commands::Generate {
            setting,
            characters,
            theme,
            print,
        } => {
            commands::run_generate(setting, characters, theme, *print, settings).await?;
        }

        Commands::Catalog => {
            commands::run_catalog(&settings)?;
        }

        Commands::Config { action } => {
            commands::run_config(action, settings, config_path.clone())?;
        }
    }

    Ok(())
}
