//! Init command - first-run setup.

use crate::cli::Output;
use crate::config::Settings;
use console::style;
use std::io::{self, Write};
use std::path::Path;

/// Write a default config and create the output directories.
pub fn run_init(settings: &Settings, config_path: &Path) -> anyhow::Result<()> {
    Output::header("Storyteller Setup");
    println!();

    println!("{}", style("Step 1: Output directories").bold().cyan());
    println!();

    for dir in [
        settings.stories_dir(),
        settings.narrations_dir(),
        settings.music_dir(),
        settings.final_audio_dir(),
    ] {
        if dir.exists() {
            Output::info(&format!("Exists: {}", dir.display()));
        } else {
            std::fs::create_dir_all(&dir)?;
            Output::success(&format!("Created: {}", dir.display()));
        }
    }

    println!();

    println!("{}", style("Step 2: Configuration file").bold().cyan());
    println!();

    if config_path.exists() {
        Output::info(&format!("Config file exists: {}", config_path.display()));
    } else if prompt_continue("Create default configuration file?")? {
        settings.save_to(&config_path.to_path_buf())?;
        Output::success(&format!("Created config file: {}", config_path.display()));
        println!();
        println!("  Edit your config with: {}", style("storyteller config edit").green());
    } else {
        Output::info("Skipped config file creation. Using defaults.");
    }

    println!();

    println!("{}", style("Setup Complete!").bold().green());
    println!();
    println!("Next steps:");
    println!(
        "  {} Check that the model and audio services are up",
        style("storyteller doctor").cyan()
    );
    println!("  {} See what stories you can make", style("storyteller catalog").cyan());
    println!(
        "  {} Make your first story",
        style("storyteller generate -s \"Magical Forest\" -p \"Brave Fox\" -t Friendship").cyan()
    );
    println!();

    Ok(())
}

/// Prompt user for yes/no confirmation.
fn prompt_continue(message: &str) -> io::Result<bool> {
    print!("{} {} ", style("?").cyan(), message);
    print!("{} ", style("[y/N]").dim());
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    Ok(is_yes(&input))
}

fn is_yes(input: &str) -> bool {
    matches!(input.trim().to_lowercase().as_str(), "y" | "yes")
}
