//! CLI module for Storyteller.

pub mod commands;
mod output;
pub mod preflight;

pub use output::{format_duration, Output};

use clap::{Parser, Subcommand};

/// Storyteller - narrated bedtime stories with background music
///
/// Pick a setting, up to three characters, and a theme. Storyteller writes the
/// story with a local LLM, narrates it, scores it, and mixes everything into
/// one WAV file.
#[derive(Parser, Debug)]
#[command(name = "storyteller")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a default configuration file and create output directories
    Init,

    /// Check configuration and reachability of the generation services
    Doctor,

    /// Generate a narrated story with background music
    Generate {
        /// Story setting (see `storyteller catalog`)
        #[arg(short, long)]
        setting: String,

        /// Character to feature (repeat for up to three)
        #[arg(short = 'p', long = "character", required = true)]
        characters: Vec<String>,

        /// Story theme
        #[arg(short, long)]
        theme: String,

        /// Print the story text when done
        #[arg(long)]
        print: bool,
    },

    /// List available settings, characters, and themes
    Catalog,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}
