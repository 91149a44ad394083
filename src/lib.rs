//! Storyteller - narrated children's stories with background music
//!
//! A local-first CLI tool that turns a setting, a few characters, and a theme
//! into a finished audio story.
//!
//! # Overview
//!
//! Generative models are unreliable, so every stage follows the same loop:
//! generate a candidate, validate it, and retry or give up after a fixed
//! number of attempts.
//!
//! - The story is written by an LLM in three parts and checked for
//!   readability, length, and prohibited content
//! - Each part is narrated by a text-to-speech service and checked for
//!   loudness, length, and sample rate
//! - Four music cues are composed for the setting and checked for level and
//!   sample rate
//! - Everything is mixed into one normalized 16-bit WAV file, with silence
//!   standing in for any slot that never produced usable audio
//!
//! # Architecture
//!
//! - `config` - Settings, prompt templates, and the story catalog
//! - `story` - Story requests and accepted narratives
//! - `validation` - Acceptance checks for text and audio
//! - `retry` - The generate, validate, retry loop
//! - `generation` - LLM, speech, and music collaborators
//! - `pipeline` - The narrative, narration, and music stages
//! - `audio` - Buffers, WAV I/O, resampling, and final assembly
//! - `orchestrator` - Runs the stages and writes every artifact
//!
//! # Example
//!
//! ```rust,no_run
//! use storyteller::config::{Catalog, Settings};
//! use storyteller::orchestrator::Orchestrator;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let catalog = Catalog::builtin()?;
//!     let request = catalog.resolve(
//!         "Magical Forest",
//!         &["Brave Fox".to_string(), "Wise Owl".to_string()],
//!         "Friendship",
//!     )?;
//!
//!     let orchestrator = Orchestrator::new(settings)?;
//!     let run = orchestrator.generate(&request).await?;
//!     println!("Saved {} ({:.1}s)", run.track.path.display(), run.track.duration_seconds);
//!
//!     Ok(())
//! }
//! ```

pub mod audio;
pub mod cli;
pub mod config;
pub mod error;
pub mod generation;
pub mod openai;
pub mod orchestrator;
pub mod pipeline;
pub mod retry;
pub mod story;
pub mod validation;

pub use error::{Result, StoryError};
