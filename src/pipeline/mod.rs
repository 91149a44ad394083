//! The three generation stages.
//!
//! Each stage pairs a collaborator with its validator and runs them through
//! [`run_with_retry`](crate::retry::run_with_retry). Narration and music run
//! their slots concurrently; the narrative stage writes its sections in order.

mod music;
mod narration;
mod narrative;

pub use music::{MusicOutcome, MusicPipeline};
pub use narration::{NarrationOutcome, NarrationPipeline};
pub use narrative::{NarrativeCandidate, NarrativePipeline};

#[cfg(test)]
pub(crate) mod fakes;
