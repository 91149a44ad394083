//! Audio buffers and processing utilities.
//!
//! This module holds the in-memory [`AudioBuffer`] shared by every audio stage,
//! WAV encoding/decoding, resampling, and the final track assembler.

mod assembler;
mod resample;
mod wav;

pub use assembler::{
    normalize_peak, quantize, AssembledTrack, AssemblyInputs, AssemblyPlan, AudioAssembler,
    PlanSlot, RenderedMix, SlotSource, DEFAULT_FALLBACK_SECONDS, DEFAULT_GAP_SECONDS,
};
pub use resample::resample;
pub use wav::{decode_wav, encode_wav, read_wav, write_wav};

/// Mono floating point audio at a fixed sample rate.
///
/// Samples are expected to lie in `[-1.0, 1.0]`, though intermediate mixes may
/// exceed that range until they are normalized.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    pub sample_rate: u32,
    pub samples: Vec<f32>,
}

impl AudioBuffer {
    pub fn new(sample_rate: u32, samples: Vec<f32>) -> Self {
        Self {
            sample_rate,
            samples,
        }
    }

    /// Zero-valued audio lasting `seconds` at `sample_rate`.
    pub fn silence(sample_rate: u32, seconds: f64) -> Self {
        let len = (seconds * sample_rate as f64) as usize;
        Self::new(sample_rate, vec![0.0; len])
    }

    /// Duration in seconds. Zero when the sample rate is zero.
    pub fn duration_seconds(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Root mean square loudness.
    pub fn rms(&self) -> f32 {
        if self.samples.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.samples.iter().map(|s| (*s as f64) * (*s as f64)).sum();
        (sum / self.samples.len() as f64).sqrt() as f32
    }

    /// Peak absolute amplitude.
    pub fn peak(&self) -> f32 {
        self.samples.iter().fold(0.0f32, |peak, s| peak.max(s.abs()))
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}
