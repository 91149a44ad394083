//! Narration and music clip validators.

use super::ValidationReport;
use crate::audio::AudioBuffer;
use serde::{Deserialize, Serialize};

/// Acceptance thresholds for narration audio.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NarrationThresholds {
    /// Minimum RMS loudness (inclusive).
    pub min_rms: f32,
    /// Minimum duration in seconds (inclusive).
    pub min_duration_seconds: f64,
    /// Required sample rate. Must match exactly.
    pub sample_rate: u32,
}

impl Default for NarrationThresholds {
    fn default() -> Self {
        Self {
            min_rms: 0.02,
            min_duration_seconds: 10.0,
            sample_rate: 44100,
        }
    }
}

/// Acceptance thresholds for music clips.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MusicThresholds {
    /// Peak amplitude must be strictly greater than this.
    pub min_peak: f32,
    /// Required sample rate. Must match exactly.
    pub sample_rate: u32,
}

impl Default for MusicThresholds {
    fn default() -> Self {
        Self {
            min_peak: 0.2,
            sample_rate: 32000,
        }
    }
}

/// Accepts iff RMS >= min, duration >= min, and the sample rate matches exactly.
pub fn validate_narration(
    buffer: &AudioBuffer,
    thresholds: &NarrationThresholds,
) -> ValidationReport {
    let rms = buffer.rms();
    let duration = buffer.duration_seconds();

    ValidationReport::new()
        .check(
            "rms",
            format!("{:.4}", rms),
            format!(">= {}", thresholds.min_rms),
            rms >= thresholds.min_rms,
        )
        .check(
            "duration",
            format!("{:.2}s", duration),
            format!(">= {}s", thresholds.min_duration_seconds),
            duration >= thresholds.min_duration_seconds,
        )
        .check(
            "sample_rate",
            format!("{} Hz", buffer.sample_rate),
            format!("== {} Hz", thresholds.sample_rate),
            buffer.sample_rate == thresholds.sample_rate,
        )
}

/// Accepts iff peak > min and the sample rate matches exactly.
pub fn validate_music(buffer: &AudioBuffer, thresholds: &MusicThresholds) -> ValidationReport {
    let peak = buffer.peak();

    ValidationReport::new()
        .check(
            "peak_amplitude",
            format!("{:.4}", peak),
            format!("> {}", thresholds.min_peak),
            peak > thresholds.min_peak,
        )
        .check(
            "sample_rate",
            format!("{} Hz", buffer.sample_rate),
            format!("== {} Hz", thresholds.sample_rate),
            buffer.sample_rate == thresholds.sample_rate,
        )
}
