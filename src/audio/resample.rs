//! Sample rate conversion.

use super::AudioBuffer;
use crate::error::{Result, StoryError};
use rubato::{FftFixedIn, Resampler};
use tracing::debug;

/// Input block length handed to the FFT resampler.
const CHUNK: usize = 1024;
const SUB_CHUNKS: usize = 2;

/// Resample a buffer to `target_rate`.
///
/// The output length is exactly `round(len * target / source)` samples, so the
/// duration in seconds is preserved. The resampler's start-up delay is trimmed
/// and the tail is flushed with zero padding.
pub fn resample(buffer: &AudioBuffer, target_rate: u32) -> Result<AudioBuffer> {
    if buffer.sample_rate == target_rate {
        return Ok(buffer.clone());
    }
    if buffer.sample_rate == 0 || target_rate == 0 {
        return Err(StoryError::Audio(format!(
            "Cannot resample between {} Hz and {} Hz",
            buffer.sample_rate, target_rate
        )));
    }

    let ratio = target_rate as f64 / buffer.sample_rate as f64;
    let expected = (buffer.samples.len() as f64 * ratio).round() as usize;
    if expected == 0 {
        return Ok(AudioBuffer::new(target_rate, Vec::new()));
    }

    debug!(
        "Resampling {} samples from {} Hz to {} Hz",
        buffer.samples.len(),
        buffer.sample_rate,
        target_rate
    );

    let mut resampler = FftFixedIn::<f32>::new(
        buffer.sample_rate as usize,
        target_rate as usize,
        CHUNK,
        SUB_CHUNKS,
        1,
    )
    .map_err(|e| StoryError::Audio(format!("Failed to create resampler: {}", e)))?;

    let delay = resampler.output_delay();
    let chunk = resampler.input_frames_next();
    let mut block = vec![0.0f32; chunk];
    let mut out = Vec::with_capacity(expected + delay + chunk);
    let mut pos = 0;

    while out.len() < expected + delay {
        block.fill(0.0);
        if pos < buffer.samples.len() {
            let end = (pos + chunk).min(buffer.samples.len());
            block[..end - pos].copy_from_slice(&buffer.samples[pos..end]);
        }
        pos += chunk;

        let frames = resampler
            .process(&[&block], None)
            .map_err(|e| StoryError::Audio(format!("Resampling failed: {}", e)))?;
        out.extend_from_slice(&frames[0]);
    }

    out.drain(..delay);
    out.truncate(expected);

    Ok(AudioBuffer::new(target_rate, out))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(rate: u32, seconds: f64, freq: f32) -> AudioBuffer {
        let len = (rate as f64 * seconds) as usize;
        let samples = (0..len)
            .map(|i| 0.5 * (2.0 * std::f32::consts::PI * freq * i as f32 / rate as f32).sin())
            .collect();
        AudioBuffer::new(rate, samples)
    }

    #[test]
    fn test_upsample_preserves_duration() {
        let input = sine(22050, 1.5, 440.0);
        let output = resample(&input, 44100).unwrap();

        assert_eq!(output.sample_rate, 44100);
        assert!((output.duration_seconds() - input.duration_seconds()).abs() < 0.01);
        assert!(output.peak() > 0.3 && output.peak() < 0.7);
    }

    #[test]
    fn test_music_rate_to_narration_rate() {
        let input = sine(32000, 2.0, 220.0);
        let output = resample(&input, 44100).unwrap();
        assert!((output.duration_seconds() - 2.0).abs() < 0.01);
    }

    #[test]
    fn test_same_rate_is_identity() {
        let input = sine(44100, 0.1, 440.0);
        assert_eq!(resample(&input, 44100).unwrap(), input);
    }

    #[test]
    fn test_resampling_is_deterministic() {
        let input = sine(22050, 0.5, 330.0);
        let a = resample(&input, 44100).unwrap();
        let b = resample(&input, 44100).unwrap();
        assert_eq!(a, b);
    }
}
