//! WAV encoding and decoding.
//!
//! Everything written by Storyteller is 16-bit mono PCM. Reading accepts any
//! integer or float WAV and mixes multi-channel audio down to mono.

use super::assembler::quantize;
use super::AudioBuffer;
use crate::error::{Result, StoryError};
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use std::io::{Cursor, Read, Seek, Write};
use std::path::Path;
use tracing::debug;

/// Decode WAV bytes (as returned by a synthesis service) into a mono buffer.
pub fn decode_wav(bytes: &[u8]) -> Result<AudioBuffer> {
    let reader = WavReader::new(Cursor::new(bytes))?;
    read_samples(reader)
}

/// Load a WAV file into a mono buffer.
pub fn read_wav(path: &Path) -> Result<AudioBuffer> {
    let reader = WavReader::open(path)?;
    let buffer = read_samples(reader)?;
    debug!(
        "Loaded {} ({} Hz, {} samples)",
        path.display(),
        buffer.sample_rate,
        buffer.samples.len()
    );
    Ok(buffer)
}

fn read_samples<R: Read>(mut reader: WavReader<R>) -> Result<AudioBuffer> {
    let spec = reader.spec();
    if spec.channels == 0 {
        return Err(StoryError::Audio("WAV declares zero channels".to_string()));
    }

    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<std::result::Result<_, _>>()?,
        SampleFormat::Int => {
            let scale = (1i64 << spec.bits_per_sample.saturating_sub(1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<std::result::Result<_, _>>()?
        }
    };

    let channels = spec.channels as usize;
    let samples = if channels == 1 {
        interleaved
    } else {
        interleaved
            .chunks(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
            .collect()
    };

    Ok(AudioBuffer::new(spec.sample_rate, samples))
}

/// Write already-quantized samples as 16-bit mono PCM.
pub(crate) fn write_pcm16<W: Write + Seek>(writer: W, sample_rate: u32, pcm: &[i16]) -> Result<()> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::new(writer, spec)?;
    for sample in pcm {
        writer.write_sample(*sample)?;
    }
    writer.finalize()?;
    Ok(())
}

fn to_pcm16(buffer: &AudioBuffer) -> Vec<i16> {
    buffer.samples.iter().map(|s| quantize(*s)).collect()
}

/// Encode a buffer as 16-bit mono WAV bytes.
pub fn encode_wav(buffer: &AudioBuffer) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    write_pcm16(Cursor::new(&mut bytes), buffer.sample_rate, &to_pcm16(buffer))?;
    Ok(bytes)
}

/// Write a buffer to disk as a 16-bit mono WAV file.
pub fn write_wav(path: &Path, buffer: &AudioBuffer) -> Result<()> {
    let file = std::io::BufWriter::new(std::fs::File::create(path)?);
    write_pcm16(file, buffer.sample_rate, &to_pcm16(buffer))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_keeps_rate_and_length() {
        let buffer = AudioBuffer::new(32000, vec![0.0, 0.25, -0.25, 0.5]);
        let bytes = encode_wav(&buffer).unwrap();
        let decoded = decode_wav(&bytes).unwrap();

        assert_eq!(decoded.sample_rate, 32000);
        assert_eq!(decoded.samples.len(), 4);
        assert!((decoded.samples[3] - 0.5).abs() < 1e-3);
    }

    #[test]
    fn test_stereo_is_mixed_down() {
        let spec = WavSpec {
            channels: 2,
            sample_rate: 8000,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        };
        let mut bytes = Vec::new();
        {
            let mut writer = WavWriter::new(Cursor::new(&mut bytes), spec).unwrap();
            for s in [0.5f32, -0.5, 1.0, 0.0] {
                writer.write_sample(s).unwrap();
            }
            writer.finalize().unwrap();
        }

        let decoded = decode_wav(&bytes).unwrap();
        assert_eq!(decoded.samples, vec![0.0, 0.5]);
    }

    #[test]
    fn test_garbage_bytes_are_rejected() {
        assert!(decode_wav(b"definitely not a wav file").is_err());
    }

    #[test]
    fn test_write_and_read_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.wav");
        let buffer = AudioBuffer::new(44100, vec![0.1; 441]);

        write_wav(&path, &buffer).unwrap();
        let loaded = read_wav(&path).unwrap();

        assert_eq!(loaded.sample_rate, 44100);
        assert_eq!(loaded.samples.len(), 441);
    }
}
