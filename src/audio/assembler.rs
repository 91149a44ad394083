//! Final track assembly.
//!
//! Merges the narration and music slots into one normalized 16-bit mono WAV
//! following the fixed [`AssemblyPlan`]. Missing or unreadable slots are
//! replaced with silence so assembly never blocks on a single bad input; only
//! the beginning narration is mandatory because it defines the target rate.

use super::wav::{read_wav, write_pcm16};
use super::{resample, AudioBuffer};
use crate::error::{Result, StoryError};
use crate::story::{MusicCue, SectionId};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

/// Default silence inserted between adjacent slots.
pub const DEFAULT_GAP_SECONDS: f64 = 0.5;

/// Default length of the silence substituted for a missing slot.
pub const DEFAULT_FALLBACK_SECONDS: f64 = 3.0;

/// One position in the assembly plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanSlot {
    Gap,
    Music(MusicCue),
    Narration(SectionId),
}

/// The fixed order in which slots are concatenated.
pub struct AssemblyPlan;

impl AssemblyPlan {
    pub const SLOTS: [PlanSlot; 15] = [
        PlanSlot::Gap,
        PlanSlot::Music(MusicCue::Opening),
        PlanSlot::Gap,
        PlanSlot::Narration(SectionId::Beginning),
        PlanSlot::Gap,
        PlanSlot::Music(MusicCue::Transition1),
        PlanSlot::Gap,
        PlanSlot::Narration(SectionId::Middle),
        PlanSlot::Gap,
        PlanSlot::Music(MusicCue::Transition2),
        PlanSlot::Gap,
        PlanSlot::Narration(SectionId::Ending),
        PlanSlot::Gap,
        PlanSlot::Music(MusicCue::Closing),
        PlanSlot::Gap,
    ];

    /// The seven non-gap slots, in plan order.
    pub fn content_slots() -> impl Iterator<Item = PlanSlot> {
        Self::SLOTS.into_iter().filter(|s| *s != PlanSlot::Gap)
    }
}

/// Where a slot's audio comes from.
#[derive(Debug, Clone, Default)]
pub enum SlotSource {
    /// The stage exhausted its attempts (or the audio was never persisted).
    #[default]
    Missing,
    /// A WAV file on disk. Unreadable files are treated as missing.
    File(PathBuf),
    /// An in-memory buffer.
    Buffer(AudioBuffer),
}

/// Sources for the seven content slots.
#[derive(Debug, Clone, Default)]
pub struct AssemblyInputs {
    narration: [SlotSource; 3],
    music: [SlotSource; 4],
}

impl AssemblyInputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_narration(&mut self, id: SectionId, source: SlotSource) {
        self.narration[id.index()] = source;
    }

    pub fn set_music(&mut self, cue: MusicCue, source: SlotSource) {
        self.music[cue.index()] = source;
    }

    pub fn with_narration(mut self, id: SectionId, source: SlotSource) -> Self {
        self.set_narration(id, source);
        self
    }

    pub fn with_music(mut self, cue: MusicCue, source: SlotSource) -> Self {
        self.set_music(cue, source);
        self
    }

    pub fn narration(&self, id: SectionId) -> &SlotSource {
        &self.narration[id.index()]
    }

    pub fn music(&self, cue: MusicCue) -> &SlotSource {
        &self.music[cue.index()]
    }
}

/// The normalized mix, before it is written to disk.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedMix {
    pub sample_rate: u32,
    /// Normalized float samples.
    pub samples: Vec<f32>,
    /// The same samples quantized to 16-bit.
    pub pcm: Vec<i16>,
    /// Peak absolute amplitude before normalization.
    pub peak_before: f32,
}

impl RenderedMix {
    pub fn duration_seconds(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

/// A final track written to disk.
#[derive(Debug, Clone)]
pub struct AssembledTrack {
    pub path: PathBuf,
    pub duration_seconds: f64,
    pub sample_rate: u32,
}

/// Assembles slot audio into the final track.
#[derive(Debug, Clone)]
pub struct AudioAssembler {
    output_dir: PathBuf,
    gap_seconds: f64,
    fallback_seconds: f64,
}

impl AudioAssembler {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            gap_seconds: DEFAULT_GAP_SECONDS,
            fallback_seconds: DEFAULT_FALLBACK_SECONDS,
        }
    }

    /// Override gap and fallback durations.
    pub fn with_timing(mut self, gap_seconds: f64, fallback_seconds: f64) -> Self {
        self.gap_seconds = gap_seconds;
        self.fallback_seconds = fallback_seconds;
        self
    }

    /// Build the normalized, quantized mix in memory.
    pub fn render(&self, inputs: &AssemblyInputs) -> Result<RenderedMix> {
        let beginning = match load_source(inputs.narration(SectionId::Beginning)) {
            Some(buffer) if buffer.sample_rate > 0 => buffer,
            _ => {
                return Err(StoryError::Assembly(
                    "beginning narration is unavailable, target sample rate is undefined"
                        .to_string(),
                ))
            }
        };
        let target_rate = beginning.sample_rate;
        info!("Using {} Hz as target sample rate for merging", target_rate);

        let gap_len = (self.gap_seconds * target_rate as f64) as usize;
        let mut mix: Vec<f32> = Vec::new();

        for slot in AssemblyPlan::SLOTS {
            match slot {
                PlanSlot::Gap => mix.extend(std::iter::repeat(0.0f32).take(gap_len)),
                PlanSlot::Narration(SectionId::Beginning) => {
                    mix.extend_from_slice(&beginning.samples)
                }
                PlanSlot::Narration(id) => {
                    let loaded = load_source(inputs.narration(id));
                    mix.extend_from_slice(&self.resolve(slot, loaded, target_rate)?.samples);
                }
                PlanSlot::Music(cue) => {
                    let loaded = load_source(inputs.music(cue));
                    mix.extend_from_slice(&self.resolve(slot, loaded, target_rate)?.samples);
                }
            }
        }

        let peak_before = normalize_peak(&mut mix);
        if peak_before > 1.0 {
            info!("Normalized mix to avoid clipping (peak before: {:.2})", peak_before);
        } else {
            info!("No normalization needed (peak: {:.2})", peak_before);
        }

        let pcm = mix.iter().map(|s| quantize(*s)).collect();

        Ok(RenderedMix {
            sample_rate: target_rate,
            samples: mix,
            pcm,
            peak_before,
        })
    }

    /// Bring one loaded content slot to the target rate, or substitute silence.
    fn resolve(
        &self,
        slot: PlanSlot,
        loaded: Option<AudioBuffer>,
        target_rate: u32,
    ) -> Result<AudioBuffer> {
        match loaded {
            Some(buffer) if buffer.sample_rate != target_rate => {
                warn!(
                    "Resampling {:?} from {} Hz to {} Hz",
                    slot, buffer.sample_rate, target_rate
                );
                resample(&buffer, target_rate).map_err(|e| {
                    StoryError::Assembly(format!("could not resample {:?}: {}", slot, e))
                })
            }
            Some(buffer) => Ok(buffer),
            None => {
                warn!(
                    "{:?} is missing, using {}s of silence instead",
                    slot, self.fallback_seconds
                );
                Ok(AudioBuffer::silence(target_rate, self.fallback_seconds))
            }
        }
    }

    /// Render the mix and write it as `final_story_audio_<timestamp>.wav`.
    ///
    /// The file is written to a temporary path first and only moved into place
    /// once complete, so a failure never leaves a partial track behind.
    #[instrument(skip(self, inputs))]
    pub fn assemble(&self, inputs: &AssemblyInputs, timestamp: &str) -> Result<AssembledTrack> {
        let mix = self.render(inputs)?;

        std::fs::create_dir_all(&self.output_dir)?;
        let path = self
            .output_dir
            .join(format!("final_story_audio_{}.wav", timestamp));

        let tmp = tempfile::NamedTempFile::new_in(&self.output_dir)?;
        write_pcm16(BufWriter::new(tmp.as_file()), mix.sample_rate, &mix.pcm)?;
        tmp.persist(&path).map_err(|e| StoryError::Io(e.error))?;

        let duration_seconds = mix.duration_seconds();
        info!(
            "Final combined audio saved at {} (duration: {:.2}s)",
            path.display(),
            duration_seconds
        );

        Ok(AssembledTrack {
            path,
            duration_seconds,
            sample_rate: mix.sample_rate,
        })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

/// Load a slot's audio. Missing sources and unreadable files both yield `None`.
fn load_source(source: &SlotSource) -> Option<AudioBuffer> {
    match source {
        SlotSource::Missing => None,
        SlotSource::Buffer(buffer) => Some(buffer.clone()),
        SlotSource::File(path) => match read_wav(path) {
            Ok(buffer) => Some(buffer),
            Err(e) => {
                warn!("Error reading WAV file {}: {}", path.display(), e);
                None
            }
        },
    }
}

/// Divide every sample by the peak if it exceeds 1.0. Returns the original peak.
///
/// Quiet mixes are never boosted.
pub fn normalize_peak(samples: &mut [f32]) -> f32 {
    let peak = samples.iter().fold(0.0f32, |peak, s| peak.max(s.abs()));
    if peak > 1.0 {
        for sample in samples.iter_mut() {
            *sample /= peak;
        }
    }
    peak
}

/// Convert a float sample to 16-bit by linear scaling with 32767.
pub fn quantize(sample: f32) -> i16 {
    (sample * 32767.0) as i16
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::write_wav;

    const RATE: u32 = 8000;

    fn constant(rate: u32, seconds: f64, value: f32) -> SlotSource {
        let len = (rate as f64 * seconds) as usize;
        SlotSource::Buffer(AudioBuffer::new(rate, vec![value; len]))
    }

    fn full_inputs() -> AssemblyInputs {
        AssemblyInputs::new()
            .with_narration(SectionId::Beginning, constant(RATE, 1.0, 0.25))
            .with_narration(SectionId::Middle, constant(RATE, 1.0, 0.25))
            .with_narration(SectionId::Ending, constant(RATE, 1.0, 0.25))
            .with_music(MusicCue::Opening, constant(RATE, 0.5, 0.5))
            .with_music(MusicCue::Transition1, constant(RATE, 0.5, 0.5))
            .with_music(MusicCue::Transition2, constant(RATE, 0.5, 0.5))
            .with_music(MusicCue::Closing, constant(RATE, 0.5, 0.5))
    }

    #[test]
    fn test_plan_has_seven_content_slots_between_gaps() {
        assert_eq!(AssemblyPlan::content_slots().count(), 7);
        for (i, slot) in AssemblyPlan::SLOTS.iter().enumerate() {
            assert_eq!(*slot == PlanSlot::Gap, i % 2 == 0);
        }
    }

    #[test]
    fn test_render_length_and_order() {
        let mix = AudioAssembler::new("unused").render(&full_inputs()).unwrap();

        // 8 gaps of 0.5s + 3 narrations of 1s + 4 cues of 0.5s
        assert_eq!(mix.samples.len(), 8 * 4000 + 3 * 8000 + 4 * 4000);
        assert_eq!(mix.sample_rate, RATE);
        // opening music sits right after the first gap
        assert_eq!(mix.samples[4000], 0.5);
        // beginning narration follows the second gap
        assert_eq!(mix.samples[4000 + 4000 + 4000], 0.25);
    }

    #[test]
    fn test_render_is_deterministic() {
        let assembler = AudioAssembler::new("unused");
        let inputs = full_inputs().with_music(MusicCue::Closing, SlotSource::Missing);

        let a = assembler.render(&inputs).unwrap();
        let b = assembler.render(&inputs).unwrap();
        assert_eq!(a.pcm.len(), b.pcm.len());
        assert_eq!(a, b);
    }

    #[test]
    fn test_missing_opening_becomes_three_seconds_of_silence() {
        let inputs = full_inputs().with_music(MusicCue::Opening, SlotSource::Missing);
        let mix = AudioAssembler::new("unused").render(&inputs).unwrap();

        let gap = 4000;
        let fallback = 3 * RATE as usize;
        assert_eq!(
            mix.samples.len(),
            8 * gap + fallback + 3 * 8000 + 3 * 4000
        );
        assert!(mix.samples[..gap + fallback + gap].iter().all(|s| *s == 0.0));
        // beginning narration is still in its place
        assert_eq!(mix.samples[gap + fallback + gap], 0.25);
    }

    #[test]
    fn test_missing_beginning_narration_fails() {
        let inputs = full_inputs().with_narration(SectionId::Beginning, SlotSource::Missing);
        let result = AudioAssembler::new("unused").render(&inputs);
        assert!(matches!(result, Err(StoryError::Assembly(_))));
    }

    #[test]
    fn test_beginning_file_fills_its_own_slot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("beginning.wav");
        write_wav(&path, &AudioBuffer::new(RATE, vec![0.25; 8000])).unwrap();

        let assembler = AudioAssembler::new("unused");
        let from_file = assembler
            .render(&full_inputs().with_narration(SectionId::Beginning, SlotSource::File(path)))
            .unwrap();
        let from_buffer = assembler.render(&full_inputs()).unwrap();

        assert_eq!(from_file.samples.len(), from_buffer.samples.len());
        for (a, b) in from_file.samples.iter().zip(&from_buffer.samples) {
            assert!((a - b).abs() < 1e-3);
        }
    }

    #[test]
    fn test_unreadable_file_falls_back_to_silence() {
        let dir = tempfile::tempdir().unwrap();
        let corrupt = dir.path().join("corrupt.wav");
        std::fs::write(&corrupt, b"not audio").unwrap();

        let inputs = full_inputs()
            .with_music(MusicCue::Transition1, SlotSource::File(corrupt))
            .with_music(
                MusicCue::Transition2,
                SlotSource::File(dir.path().join("does_not_exist.wav")),
            );
        let mix = AudioAssembler::new(dir.path()).render(&inputs).unwrap();

        assert_eq!(
            mix.samples.len(),
            8 * 4000 + 3 * 8000 + 2 * 4000 + 2 * 3 * 8000
        );
    }

    #[test]
    fn test_slots_are_resampled_to_narration_rate() {
        let inputs = full_inputs().with_music(MusicCue::Closing, constant(16000, 0.5, 0.5));
        let mix = AudioAssembler::new("unused").render(&inputs).unwrap();
        assert_eq!(mix.samples.len(), 8 * 4000 + 3 * 8000 + 4 * 4000);
    }

    #[test]
    fn test_normalize_leaves_quiet_audio_alone() {
        let mut samples = vec![0.1, -0.9, 1.0, 0.0];
        let original = samples.clone();
        let peak = normalize_peak(&mut samples);
        assert_eq!(peak, 1.0);
        assert_eq!(samples, original);
    }

    #[test]
    fn test_normalize_divides_by_peak() {
        let mut samples = vec![0.5, -4.0, 2.0, 1.0];
        let original = samples.clone();
        let peak = normalize_peak(&mut samples);

        assert_eq!(peak, 4.0);
        for (out, input) in samples.iter().zip(&original) {
            assert_eq!(*out, input / 4.0);
        }
        let post_peak = samples.iter().fold(0.0f32, |p, s| p.max(s.abs()));
        assert_eq!(post_peak, 1.0);
    }

    #[test]
    fn test_loud_mix_is_normalized() {
        let inputs = full_inputs().with_narration(SectionId::Middle, constant(RATE, 1.0, 2.0));
        let mix = AudioAssembler::new("unused").render(&inputs).unwrap();

        assert_eq!(mix.peak_before, 2.0);
        assert_eq!(mix.samples.iter().fold(0.0f32, |p, s| p.max(s.abs())), 1.0);
        assert_eq!(mix.pcm.iter().map(|s| s.unsigned_abs()).max(), Some(32767));
    }

    #[test]
    fn test_quantize_scales_by_32767() {
        assert_eq!(quantize(1.0), 32767);
        assert_eq!(quantize(-1.0), -32767);
        assert_eq!(quantize(0.0), 0);
        assert_eq!(quantize(0.5), 16383);
    }

    #[test]
    fn test_assemble_writes_final_track() {
        let dir = tempfile::tempdir().unwrap();
        let narration_path = dir.path().join("narration.wav");
        write_wav(&narration_path, &AudioBuffer::new(RATE, vec![0.25; 8000])).unwrap();

        let inputs =
            full_inputs().with_narration(SectionId::Beginning, SlotSource::File(narration_path));
        let assembler = AudioAssembler::new(dir.path().join("final"));
        let track = assembler.assemble(&inputs, "20250101_120000").unwrap();

        assert!(track
            .path
            .ends_with("final/final_story_audio_20250101_120000.wav"));
        assert_eq!(track.sample_rate, RATE);

        let written = read_wav(&track.path).unwrap();
        assert_eq!(written.samples.len(), 8 * 4000 + 3 * 8000 + 4 * 4000);
        assert!((track.duration_seconds - written.duration_seconds()).abs() < 1e-9);

        let leftovers = std::fs::read_dir(assembler.output_dir()).unwrap().count();
        assert_eq!(leftovers, 1);
    }
}
