//! Audio assembly: segments in, one timed episode recording out.
//!
//! Randomized-length silence is inserted between consecutive turns so the
//! pacing does not sound mechanical. The random source is injected so tests
//! can seed it.

use rand::Rng;
use std::fs;
use std::path::{Path, PathBuf};

use crate::dialogue::Transcript;
use crate::error::PodcastError;
use crate::tts::AudioSegment;

/// Bounds for one inter-turn pause, in milliseconds.
#[derive(Debug, Clone, Copy)]
pub struct SilenceRange {
    pub min_ms: u64,
    pub max_ms: u64,
}

/// The persisted artifacts of a successful run.
#[derive(Debug, Clone)]
pub struct EpisodeOutput {
    pub audio_path: PathBuf,
    pub transcript_path: PathBuf,
    pub duration_secs: f32,
}

/// Concatenates ordered segments with randomized gaps and writes the final
/// WAV plus the transcript artifact.
pub struct AudioAssembler<R: Rng> {
    rng: R,
    silence: SilenceRange,
    sample_rate: u32,
}

impl<R: Rng> AudioAssembler<R> {
    pub fn new(rng: R, silence: SilenceRange, sample_rate: u32) -> Result<Self, PodcastError> {
        if silence.min_ms >= silence.max_ms {
            return Err(PodcastError::Assembly(format!(
                "silence range is empty: {}ms..{}ms",
                silence.min_ms, silence.max_ms
            )));
        }
        if sample_rate == 0 {
            return Err(PodcastError::Assembly(
                "sample rate must be non-zero".to_string(),
            ));
        }
        Ok(Self {
            rng,
            silence,
            sample_rate,
        })
    }

    /// Assemble the episode. Segments may arrive in any order (synthesis can
    /// be parallelized); they are re-sorted by turn index and verified to be
    /// contiguous from 0. On any write failure, partial artifacts are removed
    /// before the error is returned.
    pub fn assemble(
        &mut self,
        mut segments: Vec<AudioSegment>,
        transcript: &Transcript,
        audio_path: &Path,
        transcript_path: &Path,
    ) -> Result<EpisodeOutput, PodcastError> {
        if segments.is_empty() {
            return Err(PodcastError::Assembly(
                "no audio segments to assemble".to_string(),
            ));
        }

        segments.sort_by_key(|s| s.turn_index);
        for (i, segment) in segments.iter().enumerate() {
            if segment.turn_index != i {
                return Err(PodcastError::Assembly(format!(
                    "segment ordering broken: expected turn {}, found turn {}",
                    i, segment.turn_index
                )));
            }
        }

        let mut combined: Vec<f32> = Vec::new();
        for (i, segment) in segments.iter().enumerate() {
            if i > 0 {
                let gap_ms = self.rng.gen_range(self.silence.min_ms..=self.silence.max_ms);
                let gap_samples = (gap_ms * self.sample_rate as u64 / 1000) as usize;
                combined.extend(std::iter::repeat(0.0).take(gap_samples));
            }
            combined.extend_from_slice(&segment.samples);
        }

        if let Err(e) = self.write_wav(audio_path, &combined) {
            let _ = fs::remove_file(audio_path);
            return Err(e);
        }

        if let Err(e) = fs::write(transcript_path, transcript.render()) {
            let _ = fs::remove_file(audio_path);
            let _ = fs::remove_file(transcript_path);
            return Err(PodcastError::Assembly(format!(
                "failed to write transcript: {}",
                e
            )));
        }

        Ok(EpisodeOutput {
            audio_path: audio_path.to_path_buf(),
            transcript_path: transcript_path.to_path_buf(),
            duration_secs: combined.len() as f32 / self.sample_rate as f32,
        })
    }

    fn write_wav(&self, path: &Path, samples: &[f32]) -> Result<(), PodcastError> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let mut writer = hound::WavWriter::create(path, spec)
            .map_err(|e| PodcastError::Assembly(format!("failed to create WAV: {}", e)))?;

        for &sample in samples {
            let scaled = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
            writer
                .write_sample(scaled)
                .map_err(|e| PodcastError::Assembly(format!("failed to write WAV: {}", e)))?;
        }

        writer
            .finalize()
            .map_err(|e| PodcastError::Assembly(format!("failed to finalize WAV: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::speaker::Role;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const RATE: u32 = 24_000;

    fn segment(turn_index: usize, n_samples: usize) -> AudioSegment {
        let speaker = if turn_index % 2 == 0 {
            Role::Host
        } else {
            Role::Guest
        };
        AudioSegment {
            turn_index,
            speaker,
            samples: vec![0.25; n_samples],
            duration_secs: n_samples as f32 / RATE as f32,
        }
    }

    fn transcript(n: usize) -> Transcript {
        Transcript {
            topic_title: "Artificial Intelligence Ethics".to_string(),
            host_name: "Alex Morgan".to_string(),
            guest_name: "Dr. Jamie Reynolds".to_string(),
            turns: (0..n)
                .map(|i| crate::dialogue::Utterance {
                    speaker: if i % 2 == 0 { Role::Host } else { Role::Guest },
                    text: format!("Line {}.", i),
                    turn_index: i,
                })
                .collect(),
        }
    }

    fn assembler(seed: u64) -> AudioAssembler<StdRng> {
        AudioAssembler::new(
            StdRng::seed_from_u64(seed),
            SilenceRange {
                min_ms: 500,
                max_ms: 1500,
            },
            RATE,
        )
        .unwrap()
    }

    fn wav_sample_count(path: &Path) -> usize {
        hound::WavReader::open(path).unwrap().len() as usize
    }

    #[test]
    fn test_gap_count_and_bounds() {
        let dir = tempfile::tempdir().unwrap();
        let audio = dir.path().join("episode.wav");
        let text = dir.path().join("episode_transcript.txt");

        let segments: Vec<_> = (0..4).map(|i| segment(i, 1000)).collect();
        let mut asm = assembler(7);
        let output = asm.assemble(segments, &transcript(4), &audio, &text).unwrap();

        // 4 segments of 1000 samples plus 3 gaps of 500..=1500ms each
        let total = wav_sample_count(&audio);
        let min_gap = (500 * RATE as usize) / 1000;
        let max_gap = (1500 * RATE as usize) / 1000;
        assert!(total >= 4000 + 3 * min_gap);
        assert!(total <= 4000 + 3 * max_gap);
        assert!((output.duration_secs - total as f32 / RATE as f32).abs() < 1e-6);
    }

    #[test]
    fn test_single_segment_has_no_gap() {
        let dir = tempfile::tempdir().unwrap();
        let audio = dir.path().join("episode.wav");
        let text = dir.path().join("episode_transcript.txt");

        let mut asm = assembler(7);
        asm.assemble(vec![segment(0, 2400)], &transcript(1), &audio, &text)
            .unwrap();

        assert_eq!(wav_sample_count(&audio), 2400);
    }

    #[test]
    fn test_out_of_order_segments_are_resorted() {
        let dir = tempfile::tempdir().unwrap();
        let audio = dir.path().join("episode.wav");
        let text = dir.path().join("episode_transcript.txt");

        // Completion order differs from turn order
        let segments = vec![segment(2, 100), segment(0, 100), segment(1, 100)];
        let mut asm = assembler(11);
        let output = asm.assemble(segments, &transcript(3), &audio, &text);
        assert!(output.is_ok());
    }

    #[test]
    fn test_missing_turn_index_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let audio = dir.path().join("episode.wav");
        let text = dir.path().join("episode_transcript.txt");

        let segments = vec![segment(0, 100), segment(2, 100)];
        let mut asm = assembler(11);
        let result = asm.assemble(segments, &transcript(3), &audio, &text);
        assert!(matches!(result, Err(PodcastError::Assembly(_))));
        assert!(!audio.exists());
    }

    #[test]
    fn test_duplicate_turn_index_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let audio = dir.path().join("episode.wav");
        let text = dir.path().join("episode_transcript.txt");

        let segments = vec![segment(0, 100), segment(1, 100), segment(1, 100)];
        let mut asm = assembler(11);
        let result = asm.assemble(segments, &transcript(3), &audio, &text);
        assert!(matches!(result, Err(PodcastError::Assembly(_))));
    }

    #[test]
    fn test_empty_segment_set_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let audio = dir.path().join("episode.wav");
        let text = dir.path().join("episode_transcript.txt");

        let mut asm = assembler(11);
        let result = asm.assemble(Vec::new(), &transcript(0), &audio, &text);
        assert!(matches!(result, Err(PodcastError::Assembly(_))));
    }

    #[test]
    fn test_same_seed_produces_identical_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let audio_a = dir.path().join("a.wav");
        let audio_b = dir.path().join("b.wav");
        let text_a = dir.path().join("a.txt");
        let text_b = dir.path().join("b.txt");

        let segments: Vec<_> = (0..5).map(|i| segment(i, 1234)).collect();

        assembler(42)
            .assemble(segments.clone(), &transcript(5), &audio_a, &text_a)
            .unwrap();
        assembler(42)
            .assemble(segments, &transcript(5), &audio_b, &text_b)
            .unwrap();

        assert_eq!(fs::read(&audio_a).unwrap(), fs::read(&audio_b).unwrap());
    }

    #[test]
    fn test_transcript_artifact_written_alongside_audio() {
        let dir = tempfile::tempdir().unwrap();
        let audio = dir.path().join("episode.wav");
        let text = dir.path().join("episode_transcript.txt");

        let segments: Vec<_> = (0..4).map(|i| segment(i, 100)).collect();
        assembler(3)
            .assemble(segments, &transcript(4), &audio, &text)
            .unwrap();

        let written = fs::read_to_string(&text).unwrap();
        assert!(written.contains("Title: Artificial Intelligence Ethics"));
        assert_eq!(written.matches("Line ").count(), 4);
    }

    #[test]
    fn test_unwritable_output_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        // Point the transcript at a path whose parent does not exist
        let audio = dir.path().join("episode.wav");
        let text = dir.path().join("missing").join("episode_transcript.txt");

        let segments: Vec<_> = (0..2).map(|i| segment(i, 100)).collect();
        let result = assembler(3).assemble(segments, &transcript(2), &audio, &text);

        assert!(matches!(result, Err(PodcastError::Assembly(_))));
        assert!(!audio.exists());
        assert!(!text.exists());
    }

    #[test]
    fn test_invalid_silence_range_rejected() {
        let result = AudioAssembler::new(
            StdRng::seed_from_u64(0),
            SilenceRange {
                min_ms: 900,
                max_ms: 300,
            },
            RATE,
        );
        assert!(matches!(result, Err(PodcastError::Assembly(_))));
    }
}
