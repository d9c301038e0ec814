//! Speech synthesis adapter built on kokoro-tiny.
//!
//! The pipeline talks to the narrow [`SpeechSynthesizer`] trait; the
//! [`TurnSynthesizer`] adapter maps speaker roles to voices and tags each
//! result with its turn index so assembly can re-order freely.

use kokoro_tiny::TtsEngine;

use crate::config::VoicesConfig;
use crate::dialogue::Utterance;
use crate::error::PodcastError;
use crate::speaker::Role;

/// Sample rate of the kokoro-tiny engine output.
pub const SAMPLE_RATE: u32 = 24_000;

/// Audio for one dialogue turn.
#[derive(Debug, Clone)]
pub struct AudioSegment {
    pub turn_index: usize,
    pub speaker: Role,
    /// Raw mono samples.
    pub samples: Vec<f32>,
    pub duration_secs: f32,
}

/// Narrow synthesis interface: one utterance's text in, samples out.
pub trait SpeechSynthesizer {
    fn synthesize(&mut self, text: &str, voice_id: &str) -> Result<Vec<f32>, PodcastError>;

    fn sample_rate(&self) -> u32;
}

/// Local TTS engine (downloads the model on first run).
pub struct KokoroSynthesizer {
    engine: TtsEngine,
    available_voices: Vec<String>,
}

impl KokoroSynthesizer {
    pub async fn new() -> Result<Self, PodcastError> {
        let engine = TtsEngine::new()
            .await
            .map_err(|e| PodcastError::Synthesis(format!("Failed to initialize TTS: {}", e)))?;

        let available_voices = engine.voices();

        Ok(Self {
            engine,
            available_voices,
        })
    }

    /// Get list of available voice IDs.
    pub fn available_voices(&self) -> &[String] {
        &self.available_voices
    }

    /// Validate that a voice ID exists.
    pub fn validate_voice(&self, voice_id: &str) -> Result<(), PodcastError> {
        if voice_id.is_empty() {
            return Err(PodcastError::Synthesis(format!(
                "Voice ID cannot be empty. Available voices:\n{}",
                self.format_available_voices()
            )));
        }

        if !self.available_voices.contains(&voice_id.to_string()) {
            return Err(PodcastError::Synthesis(format!(
                "Unknown voice '{}'. Available voices:\n{}",
                voice_id,
                self.format_available_voices()
            )));
        }

        Ok(())
    }

    /// Format English voices for display.
    pub fn format_available_voices(&self) -> String {
        let mut english_voices: Vec<&String> = self
            .available_voices
            .iter()
            .filter(|v| {
                v.starts_with("af_")
                    || v.starts_with("am_")
                    || v.starts_with("bf_")
                    || v.starts_with("bm_")
            })
            .collect();
        english_voices.sort();

        english_voices
            .iter()
            .map(|v| format!("  - {}", v))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl SpeechSynthesizer for KokoroSynthesizer {
    /// Synthesize in chunks: kokoro has a strict limit on text length, so
    /// long turns are split at sentence boundaries first.
    fn synthesize(&mut self, text: &str, voice_id: &str) -> Result<Vec<f32>, PodcastError> {
        self.validate_voice(voice_id)?;

        let chunks = split_into_chunks(text, 200);
        let mut all_samples = Vec::new();

        for chunk in chunks {
            if chunk.trim().is_empty() {
                continue;
            }

            let samples = self
                .engine
                .synthesize(&chunk, Some(voice_id))
                .map_err(|e| PodcastError::Synthesis(format!("Synthesis failed: {}", e)))?;

            all_samples.extend(samples);

            // 0.3s pause between chunks to prevent cutoff
            all_samples.extend(vec![0.0; 7200]);
        }

        // 0.5s trailing padding to prevent final cutoff
        all_samples.extend(vec![0.0; 12000]);

        Ok(all_samples)
    }

    fn sample_rate(&self) -> u32 {
        SAMPLE_RATE
    }
}

/// Maps each utterance to its role's voice and produces a tagged segment.
pub struct TurnSynthesizer<'a> {
    engine: &'a mut dyn SpeechSynthesizer,
    voices: &'a VoicesConfig,
}

impl<'a> TurnSynthesizer<'a> {
    pub fn new(engine: &'a mut dyn SpeechSynthesizer, voices: &'a VoicesConfig) -> Self {
        Self { engine, voices }
    }

    pub fn voice_for_role(&self, role: Role) -> &str {
        match role {
            Role::Host => &self.voices.host_voice,
            Role::Guest => &self.voices.guest_voice,
        }
    }

    /// Synthesize one utterance into an ordered segment. Empty text or an
    /// empty engine result is fatal to the run.
    pub fn synthesize_turn(&mut self, utterance: &Utterance) -> Result<AudioSegment, PodcastError> {
        if utterance.text.trim().is_empty() {
            return Err(PodcastError::Synthesis(format!(
                "turn {} has no text to synthesize",
                utterance.turn_index
            )));
        }

        let voice_id = self.voice_for_role(utterance.speaker).to_string();
        let samples = self.engine.synthesize(&utterance.text, &voice_id)?;

        if samples.is_empty() {
            return Err(PodcastError::Synthesis(format!(
                "engine returned no audio for turn {}",
                utterance.turn_index
            )));
        }

        let duration_secs = samples.len() as f32 / self.engine.sample_rate() as f32;

        Ok(AudioSegment {
            turn_index: utterance.turn_index,
            speaker: utterance.speaker,
            samples,
            duration_secs,
        })
    }
}

/// Split text into chunks that are safe for TTS synthesis, preferring
/// sentence boundaries and falling back to commas for run-on sentences.
fn split_into_chunks(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    let mut flush = |current: &mut String, chunks: &mut Vec<String>| {
        if !current.trim().is_empty() {
            chunks.push(current.trim().to_string());
        }
        current.clear();
    };

    for sentence in text.split_inclusive(&['.', '!', '?', ';'][..]) {
        let sentence = sentence.trim();
        if sentence.is_empty() {
            continue;
        }

        if current.len() + sentence.len() > max_chars {
            flush(&mut current, &mut chunks);

            if sentence.len() > max_chars {
                for part in sentence.split_inclusive(',') {
                    if current.len() + part.len() > max_chars {
                        flush(&mut current, &mut chunks);
                    }
                    current.push_str(part);
                    current.push(' ');
                }
            } else {
                current.push_str(sentence);
                current.push(' ');
            }
        } else {
            current.push_str(sentence);
            current.push(' ');
        }
    }

    flush(&mut current, &mut chunks);
    chunks
}
