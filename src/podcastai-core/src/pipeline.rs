//! Pipeline coordination: topic -> dialogue -> synthesis -> assembly.
//!
//! Each stage depends on its predecessor's full output and the first failure
//! aborts the run; the error variant names the failed stage. Nothing is
//! persisted until assembly succeeds, so an aborted run leaves no partial
//! episode behind.

use chrono::Local;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::fs;
use std::path::PathBuf;

use crate::assembler::{AudioAssembler, EpisodeOutput};
use crate::config::Config;
use crate::dialogue::DialogueEngine;
use crate::error::PodcastError;
use crate::generation::TextGenerator;
use crate::speaker::{self, Role, Speaker};
use crate::topic;
use crate::tts::{SpeechSynthesizer, TurnSynthesizer};

/// Callback for run progress events.
pub type PodcastCallback = Box<dyn Fn(PodcastEvent) + Send + Sync>;

/// Events emitted while an episode is produced.
#[derive(Debug, Clone)]
pub enum PodcastEvent {
    /// The episode topic has been fixed.
    TopicSelected { title: String },
    /// The guest persona has been derived from the topic.
    GuestIntroduced { name: String, background: String },
    /// A speaker is about to produce their next turn.
    SpeakerStart { name: String, role: Role },
    /// A turn's text has been generated.
    UtteranceReady {
        name: String,
        text: String,
        turn_index: usize,
    },
    /// A turn is being synthesized to audio.
    SynthesisProgress { turn_index: usize, total: usize },
    /// The final artifacts have been written.
    EpisodeAssembled {
        audio_path: PathBuf,
        transcript_path: PathBuf,
    },
}

/// Drives one full episode run.
pub struct Pipeline {
    config: Config,
    generator: Box<dyn TextGenerator>,
    synthesizer: Box<dyn SpeechSynthesizer>,
    callback: Option<PodcastCallback>,
    seed: Option<u64>,
}

impl Pipeline {
    pub fn new(
        config: Config,
        generator: Box<dyn TextGenerator>,
        synthesizer: Box<dyn SpeechSynthesizer>,
    ) -> Self {
        Self {
            config,
            generator,
            synthesizer,
            callback: None,
            seed: None,
        }
    }

    /// Set a callback for run progress events.
    pub fn with_callback(mut self, callback: PodcastCallback) -> Self {
        self.callback = Some(callback);
        self
    }

    /// Seed the silence-gap randomization for reproducible pacing.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Produce one episode: select the topic, generate the dialogue,
    /// synthesize every turn, and assemble the final recording.
    pub async fn run(
        &mut self,
        turn_count: usize,
        topic_override: Option<&str>,
    ) -> Result<EpisodeOutput, PodcastError> {
        self.config.validate()?;

        let episode_id = generate_episode_id();
        let output_dir = self.config.output.dir.clone();
        fs::create_dir_all(&output_dir).map_err(|e| {
            PodcastError::Config(format!(
                "failed to create output directory {}: {}",
                output_dir.display(),
                e
            ))
        })?;

        // Stage 1: topic
        let topic = topic::select_topic(self.generator.as_ref(), &self.config, topic_override)
            .await?;
        self.emit(PodcastEvent::TopicSelected {
            title: topic.title.clone(),
        });

        // Stage 2: personas, then the turn-by-turn dialogue
        let host = Speaker::podcast_host(self.config.voices.host_voice.clone());
        let guest = speaker::generate_guest(self.generator.as_ref(), &self.config, &topic).await?;
        self.emit(PodcastEvent::GuestIntroduced {
            name: guest.name.clone(),
            background: guest.background.clone(),
        });

        let transcript = {
            let engine = DialogueEngine::new(
                self.generator.as_ref(),
                &self.config,
                self.callback.as_ref(),
            );
            engine.generate(&topic, &host, &guest, turn_count).await?
        };

        // Stage 3: one audio segment per utterance
        let total = transcript.turns.len();
        let mut segments = Vec::with_capacity(total);
        for utterance in &transcript.turns {
            self.emit(PodcastEvent::SynthesisProgress {
                turn_index: utterance.turn_index,
                total,
            });
            let mut synth = TurnSynthesizer::new(self.synthesizer.as_mut(), &self.config.voices);
            segments.push(synth.synthesize_turn(utterance)?);
        }

        // Stage 4: assembly and persistence
        let sample_rate = self.synthesizer.sample_rate();
        let rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut assembler = AudioAssembler::new(rng, self.config.silence.range(), sample_rate)?;

        let audio_path = output_dir.join(format!("{}.wav", episode_id));
        let transcript_path = output_dir.join(format!("{}_transcript.txt", episode_id));
        let output = assembler.assemble(segments, &transcript, &audio_path, &transcript_path)?;

        self.emit(PodcastEvent::EpisodeAssembled {
            audio_path: output.audio_path.clone(),
            transcript_path: output.transcript_path.clone(),
        });

        Ok(output)
    }

    fn emit(&self, event: PodcastEvent) {
        if let Some(ref callback) = self.callback {
            callback(event);
        }
    }
}

/// Timestamped run identifier; repeated runs land in distinct output slots.
fn generate_episode_id() -> String {
    format!("episode_{}", Local::now().format("%Y%m%d_%H%M%S"))
}
