//! PodcastAI Core Library
//!
//! Provides the podcast pipeline: topic selection, turn-based dialogue
//! generation, speech synthesis, and audio assembly.

pub mod assembler;
pub mod config;
pub mod dialogue;
pub mod error;
pub mod generation;
pub mod pipeline;
pub mod speaker;
pub mod topic;
pub mod tts;

pub use assembler::{AudioAssembler, EpisodeOutput, SilenceRange};
pub use config::{Config, default_config};
pub use dialogue::{DialogueEngine, Transcript, TurnState, Utterance};
pub use error::PodcastError;
pub use generation::{OpenAiGenerator, TextGenerator};
pub use pipeline::{Pipeline, PodcastCallback, PodcastEvent};
pub use speaker::{Role, Speaker};
pub use topic::Topic;
pub use tts::{AudioSegment, KokoroSynthesizer, SpeechSynthesizer, TurnSynthesizer};
