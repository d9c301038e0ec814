//! Podcast persona definitions.
//!
//! The host is a fixed persona with broad general knowledge; the guest is an
//! expert persona derived from the episode topic at the start of a run.

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::PodcastError;
use crate::generation::TextGenerator;
use crate::topic::Topic;

/// Role of a speaker in the episode.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Broad-but-shallow generalist driving the interview.
    Host,
    /// Topic expert answering the host's questions.
    Guest,
}

impl Role {
    pub fn display_name(&self) -> &str {
        match self {
            Role::Host => "HOST",
            Role::Guest => "GUEST",
        }
    }
}

/// A speaker in the podcast episode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Speaker {
    pub role: Role,
    /// Display name for this speaker.
    pub name: String,
    /// Short personality description used in prompts.
    pub personality: String,
    /// Professional background used in prompts.
    pub background: String,
    /// Voice ID for TTS.
    pub voice_id: String,
}

/// Shape of the guest profile requested from the text generator.
#[derive(Debug, Deserialize)]
struct GuestProfile {
    name: String,
    personality: String,
    background: String,
}

impl Speaker {
    /// The fixed host persona, identical across runs.
    pub fn podcast_host(voice_id: impl Into<String>) -> Self {
        Self {
            role: Role::Host,
            name: "Alex Morgan".to_string(),
            personality: "Curious, intellectually engaged, and thoughtful. \
                          Asks probing questions but admits knowledge limitations."
                .to_string(),
            background: "Liberal arts background with broad general knowledge \
                         but limited specialized expertise."
                .to_string(),
            voice_id: voice_id.into(),
        }
    }

    /// Deterministic expert persona used when guest generation returns
    /// something we cannot parse.
    pub fn fallback_guest(topic: &Topic, voice_id: impl Into<String>) -> Self {
        let field = topic
            .keywords
            .first()
            .cloned()
            .unwrap_or_else(|| topic.title.clone());

        Self {
            role: Role::Guest,
            name: "Dr. Jamie Reynolds".to_string(),
            personality: "Articulate, thoughtful, and passionate about their field of expertise."
                .to_string(),
            background: format!("Leading researcher and author in the field of {}", field),
            voice_id: voice_id.into(),
        }
    }
}

const GUEST_SYSTEM: &str = "You are an expert at creating realistic podcast guest personas.";
const GUEST_MAX_TOKENS: u32 = 300;

/// Derive the guest expert persona from the episode topic.
///
/// A collaborator failure is fatal; a malformed profile falls back to the
/// deterministic default expert.
pub async fn generate_guest(
    generator: &dyn TextGenerator,
    config: &Config,
    topic: &Topic,
) -> Result<Speaker, PodcastError> {
    let prompt = config.guest_creation_prompt(topic);
    let response = generator
        .complete(GUEST_SYSTEM, &prompt, GUEST_MAX_TOKENS)
        .await?;

    let voice_id = config.voices.guest_voice.clone();
    match serde_json::from_str::<GuestProfile>(response.trim()) {
        Ok(profile) => Ok(Speaker {
            role: Role::Guest,
            name: profile.name,
            personality: profile.personality,
            background: profile.background,
            voice_id,
        }),
        Err(_) => Ok(Speaker::fallback_guest(topic, voice_id)),
    }
}
