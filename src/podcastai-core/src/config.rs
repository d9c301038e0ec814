//! Configuration module for loading TOML config files.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::assembler::SilenceRange;
use crate::error::PodcastError;
use crate::speaker::{Role, Speaker};
use crate::topic::Topic;

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub voices: VoicesConfig,
    #[serde(default)]
    pub silence: SilenceConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub prompts: PromptsConfig,
}

/// Voice configuration for TTS.
#[derive(Debug, Clone, Deserialize)]
pub struct VoicesConfig {
    pub host_voice: String,
    pub guest_voice: String,
}

impl Default for VoicesConfig {
    fn default() -> Self {
        Self {
            host_voice: "bf_emma".to_string(),
            guest_voice: "bm_george".to_string(),
        }
    }
}

/// Bounds for the randomized pauses inserted between turns.
#[derive(Debug, Clone, Deserialize)]
pub struct SilenceConfig {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl Default for SilenceConfig {
    fn default() -> Self {
        Self {
            min_ms: 500,
            max_ms: 1500,
        }
    }
}

impl SilenceConfig {
    pub fn range(&self) -> SilenceRange {
        SilenceRange {
            min_ms: self.min_ms,
            max_ms: self.max_ms,
        }
    }
}

/// Where episode artifacts are written.
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("output"),
        }
    }
}

/// Prompt templates.
///
/// System prompt templates support the placeholders {name}, {personality},
/// {background}, {topic}, {topic_description} and {other_name}.
#[derive(Debug, Clone, Deserialize)]
pub struct PromptsConfig {
    pub topic_prompt: String,
    pub guest_creation_prompt: String,
    pub host_system: String,
    pub guest_system: String,
}

impl Default for PromptsConfig {
    fn default() -> Self {
        Self {
            topic_prompt: DEFAULT_TOPIC_PROMPT.to_string(),
            guest_creation_prompt: DEFAULT_GUEST_CREATION_PROMPT.to_string(),
            host_system: DEFAULT_HOST_SYSTEM.to_string(),
            guest_system: DEFAULT_GUEST_SYSTEM.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, PodcastError> {
        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| PodcastError::Config(format!("Failed to read config: {}", e)))?;

        Self::from_str(&content)
    }

    /// Load configuration from string content.
    pub fn from_str(content: &str) -> Result<Self, PodcastError> {
        toml::from_str(content)
            .map_err(|e| PodcastError::Config(format!("Failed to parse config: {}", e)))
    }

    /// Check cross-field constraints that serde cannot express.
    pub fn validate(&self) -> Result<(), PodcastError> {
        if self.silence.min_ms >= self.silence.max_ms {
            return Err(PodcastError::Config(format!(
                "silence.min_ms ({}) must be less than silence.max_ms ({})",
                self.silence.min_ms, self.silence.max_ms
            )));
        }
        Ok(())
    }

    /// Get the system prompt for a speaker's turn, with placeholders replaced.
    pub fn system_prompt_for(&self, speaker: &Speaker, other: &Speaker, topic: &Topic) -> String {
        let template = match speaker.role {
            Role::Host => &self.prompts.host_system,
            Role::Guest => &self.prompts.guest_system,
        };

        template
            .replace("{name}", &speaker.name)
            .replace("{personality}", &speaker.personality)
            .replace("{background}", &speaker.background)
            .replace("{topic}", &topic.title)
            .replace("{topic_description}", &topic.description)
            .replace("{other_name}", &other.name)
    }

    /// Get the guest-creation prompt for a topic, with placeholders replaced.
    pub fn guest_creation_prompt(&self, topic: &Topic) -> String {
        self.prompts
            .guest_creation_prompt
            .replace("{topic}", &topic.title)
            .replace("{topic_description}", &topic.description)
    }

    /// Get the voice ID for a speaker role.
    pub fn voice_for_role(&self, role: Role) -> &str {
        match role {
            Role::Host => &self.voices.host_voice,
            Role::Guest => &self.voices.guest_voice,
        }
    }
}

/// Default configuration embedded in the binary.
pub fn default_config() -> Config {
    Config {
        voices: VoicesConfig::default(),
        silence: SilenceConfig::default(),
        output: OutputConfig::default(),
        prompts: PromptsConfig::default(),
    }
}

const DEFAULT_TOPIC_PROMPT: &str = r#"Generate an interesting topic for an intellectual discussion podcast. The topic should be thought-provoking and suitable for a 20-30 minute conversation between a curious host and an expert guest.

Respond with a JSON object of this exact shape and nothing else:
{"title": "Topic title", "description": "A paragraph describing the topic", "keywords": ["keyword1", "keyword2", "keyword3"]}
"#;

const DEFAULT_GUEST_CREATION_PROMPT: &str = r#"Create an expert guest for a podcast episode on the topic: '{topic}'

The topic is about: {topic_description}

Respond with a JSON object of this exact shape and nothing else:
{"name": "Full Name", "personality": "Brief personality description", "background": "Professional background and expertise relevant to the topic"}
"#;

const DEFAULT_HOST_SYSTEM: &str = r#"You are {name}, the host of an intellectual discussion podcast.

EPISODE TOPIC: {topic}
The topic is about: {topic_description}

ABOUT YOU: {personality}
YOUR BACKGROUND: {background}
YOUR GUEST: {other_name}

ROLE RULES:
- You have broad general knowledge but limited specialized expertise
- Ask thoughtful, probing questions and admit the limits of your own knowledge
- Build on what your guest says and keep the conversation moving forward
- Do NOT acknowledge being an AI - stay fully in character

CRITICAL OUTPUT RULES:
- Output ONLY your next spoken line - no scene directions or stage actions
- Do NOT include speaker labels, narration, or text in parentheses
- Do NOT include asterisks for emphasis or any markdown formatting
"#;

const DEFAULT_GUEST_SYSTEM: &str = r#"You are {name}, the guest expert on an intellectual discussion podcast.

EPISODE TOPIC: {topic}
The topic is about: {topic_description}

ABOUT YOU: {personality}
YOUR BACKGROUND: {background}
YOUR HOST: {other_name}

ROLE RULES:
- Provide detailed, substantive expert insight with specific examples and nuance
- Answer the host's questions directly and add depth from your own expertise
- Avoid generic or superficial content
- Do NOT acknowledge being an AI - stay fully in character

CRITICAL OUTPUT RULES:
- Output ONLY your next spoken line - no scene directions or stage actions
- Do NOT include speaker labels, narration, or text in parentheses
- Do NOT include asterisks for emphasis or any markdown formatting
"#;
