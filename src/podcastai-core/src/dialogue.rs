//! Turn-taking dialogue engine.
//!
//! Alternates host and guest turns with an explicit state machine, requesting
//! one utterance per turn from the text generator. Each turn's prompt carries
//! the accumulated transcript so far, which stands in for conversational
//! memory without any external state.

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::PodcastError;
use crate::generation::TextGenerator;
use crate::pipeline::{PodcastCallback, PodcastEvent};
use crate::speaker::{Role, Speaker};
use crate::topic::Topic;

/// One spoken line in the episode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Utterance {
    pub speaker: Role,
    pub text: String,
    pub turn_index: usize,
}

/// The complete ordered dialogue for one episode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    pub topic_title: String,
    pub host_name: String,
    pub guest_name: String,
    pub turns: Vec<Utterance>,
}

impl Transcript {
    /// Speaker display name for an utterance.
    pub fn speaker_name(&self, utterance: &Utterance) -> &str {
        match utterance.speaker {
            Role::Host => &self.host_name,
            Role::Guest => &self.guest_name,
        }
    }

    /// Render the transcript as the plain-text companion artifact.
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("Title: {}\n", self.topic_title));
        out.push_str(&format!("Host: {}\n", self.host_name));
        out.push_str(&format!("Guest: {}\n\n", self.guest_name));

        for turn in &self.turns {
            out.push_str(&format!("{}: {}\n\n", self.speaker_name(turn), turn.text));
        }

        out
    }
}

/// Who speaks next. The host always opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    AwaitingHost,
    AwaitingGuest,
    Complete,
}

impl TurnState {
    /// Role due to speak, or `None` once the dialogue is complete.
    pub fn speaker(&self) -> Option<Role> {
        match self {
            TurnState::AwaitingHost => Some(Role::Host),
            TurnState::AwaitingGuest => Some(Role::Guest),
            TurnState::Complete => None,
        }
    }

    /// Advance after a successful turn. `completed` is the number of turns
    /// recorded so far.
    pub fn advance(self, completed: usize, turn_count: usize) -> TurnState {
        if completed >= turn_count {
            return TurnState::Complete;
        }
        match self {
            TurnState::AwaitingHost => TurnState::AwaitingGuest,
            TurnState::AwaitingGuest => TurnState::AwaitingHost,
            TurnState::Complete => TurnState::Complete,
        }
    }
}

const TURN_MAX_TOKENS: u32 = 400;

/// Generates the episode dialogue one turn at a time.
pub struct DialogueEngine<'a> {
    generator: &'a dyn TextGenerator,
    config: &'a Config,
    callback: Option<&'a PodcastCallback>,
}

impl<'a> DialogueEngine<'a> {
    pub fn new(
        generator: &'a dyn TextGenerator,
        config: &'a Config,
        callback: Option<&'a PodcastCallback>,
    ) -> Self {
        Self {
            generator,
            config,
            callback,
        }
    }

    /// Generate a transcript of exactly `turn_count` alternating turns,
    /// starting with the host. Empty or failed generation aborts the run;
    /// no partial transcript is returned.
    pub async fn generate(
        &self,
        topic: &Topic,
        host: &Speaker,
        guest: &Speaker,
        turn_count: usize,
    ) -> Result<Transcript, PodcastError> {
        if turn_count == 0 {
            return Err(PodcastError::Generation(
                "turn count must be at least 1".to_string(),
            ));
        }

        let mut turns: Vec<Utterance> = Vec::with_capacity(turn_count);
        let mut state = TurnState::AwaitingHost;

        while let Some(role) = state.speaker() {
            let turn_index = turns.len();
            let (speaker, other) = match role {
                Role::Host => (host, guest),
                Role::Guest => (guest, host),
            };

            self.emit(PodcastEvent::SpeakerStart {
                name: speaker.name.clone(),
                role,
            });

            let system = self.config.system_prompt_for(speaker, other, topic);
            let prompt = turn_prompt(topic, speaker, guest, &turns, host, turn_index, turn_count);

            let text = self
                .generator
                .complete(&system, &prompt, TURN_MAX_TOKENS)
                .await?;
            let text = text.trim().to_string();

            if text.is_empty() {
                return Err(PodcastError::Generation(format!(
                    "empty response for turn {} ({})",
                    turn_index, speaker.name
                )));
            }

            self.emit(PodcastEvent::UtteranceReady {
                name: speaker.name.clone(),
                text: text.clone(),
                turn_index,
            });

            turns.push(Utterance {
                speaker: role,
                text,
                turn_index,
            });

            state = state.advance(turns.len(), turn_count);
        }

        Ok(Transcript {
            topic_title: topic.title.clone(),
            host_name: host.name.clone(),
            guest_name: guest.name.clone(),
            turns,
        })
    }

    fn emit(&self, event: PodcastEvent) {
        if let Some(callback) = self.callback {
            callback(event);
        }
    }
}

/// Build the per-turn user prompt: accumulated transcript plus an
/// instruction matched to the speaker and position in the episode.
fn turn_prompt(
    topic: &Topic,
    speaker: &Speaker,
    guest: &Speaker,
    prior: &[Utterance],
    host: &Speaker,
    turn_index: usize,
    turn_count: usize,
) -> String {
    let mut prompt = String::new();

    if prior.is_empty() {
        prompt.push_str("The episode is just beginning.\n\n");
    } else {
        prompt.push_str("The conversation so far:\n\n");
        for turn in prior {
            let name = match turn.speaker {
                Role::Host => &host.name,
                Role::Guest => &guest.name,
            };
            prompt.push_str(&format!("{}: {}\n\n", name, turn.text));
        }
    }

    let last_turn = turn_index == turn_count - 1;
    let instruction = match (speaker.role, turn_index, last_turn) {
        (Role::Host, 0, _) => format!(
            "Open the episode: welcome the listeners, introduce the topic '{}' and your guest {}.",
            topic.title, guest.name
        ),
        (Role::Host, _, true) => format!(
            "This is the final turn of the episode. Thank {} and close the episode for the listeners.",
            guest.name
        ),
        (Role::Guest, _, true) => format!(
            "This is your final turn. Share your closing thoughts on {}.",
            topic.title
        ),
        (Role::Host, _, false) => {
            "Continue the interview with your next question or remark.".to_string()
        }
        (Role::Guest, _, false) => {
            "Respond to the host with detailed expert insight.".to_string()
        }
    };

    prompt.push_str(&instruction);
    prompt.push_str(&format!(
        "\n\nSpeak as {} only, and output only the spoken line.",
        speaker.name
    ));
    prompt
}
