//! Episode topic selection.

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::PodcastError;
use crate::generation::TextGenerator;

/// The subject of an episode. Immutable once selected for a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Topic {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl Topic {
    /// Wrap a user-provided topic string without further validation.
    pub fn from_title(title: impl Into<String>) -> Self {
        let title = title.into();
        Self {
            description: format!("Exploring {} in depth.", title),
            keywords: vec![title.to_lowercase()],
            title,
        }
    }
}

const TOPIC_SYSTEM: &str = "You are a podcast topic generator.";
const TOPIC_MAX_TOKENS: u32 = 300;

/// Select the episode topic.
///
/// A non-empty override is returned unchanged. Otherwise one completion is
/// requested with the configured topic prompt; an unusable response is fatal
/// to the run (retry belongs to the collaborator wrapper, not here).
pub async fn select_topic(
    generator: &dyn TextGenerator,
    config: &Config,
    override_title: Option<&str>,
) -> Result<Topic, PodcastError> {
    if let Some(title) = override_title {
        let title = title.trim();
        if !title.is_empty() {
            return Ok(Topic::from_title(title));
        }
    }

    let response = generator
        .complete(TOPIC_SYSTEM, &config.prompts.topic_prompt, TOPIC_MAX_TOKENS)
        .await?;

    let trimmed = response.trim();
    if trimmed.is_empty() {
        return Err(PodcastError::Generation(
            "topic generator returned an empty response".to_string(),
        ));
    }

    let topic: Topic = serde_json::from_str(trimmed).map_err(|e| {
        PodcastError::Generation(format!("topic response was not a usable topic: {}", e))
    })?;

    if topic.title.trim().is_empty() {
        return Err(PodcastError::Generation(
            "topic response had an empty title".to_string(),
        ));
    }

    Ok(topic)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_config;
    use async_trait::async_trait;

    struct CannedGenerator {
        response: String,
    }

    #[async_trait]
    impl TextGenerator for CannedGenerator {
        async fn complete(
            &self,
            _system: &str,
            _prompt: &str,
            _max_tokens: u32,
        ) -> Result<String, PodcastError> {
            Ok(self.response.clone())
        }
    }

    struct PanicGenerator;

    #[async_trait]
    impl TextGenerator for PanicGenerator {
        async fn complete(
            &self,
            _system: &str,
            _prompt: &str,
            _max_tokens: u32,
        ) -> Result<String, PodcastError> {
            panic!("topic override must not hit the generator");
        }
    }

    #[tokio::test]
    async fn test_override_is_returned_unchanged() {
        let config = default_config();
        let topic = select_topic(&PanicGenerator, &config, Some("Artificial Intelligence Ethics"))
            .await
            .unwrap();
        assert_eq!(topic.title, "Artificial Intelligence Ethics");
        assert_eq!(topic.keywords, vec!["artificial intelligence ethics"]);
    }

    #[tokio::test]
    async fn test_blank_override_falls_through_to_generation() {
        let config = default_config();
        let generator = CannedGenerator {
            response: r#"{"title": "The Memory of Cities", "description": "How urban spaces remember.", "keywords": ["urbanism"]}"#.to_string(),
        };
        let topic = select_topic(&generator, &config, Some("   ")).await.unwrap();
        assert_eq!(topic.title, "The Memory of Cities");
        assert_eq!(topic.keywords, vec!["urbanism"]);
    }

    #[tokio::test]
    async fn test_unparseable_response_is_fatal() {
        let config = default_config();
        let generator = CannedGenerator {
            response: "Here are some great topic ideas for you!".to_string(),
        };
        let result = select_topic(&generator, &config, None).await;
        assert!(matches!(result, Err(PodcastError::Generation(_))));
    }

    #[tokio::test]
    async fn test_empty_response_is_fatal() {
        let config = default_config();
        let generator = CannedGenerator {
            response: "   ".to_string(),
        };
        let result = select_topic(&generator, &config, None).await;
        assert!(matches!(result, Err(PodcastError::Generation(_))));
    }

    #[tokio::test]
    async fn test_missing_keywords_defaults_to_empty() {
        let config = default_config();
        let generator = CannedGenerator {
            response: r#"{"title": "Tidal Power", "description": "Energy from the moon."}"#
                .to_string(),
        };
        let topic = select_topic(&generator, &config, None).await.unwrap();
        assert!(topic.keywords.is_empty());
    }
}
