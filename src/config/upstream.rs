//! Upstream helper configuration

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

use super::error::ValidationError;
use crate::domain::dialog::{EnvelopeStyle, Mode, UpstreamTarget};
use crate::domain::report::ReportKind;

/// Upstream helper configuration
///
/// A mode whose address (or API key, for the local model) is absent has no
/// target and is answered with 503.
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamConfig {
    /// API key for the hosted chat model
    pub local_api_key: Option<Secret<String>>,

    /// Base URL of the OpenAI-compatible chat API
    #[serde(default = "default_local_base_url")]
    pub local_base_url: String,

    /// Chat model name
    #[serde(default = "default_local_model")]
    pub local_model: String,

    /// General agent endpoint
    pub agent_url: Option<String>,

    /// User-story helper endpoint
    pub story_url: Option<String>,

    /// Java unit-test generator endpoint
    pub unittest_url: Option<String>,

    /// Java code reviewer endpoint
    pub review_url: Option<String>,

    /// Timeout for chat-style upstreams in seconds
    #[serde(default = "default_chat_timeout")]
    pub chat_timeout_secs: u64,

    /// Timeout for generation upstreams in seconds
    #[serde(default = "default_generation_timeout")]
    pub generation_timeout_secs: u64,

    /// Fragments buffered between the upstream and a slow client
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

impl UpstreamConfig {
    pub fn chat_timeout(&self) -> Duration {
        Duration::from_secs(self.chat_timeout_secs)
    }

    pub fn generation_timeout(&self) -> Duration {
        Duration::from_secs(self.generation_timeout_secs)
    }

    /// API key for the local model, if one is set and non-empty
    pub fn local_api_key(&self) -> Option<&str> {
        self.local_api_key
            .as_ref()
            .map(|k| k.expose_secret().as_str())
            .filter(|k| !k.is_empty())
    }

    /// Builds the target table for every configured mode.
    pub fn targets(&self) -> HashMap<Mode, UpstreamTarget> {
        let mut targets = HashMap::new();

        if self.local_api_key().is_some() {
            targets.insert(
                Mode::LocalModel,
                UpstreamTarget::local_model(
                    Mode::LocalModel.name(),
                    self.local_base_url.clone(),
                    self.chat_timeout(),
                ),
            );
        }

        if let Some(url) = configured(&self.agent_url) {
            targets.insert(
                Mode::Agent,
                UpstreamTarget::remote(
                    Mode::Agent.name(),
                    url,
                    "question",
                    EnvelopeStyle::Ndjson,
                    self.chat_timeout(),
                ),
            );
        }

        if let Some(url) = configured(&self.story_url) {
            targets.insert(
                Mode::UserStory,
                UpstreamTarget::remote(
                    Mode::UserStory.name(),
                    url,
                    "user_story",
                    EnvelopeStyle::PlainText,
                    self.generation_timeout(),
                ),
            );
        }

        if let Some(url) = configured(&self.unittest_url) {
            targets.insert(
                Mode::UnitTest,
                UpstreamTarget::remote(
                    Mode::UnitTest.name(),
                    url,
                    "code",
                    EnvelopeStyle::SingleDocument,
                    self.generation_timeout(),
                )
                .with_report_hint(ReportKind::TestGeneration),
            );
        }

        if let Some(url) = configured(&self.review_url) {
            targets.insert(
                Mode::CodeReview,
                UpstreamTarget::remote(
                    Mode::CodeReview.name(),
                    url,
                    "code",
                    EnvelopeStyle::SingleDocument,
                    self.generation_timeout(),
                )
                .with_report_hint(ReportKind::CodeReview)
                .with_static_field("stream", false),
            );
        }

        targets
    }

    /// Validate upstream configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.chat_timeout_secs == 0 || self.generation_timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }
        if self.channel_capacity == 0 {
            return Err(ValidationError::InvalidChannelCapacity);
        }

        let urls = [
            Some(&self.local_base_url),
            self.agent_url.as_ref(),
            self.story_url.as_ref(),
            self.unittest_url.as_ref(),
            self.review_url.as_ref(),
        ];
        for url in urls.into_iter().flatten().filter(|u| !u.is_empty()) {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ValidationError::InvalidUpstreamUrl(url.clone()));
            }
        }
        Ok(())
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            local_api_key: None,
            local_base_url: default_local_base_url(),
            local_model: default_local_model(),
            agent_url: None,
            story_url: None,
            unittest_url: None,
            review_url: None,
            chat_timeout_secs: default_chat_timeout(),
            generation_timeout_secs: default_generation_timeout(),
            channel_capacity: default_channel_capacity(),
        }
    }
}

fn configured(url: &Option<String>) -> Option<String> {
    url.as_ref().filter(|u| !u.is_empty()).cloned()
}

fn default_local_base_url() -> String {
    "https://api.deepseek.com".to_string()
}

fn default_local_model() -> String {
    "deepseek-chat".to_string()
}

fn default_chat_timeout() -> u64 {
    60
}

fn default_generation_timeout() -> u64 {
    120
}

fn default_channel_capacity() -> usize {
    16
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::dialog::UpstreamKind;
    use serde_json::Value;

    fn full_config() -> UpstreamConfig {
        UpstreamConfig {
            local_api_key: Some(Secret::new("sk-xxx".to_string())),
            agent_url: Some("http://localhost:8001/agent".to_string()),
            story_url: Some("http://localhost:8003/story".to_string()),
            unittest_url: Some("http://localhost:8004/unittest".to_string()),
            review_url: Some("http://localhost:8002/review".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_upstream_config_defaults() {
        let config = UpstreamConfig::default();
        assert_eq!(config.chat_timeout(), Duration::from_secs(60));
        assert_eq!(config.generation_timeout(), Duration::from_secs(120));
        assert_eq!(config.channel_capacity, 16);
        assert!(config.targets().is_empty());
    }

    #[test]
    fn test_targets_follow_mode_table() {
        let targets = full_config().targets();
        assert_eq!(targets.len(), 5);

        let local = &targets[&Mode::LocalModel];
        assert_eq!(local.kind, UpstreamKind::LocalModel);
        assert_eq!(local.address, "https://api.deepseek.com");

        let agent = &targets[&Mode::Agent];
        assert_eq!(agent.payload_field, "question");
        assert_eq!(agent.envelope, EnvelopeStyle::Ndjson);
        assert_eq!(agent.timeout, Duration::from_secs(60));

        let story = &targets[&Mode::UserStory];
        assert_eq!(story.payload_field, "user_story");
        assert_eq!(story.timeout, Duration::from_secs(120));

        let unittest = &targets[&Mode::UnitTest];
        assert_eq!(unittest.envelope, EnvelopeStyle::SingleDocument);
        assert_eq!(unittest.report_hint, Some(ReportKind::TestGeneration));

        let review = &targets[&Mode::CodeReview];
        assert_eq!(review.payload_field, "code");
        assert_eq!(review.envelope, EnvelopeStyle::SingleDocument);
        assert_eq!(review.report_hint, Some(ReportKind::CodeReview));
        assert_eq!(review.static_fields.get("stream"), Some(&Value::Bool(false)));
    }

    #[test]
    fn test_empty_key_disables_local_model() {
        let config = UpstreamConfig {
            local_api_key: Some(Secret::new(String::new())),
            ..full_config()
        };
        assert!(!config.targets().contains_key(&Mode::LocalModel));
    }

    #[test]
    fn test_validation_rejects_bad_url() {
        let config = UpstreamConfig {
            review_url: Some("localhost:8002".to_string()),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_zero_capacity() {
        let config = UpstreamConfig {
            channel_capacity: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
        assert!(full_config().validate().is_ok());
    }
}
