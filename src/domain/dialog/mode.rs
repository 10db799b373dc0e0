//! Request modes and the wire selector clients use to pick one.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::ValidationError;

/// Which upstream helper answers a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Direct chat-completion call to the hosted model.
    LocalModel,
    /// Remote general-purpose agent, question under `question`.
    Agent,
    /// Remote user-story helper, question under `user_story`.
    UserStory,
    /// Remote Java unit-test generator, code under `code`.
    UnitTest,
    /// Remote Java code reviewer, code under `code`.
    CodeReview,
}

impl Mode {
    pub const ALL: [Mode; 5] = [
        Mode::LocalModel,
        Mode::Agent,
        Mode::UserStory,
        Mode::UnitTest,
        Mode::CodeReview,
    ];

    /// Numeric selector used by existing clients.
    pub fn id(&self) -> i64 {
        match self {
            Mode::LocalModel => 1,
            Mode::Agent => 2,
            Mode::UserStory => 3,
            Mode::UnitTest => 4,
            Mode::CodeReview => 5,
        }
    }

    /// String selector.
    pub fn name(&self) -> &'static str {
        match self {
            Mode::LocalModel => "local",
            Mode::Agent => "agent",
            Mode::UserStory => "story",
            Mode::UnitTest => "unittest",
            Mode::CodeReview => "review",
        }
    }

    /// Optional request fields forwarded to this mode's upstream.
    pub fn extra_fields(&self) -> &'static [&'static str] {
        match self {
            Mode::UnitTest => &["targetClass", "methodName"],
            _ => &[],
        }
    }

    pub fn from_id(id: i64) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.id() == id)
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|m| m.name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Mode as sent on the wire: either the integer id or the name.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ModeSelector {
    Id(i64),
    Name(String),
}

impl ModeSelector {
    /// Resolves the selector, failing for anything unrecognized.
    pub fn resolve(&self) -> Result<Mode, ValidationError> {
        let resolved = match self {
            ModeSelector::Id(id) => Mode::from_id(*id),
            ModeSelector::Name(name) => Mode::from_name(name).or_else(|| {
                name.trim().parse::<i64>().ok().and_then(Mode::from_id)
            }),
        };

        resolved.ok_or_else(|| {
            ValidationError::invalid_format("mode", format!("unrecognized mode {}", self))
        })
    }
}

impl fmt::Display for ModeSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModeSelector::Id(id) => write!(f, "{}", id),
            ModeSelector::Name(name) => write!(f, "'{}'", name),
        }
    }
}
