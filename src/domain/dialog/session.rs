//! Dialog session entity.

use crate::domain::foundation::{SessionId, Timestamp, UserId};

/// Number of leading question characters used as a session's display name.
pub const SESSION_NAME_CHARS: usize = 10;

/// Derives a session name from the question that opened it.
///
/// Counts characters rather than bytes so CJK questions are never split
/// mid-character.
pub fn session_name_for(question: &str) -> String {
    question.chars().take(SESSION_NAME_CHARS).collect()
}

/// A named container for dialog turns owned by one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    id: SessionId,
    name: String,
    user_id: UserId,
    created_at: Timestamp,
}

impl Session {
    /// Reconstitutes a session from storage.
    pub fn reconstitute(
        id: SessionId,
        name: impl Into<String>,
        user_id: UserId,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            user_id,
            created_at,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }
}
