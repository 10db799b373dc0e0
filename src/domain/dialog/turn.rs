//! Dialog turns: one question and its final answer.

use crate::domain::foundation::{SessionId, Timestamp, ValidationError};

/// Validated question text. Stored verbatim.
///
/// Whitespace-only text counts as empty and is rejected along with `""`,
/// since it would open a session with a blank name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question(String);

impl Question {
    pub fn new(text: impl Into<String>) -> Result<Self, ValidationError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(ValidationError::empty_field("question"));
        }
        Ok(Self(text))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A turn waiting to be appended to a session's transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDialogTurn {
    pub session_id: SessionId,
    pub question: String,
    pub answer: String,
}

impl NewDialogTurn {
    pub fn new(session_id: SessionId, question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            session_id,
            question: question.into(),
            answer: answer.into(),
        }
    }
}

/// A persisted, immutable transcript entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogTurn {
    pub id: i64,
    pub session_id: SessionId,
    pub question: String,
    pub answer: String,
    pub created_at: Timestamp,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_question_is_rejected() {
        assert_eq!(
            Question::new(""),
            Err(ValidationError::empty_field("question"))
        );
    }

    #[test]
    fn whitespace_question_is_rejected() {
        assert!(Question::new("  \n\t").is_err());
    }

    #[test]
    fn question_keeps_surrounding_whitespace() {
        let q = Question::new("  why?  ").unwrap();
        assert_eq!(q.as_str(), "  why?  ");
    }
}
