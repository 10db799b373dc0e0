//! Errors raised by the dialog router before streaming begins.

use thiserror::Error;

use crate::domain::foundation::{DomainError, ValidationError};

/// Failures that reject a dialog request outright.
///
/// Anything that goes wrong after the answer stream has started is reported
/// inline as a fragment instead.
#[derive(Debug, Clone, Error)]
pub enum DialogError {
    #[error("invalid input: {0}")]
    InvalidInput(#[from] ValidationError),

    #[error("upstream unavailable for mode '{mode}': {reason}")]
    UpstreamUnavailable { mode: String, reason: String },

    #[error("storage error: {0}")]
    Storage(#[from] DomainError),
}

impl DialogError {
    pub fn upstream_unavailable(mode: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::UpstreamUnavailable {
            mode: mode.into(),
            reason: reason.into(),
        }
    }

    /// Stable code for API error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            DialogError::InvalidInput(_) => "INVALID_INPUT",
            DialogError::UpstreamUnavailable { .. } => "UPSTREAM_UNAVAILABLE",
            DialogError::Storage(_) => "DATABASE_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_converts_to_invalid_input() {
        let err: DialogError = ValidationError::empty_field("question").into();
        assert!(matches!(err, DialogError::InvalidInput(_)));
        assert_eq!(err.code(), "INVALID_INPUT");
    }

    #[test]
    fn unavailable_displays_mode() {
        let err = DialogError::upstream_unavailable("local", "no API key configured");
        assert_eq!(
            err.to_string(),
            "upstream unavailable for mode 'local': no API key configured"
        );
    }
}
