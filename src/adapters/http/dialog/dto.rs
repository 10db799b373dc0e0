//! DTOs for the dialog endpoint.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::application::DispatchDialogCommand;
use crate::domain::dialog::{DialogError, ModeSelector};
use crate::domain::foundation::{UserId, NEW_SESSION_SENTINEL};

/// Request body for `POST /dialog`.
#[derive(Debug, Clone, Deserialize)]
pub struct DialogRequest {
    #[serde(default)]
    pub mode: Option<ModeSelector>,
    #[serde(default)]
    pub question: String,
    #[serde(default = "new_session")]
    pub session_id: i64,
    /// Everything else, e.g. `targetClass` and `methodName`.
    #[serde(flatten)]
    pub extras: Map<String, Value>,
}

fn new_session() -> i64 {
    NEW_SESSION_SENTINEL
}

impl DialogRequest {
    pub fn into_command(self, user_id: UserId) -> DispatchDialogCommand {
        DispatchDialogCommand {
            user_id,
            session_id: self.session_id,
            mode: self.mode,
            question: self.question,
            extras: self.extras,
        }
    }
}

/// Error body returned before streaming starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl ErrorResponse {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
            code: "INVALID_INPUT".to_string(),
        }
    }
}

impl From<&DialogError> for ErrorResponse {
    fn from(err: &DialogError) -> Self {
        Self {
            error: err.to_string(),
            code: err.code().to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}
