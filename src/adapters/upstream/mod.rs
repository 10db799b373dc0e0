//! Upstream adapters - implementations of the `UpstreamAdapter` port.
//!
//! - `ChatCompletionAdapter` - OpenAI-compatible streaming chat completion
//! - `RemoteForwardAdapter` - JSON POST to a helper service, body streamed raw
//! - `ScriptedUpstream` - canned chunks for tests

mod chat_completion;
mod forward;
mod scripted;

pub use chat_completion::{ChatCompletionAdapter, ChatCompletionConfig, SYSTEM_PROMPT};
pub use forward::RemoteForwardAdapter;
pub use scripted::ScriptedUpstream;

use reqwest::Response;
use std::time::Duration;

use crate::ports::UpstreamError;

/// Longest error body kept in an `UpstreamError::Status`.
const MAX_ERROR_BODY_CHARS: usize = 512;

/// Maps a reqwest failure onto the port's error type.
fn classify_error(err: &reqwest::Error, timeout: Duration) -> UpstreamError {
    if err.is_timeout() {
        UpstreamError::Timeout {
            secs: timeout.as_secs(),
        }
    } else {
        UpstreamError::transport(err.to_string())
    }
}

/// Passes a success response through; reads the body of anything else.
async fn check_status(response: Response) -> Result<Response, UpstreamError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let body: String = body.trim().chars().take(MAX_ERROR_BODY_CHARS).collect();
    Err(UpstreamError::status(status.as_u16(), body))
}
