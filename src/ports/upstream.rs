//! Upstream adapter port - issues the outbound call for one dialog.
//!
//! An adapter turns an [`UpstreamTarget`] and a question into a lazy stream
//! of [`RawChunk`]s. Nothing happens until the stream is polled.
//!
//! # Contract
//!
//! - The first item is a `Notice` announcing the connection attempt.
//! - A second `Notice` follows once the upstream answered with a success
//!   status; `Data` items follow in arrival order.
//! - Any failure becomes one terminal `Failed` item and the stream ends.
//!   Adapters never surface a Rust error past this boundary.

use futures::Stream;
use serde_json::{Map, Value};
use std::pin::Pin;
use thiserror::Error;

use crate::domain::dialog::UpstreamTarget;

/// Boxed stream returned by [`UpstreamAdapter::open`].
pub type RawChunkStream = Pin<Box<dyn Stream<Item = RawChunk> + Send>>;

/// One item of an upstream's raw output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawChunk {
    /// Adapter-synthesized informational text, passed through verbatim.
    Notice(String),
    /// Raw body bytes, framed according to the target's envelope style.
    Data(Vec<u8>),
    /// Terminal failure; nothing follows.
    Failed(UpstreamError),
}

impl RawChunk {
    pub fn connecting(target_name: &str) -> Self {
        RawChunk::Notice(format!("Connecting to {}...\n", target_name))
    }

    pub fn connected() -> Self {
        RawChunk::Notice("Connected.\n\n".to_string())
    }
}

/// Why an upstream call did not complete.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpstreamError {
    #[error("upstream returned HTTP {code}: {body}")]
    Status { code: u16, body: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("timed out after {secs}s")]
    Timeout { secs: u64 },

    /// Error object sent inside an otherwise successful response body.
    #[error("upstream reported an error: {0}")]
    Reported(String),
}

impl UpstreamError {
    pub fn status(code: u16, body: impl Into<String>) -> Self {
        Self::Status {
            code,
            body: body.into(),
        }
    }

    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    pub fn reported(msg: impl Into<String>) -> Self {
        Self::Reported(msg.into())
    }
}

/// What the caller asked, forwarded to the upstream.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpstreamRequest {
    pub question: String,
    /// Mode-specific extra fields (for example `targetClass`).
    pub extras: Map<String, Value>,
}

impl UpstreamRequest {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            extras: Map::new(),
        }
    }

    pub fn with_extras(mut self, extras: Map<String, Value>) -> Self {
        self.extras = extras;
        self
    }
}

/// Port for issuing one outbound dialog call.
///
/// Implementations hold their own HTTP client; one call is made per `open`,
/// with no retry.
pub trait UpstreamAdapter: Send + Sync {
    fn open(&self, target: &UpstreamTarget, request: UpstreamRequest) -> RawChunkStream;
}
