//! OpenAI-compatible chat completion adapter.
//!
//! Sends the question as the user message under a fixed system prompt with
//! `stream: true`, then reads the server-sent events:
//!
//! ```text
//! data: {"choices":[{"delta":{"content":"Hel"}}]}
//! data: {"choices":[{"delta":{"content":"lo"}}]}
//! data: [DONE]
//! ```
//!
//! Each content delta is yielded as `Data`. Events may be split across
//! transport chunks, so lines are buffered until complete; a final event
//! without a trailing newline is still parsed. An `error` object in place
//! of a delta ends the stream with `Failed`.

use async_stream::stream;
use futures::StreamExt;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{check_status, classify_error};
use crate::application::pipeline::LineFramer;
use crate::domain::dialog::UpstreamTarget;
use crate::ports::{RawChunk, RawChunkStream, UpstreamAdapter, UpstreamError, UpstreamRequest};

/// System prompt sent ahead of every question.
pub const SYSTEM_PROMPT: &str = "You are a software engineering expert.";

/// Credentials and model for the chat completion endpoint.
#[derive(Debug, Clone)]
pub struct ChatCompletionConfig {
    api_key: Secret<String>,
    pub model: String,
}

impl ChatCompletionConfig {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            model: model.into(),
        }
    }

    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// Streams answers from a hosted chat model.
#[derive(Debug, Clone)]
pub struct ChatCompletionAdapter {
    client: Client,
    config: ChatCompletionConfig,
}

impl ChatCompletionAdapter {
    pub fn new(client: Client, config: ChatCompletionConfig) -> Self {
        Self { client, config }
    }

    fn completions_url(base_url: &str) -> String {
        format!("{}/chat/completions", base_url.trim_end_matches('/'))
    }

    fn to_request(&self, question: &str) -> ChatRequest {
        ChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: question.to_string(),
                },
            ],
            stream: true,
        }
    }
}

impl UpstreamAdapter for ChatCompletionAdapter {
    fn open(&self, target: &UpstreamTarget, request: UpstreamRequest) -> RawChunkStream {
        let client = self.client.clone();
        let url = Self::completions_url(&target.address);
        let authorization = format!("Bearer {}", self.config.api_key());
        let body = self.to_request(&request.question);
        let name = target.name.clone();
        let timeout = target.timeout;

        Box::pin(stream! {
            yield RawChunk::connecting(&name);

            let sent = client
                .post(&url)
                .timeout(timeout)
                .header("Authorization", authorization)
                .json(&body)
                .send()
                .await;

            let response = match sent {
                Ok(response) => response,
                Err(e) => {
                    yield RawChunk::Failed(classify_error(&e, timeout));
                    return;
                }
            };
            let response = match check_status(response).await {
                Ok(response) => response,
                Err(e) => {
                    yield RawChunk::Failed(e);
                    return;
                }
            };

            yield RawChunk::connected();

            let mut lines = LineFramer::new();
            let mut bytes = response.bytes_stream();
            while let Some(item) = bytes.next().await {
                let chunk = match item {
                    Ok(chunk) => chunk,
                    Err(e) => {
                        yield RawChunk::Failed(classify_error(&e, timeout));
                        return;
                    }
                };
                for line in lines.push(&chunk) {
                    if let Some(event) = parse_sse_line(&line) {
                        let terminal = event.is_terminal();
                        if let Some(raw) = event.into_chunk() {
                            yield raw;
                        }
                        if terminal {
                            return;
                        }
                    }
                }
            }

            // last event may arrive without a trailing newline
            if let Some(event) = lines.flush().as_deref().and_then(parse_sse_line) {
                if let Some(raw) = event.into_chunk() {
                    yield raw;
                }
            }
        })
    }
}

// ----- SSE parsing -----

#[derive(Debug, Clone, PartialEq, Eq)]
enum SseEvent {
    Delta(String),
    /// Provider error object sent in place of a delta.
    Error(String),
    Done,
}

impl SseEvent {
    fn is_terminal(&self) -> bool {
        !matches!(self, SseEvent::Delta(_))
    }

    fn into_chunk(self) -> Option<RawChunk> {
        match self {
            SseEvent::Delta(text) => Some(RawChunk::Data(text.into_bytes())),
            SseEvent::Error(message) => Some(RawChunk::Failed(UpstreamError::reported(message))),
            SseEvent::Done => None,
        }
    }
}

/// Parses one SSE line. Comments, other fields and empty deltas yield nothing.
fn parse_sse_line(line: &str) -> Option<SseEvent> {
    let data = line.trim_end_matches(&['\r', '\n'][..]).strip_prefix("data:")?.trim();
    if data == "[DONE]" {
        return Some(SseEvent::Done);
    }

    match serde_json::from_str::<StreamResponseChunk>(data) {
        Ok(StreamResponseChunk {
            error: Some(error), ..
        }) => Some(SseEvent::Error(error_message(&error))),
        Ok(chunk) => chunk
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.delta.content)
            .filter(|content| !content.is_empty())
            .map(SseEvent::Delta),
        Err(e) => {
            if !data.is_empty() {
                tracing::debug!(error = %e, "skipping unparseable SSE event");
            }
            None
        }
    }
}

fn error_message(error: &Value) -> String {
    match error {
        Value::String(message) => message.clone(),
        Value::Object(obj) => obj
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string()),
        other => other.to_string(),
    }
}

// ----- Chat completion API types -----

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct StreamResponseChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
    error: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    delta: StreamDelta,
}

#[derive(Debug, Deserialize)]
struct StreamDelta {
    content: Option<String>,
}
