//! DispatchDialogHandler - routes one question to its upstream and streams
//! the normalized answer.

use serde_json::{Map, Value};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::UpstreamRegistry;
use crate::application::pipeline::{
    normalize, spawn_transcript_pump, TranscriptContext, TranscriptOutcome,
    DEFAULT_CHANNEL_CAPACITY,
};
use crate::domain::dialog::{session_name_for, DialogError, Mode, ModeSelector, Question};
use crate::domain::foundation::{DispatchId, SessionId, SessionSelector, UserId, ValidationError};
use crate::ports::{DialogRepository, UpstreamRequest};

/// Command to answer one question.
#[derive(Debug, Clone)]
pub struct DispatchDialogCommand {
    pub user_id: UserId,
    /// Wire session id; `-1` opens a new session.
    pub session_id: i64,
    pub mode: Option<ModeSelector>,
    pub question: String,
    /// Optional request fields; only those the mode accepts are forwarded.
    pub extras: Map<String, Value>,
}

/// A dialog whose answer is streaming.
#[derive(Debug)]
pub struct DialogStream {
    pub dispatch_id: DispatchId,
    pub session_id: SessionId,
    pub mode: Mode,
    /// Canonical fragments in delivery order.
    pub fragments: mpsc::Receiver<String>,
    /// Resolves once the transcript has been written (or failed to be).
    pub transcript: JoinHandle<TranscriptOutcome>,
}

/// Handler for dialog requests.
pub struct DispatchDialogHandler {
    repository: Arc<dyn DialogRepository>,
    upstreams: Arc<UpstreamRegistry>,
    channel_capacity: usize,
}

impl DispatchDialogHandler {
    pub fn new(repository: Arc<dyn DialogRepository>, upstreams: Arc<UpstreamRegistry>) -> Self {
        Self {
            repository,
            upstreams,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }

    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }

    pub async fn handle(&self, cmd: DispatchDialogCommand) -> Result<DialogStream, DialogError> {
        // 1. Validate everything before any side effect
        let question = Question::new(cmd.question)?;
        let mode = cmd
            .mode
            .ok_or_else(|| ValidationError::empty_field("mode"))?
            .resolve()?;
        let selector = SessionSelector::from_wire(cmd.session_id)?;

        let route = self
            .upstreams
            .route(mode)
            .ok_or_else(|| DialogError::upstream_unavailable(mode.name(), "no upstream configured"))?;

        // 2. Resolve or allocate the session
        let session_id = match selector {
            SessionSelector::Existing(id) => id,
            SessionSelector::New => {
                let session = self
                    .repository
                    .create_session(cmd.user_id, &session_name_for(question.as_str()))
                    .await?;
                tracing::info!(
                    session_id = %session.id(),
                    user_id = %cmd.user_id,
                    "session created"
                );
                session.id()
            }
        };

        // 3. Wire adapter → normalizer → accumulator
        let dispatch_id = DispatchId::new();
        tracing::info!(
            dispatch_id = %dispatch_id,
            session_id = %session_id,
            mode = %mode,
            upstream = %route.target.name,
            "dispatching dialog"
        );

        let request = UpstreamRequest::new(question.as_str())
            .with_extras(forwarded_extras(mode, cmd.extras));
        let raw = route.adapter.open(&route.target, request);
        let fragments = normalize(raw, route.target.envelope, route.target.report_hint);

        let (rx, transcript) = spawn_transcript_pump(
            fragments,
            Arc::clone(&self.repository),
            TranscriptContext {
                dispatch_id,
                session_id,
                question: question.as_str().to_string(),
            },
            self.channel_capacity,
        );

        Ok(DialogStream {
            dispatch_id,
            session_id,
            mode,
            fragments: rx,
            transcript,
        })
    }
}

/// Keeps only the extra fields `mode` accepts, dropping nulls.
fn forwarded_extras(mode: Mode, mut extras: Map<String, Value>) -> Map<String, Value> {
    let allowed = mode.extra_fields();
    extras.retain(|key, value| allowed.contains(&key.as_str()) && !value.is_null());
    extras
}
