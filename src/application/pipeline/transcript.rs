//! Transcript accumulator - forwards fragments to the client and persists
//! the full answer exactly once.

use futures::StreamExt;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::Instrument;

use super::normalizer::FragmentStream;
use crate::domain::dialog::{DialogTurn, NewDialogTurn};
use crate::domain::foundation::{DispatchId, DomainError, SessionId};
use crate::ports::DialogRepository;

/// Default bound on fragments buffered between the pump and the client.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 16;

/// How the transcript of one dialog ended up.
#[derive(Debug, Clone)]
pub enum TranscriptOutcome {
    Persisted(DialogTurn),
    NotSaved { answer: String, error: DomainError },
}

impl TranscriptOutcome {
    /// The full answer text, whether or not it was stored.
    pub fn answer(&self) -> &str {
        match self {
            TranscriptOutcome::Persisted(turn) => &turn.answer,
            TranscriptOutcome::NotSaved { answer, .. } => answer,
        }
    }

    pub fn is_persisted(&self) -> bool {
        matches!(self, TranscriptOutcome::Persisted(_))
    }
}

/// Identifies the turn a pump is recording.
#[derive(Debug, Clone)]
pub struct TranscriptContext {
    pub dispatch_id: DispatchId,
    pub session_id: SessionId,
    pub question: String,
}

/// Trailing fragment when the transcript could not be stored.
pub fn not_saved_fragment(err: &DomainError) -> String {
    format!("\n[transcript not saved: {}]\n", err.message)
}

/// Spawns the pump task for one dialog.
///
/// The task reads `fragments` to the end, forwarding each into a bounded
/// channel and appending it to the transcript. If the receiver is dropped,
/// delivery stops but the upstream is still drained. Exactly one
/// `append_turn` call is made when the fragments end.
pub fn spawn_transcript_pump(
    fragments: FragmentStream,
    repository: Arc<dyn DialogRepository>,
    context: TranscriptContext,
    capacity: usize,
) -> (mpsc::Receiver<String>, JoinHandle<TranscriptOutcome>) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    let span = tracing::info_span!(
        "transcript",
        dispatch_id = %context.dispatch_id,
        session_id = %context.session_id,
    );

    let handle = tokio::spawn(
        async move {
            let mut fragments = fragments;
            let mut transcript = String::new();
            let mut delivering = true;

            while let Some(fragment) = fragments.next().await {
                transcript.push_str(&fragment);
                if delivering && tx.send(fragment).await.is_err() {
                    delivering = false;
                    tracing::info!("client disconnected, draining upstream");
                }
            }

            let turn = NewDialogTurn::new(context.session_id, context.question, transcript.clone());
            match repository.append_turn(turn).await {
                Ok(turn) => {
                    tracing::info!(turn_id = turn.id, bytes = turn.answer.len(), "transcript persisted");
                    TranscriptOutcome::Persisted(turn)
                }
                Err(error) => {
                    tracing::error!(error = %error, "failed to persist transcript");
                    if delivering {
                        let _ = tx.send(not_saved_fragment(&error)).await;
                    }
                    TranscriptOutcome::NotSaved {
                        answer: transcript,
                        error,
                    }
                }
            }
        }
        .instrument(span),
    );

    (rx, handle)
}
