//! Dialog repository port - sessions and their transcripts.

use async_trait::async_trait;

use crate::domain::dialog::{DialogTurn, NewDialogTurn, Session};
use crate::domain::foundation::{DomainError, SessionId, UserId};

/// Repository port for dialog sessions and turns.
///
/// Sessions are created once and never updated. Turns are append-only.
#[async_trait]
pub trait DialogRepository: Send + Sync {
    /// The id the next created session would receive (current maximum + 1).
    ///
    /// Advisory only: another writer may take it first. Use
    /// [`create_session`](Self::create_session) to allocate.
    async fn next_session_id(&self) -> Result<SessionId, DomainError>;

    /// Atomically allocates the next id and stores a new session.
    ///
    /// Concurrent callers never receive the same id.
    ///
    /// # Errors
    ///
    /// - `DatabaseError` on persistence failure
    async fn create_session(&self, user_id: UserId, name: &str) -> Result<Session, DomainError>;

    /// Appends one question/answer turn to a session.
    ///
    /// # Errors
    ///
    /// - `DatabaseError` on persistence failure
    async fn append_turn(&self, turn: NewDialogTurn) -> Result<DialogTurn, DomainError>;
}
