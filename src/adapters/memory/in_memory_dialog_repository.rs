//! In-Memory Dialog Repository
//!
//! Stores sessions and turns in memory.
//! Useful for testing and development.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use crate::domain::dialog::{DialogTurn, NewDialogTurn, Session};
use crate::domain::foundation::{DomainError, SessionId, Timestamp, UserId};
use crate::ports::DialogRepository;

#[derive(Debug, Default)]
struct State {
    sessions: BTreeMap<SessionId, Session>,
    turns: Vec<DialogTurn>,
    next_turn_id: i64,
    fail_sessions: Option<DomainError>,
    fail_appends: Option<DomainError>,
}

/// In-memory storage for dialog sessions and transcripts.
///
/// The whole state sits behind one lock, so id allocation and insert happen
/// together.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDialogRepository {
    state: Arc<RwLock<State>>,
}

impl InMemoryDialogRepository {
    /// Create a new in-memory repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every later `create_session` fail with `error`.
    pub fn fail_session_creation(&self, error: DomainError) {
        if let Ok(mut state) = self.state.write() {
            state.fail_sessions = Some(error);
        }
    }

    /// Makes every later `append_turn` fail with `error`.
    pub fn fail_appends(&self, error: DomainError) {
        if let Ok(mut state) = self.state.write() {
            state.fail_appends = Some(error);
        }
    }

    /// All sessions, ordered by id.
    pub fn sessions(&self) -> Vec<Session> {
        self.state
            .read()
            .map(|s| s.sessions.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Turns of one session in insertion order.
    pub fn turns_for(&self, session_id: SessionId) -> Vec<DialogTurn> {
        self.state
            .read()
            .map(|s| {
                s.turns
                    .iter()
                    .filter(|t| t.session_id == session_id)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}

fn poisoned() -> DomainError {
    DomainError::database("in-memory repository lock poisoned")
}

fn next_id(sessions: &BTreeMap<SessionId, Session>) -> SessionId {
    sessions
        .keys()
        .next_back()
        .map(SessionId::next)
        .unwrap_or_else(SessionId::first)
}

#[async_trait]
impl DialogRepository for InMemoryDialogRepository {
    async fn next_session_id(&self) -> Result<SessionId, DomainError> {
        let state = self.state.read().map_err(|_| poisoned())?;
        Ok(next_id(&state.sessions))
    }

    async fn create_session(&self, user_id: UserId, name: &str) -> Result<Session, DomainError> {
        let mut state = self.state.write().map_err(|_| poisoned())?;
        if let Some(err) = &state.fail_sessions {
            return Err(err.clone());
        }

        let id = next_id(&state.sessions);
        let session = Session::reconstitute(id, name, user_id, Timestamp::now());
        state.sessions.insert(id, session.clone());
        Ok(session)
    }

    async fn append_turn(&self, turn: NewDialogTurn) -> Result<DialogTurn, DomainError> {
        let mut state = self.state.write().map_err(|_| poisoned())?;
        if let Some(err) = &state.fail_appends {
            return Err(err.clone());
        }

        state.next_turn_id += 1;
        let stored = DialogTurn {
            id: state.next_turn_id,
            session_id: turn.session_id,
            question: turn.question,
            answer: turn.answer,
            created_at: Timestamp::now(),
        };
        state.turns.push(stored.clone());
        Ok(stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[tokio::test]
    async fn first_session_gets_id_one() {
        let repo = InMemoryDialogRepository::new();
        assert_eq!(repo.next_session_id().await.unwrap(), SessionId::first());

        let session = repo.create_session(UserId::new(3), "hello").await.unwrap();
        assert_eq!(session.id().as_i64(), 1);
        assert_eq!(session.user_id(), UserId::new(3));
        assert_eq!(repo.next_session_id().await.unwrap().as_i64(), 2);
    }

    #[tokio::test]
    async fn concurrent_creation_never_duplicates_ids() {
        let repo = InMemoryDialogRepository::new();
        let mut handles = Vec::new();
        for i in 0..32 {
            let repo = repo.clone();
            handles.push(tokio::spawn(async move {
                repo.create_session(UserId::new(i), "q").await.unwrap().id()
            }));
        }

        let mut ids = HashSet::new();
        for handle in handles {
            assert!(ids.insert(handle.await.unwrap()));
        }
        assert_eq!(ids.len(), 32);
        assert_eq!(repo.sessions().last().unwrap().id().as_i64(), 32);
    }

    #[tokio::test]
    async fn turns_are_appended_per_session() {
        let repo = InMemoryDialogRepository::new();
        let a = repo.create_session(UserId::new(1), "a").await.unwrap().id();
        let b = repo.create_session(UserId::new(1), "b").await.unwrap().id();

        repo.append_turn(NewDialogTurn::new(a, "q1", "a1")).await.unwrap();
        repo.append_turn(NewDialogTurn::new(b, "q2", "a2")).await.unwrap();
        let third = repo.append_turn(NewDialogTurn::new(a, "q3", "a3")).await.unwrap();

        assert_eq!(third.id, 3);
        let turns = repo.turns_for(a);
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[1].answer, "a3");
    }

    #[tokio::test]
    async fn injected_failures_surface() {
        let repo = InMemoryDialogRepository::new();
        repo.fail_session_creation(DomainError::database("nope"));
        assert!(repo.create_session(UserId::new(1), "x").await.is_err());
    }
}
