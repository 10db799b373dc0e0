//! PostgreSQL implementation of DialogRepository.
//!
//! Sessions are keyed by a plain integer allocated as `MAX(id) + 1`. The
//! allocation runs under a transaction-scoped advisory lock so concurrent
//! requests serialize on it.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};

use crate::domain::dialog::{DialogTurn, NewDialogTurn, Session};
use crate::domain::foundation::{DomainError, ErrorCode, SessionId, Timestamp, UserId};
use crate::ports::DialogRepository;

/// Advisory lock key guarding session id allocation.
const SESSION_ALLOCATION_LOCK: i64 = 0x6469_616c_6f67;

/// PostgreSQL implementation of DialogRepository.
#[derive(Clone)]
pub struct PostgresDialogRepository {
    pool: PgPool,
}

impl PostgresDialogRepository {
    /// Creates a new PostgresDialogRepository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DialogRepository for PostgresDialogRepository {
    async fn next_session_id(&self) -> Result<SessionId, DomainError> {
        let next: i64 = sqlx::query_scalar("SELECT COALESCE(MAX(id), 0) + 1 FROM sessions")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                DomainError::new(
                    ErrorCode::DatabaseError,
                    format!("Failed to read next session id: {}", e),
                )
            })?;

        to_session_id(next)
    }

    async fn create_session(&self, user_id: UserId, name: &str) -> Result<Session, DomainError> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to start transaction: {}", e),
            )
        })?;

        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(SESSION_ALLOCATION_LOCK)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                DomainError::new(
                    ErrorCode::DatabaseError,
                    format!("Failed to lock session allocation: {}", e),
                )
            })?;

        let row = sqlx::query(
            r#"
            INSERT INTO sessions (id, session_name, user_id, created_at)
            SELECT COALESCE(MAX(id), 0) + 1, $1, $2, NOW() FROM sessions
            RETURNING id, session_name, user_id, created_at
            "#,
        )
        .bind(name)
        .bind(user_id.as_i64())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to insert session: {}", e),
            )
        })?;

        tx.commit().await.map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to commit transaction: {}", e),
            )
        })?;

        row_to_session(row)
    }

    async fn append_turn(&self, turn: NewDialogTurn) -> Result<DialogTurn, DomainError> {
        let row = sqlx::query(
            r#"
            INSERT INTO dialogs (session_id, question, message, created_at)
            VALUES ($1, $2, $3, NOW())
            RETURNING id, created_at
            "#,
        )
        .bind(turn.session_id.as_i64())
        .bind(&turn.question)
        .bind(&turn.answer)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to insert dialog turn: {}", e),
            )
        })?;

        let id: i64 = row.try_get("id").map_err(column_error)?;
        let created_at: DateTime<Utc> = row.try_get("created_at").map_err(column_error)?;

        Ok(DialogTurn {
            id,
            session_id: turn.session_id,
            question: turn.question,
            answer: turn.answer,
            created_at: Timestamp::from_datetime(created_at),
        })
    }
}

fn column_error(e: sqlx::Error) -> DomainError {
    DomainError::new(
        ErrorCode::DatabaseError,
        format!("Failed to read column: {}", e),
    )
}

fn to_session_id(id: i64) -> Result<SessionId, DomainError> {
    SessionId::new(id).map_err(|e| {
        DomainError::new(
            ErrorCode::InternalError,
            format!("Invalid session id {} in storage: {}", id, e),
        )
    })
}

fn row_to_session(row: sqlx::postgres::PgRow) -> Result<Session, DomainError> {
    let id: i64 = row.try_get("id").map_err(column_error)?;
    let name: String = row.try_get("session_name").map_err(column_error)?;
    let user_id: i64 = row.try_get("user_id").map_err(column_error)?;
    let created_at: DateTime<Utc> = row.try_get("created_at").map_err(column_error)?;

    Ok(Session::reconstitute(
        to_session_id(id)?,
        name,
        UserId::new(user_id),
        Timestamp::from_datetime(created_at),
    ))
}
