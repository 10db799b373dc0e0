//! Foundation module - Shared domain primitives.
//!
//! Contains identifiers, timestamps and error types that form the
//! vocabulary of the dialog domain.

mod errors;
mod ids;
mod timestamp;

pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{DispatchId, SessionId, SessionSelector, UserId, NEW_SESSION_SENTINEL};
pub use timestamp::Timestamp;
