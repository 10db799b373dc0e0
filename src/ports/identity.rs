//! Identity port - resolves the caller from an opaque token.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::foundation::UserId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    #[error("missing authorization token")]
    MissingToken,

    #[error("invalid authorization token: {0}")]
    InvalidToken(String),
}

/// Verifies a request token and returns the user it identifies.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<UserId, IdentityError>;
}
