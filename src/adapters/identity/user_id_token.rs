//! Token verifier for clients that send their numeric user id as the token.

use async_trait::async_trait;

use crate::domain::foundation::UserId;
use crate::ports::{IdentityError, IdentityVerifier};

/// Treats the token as the caller's user id.
///
/// An optional `Bearer ` prefix is accepted.
#[derive(Debug, Clone, Copy, Default)]
pub struct UserIdTokenVerifier;

impl UserIdTokenVerifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl IdentityVerifier for UserIdTokenVerifier {
    async fn verify(&self, token: &str) -> Result<UserId, IdentityError> {
        let token = strip_bearer(token.trim()).trim();
        if token.is_empty() {
            return Err(IdentityError::MissingToken);
        }

        token
            .parse::<UserId>()
            .map_err(|e| IdentityError::InvalidToken(e.to_string()))
    }
}

/// Drops a leading `Bearer` scheme, including a bare `Bearer` with no value.
fn strip_bearer(token: &str) -> &str {
    match token.strip_prefix("Bearer") {
        Some(rest) if rest.is_empty() || rest.starts_with(char::is_whitespace) => rest,
        _ => token,
    }
}
