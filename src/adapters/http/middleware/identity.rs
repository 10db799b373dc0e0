//! Identity middleware and extractor for axum.
//!
//! ```text
//! Request → identity_middleware → injects UserId into extensions
//!                                      ↓
//!                       Handler → RequireIdentity reads from extensions
//! ```
//!
//! The middleware uses the `IdentityVerifier` port, so the token scheme can
//! change without touching handlers.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use crate::domain::foundation::UserId;
use crate::ports::{IdentityError, IdentityVerifier};

/// Middleware state - wraps the identity verifier.
pub type IdentityState = Arc<dyn IdentityVerifier>;

/// Resolves the caller from the `Authorization` header.
///
/// - valid token: injects `UserId` into request extensions
/// - no header: continues without a user; `RequireIdentity` rejects later
/// - present but empty or unparseable: 401 with an `UNAUTHENTICATED` body
pub async fn identity_middleware(
    State(verifier): State<IdentityState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get("Authorization")
        .map(|h| h.to_str().map(str::to_string));

    match token {
        Some(Ok(token)) => match verifier.verify(&token).await {
            Ok(user_id) => {
                request.extensions_mut().insert(user_id);
                next.run(request).await
            }
            Err(e) => {
                tracing::debug!(error = %e, "rejected authorization token");
                IdentityRejection::from(e).into_response()
            }
        },
        Some(Err(_)) => {
            IdentityRejection::Invalid("header is not valid ASCII".to_string()).into_response()
        }
        None => next.run(request).await,
    }
}

/// Extractor that requires an identified caller.
///
/// ```ignore
/// async fn my_handler(RequireIdentity(user_id): RequireIdentity) -> impl IntoResponse {
///     format!("Hello, user {}!", user_id)
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct RequireIdentity(pub UserId);

impl<S> axum::extract::FromRequestParts<S> for RequireIdentity
where
    S: Send + Sync,
{
    type Rejection = IdentityRejection;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut axum::http::request::Parts,
        _state: &'life1 S,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self, Self::Rejection>> + Send + 'async_trait>,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            parts
                .extensions
                .get::<UserId>()
                .copied()
                .map(RequireIdentity)
                .ok_or(IdentityRejection::Missing)
        })
    }
}

/// Rejection for requests without a usable identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityRejection {
    Missing,
    Invalid(String),
}

impl From<IdentityError> for IdentityRejection {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::MissingToken => IdentityRejection::Missing,
            IdentityError::InvalidToken(reason) => IdentityRejection::Invalid(reason),
        }
    }
}

impl IntoResponse for IdentityRejection {
    fn into_response(self) -> Response {
        let message = match self {
            IdentityRejection::Missing => "Authentication required".to_string(),
            IdentityRejection::Invalid(reason) => format!("Invalid token: {}", reason),
        };

        (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({
                "error": message,
                "code": "UNAUTHENTICATED"
            })),
        )
            .into_response()
    }
}
