//! HTTP handlers for the dialog endpoint.

use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderName, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use futures::StreamExt;
use tokio_stream::wrappers::ReceiverStream;

use crate::adapters::http::middleware::RequireIdentity;
use crate::application::{DialogStream, DispatchDialogHandler};
use crate::domain::dialog::DialogError;

use super::dto::{DialogRequest, ErrorResponse, HealthResponse};

/// Response header carrying the resolved session id.
pub const SESSION_ID_HEADER: &str = "x-session-id";

// ════════════════════════════════════════════════════════════════════════════
// Handler state
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct DialogHandlers {
    dispatch_handler: Arc<DispatchDialogHandler>,
}

impl DialogHandlers {
    pub fn new(dispatch_handler: Arc<DispatchDialogHandler>) -> Self {
        Self { dispatch_handler }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HTTP handlers
// ════════════════════════════════════════════════════════════════════════════

/// POST /dialog - Answer a question as a streamed plain-text body
pub async fn post_dialog(
    State(handlers): State<DialogHandlers>,
    RequireIdentity(user_id): RequireIdentity,
    payload: Result<Json<DialogRequest>, JsonRejection>,
) -> Response {
    let Json(req) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::invalid_input(rejection.body_text())),
            )
                .into_response()
        }
    };

    match handlers.dispatch_handler.handle(req.into_command(user_id)).await {
        Ok(stream) => stream_response(stream),
        Err(e) => handle_dialog_error(e),
    }
}

/// GET /health - Liveness probe
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

// ════════════════════════════════════════════════════════════════════════════
// Helpers
// ════════════════════════════════════════════════════════════════════════════

fn stream_response(stream: DialogStream) -> Response {
    let DialogStream {
        session_id,
        fragments,
        ..
    } = stream;

    let body = Body::from_stream(ReceiverStream::new(fragments).map(Ok::<_, Infallible>));

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (header::CACHE_CONTROL, "no-cache".to_string()),
            (HeaderName::from_static(SESSION_ID_HEADER), session_id.to_string()),
        ],
        body,
    )
        .into_response()
}

fn handle_dialog_error(error: DialogError) -> Response {
    let status = match &error {
        DialogError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        DialogError::UpstreamUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        DialogError::Storage(e) => {
            tracing::error!(error = %e, "dialog rejected by storage failure");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    (status, Json(ErrorResponse::from(&error))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{DomainError, ValidationError};

    #[test]
    fn error_statuses() {
        let cases = [
            (
                DialogError::from(ValidationError::empty_field("question")),
                StatusCode::BAD_REQUEST,
            ),
            (
                DialogError::upstream_unavailable("local", "missing key"),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                DialogError::from(DomainError::database("down")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, status) in cases {
            assert_eq!(handle_dialog_error(error).status(), status);
        }
    }
}
