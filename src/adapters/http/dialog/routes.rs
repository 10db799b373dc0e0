//! HTTP routes for the dialog endpoints.

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use super::handlers::{health, post_dialog, DialogHandlers};
use crate::adapters::http::middleware::{identity_middleware, IdentityState};

/// Creates the router: `POST /dialog` behind identity, `GET /health` open.
pub fn dialog_routes(handlers: DialogHandlers, identity: IdentityState) -> Router {
    let protected = Router::new()
        .route("/dialog", post(post_dialog))
        .with_state(handlers)
        .layer(middleware::from_fn_with_state(identity, identity_middleware));

    Router::new().route("/health", get(health)).merge(protected)
}
