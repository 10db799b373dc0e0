//! HTTP adapters - axum routes, handlers and middleware.

pub mod dialog;
pub mod middleware;

pub use dialog::{dialog_routes, DialogHandlers};
