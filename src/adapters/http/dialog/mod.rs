//! Dialog HTTP endpoints.

mod dto;
mod handlers;
mod routes;

pub use dto::{DialogRequest, ErrorResponse, HealthResponse};
pub use handlers::{health, post_dialog, DialogHandlers, SESSION_ID_HEADER};
pub use routes::dialog_routes;
