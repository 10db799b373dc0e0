//! Application layer - handlers and the streaming pipeline.
//!
//! This layer orchestrates domain operations and coordinates between ports.

pub mod handlers;
pub mod pipeline;

pub use handlers::{
    DialogStream, DispatchDialogCommand, DispatchDialogHandler, UpstreamRegistry, UpstreamRoute,
};
