//! Application handlers.
//!
//! Command handlers that orchestrate domain operations.

pub mod dialog;

pub use dialog::{
    DialogStream, DispatchDialogCommand, DispatchDialogHandler, UpstreamRegistry, UpstreamRoute,
};
