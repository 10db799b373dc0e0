//! Dialog handlers.

mod dispatch_dialog;
mod upstream_registry;

pub use dispatch_dialog::{DialogStream, DispatchDialogCommand, DispatchDialogHandler};
pub use upstream_registry::{UpstreamRegistry, UpstreamRoute};
