//! Domain layer containing the dialog model and report rendering.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (IDs, timestamps, errors)
//! - `dialog` - Sessions, turns, modes and upstream targets
//! - `report` - Markdown rendering of structured upstream reports

pub mod dialog;
pub mod foundation;
pub mod report;
