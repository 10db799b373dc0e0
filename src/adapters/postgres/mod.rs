//! PostgreSQL adapters - Database implementations for repository ports.
//!
//! - `PostgresDialogRepository` - Sessions and append-only dialog turns

mod dialog_repository;

pub use dialog_repository::PostgresDialogRepository;
