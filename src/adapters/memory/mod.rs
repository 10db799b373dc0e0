//! In-memory adapters for tests and local development.

mod in_memory_dialog_repository;

pub use in_memory_dialog_repository::InMemoryDialogRepository;
