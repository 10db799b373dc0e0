//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `UpstreamAdapter` - Outbound call to an AI helper service
//! - `DialogRepository` - Session and transcript persistence
//! - `IdentityVerifier` - Caller identification from a request token

mod dialog_repository;
mod identity;
mod upstream;

pub use dialog_repository::DialogRepository;
pub use identity::{IdentityError, IdentityVerifier};
pub use upstream::{RawChunk, RawChunkStream, UpstreamAdapter, UpstreamError, UpstreamRequest};
