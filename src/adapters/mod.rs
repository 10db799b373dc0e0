//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `upstream` - Outbound calls to AI helper services (reqwest)
//! - `postgres` - Session and transcript persistence (sqlx)
//! - `memory` - In-memory repository for tests and development
//! - `identity` - Request token verification
//! - `http` - axum routes, handlers and middleware

pub mod http;
pub mod identity;
pub mod memory;
pub mod postgres;
pub mod upstream;
