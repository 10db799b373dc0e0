//! Identity adapters - implementations of the `IdentityVerifier` port.

mod user_id_token;

pub use user_id_token::UserIdTokenVerifier;
