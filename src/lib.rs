//! Dialog Gateway - Streaming dialog service for AI helper backends
//!
//! Routes a question to one of several upstream helpers (a hosted chat
//! model or remote code-review, test-generation, user-story and agent
//! services), normalizes whatever the upstream sends into readable text,
//! streams it to the client and records the full transcript.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
