//! Strongly-typed identifier value objects.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::ValidationError;

/// Wire value a client sends to ask for a fresh session.
pub const NEW_SESSION_SENTINEL: i64 = -1;

/// Identifier of a dialog session, allocated by storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(i64);

impl SessionId {
    /// Creates a SessionId, rejecting non-positive values.
    pub fn new(id: i64) -> Result<Self, ValidationError> {
        if id <= 0 {
            return Err(ValidationError::invalid_format(
                "session_id",
                format!("must be positive or {}, got {}", NEW_SESSION_SENTINEL, id),
            ));
        }
        Ok(Self(id))
    }

    /// Returns the first identifier handed out by an empty store.
    pub fn first() -> Self {
        Self(1)
    }

    /// Returns the identifier following this one.
    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }

    /// Returns the raw integer value.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which session a request belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionSelector {
    /// Allocate a new session before answering.
    New,
    /// Append to an existing session.
    Existing(SessionId),
}

impl SessionSelector {
    /// Interprets the wire value, where `-1` means "new session".
    pub fn from_wire(value: i64) -> Result<Self, ValidationError> {
        if value == NEW_SESSION_SENTINEL {
            return Ok(Self::New);
        }
        SessionId::new(value).map(Self::Existing)
    }
}

/// Identifier of the calling user, carried by the opaque identity token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    /// Creates a UserId from its integer value.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw integer value.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UserId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::empty_field("user_id"));
        }
        trimmed
            .parse::<i64>()
            .map(Self)
            .map_err(|e| ValidationError::invalid_format("user_id", e.to_string()))
    }
}

/// Correlates log lines for one dispatched dialog request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DispatchId(Uuid);

impl DispatchId {
    /// Creates a new random DispatchId.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for DispatchId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DispatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_id_rejects_zero_and_negative() {
        assert!(SessionId::new(0).is_err());
        assert!(SessionId::new(-5).is_err());
        assert_eq!(SessionId::new(7).unwrap().as_i64(), 7);
    }

    #[test]
    fn session_id_first_and_next() {
        assert_eq!(SessionId::first().as_i64(), 1);
        assert_eq!(SessionId::first().next().as_i64(), 2);
    }

    #[test]
    fn selector_maps_sentinel_to_new() {
        assert_eq!(SessionSelector::from_wire(-1).unwrap(), SessionSelector::New);
    }

    #[test]
    fn selector_maps_positive_to_existing() {
        assert_eq!(
            SessionSelector::from_wire(12).unwrap(),
            SessionSelector::Existing(SessionId::new(12).unwrap())
        );
    }

    #[test]
    fn selector_rejects_other_negatives() {
        assert!(SessionSelector::from_wire(-2).is_err());
        assert!(SessionSelector::from_wire(0).is_err());
    }

    #[test]
    fn user_id_parses_from_token_text() {
        let id: UserId = " 42 ".parse().unwrap();
        assert_eq!(id.as_i64(), 42);
    }

    #[test]
    fn user_id_rejects_garbage() {
        assert!("".parse::<UserId>().is_err());
        assert!("abc".parse::<UserId>().is_err());
    }

    #[test]
    fn session_id_serializes_as_integer() {
        let json = serde_json::to_string(&SessionId::new(3).unwrap()).unwrap();
        assert_eq!(json, "3");
    }

    #[test]
    fn dispatch_ids_are_unique() {
        assert_ne!(DispatchId::new(), DispatchId::new());
    }
}
