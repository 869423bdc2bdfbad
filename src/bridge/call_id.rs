//! Type-safe correlation identifier for in-flight commands.
//!
//! [`CallId`] is a newtype wrapper around [`uuid::Uuid`] (v4). The bridge
//! generates one per outbound command and the plant echoes it back on the
//! matching reply; it carries no meaning beyond correlation.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Unique identifier correlating an outbound command with its reply.
///
/// Wraps a UUID v4 rendered in its canonical hyphenated text form on the
/// wire. Generated exclusively by the bridge — the plant never mints one.
/// Used as the key of the pending-call table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallId(uuid::Uuid);

impl CallId {
    /// Creates a new random `CallId` (UUID v4).
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// Creates a `CallId` from an existing [`uuid::Uuid`].
    #[must_use]
    pub const fn from_uuid(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner [`uuid::Uuid`].
    #[must_use]
    pub const fn as_uuid(&self) -> &uuid::Uuid {
        &self.0
    }
}

impl Default for CallId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CallId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<uuid::Uuid> for CallId {
    fn from(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }
}

impl From<CallId> for uuid::Uuid {
    fn from(id: CallId) -> Self {
        id.0
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn new_generates_unique_ids() {
        let a = CallId::new();
        let b = CallId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn display_is_uuid_format() {
        let id = CallId::new();
        let s = format!("{id}");
        assert_eq!(s.len(), 36); // UUID string length
        assert!(s.contains('-'));
    }

    #[test]
    fn serde_is_transparent() {
        let id = CallId::new();
        let json = serde_json::to_string(&id).ok();
        let Some(json) = json else {
            panic!("serialization failed");
        };
        assert_eq!(json, format!("\"{id}\""));
        let parsed: Option<CallId> = serde_json::from_str(&json).ok();
        assert_eq!(parsed, Some(id));
    }

    #[test]
    fn from_uuid_round_trip() {
        let uuid = uuid::Uuid::new_v4();
        let id = CallId::from_uuid(uuid);
        assert_eq!(*id.as_uuid(), uuid);
        assert_eq!(CallId::from(uuid), id);
        assert_eq!(uuid::Uuid::from(id), uuid);
    }

    #[test]
    fn hash_works_in_hashmap() {
        use std::collections::HashMap;
        let id = CallId::new();
        let mut map = HashMap::new();
        map.insert(id, "test");
        assert_eq!(map.get(&id), Some(&"test"));
    }

    #[test]
    fn default_creates_new() {
        let a = CallId::default();
        let b = CallId::default();
        assert_ne!(a, b);
    }
}
