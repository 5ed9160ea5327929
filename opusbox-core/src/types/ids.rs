use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque, gateway-generated identifier for a stored object.
///
/// Keys are random v4 UUIDs: collision resistance comes from the generator,
/// never from object content. The gateway issues a fresh key per created
/// object; callers persist the string form and hand it back for reads and
/// deletes.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
)]
pub struct ObjectKey(pub Uuid);

impl ObjectKey {
    pub fn new() -> Self {
        ObjectKey(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }

    pub fn as_str(&self) -> String {
        self.0.to_string()
    }
}

impl Default for ObjectKey {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ObjectKey {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(ObjectKey(Uuid::parse_str(s)?))
    }
}

impl From<Uuid> for ObjectKey {
    fn from(value: Uuid) -> Self {
        ObjectKey(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_unique_per_generation() {
        let a = ObjectKey::new();
        let b = ObjectKey::new();
        assert_ne!(a, b);
    }

    #[test]
    fn display_round_trips_through_from_str() {
        let key = ObjectKey::new();
        let parsed: ObjectKey = key.to_string().parse().expect("valid uuid");
        assert_eq!(key, parsed);
    }

    #[test]
    fn rejects_garbage_strings() {
        assert!("not-a-key".parse::<ObjectKey>().is_err());
    }
}
