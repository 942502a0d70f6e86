use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// New Type Pattern -- https://doc.rust-lang.org/rust-by-example/generics/new_types.html
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
pub struct EntityId(pub String);

impl EntityId {
    pub fn new() -> EntityId {
        EntityId(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for EntityId {
    fn from(value: String) -> Self {
        EntityId(value)
    }
}

// Values
/// Rows committed per batch when copying between stores
pub const DEFAULT_MIGRATION_BATCH_SIZE: usize = 50;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_ids_are_unique() {
        let first = EntityId::new();
        let second = EntityId::new();

        assert!(!first.as_str().is_empty());
        assert_ne!(first, second);
    }

    #[test]
    fn serializes_as_plain_string() {
        let id = EntityId("abc".to_string());

        assert_eq!(serde_json::to_string(&id).unwrap(), "\"abc\"");
    }
}
