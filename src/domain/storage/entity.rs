//! Storage entity traits

use std::fmt::Debug;

use serde::{de::DeserializeOwned, Serialize};

/// Key types usable as a storage primary key
pub trait StorageKey: Clone + Debug + Send + Sync + Eq + std::hash::Hash {
    /// Returns the key as the string stored in the primary key column
    fn as_str(&self) -> &str;
}

/// Entities persisted through [`Storage`](super::Storage)
pub trait StorageEntity: Clone + Debug + Send + Sync + Serialize + DeserializeOwned {
    type Key: StorageKey;

    fn key(&self) -> &Self::Key;
}

impl StorageKey for String {
    fn as_str(&self) -> &str {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
    struct Ledger {
        organization_id: String,
        total: f64,
    }

    impl StorageEntity for Ledger {
        type Key = String;

        fn key(&self) -> &Self::Key {
            &self.organization_id
        }
    }

    #[test]
    fn test_string_key_as_str() {
        let key = "org-1".to_string();
        assert_eq!(StorageKey::as_str(&key), "org-1");
    }

    #[test]
    fn test_entity_key() {
        let ledger = Ledger {
            organization_id: "org-42".to_string(),
            total: 12.5,
        };
        assert_eq!(ledger.key().as_str(), "org-42");
        assert_eq!(ledger.total, 12.5);
    }
}
