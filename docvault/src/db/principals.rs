//! Principal directory
//!
//! Stores credential-bearing principal records and hands out the stripped
//! [`Principal`] projection. The directory sits behind a trait so the
//! in-memory implementation can be swapped for a persistent one without
//! touching the gate.

use async_trait::async_trait;
use dashmap::DashMap;
use serde::Serialize;

/// Resolved identity attached to an authenticated request
///
/// Never carries the credential secret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    pub id: String,
    pub name: String,
    pub email: String,
}

/// Stored principal record, secret included
#[derive(Debug, Clone)]
pub struct PrincipalRecord {
    pub id: String,
    pub name: String,
    pub email: String,
    /// Credential secret; must never leave the directory
    pub password_hash: String,
}

impl PrincipalRecord {
    /// Projection that drops the secret
    pub fn to_principal(&self) -> Principal {
        Principal {
            id: self.id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }
}

/// Lookup seam used by the auth gate
#[async_trait]
pub trait PrincipalDirectory: Send + Sync {
    /// Resolve a principal by ID, already stripped of secrets
    async fn find_by_id(&self, id: &str) -> Option<Principal>;
}

/// In-memory directory
pub struct MemoryDirectory {
    records: DashMap<String, PrincipalRecord>,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
        }
    }

    pub fn insert(&self, record: PrincipalRecord) {
        self.records.insert(record.id.clone(), record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Default for MemoryDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PrincipalDirectory for MemoryDirectory {
    async fn find_by_id(&self, id: &str) -> Option<Principal> {
        self.records.get(id).map(|record| record.to_principal())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> PrincipalRecord {
        PrincipalRecord {
            id: "u-1".into(),
            name: "Ada Lovelace".into(),
            email: "ada@example.com".into(),
            password_hash: "$argon2id$stub".into(),
        }
    }

    #[test]
    fn test_projection_strips_secret() {
        let principal = record().to_principal();
        let json = serde_json::to_string(&principal).unwrap();
        assert!(json.contains("ada@example.com"));
        assert!(!json.contains("argon2"));
    }

    #[tokio::test]
    async fn test_find_by_id() {
        let directory = MemoryDirectory::new();
        directory.insert(record());

        let found = directory.find_by_id("u-1").await.unwrap();
        assert_eq!(found.name, "Ada Lovelace");

        assert!(directory.find_by_id("u-2").await.is_none());
    }
}
