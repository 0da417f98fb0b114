//! In-memory credential repository for development and tests

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::domain::{Credential, CredentialRepository, DomainError};

use super::generate_credential_value;

#[derive(Debug, Default)]
pub struct InMemoryCredentialRepository {
    credentials: RwLock<HashMap<String, Credential>>,
    next_id: AtomicI64,
}

impl InMemoryCredentialRepository {
    pub fn new() -> Self {
        Self {
            credentials: RwLock::new(HashMap::new()),
            next_id: AtomicI64::new(1),
        }
    }

    /// Seed a credential with a known value (test setup)
    pub async fn insert(&self, value: impl Into<String>) -> Credential {
        let value = value.into();
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let credential = Credential::new(id, value.clone(), Utc::now());

        let mut credentials = self.credentials.write().await;
        credentials.insert(value, credential.clone());
        credential
    }
}

#[async_trait]
impl CredentialRepository for InMemoryCredentialRepository {
    async fn issue(&self) -> Result<Credential, DomainError> {
        let value = generate_credential_value();
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let credential = Credential::new(id, value.clone(), Utc::now());

        let mut credentials = self.credentials.write().await;
        if credentials.contains_key(&value) {
            // 128-bit random values do not collide in practice
            return Err(DomainError::conflict("Credential value collision"));
        }
        credentials.insert(value, credential.clone());

        Ok(credential)
    }

    async fn find(&self, value: &str) -> Result<Option<Credential>, DomainError> {
        let credentials = self.credentials.read().await;
        Ok(credentials.get(value).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[tokio::test]
    async fn test_issue_and_find() {
        let repo = InMemoryCredentialRepository::new();

        let issued = repo.issue().await.unwrap();
        let found = repo.find(issued.value()).await.unwrap();

        assert_eq!(found, Some(issued));
    }

    #[tokio::test]
    async fn test_find_missing_is_none() {
        let repo = InMemoryCredentialRepository::new();

        let found = repo.find("no-such-value").await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_issued_values_are_distinct() {
        let repo = InMemoryCredentialRepository::new();
        let mut values = HashSet::new();

        for _ in 0..50 {
            let credential = repo.issue().await.unwrap();
            assert!(values.insert(credential.value().to_string()));
        }
    }

    #[tokio::test]
    async fn test_ids_are_monotonic() {
        let repo = InMemoryCredentialRepository::new();

        let first = repo.issue().await.unwrap();
        let second = repo.issue().await.unwrap();

        assert!(second.id() > first.id());
    }
}
