//! In-memory grant repository for development and tests
//!
//! Each grant lives behind its own async mutex so concurrent consumers
//! of the same (credential, resource) pair serialize on that entry
//! alone. The outer map lock is held only long enough to resolve the
//! entry, keeping unrelated grants from contending.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};

use crate::domain::{ConsumeOutcome, DomainError, Grant, GrantRepository};

type GrantKey = (String, String);

#[derive(Debug, Default)]
pub struct InMemoryGrantRepository {
    grants: RwLock<HashMap<GrantKey, Arc<Mutex<Grant>>>>,
}

impl InMemoryGrantRepository {
    pub fn new() -> Self {
        Self::default()
    }

    async fn entry(&self, credential_value: &str, resource_name: &str) -> Option<Arc<Mutex<Grant>>> {
        let grants = self.grants.read().await;
        grants
            .get(&(credential_value.to_string(), resource_name.to_string()))
            .cloned()
    }
}

#[async_trait]
impl GrantRepository for InMemoryGrantRepository {
    async fn upsert(
        &self,
        credential_value: &str,
        resource_name: &str,
        limit: i64,
    ) -> Result<Grant, DomainError> {
        let grant = Grant::new(credential_value, resource_name, limit);
        let key = (credential_value.to_string(), resource_name.to_string());

        let mut grants = self.grants.write().await;
        // Replacing the entry resets the counter and starts a fresh
        // quota epoch; in-flight consumers of the old entry linearize
        // before the reset.
        grants.insert(key, Arc::new(Mutex::new(grant.clone())));

        Ok(grant)
    }

    async fn find(
        &self,
        credential_value: &str,
        resource_name: &str,
    ) -> Result<Option<Grant>, DomainError> {
        match self.entry(credential_value, resource_name).await {
            Some(entry) => Ok(Some(entry.lock().await.clone())),
            None => Ok(None),
        }
    }

    async fn try_consume(
        &self,
        credential_value: &str,
        resource_name: &str,
    ) -> Result<ConsumeOutcome, DomainError> {
        let Some(entry) = self.entry(credential_value, resource_name).await else {
            return Ok(ConsumeOutcome::NoSuchGrant);
        };

        let mut grant = entry.lock().await;
        if grant.has_remaining() {
            grant.consume();
            Ok(ConsumeOutcome::Admitted)
        } else {
            Ok(ConsumeOutcome::QuotaExceeded)
        }
    }
}
