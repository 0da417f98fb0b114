//! Read-through credential lookup cache using moka
//!
//! The cache maps a credential value to its last-known store record so
//! hot keys skip the store round-trip. It is process-local, never
//! authoritative, and constructed once at startup. Entries have no TTL
//! and are never invalidated; credentials are immutable once issued, so
//! a cached record can only go stale if a revocation feature is added
//! later. Absent results are not cached, which keeps a not-yet-issued
//! key from being pinned as missing at the cost of repeated store hits
//! for invalid keys.

use std::sync::Arc;

use moka::future::Cache as MokaCache;
use tracing::trace;

use crate::domain::{Credential, CredentialRepository, DomainError};

#[derive(Debug)]
pub struct CredentialCache {
    cache: MokaCache<String, Credential>,
}

impl CredentialCache {
    pub fn new(max_capacity: u64) -> Self {
        Self {
            cache: MokaCache::builder().max_capacity(max_capacity).build(),
        }
    }

    /// Return the cached record, or load it from the store and cache a
    /// present result
    pub async fn get_or_load(
        &self,
        value: &str,
        store: &Arc<dyn CredentialRepository>,
    ) -> Result<Option<Credential>, DomainError> {
        if let Some(credential) = self.cache.get(value).await {
            trace!("Credential cache hit");
            return Ok(Some(credential));
        }

        let loaded = store.find(value).await?;

        if let Some(ref credential) = loaded {
            self.cache
                .insert(value.to_string(), credential.clone())
                .await;
        }

        Ok(loaded)
    }

    /// Approximate number of cached entries
    pub fn len(&self) -> u64 {
        self.cache.entry_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
