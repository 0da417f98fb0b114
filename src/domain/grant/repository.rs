//! Grant repository trait

use std::fmt::Debug;

use async_trait::async_trait;

use super::entity::{ConsumeOutcome, Grant};
use crate::domain::DomainError;

/// Repository trait for the grant store.
///
/// `try_consume` is the one operation that must be atomic: the
/// `consumed < limit` check and the increment happen as a single
/// indivisible step with respect to concurrent callers on the same
/// (credential, resource) pair. Implementations serialize per pair and
/// must not contend across unrelated pairs.
#[async_trait]
pub trait GrantRepository: Send + Sync + Debug {
    /// Create a grant for the pair, or overwrite its limit and reset
    /// the counter to zero (a limit change starts a fresh quota epoch)
    async fn upsert(
        &self,
        credential_value: &str,
        resource_name: &str,
        limit: i64,
    ) -> Result<Grant, DomainError>;

    /// Look up the grant for a (credential, resource) pair
    async fn find(
        &self,
        credential_value: &str,
        resource_name: &str,
    ) -> Result<Option<Grant>, DomainError>;

    /// Atomically admit one consumption if the counter is below the
    /// limit. Denials never modify the counter.
    async fn try_consume(
        &self,
        credential_value: &str,
        resource_name: &str,
    ) -> Result<ConsumeOutcome, DomainError>;
}
