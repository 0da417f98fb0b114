//! Credential repository trait

use std::fmt::Debug;

use async_trait::async_trait;

use super::entity::Credential;
use crate::domain::DomainError;

/// Repository trait for the credential store.
///
/// `find` never fails for a missing record; absence is `Ok(None)`.
/// `issue` fails with `DomainError::Storage` when the durable backend
/// is unreachable.
#[async_trait]
pub trait CredentialRepository: Send + Sync + Debug {
    /// Create and persist a credential with a freshly generated value
    async fn issue(&self) -> Result<Credential, DomainError>;

    /// Look up a credential by its opaque value
    async fn find(&self, value: &str) -> Result<Option<Credential>, DomainError>;
}
