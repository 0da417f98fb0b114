//! Credential issuance and grant management
//!
//! The only path that can reset a counter or change a limit. These
//! operations authenticate nothing about their caller; deployments are
//! expected to keep them off the public network (see DESIGN.md).

use std::sync::Arc;

use serde_json::json;
use tracing::info;

use crate::domain::audit::events;
use crate::domain::{
    AuditEvent, Credential, CredentialRepository, DomainError, Grant, GrantRepository,
};
use crate::infrastructure::audit::AuditHandle;

#[derive(Debug)]
pub struct ProvisioningService {
    credentials: Arc<dyn CredentialRepository>,
    grants: Arc<dyn GrantRepository>,
    audit: AuditHandle,
}

impl ProvisioningService {
    pub fn new(
        credentials: Arc<dyn CredentialRepository>,
        grants: Arc<dyn GrantRepository>,
        audit: AuditHandle,
    ) -> Self {
        Self {
            credentials,
            grants,
            audit,
        }
    }

    /// Issue a new credential with a freshly generated value
    pub async fn issue_credential(&self, trace_id: &str) -> Result<Credential, DomainError> {
        let credential = self.credentials.issue().await?;

        info!(credential_id = credential.id(), "Credential issued");

        self.audit
            .emit(AuditEvent::new(
                events::CREDENTIAL_ISSUED,
                json!({"credentialId": credential.id()}),
                trace_id,
            ))
            .await;

        Ok(credential)
    }

    /// Create or overwrite the grant for a (credential, resource) pair.
    /// Overwriting resets the counter to zero and starts a fresh quota
    /// epoch. Fails with `NotFound` when the credential was never
    /// issued, leaving no grant row behind.
    pub async fn set_grant(
        &self,
        credential_value: &str,
        resource_name: &str,
        limit: i64,
        trace_id: &str,
    ) -> Result<Grant, DomainError> {
        if limit <= 0 {
            return Err(DomainError::validation("limit must be positive"));
        }

        let credential = self
            .credentials
            .find(credential_value)
            .await?
            .ok_or_else(|| DomainError::not_found("API key not found"))?;

        let grant = self
            .grants
            .upsert(credential_value, resource_name, limit)
            .await?;

        info!(
            credential_id = credential.id(),
            resource = resource_name,
            limit,
            "Grant set"
        );

        self.audit
            .emit(AuditEvent::new(
                events::GRANT_SET,
                json!({
                    "credentialId": credential.id(),
                    "resource": resource_name,
                    "limit": limit,
                }),
                trace_id,
            ))
            .await;

        Ok(grant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AuditConfig;
    use crate::infrastructure::audit::AuditSink;
    use crate::infrastructure::credential::InMemoryCredentialRepository;
    use crate::infrastructure::grant::InMemoryGrantRepository;

    struct Fixture {
        service: ProvisioningService,
        grants: Arc<InMemoryGrantRepository>,
        _sink: AuditSink,
    }

    fn fixture() -> Fixture {
        let credentials = Arc::new(InMemoryCredentialRepository::new());
        let grants = Arc::new(InMemoryGrantRepository::new());
        let sink = AuditSink::spawn(&AuditConfig {
            log_path: std::env::temp_dir()
                .join(format!("audit-{}.log", uuid::Uuid::new_v4()))
                .to_string_lossy()
                .into_owned(),
            ..AuditConfig::default()
        });

        let service = ProvisioningService::new(credentials, grants.clone(), sink.handle());

        Fixture {
            service,
            grants,
            _sink: sink,
        }
    }

    #[tokio::test]
    async fn test_issued_credentials_are_pairwise_distinct() {
        let fx = fixture();
        let mut values = std::collections::HashSet::new();

        for _ in 0..20 {
            let credential = fx.service.issue_credential("t").await.unwrap();
            assert!(values.insert(credential.value().to_string()));
        }
    }

    #[tokio::test]
    async fn test_set_grant_for_unknown_credential() {
        let fx = fixture();

        let result = fx.service.set_grant("ghost", "/v1/ocr", 5, "t").await;
        assert!(matches!(result, Err(DomainError::NotFound { .. })));

        // No grant row was created
        assert!(fx.grants.find("ghost", "/v1/ocr").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_grant_rejects_non_positive_limit() {
        let fx = fixture();
        let credential = fx.service.issue_credential("t").await.unwrap();

        let result = fx
            .service
            .set_grant(credential.value(), "/v1/ocr", 0, "t")
            .await;
        assert!(matches!(result, Err(DomainError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_set_grant_resets_epoch() {
        let fx = fixture();
        let credential = fx.service.issue_credential("t").await.unwrap();

        fx.service
            .set_grant(credential.value(), "/v1/ocr", 2, "t")
            .await
            .unwrap();

        fx.grants
            .try_consume(credential.value(), "/v1/ocr")
            .await
            .unwrap();
        fx.grants
            .try_consume(credential.value(), "/v1/ocr")
            .await
            .unwrap();

        let grant = fx
            .service
            .set_grant(credential.value(), "/v1/ocr", 4, "t")
            .await
            .unwrap();

        assert_eq!(grant.limit(), 4);
        assert_eq!(grant.consumed(), 0);
    }
}
