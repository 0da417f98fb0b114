//! Admission decision engine
//!
//! Per request, over a single (credential, resource) pair: resolve the
//! credential through the lookup cache, check that a grant exists, then
//! atomically consume one unit of quota. Exactly one outcome per
//! request; only `Allowed` advances the counter, and it advances it by
//! exactly one. Every terminal outcome emits one audit event.

use std::sync::Arc;

use serde_json::json;
use tracing::debug;

use crate::domain::audit::events;
use crate::domain::{
    AuditEvent, ConsumeOutcome, CredentialRepository, DomainError, GrantRepository,
};
use crate::infrastructure::audit::AuditHandle;
use crate::infrastructure::credential::CredentialCache;

/// Terminal outcome of an admission decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmissionOutcome {
    /// Credential and grant are valid; one unit of quota was consumed
    Allowed,
    /// The presented credential does not resolve to an issued one
    InvalidCredential,
    /// The credential exists but holds no grant for the resource
    MissingGrant,
    /// The grant's counter has reached its limit
    QuotaExhausted,
}

impl AdmissionOutcome {
    fn audit_event_name(&self) -> &'static str {
        match self {
            Self::Allowed => events::ADMISSION_ALLOWED,
            Self::InvalidCredential => events::ADMISSION_INVALID_CREDENTIAL,
            Self::MissingGrant => events::ADMISSION_MISSING_GRANT,
            Self::QuotaExhausted => events::ADMISSION_QUOTA_EXHAUSTED,
        }
    }
}

/// Decides allow/deny per request and advances quota counters
#[derive(Debug)]
pub struct AdmissionService {
    credentials: Arc<dyn CredentialRepository>,
    grants: Arc<dyn GrantRepository>,
    cache: CredentialCache,
    audit: AuditHandle,
}

impl AdmissionService {
    pub fn new(
        credentials: Arc<dyn CredentialRepository>,
        grants: Arc<dyn GrantRepository>,
        cache: CredentialCache,
        audit: AuditHandle,
    ) -> Self {
        Self {
            credentials,
            grants,
            cache,
            audit,
        }
    }

    /// Decide admission for one request. Store failures propagate as
    /// `DomainError::Storage`; they are never folded into a deny.
    pub async fn decide(
        &self,
        credential_value: &str,
        resource_name: &str,
        trace_id: &str,
    ) -> Result<AdmissionOutcome, DomainError> {
        let credential = self
            .cache
            .get_or_load(credential_value, &self.credentials)
            .await?;

        let Some(credential) = credential else {
            return self
                .finish(
                    AdmissionOutcome::InvalidCredential,
                    None,
                    resource_name,
                    trace_id,
                )
                .await;
        };

        // Existence check before the write path: credentials with zero
        // grants never open a write transaction.
        if self
            .grants
            .find(credential_value, resource_name)
            .await?
            .is_none()
        {
            return self
                .finish(
                    AdmissionOutcome::MissingGrant,
                    Some(credential.id()),
                    resource_name,
                    trace_id,
                )
                .await;
        }

        let outcome = match self.grants.try_consume(credential_value, resource_name).await? {
            ConsumeOutcome::Admitted => AdmissionOutcome::Allowed,
            ConsumeOutcome::QuotaExceeded => AdmissionOutcome::QuotaExhausted,
            // The grant vanished between find and try_consume; grants
            // are never deleted in normal operation, but treat it the
            // same as never having existed.
            ConsumeOutcome::NoSuchGrant => AdmissionOutcome::MissingGrant,
        };

        self.finish(outcome, Some(credential.id()), resource_name, trace_id)
            .await
    }

    async fn finish(
        &self,
        outcome: AdmissionOutcome,
        credential_id: Option<i64>,
        resource_name: &str,
        trace_id: &str,
    ) -> Result<AdmissionOutcome, DomainError> {
        debug!(resource = resource_name, ?outcome, "Admission decision");

        self.audit
            .emit(AuditEvent::new(
                outcome.audit_event_name(),
                json!({
                    "resource": resource_name,
                    "credentialId": credential_id,
                    "outcome": format!("{:?}", outcome),
                }),
                trace_id,
            ))
            .await;

        Ok(outcome)
    }
}
