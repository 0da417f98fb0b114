//! Application state for shared services

use std::collections::HashSet;
use std::sync::Arc;

use crate::domain::CredentialRepository;
use crate::infrastructure::admission::AdmissionService;
use crate::infrastructure::provisioning::ProvisioningService;

/// Shared state available to handlers and middleware
#[derive(Clone)]
pub struct AppState {
    /// Admission decision engine
    pub admission: Arc<AdmissionService>,
    /// Credential issuance and grant management
    pub provisioning: Arc<ProvisioningService>,
    /// Credential store handle, used by the readiness check
    pub credentials: Arc<dyn CredentialRepository>,
    /// Request paths subject to admission control
    pub protected_resources: Arc<HashSet<String>>,
}

impl AppState {
    pub fn new(
        admission: Arc<AdmissionService>,
        provisioning: Arc<ProvisioningService>,
        credentials: Arc<dyn CredentialRepository>,
        protected_resources: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            admission,
            provisioning,
            credentials,
            protected_resources: Arc::new(protected_resources.into_iter().collect()),
        }
    }

    /// Whether a request path is gated by the admission middleware
    pub fn is_protected(&self, path: &str) -> bool {
        self.protected_resources.contains(path)
    }
}
