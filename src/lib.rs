//! Quota Gate
//!
//! An admission-controlled API gateway:
//! - credential issuance (opaque bearer keys)
//! - per-resource quota grants with atomic consumption counters
//! - a read-through credential lookup cache
//! - an admission middleware gating configured protected resources
//!
//! The operations the gateway fronts are opaque downstream handlers;
//! callers merge their own routes via
//! [`api::create_router_with_downstream`].

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use tracing::info;

use api::state::AppState;
use config::StorageBackend;
use domain::{CredentialRepository, GrantRepository};
use infrastructure::admission::AdmissionService;
use infrastructure::audit::AuditSink;
use infrastructure::credential::{
    CredentialCache, InMemoryCredentialRepository, PostgresCredentialRepository,
};
use infrastructure::grant::{InMemoryGrantRepository, PostgresGrantRepository};
use infrastructure::provisioning::ProvisioningService;
use infrastructure::storage::{PostgresConfig, PostgresMigrator};

/// Create the application state with all services initialized.
///
/// Returns the state together with the audit sink, which the caller
/// owns for graceful shutdown.
pub async fn create_app_state(config: &AppConfig) -> anyhow::Result<(AppState, AuditSink)> {
    let (credentials, grants): (Arc<dyn CredentialRepository>, Arc<dyn GrantRepository>) =
        match config.database.backend {
            StorageBackend::Postgres => {
                let url = config.database_url();
                info!("Connecting to PostgreSQL...");

                let pool = PostgresConfig::from_app_config(&url, &config.database)
                    .connect()
                    .await?;
                PostgresMigrator::new(pool.clone()).run().await?;

                info!("PostgreSQL connection established");
                (
                    Arc::new(PostgresCredentialRepository::new(pool.clone())),
                    Arc::new(PostgresGrantRepository::new(pool)),
                )
            }
            StorageBackend::Memory => {
                info!("Using in-memory stores");
                (
                    Arc::new(InMemoryCredentialRepository::new()),
                    Arc::new(InMemoryGrantRepository::new()),
                )
            }
        };

    let audit_sink = AuditSink::spawn(&config.audit);

    let admission = Arc::new(AdmissionService::new(
        credentials.clone(),
        grants.clone(),
        CredentialCache::new(config.admission.cache_capacity),
        audit_sink.handle(),
    ));

    let provisioning = Arc::new(ProvisioningService::new(
        credentials.clone(),
        grants,
        audit_sink.handle(),
    ));

    let state = AppState::new(
        admission,
        provisioning,
        credentials,
        config.admission.protected_resources.iter().cloned(),
    );

    Ok((state, audit_sink))
}
