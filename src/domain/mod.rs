//! Domain types: entities, repository traits and errors

pub mod audit;
pub mod credential;
pub mod error;
pub mod grant;

pub use audit::AuditEvent;
pub use credential::{Credential, CredentialRepository};
pub use error::DomainError;
pub use grant::{ConsumeOutcome, Grant, GrantRepository};
