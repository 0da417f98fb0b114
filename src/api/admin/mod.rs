//! Grant management endpoints: credential issuance and quota grants
//!
//! These endpoints authenticate nothing about their caller; deployments
//! are expected to gate them externally. See DESIGN.md.

mod credentials;
mod grants;

pub use credentials::{issue_credential, IssueCredentialResponse};
pub use grants::{set_grant, SetGrantRequest};
