//! Credential issuance endpoint

use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};

use crate::api::middleware::TraceId;
use crate::api::state::AppState;
use crate::api::types::ApiError;

/// Response carrying a freshly issued credential value. The value is
/// the bearer secret; it is returned here and never again.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueCredentialResponse {
    pub value: String,
}

/// `POST /credentials`: issue a new credential
pub async fn issue_credential(
    State(state): State<AppState>,
    trace_id: Option<Extension<TraceId>>,
) -> Result<Json<IssueCredentialResponse>, ApiError> {
    let trace_id = trace_id.map(|Extension(t)| t).unwrap_or_else(TraceId::generate);

    let credential = state
        .provisioning
        .issue_credential(trace_id.as_str())
        .await?;

    Ok(Json(IssueCredentialResponse {
        value: credential.value().to_string(),
    }))
}
