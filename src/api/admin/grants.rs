//! Grant management endpoint

use axum::{extract::State, Extension, Json};
use serde::Deserialize;

use crate::api::middleware::TraceId;
use crate::api::state::AppState;
use crate::api::types::{ApiError, MessageBody};

/// Request to create or overwrite a quota grant
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetGrantRequest {
    pub credential_value: String,
    pub resource_name: String,
    pub limit: i64,
}

/// `POST /grants`: set the quota grant for a (credential, resource)
/// pair. Overwriting an existing grant resets its counter to zero.
pub async fn set_grant(
    State(state): State<AppState>,
    trace_id: Option<Extension<TraceId>>,
    Json(request): Json<SetGrantRequest>,
) -> Result<Json<MessageBody>, ApiError> {
    let trace_id = trace_id.map(|Extension(t)| t).unwrap_or_else(TraceId::generate);

    state
        .provisioning
        .set_grant(
            &request.credential_value,
            &request.resource_name,
            request.limit,
            trace_id.as_str(),
        )
        .await?;

    Ok(Json(MessageBody::ok()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_uses_camel_case_fields() {
        let request: SetGrantRequest = serde_json::from_str(
            r#"{"credentialValue": "k1", "resourceName": "/v1/ocr", "limit": 5}"#,
        )
        .unwrap();

        assert_eq!(request.credential_value, "k1");
        assert_eq!(request.resource_name, "/v1/ocr");
        assert_eq!(request.limit, 5);
    }
}
