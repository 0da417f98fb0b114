//! Audit event structure

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One structured event destined for the audit sink.
///
/// The sink guarantees ordered, eventual delivery without blocking the
/// request path; emitting an event is a side effect of an admission
/// decision, never a precondition for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEvent {
    /// Event name, e.g. `admission.allowed`
    pub event: String,
    /// Event payload (resource, credential identity, outcome details)
    pub data: Value,
    /// Correlation identifier of the originating request
    pub trace_id: String,
}

impl AuditEvent {
    pub fn new(event: impl Into<String>, data: Value, trace_id: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            data,
            trace_id: trace_id.into(),
        }
    }
}

/// Event names emitted by the admission decision engine
pub mod events {
    pub const ADMISSION_ALLOWED: &str = "admission.allowed";
    pub const ADMISSION_INVALID_CREDENTIAL: &str = "admission.invalid_credential";
    pub const ADMISSION_MISSING_GRANT: &str = "admission.missing_grant";
    pub const ADMISSION_QUOTA_EXHAUSTED: &str = "admission.quota_exhausted";
    pub const CREDENTIAL_ISSUED: &str = "credential.issued";
    pub const GRANT_SET: &str = "grant.set";
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_audit_event_wire_shape() {
        let event = AuditEvent::new(
            events::ADMISSION_ALLOWED,
            json!({"resource": "/v1/ocr"}),
            "trace-1",
        );

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "admission.allowed");
        assert_eq!(json["traceId"], "trace-1");
        assert_eq!(json["data"]["resource"], "/v1/ocr");
    }
}
