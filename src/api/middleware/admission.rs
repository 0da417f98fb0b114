//! Admission middleware
//!
//! Gates requests to configured protected resources. Unprotected paths
//! pass through untouched, with no store access. Protected paths must
//! carry an `X-API-Key` header; the admission engine's terminal outcome
//! maps onto the HTTP responses below, and only `Allowed` reaches the
//! downstream handler.

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::trace_id::TraceId;
use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::infrastructure::admission::AdmissionOutcome;

pub const API_KEY_HEADER: &str = "x-api-key";

pub async fn admission_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let path = request.uri().path();

    if !state.is_protected(path) {
        return next.run(request).await;
    }

    let Some(api_key) = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
    else {
        return ApiError::bad_request("Missing API Key").into_response();
    };

    let resource = path.to_string();
    let trace_id = request
        .extensions()
        .get::<TraceId>()
        .cloned()
        .unwrap_or_else(TraceId::generate);

    let outcome = match state
        .admission
        .decide(&api_key, &resource, trace_id.as_str())
        .await
    {
        Ok(outcome) => outcome,
        Err(e) => return ApiError::from(e).into_response(),
    };

    match outcome {
        AdmissionOutcome::Allowed => next.run(request).await,
        AdmissionOutcome::InvalidCredential => {
            ApiError::unauthorized("Invalid API Key").into_response()
        }
        AdmissionOutcome::MissingGrant => {
            ApiError::forbidden("API access not allowed").into_response()
        }
        AdmissionOutcome::QuotaExhausted => {
            ApiError::forbidden("API quota exceeded").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::http::StatusCode;
    use axum::{middleware, routing::get, Json, Router};
    use tower::util::ServiceExt;

    use crate::api::types::MessageBody;
    use crate::config::AuditConfig;
    use crate::domain::grant::GrantRepository;
    use crate::infrastructure::admission::AdmissionService;
    use crate::infrastructure::audit::AuditSink;
    use crate::infrastructure::credential::{CredentialCache, InMemoryCredentialRepository};
    use crate::infrastructure::grant::InMemoryGrantRepository;
    use crate::infrastructure::provisioning::ProvisioningService;

    struct Fixture {
        app: Router,
        credentials: Arc<InMemoryCredentialRepository>,
        grants: Arc<InMemoryGrantRepository>,
        _sink: AuditSink,
    }

    fn fixture(protected: &[&str]) -> Fixture {
        let credentials = Arc::new(InMemoryCredentialRepository::new());
        let grants = Arc::new(InMemoryGrantRepository::new());
        let sink = AuditSink::spawn(&AuditConfig {
            log_path: std::env::temp_dir()
                .join(format!("audit-{}.log", uuid::Uuid::new_v4()))
                .to_string_lossy()
                .into_owned(),
            ..AuditConfig::default()
        });

        let credentials_dyn: Arc<dyn crate::domain::CredentialRepository> = credentials.clone();
        let grants_dyn: Arc<dyn crate::domain::GrantRepository> = grants.clone();

        let state = AppState::new(
            Arc::new(AdmissionService::new(
                credentials_dyn.clone(),
                grants_dyn.clone(),
                CredentialCache::new(100),
                sink.handle(),
            )),
            Arc::new(ProvisioningService::new(
                credentials_dyn.clone(),
                grants_dyn,
                sink.handle(),
            )),
            credentials_dyn,
            protected.iter().map(|s| s.to_string()),
        );

        let app = Router::new()
            .route("/v1/ocr", get(|| async { Json(MessageBody::new("OK")) }))
            .route("/open", get(|| async { Json(MessageBody::new("OK")) }))
            .layer(middleware::from_fn_with_state(
                state.clone(),
                admission_middleware,
            ))
            .with_state(state);

        Fixture {
            app,
            credentials,
            grants,
            _sink: sink,
        }
    }

    fn get_request(path: &str, api_key: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(path);
        if let Some(key) = api_key {
            builder = builder.header(API_KEY_HEADER, key);
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn body_message(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: MessageBody = serde_json::from_slice(&bytes).unwrap();
        body.message
    }

    #[tokio::test]
    async fn test_unprotected_path_passes_without_key() {
        let fx = fixture(&["/v1/ocr"]);

        let response = fx.app.oneshot(get_request("/open", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_missing_header_is_400() {
        let fx = fixture(&["/v1/ocr"]);

        let response = fx.app.oneshot(get_request("/v1/ocr", None)).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_message(response).await, "Missing API Key");
    }

    #[tokio::test]
    async fn test_unknown_key_is_401_and_touches_no_grant() {
        let fx = fixture(&["/v1/ocr"]);
        fx.grants.upsert("someone-else", "/v1/ocr", 5).await.unwrap();

        let response = fx
            .app
            .oneshot(get_request("/v1/ocr", Some("unknown-value")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_message(response).await, "Invalid API Key");

        let grant = fx.grants.find("someone-else", "/v1/ocr").await.unwrap();
        assert_eq!(grant.unwrap().consumed(), 0);
    }

    #[tokio::test]
    async fn test_key_without_grant_is_403() {
        let fx = fixture(&["/v1/ocr"]);
        fx.credentials.insert("k1").await;

        let response = fx
            .app
            .oneshot(get_request("/v1/ocr", Some("k1")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(body_message(response).await, "API access not allowed");
    }

    #[tokio::test]
    async fn test_quota_scenario_two_allowed_then_403() {
        let fx = fixture(&["/v1/ocr"]);
        fx.credentials.insert("k1").await;
        fx.grants.upsert("k1", "/v1/ocr", 2).await.unwrap();

        for _ in 0..2 {
            let response = fx
                .app
                .clone()
                .oneshot(get_request("/v1/ocr", Some("k1")))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        let grant = fx.grants.find("k1", "/v1/ocr").await.unwrap().unwrap();
        assert_eq!(grant.consumed(), 2);

        let response = fx
            .app
            .clone()
            .oneshot(get_request("/v1/ocr", Some("k1")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(body_message(response).await, "API quota exceeded");

        // denied call left the counter where it was
        let grant = fx.grants.find("k1", "/v1/ocr").await.unwrap().unwrap();
        assert_eq!(grant.consumed(), 2);
    }
}
