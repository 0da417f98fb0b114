//! Request/response logging middleware with sensitive header redaction

use std::time::Instant;

use axum::{body::Body, http::Request, middleware::Next, response::Response};
use tracing::info;

use super::trace_id::TraceId;

pub async fn logging_middleware(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let trace_id = request
        .extensions()
        .get::<TraceId>()
        .map(|t| t.as_str().to_string())
        .unwrap_or_default();
    let headers_log = redact_headers(&request);

    info!(
        method = %method,
        path = %path,
        trace_id = %trace_id,
        headers = %headers_log,
        "Incoming request"
    );

    let response = next.run(request).await;

    let duration = start.elapsed();

    info!(
        method = %method,
        path = %path,
        status = %response.status().as_u16(),
        duration_ms = %duration.as_millis(),
        trace_id = %trace_id,
        "Request completed"
    );

    response
}

fn redact_headers(request: &Request<Body>) -> String {
    let mut parts = Vec::new();

    for (name, value) in request.headers() {
        let name_str = name.as_str().to_lowercase();

        if !should_log_header(&name_str) {
            continue;
        }

        let value_str = if is_sensitive_header(&name_str) {
            "[REDACTED]".to_string()
        } else {
            value.to_str().unwrap_or("[invalid]").to_string()
        };

        parts.push(format!("{}={}", name_str, value_str));
    }

    parts.join(", ")
}

/// Check if a header contains sensitive information
fn is_sensitive_header(name: &str) -> bool {
    matches!(name, "authorization" | "x-api-key" | "cookie" | "set-cookie")
}

/// Check if a header should be logged
fn should_log_header(name: &str) -> bool {
    matches!(
        name,
        "content-type"
            | "content-length"
            | "accept"
            | "user-agent"
            | "x-trace-id"
            | "x-forwarded-for"
            | "x-api-key"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_sensitive_header() {
        assert!(is_sensitive_header("x-api-key"));
        assert!(is_sensitive_header("authorization"));
        assert!(!is_sensitive_header("content-type"));
    }

    #[test]
    fn test_api_key_never_logged_in_clear() {
        let request = Request::builder()
            .uri("/v1/ocr")
            .header("x-api-key", "super-secret-value")
            .header("content-type", "application/json")
            .body(Body::empty())
            .unwrap();

        let logged = redact_headers(&request);

        assert!(logged.contains("x-api-key=[REDACTED]"));
        assert!(!logged.contains("super-secret-value"));
        assert!(logged.contains("content-type=application/json"));
    }
}
