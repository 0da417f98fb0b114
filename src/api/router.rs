//! Router assembly

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use super::admin;
use super::health;
use super::middleware::{admission_middleware, logging_middleware, trace_id_middleware};
use super::state::AppState;

/// Create the gateway router: health probes, the grant management API
/// and the admission middleware stack
pub fn create_router(state: AppState) -> Router {
    create_router_with_downstream(state, Router::new())
}

/// Create the gateway router and merge in downstream routes for the
/// protected operations (the opaque handlers the gateway fronts).
/// Layer order matters: trace-id must run first so the admission
/// middleware and handlers see the request's correlation id.
pub fn create_router_with_downstream(state: AppState, downstream: Router<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready_check))
        .route("/credentials", post(admin::issue_credential))
        .route("/grants", post(admin::set_grant))
        .merge(downstream)
        // innermost first; later layers wrap earlier ones
        .layer(middleware::from_fn_with_state(
            state.clone(),
            admission_middleware,
        ))
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(trace_id_middleware))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
