//! HTTP surface: router, state, middleware and handlers

pub mod admin;
pub mod health;
pub mod middleware;
pub mod router;
pub mod state;
pub mod types;

pub use router::{create_router, create_router_with_downstream};
pub use state::AppState;
