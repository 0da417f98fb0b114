//! API middleware components

pub mod admission;
pub mod logging;
pub mod trace_id;

pub use admission::{admission_middleware, API_KEY_HEADER};
pub use logging::logging_middleware;
pub use trace_id::{trace_id_middleware, TraceId, TRACE_ID_HEADER};
