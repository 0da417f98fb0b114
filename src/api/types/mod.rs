//! Shared API types

mod error;

pub use error::{ApiError, MessageBody};
