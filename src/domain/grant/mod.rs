//! Grant domain types

mod entity;
mod repository;

pub use entity::{ConsumeOutcome, Grant};
pub use repository::GrantRepository;
