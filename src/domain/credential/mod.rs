//! Credential domain types

mod entity;
mod repository;

pub use entity::Credential;
pub use repository::CredentialRepository;
