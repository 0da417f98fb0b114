//! Credential store implementations and the lookup cache

mod cache;
mod in_memory;
mod postgres;

pub use cache::CredentialCache;
pub use in_memory::InMemoryCredentialRepository;
pub use postgres::PostgresCredentialRepository;

/// Generate a fresh credential value: 128 random bits rendered as text
pub fn generate_credential_value() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generated_values_are_distinct() {
        let values: HashSet<String> = (0..1000).map(|_| generate_credential_value()).collect();
        assert_eq!(values.len(), 1000);
    }
}
