//! Grant entity and consumption outcomes

use serde::{Deserialize, Serialize};

/// Authorization of one credential to consume one named resource up to
/// a limit. At most one grant exists per (credential, resource) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grant {
    /// Value of the owning credential
    credential_value: String,
    /// Protected resource this grant applies to
    resource_name: String,
    /// Maximum permitted consumptions in the current quota epoch
    limit: i64,
    /// Consumptions recorded in the current quota epoch
    consumed: i64,
}

impl Grant {
    /// Create a grant at the start of a quota epoch (`consumed = 0`)
    pub fn new(
        credential_value: impl Into<String>,
        resource_name: impl Into<String>,
        limit: i64,
    ) -> Self {
        Self {
            credential_value: credential_value.into(),
            resource_name: resource_name.into(),
            limit,
            consumed: 0,
        }
    }

    /// Materialize a grant from stored state
    pub fn from_parts(
        credential_value: impl Into<String>,
        resource_name: impl Into<String>,
        limit: i64,
        consumed: i64,
    ) -> Self {
        Self {
            credential_value: credential_value.into(),
            resource_name: resource_name.into(),
            limit,
            consumed,
        }
    }

    pub fn credential_value(&self) -> &str {
        &self.credential_value
    }

    pub fn resource_name(&self) -> &str {
        &self.resource_name
    }

    pub fn limit(&self) -> i64 {
        self.limit
    }

    pub fn consumed(&self) -> i64 {
        self.consumed
    }

    /// Whether another consumption would still be admitted
    pub fn has_remaining(&self) -> bool {
        self.consumed < self.limit
    }

    /// Record one consumption. Callers must hold the per-grant
    /// serialization point; see `GrantRepository::try_consume`.
    pub fn consume(&mut self) {
        self.consumed += 1;
    }
}

/// Outcome of an atomic check-and-increment on a grant counter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsumeOutcome {
    /// Counter was below the limit and has been incremented by one
    Admitted,
    /// Counter was at or above the limit; left unchanged
    QuotaExceeded,
    /// No grant exists for the (credential, resource) pair
    NoSuchGrant,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_grant_starts_fresh_epoch() {
        let grant = Grant::new("key-1", "/v1/ocr", 5);

        assert_eq!(grant.limit(), 5);
        assert_eq!(grant.consumed(), 0);
        assert!(grant.has_remaining());
    }

    #[test]
    fn test_consume_until_exhausted() {
        let mut grant = Grant::new("key-1", "/v1/ocr", 2);

        grant.consume();
        assert!(grant.has_remaining());
        grant.consume();
        assert!(!grant.has_remaining());
        assert_eq!(grant.consumed(), 2);
    }

    #[test]
    fn test_from_parts_preserves_counter() {
        let grant = Grant::from_parts("key-1", "/v1/ocr", 3, 3);

        assert_eq!(grant.consumed(), 3);
        assert!(!grant.has_remaining());
    }
}
