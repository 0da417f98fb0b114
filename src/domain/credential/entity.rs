//! Credential entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An issued bearer credential.
///
/// The `value` is the opaque secret callers present in the `X-API-Key`
/// header. It is generated once at issuance and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    /// Stable internal identifier, assigned at creation
    id: i64,
    /// Opaque random token, globally unique
    value: String,
    /// Creation timestamp
    issued_at: DateTime<Utc>,
}

impl Credential {
    /// Create a credential record. Used by stores when materializing rows
    /// and by the issuance path after generating a fresh value.
    pub fn new(id: i64, value: impl Into<String>, issued_at: DateTime<Utc>) -> Self {
        Self {
            id,
            value: value.into(),
            issued_at,
        }
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_accessors() {
        let now = Utc::now();
        let credential = Credential::new(7, "a1b2c3", now);

        assert_eq!(credential.id(), 7);
        assert_eq!(credential.value(), "a1b2c3");
        assert_eq!(credential.issued_at(), now);
    }

    #[test]
    fn test_credential_serde_round_trip() {
        let credential = Credential::new(1, "tok", Utc::now());
        let json = serde_json::to_string(&credential).unwrap();
        let back: Credential = serde_json::from_str(&json).unwrap();

        assert_eq!(back, credential);
    }
}
