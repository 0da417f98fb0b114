//! PostgreSQL credential repository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPool;
use sqlx::Row;
use tracing::debug;

use crate::domain::{Credential, CredentialRepository, DomainError};

use super::generate_credential_value;

#[derive(Debug)]
pub struct PostgresCredentialRepository {
    pool: PgPool,
}

impl PostgresCredentialRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn row_to_credential(row: &sqlx::postgres::PgRow) -> Credential {
    let id: i64 = row.get("id");
    let value: String = row.get("value");
    let issued_at: DateTime<Utc> = row.get("issued_at");
    Credential::new(id, value, issued_at)
}

#[async_trait]
impl CredentialRepository for PostgresCredentialRepository {
    async fn issue(&self) -> Result<Credential, DomainError> {
        let value = generate_credential_value();

        let row = sqlx::query(
            "INSERT INTO credentials (value) VALUES ($1) RETURNING id, value, issued_at",
        )
        .bind(&value)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to issue credential: {}", e)))?;

        debug!("Issued credential id={}", row.get::<i64, _>("id"));

        Ok(row_to_credential(&row))
    }

    async fn find(&self, value: &str) -> Result<Option<Credential>, DomainError> {
        let row = sqlx::query("SELECT id, value, issued_at FROM credentials WHERE value = $1")
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to find credential: {}", e)))?;

        Ok(row.as_ref().map(row_to_credential))
    }
}
