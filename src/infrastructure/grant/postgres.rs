//! PostgreSQL grant repository
//!
//! `try_consume` relies on a conditional `UPDATE`: the row lock taken
//! by PostgreSQL serializes concurrent consumers of the same grant, so
//! the check and the increment are one indivisible step. Rows for
//! different (credential, resource) pairs never contend.

use async_trait::async_trait;
use sqlx::postgres::PgPool;
use sqlx::Row;
use tracing::debug;

use crate::domain::{ConsumeOutcome, DomainError, Grant, GrantRepository};

#[derive(Debug)]
pub struct PostgresGrantRepository {
    pool: PgPool,
}

impl PostgresGrantRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn row_to_grant(row: &sqlx::postgres::PgRow) -> Grant {
    Grant::from_parts(
        row.get::<String, _>("credential_value"),
        row.get::<String, _>("resource_name"),
        row.get::<i64, _>("limit"),
        row.get::<i64, _>("consumed"),
    )
}

#[async_trait]
impl GrantRepository for PostgresGrantRepository {
    async fn upsert(
        &self,
        credential_value: &str,
        resource_name: &str,
        limit: i64,
    ) -> Result<Grant, DomainError> {
        let row = sqlx::query(
            r#"
            INSERT INTO grants (credential_value, resource_name, "limit", consumed)
            VALUES ($1, $2, $3, 0)
            ON CONFLICT (credential_value, resource_name)
            DO UPDATE SET "limit" = EXCLUDED."limit", consumed = 0
            RETURNING credential_value, resource_name, "limit", consumed
            "#,
        )
        .bind(credential_value)
        .bind(resource_name)
        .bind(limit)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to upsert grant: {}", e)))?;

        debug!(
            resource = resource_name,
            limit, "Grant set, counter reset to zero"
        );

        Ok(row_to_grant(&row))
    }

    async fn find(
        &self,
        credential_value: &str,
        resource_name: &str,
    ) -> Result<Option<Grant>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT credential_value, resource_name, "limit", consumed
            FROM grants
            WHERE credential_value = $1 AND resource_name = $2
            "#,
        )
        .bind(credential_value)
        .bind(resource_name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to find grant: {}", e)))?;

        Ok(row.as_ref().map(row_to_grant))
    }

    async fn try_consume(
        &self,
        credential_value: &str,
        resource_name: &str,
    ) -> Result<ConsumeOutcome, DomainError> {
        let updated = sqlx::query(
            r#"
            UPDATE grants
            SET consumed = consumed + 1
            WHERE credential_value = $1 AND resource_name = $2 AND consumed < "limit"
            RETURNING consumed
            "#,
        )
        .bind(credential_value)
        .bind(resource_name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to consume grant: {}", e)))?;

        if updated.is_some() {
            return Ok(ConsumeOutcome::Admitted);
        }

        // The update missed either because the grant is exhausted or
        // because it does not exist; disambiguate without writing.
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM grants WHERE credential_value = $1 AND resource_name = $2)",
        )
        .bind(credential_value)
        .bind(resource_name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to check grant existence: {}", e)))?;

        if exists {
            Ok(ConsumeOutcome::QuotaExceeded)
        } else {
            Ok(ConsumeOutcome::NoSuchGrant)
        }
    }
}
