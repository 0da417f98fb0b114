//! Database schema migrations

use sqlx::postgres::PgPool;
use tracing::info;

use crate::domain::DomainError;

/// A single schema migration
#[derive(Debug, Clone)]
pub struct Migration {
    pub version: i64,
    pub description: &'static str,
    pub up: &'static str,
}

/// All migrations, in application order
pub fn migrations() -> Vec<Migration> {
    vec![
        Migration {
            version: 1,
            description: "create credentials table",
            up: r#"
                CREATE TABLE IF NOT EXISTS credentials (
                    id BIGSERIAL PRIMARY KEY,
                    value TEXT NOT NULL UNIQUE,
                    issued_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                )
            "#,
        },
        Migration {
            version: 2,
            description: "create grants table",
            up: r#"
                CREATE TABLE IF NOT EXISTS grants (
                    credential_value TEXT NOT NULL REFERENCES credentials(value),
                    resource_name TEXT NOT NULL,
                    "limit" BIGINT NOT NULL,
                    consumed BIGINT NOT NULL DEFAULT 0,
                    PRIMARY KEY (credential_value, resource_name)
                )
            "#,
        },
    ]
}

/// Applies migrations against PostgreSQL, recording each in a ledger
/// table so reruns are no-ops
#[derive(Debug)]
pub struct PostgresMigrator {
    pool: PgPool,
}

impl PostgresMigrator {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn ensure_migrations_table(&self) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS _migrations (
                version BIGINT PRIMARY KEY,
                description TEXT NOT NULL,
                installed_on TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to create migrations table: {}", e)))?;

        Ok(())
    }

    async fn run_migration(&self, migration: &Migration) -> Result<(), DomainError> {
        let applied: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM _migrations WHERE version = $1)")
                .bind(migration.version)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    DomainError::storage(format!("Failed to check migration status: {}", e))
                })?;

        if applied {
            return Ok(());
        }

        sqlx::query(migration.up)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                DomainError::storage(format!(
                    "Failed to run migration {}: {}",
                    migration.version, e
                ))
            })?;

        sqlx::query("INSERT INTO _migrations (version, description) VALUES ($1, $2)")
            .bind(migration.version)
            .bind(migration.description)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                DomainError::storage(format!(
                    "Failed to record migration {}: {}",
                    migration.version, e
                ))
            })?;

        info!(
            "Applied migration {}: {}",
            migration.version, migration.description
        );

        Ok(())
    }

    /// Run all pending migrations
    pub async fn run(&self) -> Result<(), DomainError> {
        self.ensure_migrations_table().await?;

        for migration in migrations() {
            self.run_migration(&migration).await?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_ordered_and_distinct() {
        let all = migrations();

        assert!(!all.is_empty());
        for pair in all.windows(2) {
            assert!(pair[0].version < pair[1].version);
        }
    }
}
