//! Migrate command - applies the database schema

use tracing::info;

use crate::config::AppConfig;
use crate::infrastructure::logging;
use crate::infrastructure::storage::{PostgresConfig, PostgresMigrator};

/// Apply all pending schema migrations and exit
pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    logging::init_logging(&config.logging);

    let url = config.database_url();
    info!("Connecting to PostgreSQL...");

    let pool = PostgresConfig::from_app_config(&url, &config.database)
        .connect()
        .await?;

    PostgresMigrator::new(pool).run().await?;
    info!("Migrations applied");

    Ok(())
}
