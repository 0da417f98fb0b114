//! Storage infrastructure: connection pooling and schema migrations

mod migrations;
mod postgres;

pub use migrations::{migrations, Migration, PostgresMigrator};
pub use postgres::PostgresConfig;
