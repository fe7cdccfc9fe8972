//! PostgreSQL adapters for the application data manager ports.

#![forbid(unsafe_code)]

mod database_config;
mod database_migrator;
mod postgres_querier;
pub mod query_builder;

pub use database_config::{
    BootstrapUser, DEFAULT_EXPORT_BATCH_SIZE, DEFAULT_MAX_CONNECTIONS, DEFAULT_MAX_PING_ATTEMPTS,
    DatabaseConfig,
};
pub use database_migrator::{DatabaseMigrator, connect_lazy};
pub use postgres_querier::PostgresQuerier;
