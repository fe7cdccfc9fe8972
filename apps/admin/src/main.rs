//! Operator CLI for the todo service database.
//!
//! `todo-admin migrate` applies the schema and the optional bootstrap user.
//! `todo-admin export <entity>` streams a whole table as JSON lines on stdout.

#![forbid(unsafe_code)]

mod export;

use std::env;

use todo_core::{AppError, AppResult};
use todo_infrastructure::{DatabaseConfig, DatabaseMigrator, PostgresQuerier, connect_lazy};
use tracing_subscriber::EnvFilter;

use crate::export::ExportTarget;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Migrate,
    Export(ExportTarget),
}

impl Command {
    fn parse(arguments: &[String]) -> AppResult<Self> {
        match arguments.first().map(String::as_str) {
            Some("migrate") => Ok(Self::Migrate),
            Some("export") => {
                let target = arguments.get(1).ok_or_else(|| {
                    AppError::Validation(format!(
                        "export needs an entity, one of: {}",
                        ExportTarget::names().join(", ")
                    ))
                })?;
                Ok(Self::Export(target.parse()?))
            }
            Some(other) => Err(AppError::Validation(format!(
                "unknown command '{other}', expected 'migrate' or 'export <entity>'"
            ))),
            None => Err(AppError::Validation(
                "usage: todo-admin migrate | todo-admin export <entity>".to_owned(),
            )),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let arguments = env::args().skip(1).collect::<Vec<_>>();
    let command = Command::parse(&arguments)?;
    let config = DatabaseConfig::from_env()?;

    let pool = connect_lazy(&config)?;
    let migrator = DatabaseMigrator::new(pool.clone());
    migrator.wait_until_ready(config.max_ping_attempts).await?;

    if command == Command::Migrate || config.run_migrations {
        migrator.migrate(config.bootstrap_user.as_ref()).await?;
    }

    match command {
        Command::Migrate => {
            tracing::info!("migrations applied");
        }
        Command::Export(target) => {
            let querier = PostgresQuerier::new(pool);
            let exported = export::run(&querier, target, config.export_batch_size).await?;
            tracing::info!(entity = target.name(), rows = exported, "export finished");
        }
    }

    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // Stdout carries export rows.
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
