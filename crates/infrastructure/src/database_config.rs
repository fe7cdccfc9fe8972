use std::env;
use std::str::FromStr;

use todo_core::{AppError, AppResult};

/// Default pool size.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;
/// Default number of readiness pings before giving up.
pub const DEFAULT_MAX_PING_ATTEMPTS: u32 = 10;
/// Default export batch size.
pub const DEFAULT_EXPORT_BATCH_SIZE: u16 = 1000;

/// Superuser created on first migration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapUser {
    /// Login name.
    pub username: String,
    /// Password hash, stored as given.
    pub hashed_password: String,
}

/// Database settings read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    /// Connection string.
    pub database_url: String,
    /// Pool size.
    pub max_connections: u32,
    /// Readiness pings, one per second, before startup fails.
    pub max_ping_attempts: u32,
    /// Whether startup applies pending migrations.
    pub run_migrations: bool,
    /// Optional superuser created alongside the schema.
    pub bootstrap_user: Option<BootstrapUser>,
    /// Rows per batch for full-table exports.
    pub export_batch_size: u16,
}

impl DatabaseConfig {
    /// Reads the process environment.
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Reads settings through `lookup`, which returns `None` for unset keys.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> AppResult<Self> {
        let database_url = lookup("DATABASE_URL")
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| AppError::Validation("DATABASE_URL is required".to_owned()))?;

        let max_connections =
            parsed_or(&lookup, "DATABASE_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS)?;
        if max_connections == 0 {
            return Err(AppError::Validation(
                "DATABASE_MAX_CONNECTIONS must be greater than zero".to_owned(),
            ));
        }

        let max_ping_attempts =
            parsed_or(&lookup, "DATABASE_MAX_PING_ATTEMPTS", DEFAULT_MAX_PING_ATTEMPTS)?;
        let run_migrations = flag_or(&lookup, "DATABASE_RUN_MIGRATIONS", true)?;

        let export_batch_size = parsed_or(&lookup, "EXPORT_BATCH_SIZE", DEFAULT_EXPORT_BATCH_SIZE)?;
        if export_batch_size == 0 {
            return Err(AppError::Validation(
                "EXPORT_BATCH_SIZE must be greater than zero".to_owned(),
            ));
        }

        let bootstrap_user = match (
            non_empty(&lookup, "BOOTSTRAP_USERNAME"),
            non_empty(&lookup, "BOOTSTRAP_HASHED_PASSWORD"),
        ) {
            (Some(username), Some(hashed_password)) => Some(BootstrapUser {
                username,
                hashed_password,
            }),
            (None, None) => None,
            _ => {
                return Err(AppError::Validation(
                    "BOOTSTRAP_USERNAME and BOOTSTRAP_HASHED_PASSWORD must be set together"
                        .to_owned(),
                ));
            }
        };

        Ok(Self {
            database_url,
            max_connections,
            max_ping_attempts,
            run_migrations,
            bootstrap_user,
            export_batch_size,
        })
    }
}

fn non_empty(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<String> {
    lookup(name).filter(|value| !value.trim().is_empty())
}

fn parsed_or<T>(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: T) -> AppResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match non_empty(lookup, name) {
        Some(value) => value
            .trim()
            .parse::<T>()
            .map_err(|error| AppError::Validation(format!("invalid {name}: {error}"))),
        None => Ok(default),
    }
}

fn flag_or(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: bool) -> AppResult<bool> {
    match non_empty(lookup, name) {
        Some(value) if value.eq_ignore_ascii_case("true") || value == "1" => Ok(true),
        Some(value) if value.eq_ignore_ascii_case("false") || value == "0" => Ok(false),
        Some(value) => Err(AppError::Validation(format!(
            "{name} must be 'true' or 'false', got '{value}'"
        ))),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use todo_core::AppError;

    use super::{
        BootstrapUser, DEFAULT_EXPORT_BATCH_SIZE, DEFAULT_MAX_CONNECTIONS,
        DEFAULT_MAX_PING_ATTEMPTS, DatabaseConfig,
    };

    fn lookup_from(
        pairs: &[(&str, &str)],
    ) -> impl Fn(&str) -> Option<String> + use<> {
        let values = pairs
            .iter()
            .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
            .collect::<HashMap<_, _>>();
        move |name| values.get(name).cloned()
    }

    #[test]
    fn defaults_apply_when_only_the_url_is_set() {
        let config =
            DatabaseConfig::from_lookup(lookup_from(&[("DATABASE_URL", "postgres://db/todo")]));

        assert_eq!(
            config.unwrap_or_else(|_| unreachable!()),
            DatabaseConfig {
                database_url: "postgres://db/todo".to_owned(),
                max_connections: DEFAULT_MAX_CONNECTIONS,
                max_ping_attempts: DEFAULT_MAX_PING_ATTEMPTS,
                run_migrations: true,
                bootstrap_user: None,
                export_batch_size: DEFAULT_EXPORT_BATCH_SIZE,
            }
        );
    }

    #[test]
    fn missing_url_is_rejected() {
        let config = DatabaseConfig::from_lookup(lookup_from(&[]));
        assert!(matches!(config, Err(AppError::Validation(message)) if message.contains("DATABASE_URL")));
    }

    #[test]
    fn explicit_values_override_defaults() {
        let config = DatabaseConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://db/todo"),
            ("DATABASE_MAX_CONNECTIONS", "4"),
            ("DATABASE_MAX_PING_ATTEMPTS", "3"),
            ("DATABASE_RUN_MIGRATIONS", "false"),
            ("BOOTSTRAP_USERNAME", "root"),
            ("BOOTSTRAP_HASHED_PASSWORD", "$argon2id$hash"),
            ("EXPORT_BATCH_SIZE", "250"),
        ]))
        .unwrap_or_else(|_| unreachable!());

        assert_eq!(config.max_connections, 4);
        assert_eq!(config.max_ping_attempts, 3);
        assert!(!config.run_migrations);
        assert_eq!(config.export_batch_size, 250);
        assert_eq!(
            config.bootstrap_user,
            Some(BootstrapUser {
                username: "root".to_owned(),
                hashed_password: "$argon2id$hash".to_owned(),
            })
        );
    }

    #[test]
    fn invalid_values_are_validation_errors() {
        for (key, value) in [
            ("DATABASE_MAX_CONNECTIONS", "lots"),
            ("DATABASE_MAX_CONNECTIONS", "0"),
            ("DATABASE_RUN_MIGRATIONS", "maybe"),
            ("EXPORT_BATCH_SIZE", "0"),
            ("EXPORT_BATCH_SIZE", "70000"),
        ] {
            let config = DatabaseConfig::from_lookup(lookup_from(&[
                ("DATABASE_URL", "postgres://db/todo"),
                (key, value),
            ]));
            assert!(matches!(config, Err(AppError::Validation(_))), "{key}={value}");
        }
    }

    #[test]
    fn half_configured_bootstrap_user_is_rejected() {
        let config = DatabaseConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://db/todo"),
            ("BOOTSTRAP_USERNAME", "root"),
        ]));
        assert!(matches!(config, Err(AppError::Validation(_))));
    }
}
