//! Schema readiness, migrate-once, and the optional bootstrap superuser.

use std::time::Duration;

use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use todo_application::UserDataManager;
use todo_core::{AccountId, AppError, AppResult, MembershipId, UserId};
use todo_domain::{
    AccountUserPermissions, AuditEvent, ServiceAdminPermissions, UNPAID_BILLING_STATUS,
    UserReputation,
};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::database_config::{BootstrapUser, DatabaseConfig};
use crate::postgres_querier::PostgresQuerier;
use crate::query_builder::{
    ACCOUNT_USER_MEMBERSHIPS, ACCOUNTS, SqlValue, USERS, build_insert_query,
};

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

const PING_INTERVAL: Duration = Duration::from_secs(1);
const BOOTSTRAP_REASON: &str = "bootstrap";

/// Opens the pool described by `config`. Connections are established lazily.
pub fn connect_lazy(config: &DatabaseConfig) -> AppResult<PgPool> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect_lazy(config.database_url.as_str())
        .map_err(|error| {
            AppError::database_unavailable("failed to configure database pool", error)
        })
}

/// Applies the embedded migrations at most once per process.
pub struct DatabaseMigrator {
    querier: PostgresQuerier,
    migrated: Mutex<bool>,
}

impl DatabaseMigrator {
    /// Creates a migrator over the pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self {
            querier: PostgresQuerier::new(pool),
            migrated: Mutex::new(false),
        }
    }

    /// Pings once per second until the database answers or `max_attempts`
    /// pings have failed.
    pub async fn wait_until_ready(&self, max_attempts: u32) -> AppResult<()> {
        let mut attempt = 0_u32;

        loop {
            attempt += 1;
            match sqlx::query("SELECT 1").execute(self.querier.pool()).await {
                Ok(_) => {
                    tracing::debug!(attempt, "database is ready");
                    return Ok(());
                }
                Err(error) if attempt >= max_attempts => {
                    return Err(AppError::database_unavailable(
                        format!("database was not ready after {attempt} attempts"),
                        error,
                    ));
                }
                Err(error) => {
                    tracing::info!(attempt, max_attempts, error = %error, "waiting for database");
                    tokio::time::sleep(PING_INTERVAL).await;
                }
            }
        }
    }

    /// Runs pending migrations unless this migrator already did, then
    /// creates the bootstrap superuser when one is configured and missing.
    pub async fn migrate(&self, bootstrap_user: Option<&BootstrapUser>) -> AppResult<()> {
        {
            let mut migrated = self.migrated.lock().await;
            if !*migrated {
                tracing::info!("migrating database");
                MIGRATOR
                    .run(self.querier.pool())
                    .await
                    .map_err(|error| {
                        AppError::Internal(format!("failed to run migrations: {error}"))
                    })?;
                *migrated = true;
            }
        }

        if let Some(bootstrap_user) = bootstrap_user {
            self.ensure_bootstrap_user(bootstrap_user).await?;
        }

        Ok(())
    }

    /// Returns whether this migrator has applied the migrations.
    pub async fn has_migrated(&self) -> bool {
        *self.migrated.lock().await
    }

    async fn ensure_bootstrap_user(&self, bootstrap_user: &BootstrapUser) -> AppResult<()> {
        match self
            .querier
            .get_user_by_username(&bootstrap_user.username)
            .await
        {
            Ok(_) => {
                tracing::debug!(username = %bootstrap_user.username, "bootstrap user already exists");
                return Ok(());
            }
            Err(error) if error.is_not_found() => {}
            Err(error) => return Err(error),
        }

        let user_id = self.create_superuser(bootstrap_user).await?;
        tracing::info!(username = %bootstrap_user.username, user_id = %user_id, "created bootstrap user");
        Ok(())
    }

    // User, account, and membership land in one transaction with one audit
    // entry each, all attributed to the new user.
    async fn create_superuser(&self, bootstrap_user: &BootstrapUser) -> AppResult<UserId> {
        let user_statement = build_insert_query(
            &USERS,
            vec![
                ("external_id", Uuid::new_v4().to_string().into()),
                ("username", bootstrap_user.username.clone().into()),
                ("hashed_password", bootstrap_user.hashed_password.clone().into()),
                ("requires_password_change", false.into()),
                ("two_factor_secret", "".into()),
                (
                    "two_factor_secret_verified_on",
                    SqlValue::Timestamp(chrono::Utc::now()),
                ),
                (
                    "service_admin_permissions",
                    ServiceAdminPermissions::all().as_database().into(),
                ),
                ("reputation", UserReputation::Good.as_str().into()),
                ("reputation_explanation", "".into()),
            ],
        );

        let (pending, user) = self
            .querier
            .begin_write("create bootstrap user")
            .await?
            .insert(user_statement)
            .await?;
        let (pending, user_id) = pending.check(UserId::from_database(user.id)).await?;

        let account_statement = build_insert_query(
            &ACCOUNTS,
            vec![
                ("external_id", Uuid::new_v4().to_string().into()),
                ("name", format!("{}'s account", bootstrap_user.username).into()),
                ("billing_status", UNPAID_BILLING_STATUS.into()),
                (
                    "default_user_permissions",
                    AccountUserPermissions::member_defaults().as_database().into(),
                ),
                ("belongs_to_user", user_id.as_database().into()),
            ],
        );
        let (pending, account) = pending
            .record(&AuditEvent::UserCreated {
                performed_by: user_id,
                user_id,
            })
            .await?
            .then()
            .insert(account_statement)
            .await?;
        let (pending, account_id) = pending.check(AccountId::from_database(account.id)).await?;

        let membership_statement = build_insert_query(
            &ACCOUNT_USER_MEMBERSHIPS,
            vec![
                ("belongs_to_user", user_id.as_database().into()),
                ("belongs_to_account", account_id.as_database().into()),
                (
                    "user_account_permissions",
                    AccountUserPermissions::all().as_database().into(),
                ),
                ("default_account", true.into()),
            ],
        );
        let (pending, membership) = pending
            .record(&AuditEvent::AccountCreated {
                performed_by: user_id,
                account_id,
            })
            .await?
            .then()
            .insert(membership_statement)
            .await?;
        let (pending, membership_id) = pending
            .check(MembershipId::from_database(membership.id))
            .await?;

        pending
            .record(&AuditEvent::UserAddedToAccount {
                performed_by: user_id,
                account_id,
                user_id,
                membership_id,
                permissions: AccountUserPermissions::all(),
                reason: BOOTSTRAP_REASON.to_owned(),
            })
            .await?
            .commit()
            .await?;

        Ok(user_id)
    }
}
