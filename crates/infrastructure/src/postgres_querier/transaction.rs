//! Write-then-audit transaction protocol.
//!
//! `PendingWrite` holds an open transaction that has not been audited yet and
//! cannot commit. `record` turns it into an `AuditedWrite`, the only state
//! with `commit`. Any failure after `begin` rolls back before returning.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, Postgres, Transaction};
use todo_core::{AppError, AppResult};
use todo_domain::AuditEvent;

use super::PostgresQuerier;
use super::binding::to_arguments;
use crate::query_builder::{AUDIT_LOG, SqlValue, Statement, build_insert_query};

const UNIQUE_VIOLATION: &str = "23505";

/// Server-assigned columns of a freshly inserted row.
#[derive(Debug, Clone, Copy, FromRow)]
pub(crate) struct InsertedRow {
    pub(crate) id: i64,
    pub(crate) created_on: DateTime<Utc>,
}

/// An open transaction whose mutation has not been audited.
pub(crate) struct PendingWrite {
    transaction: Transaction<'static, Postgres>,
    operation: &'static str,
}

/// A transaction whose audit entry is written and may now commit.
pub(crate) struct AuditedWrite {
    transaction: Transaction<'static, Postgres>,
    operation: &'static str,
}

impl PostgresQuerier {
    /// Opens a write transaction. Nothing needs rolling back on failure.
    pub(crate) async fn begin_write(&self, operation: &'static str) -> AppResult<PendingWrite> {
        let transaction = self.pool.begin().await.map_err(|error| {
            AppError::database_unavailable(format!("failed to begin transaction to {operation}"), error)
        })?;

        Ok(PendingWrite {
            transaction,
            operation,
        })
    }

    /// Runs one mutation plus its audit entry. Zero affected rows rolls back
    /// without auditing and returns `Ok(0)`.
    pub(crate) async fn execute_audited(
        &self,
        operation: &'static str,
        statement: Statement,
        event: AuditEvent,
    ) -> AppResult<u64> {
        let (pending, affected) = self.begin_write(operation).await?.execute(statement).await?;
        if affected == 0 {
            pending.abandon().await;
            return Ok(0);
        }

        pending.record(&event).await?.commit().await?;
        Ok(affected)
    }
}

impl PendingWrite {
    /// Runs a mutation and returns the affected row count.
    pub(crate) async fn execute(mut self, statement: Statement) -> AppResult<(Self, u64)> {
        let arguments = match to_arguments(statement.args) {
            Ok(arguments) => arguments,
            Err(error) => {
                self.rollback().await;
                return Err(error);
            }
        };

        let result = sqlx::query_with(&statement.sql, arguments)
            .execute(&mut *self.transaction)
            .await;

        match result {
            Ok(done) => Ok((self, done.rows_affected())),
            Err(error) => {
                let operation = self.operation;
                self.rollback().await;
                Err(write_error(operation, error))
            }
        }
    }

    /// Runs an `INSERT ... RETURNING id, created_on` and returns both.
    pub(crate) async fn insert(
        mut self,
        statement: Statement,
    ) -> AppResult<(Self, InsertedRow)> {
        let arguments = match to_arguments(statement.args) {
            Ok(arguments) => arguments,
            Err(error) => {
                self.rollback().await;
                return Err(error);
            }
        };

        let result = sqlx::query_as_with::<_, InsertedRow, _>(&statement.sql, arguments)
            .fetch_one(&mut *self.transaction)
            .await;

        match result {
            Ok(inserted) => Ok((self, inserted)),
            Err(error) => {
                let operation = self.operation;
                self.rollback().await;
                Err(write_error(operation, error))
            }
        }
    }

    /// Appends the audit entry for the mutation in the same transaction.
    pub(crate) async fn record(self, event: &AuditEvent) -> AppResult<AuditedWrite> {
        let context = match event.context() {
            Ok(context) => context,
            Err(error) => {
                self.rollback().await;
                return Err(error);
            }
        };

        let statement = build_insert_query(
            &AUDIT_LOG,
            vec![
                ("event_type", SqlValue::from(event.event_type())),
                ("context", SqlValue::Json(context)),
            ],
        );
        self.insert_audit(statement).await
    }

    /// Executes a prepared audit insert. Failures are audit errors.
    pub(crate) async fn insert_audit(mut self, statement: Statement) -> AppResult<AuditedWrite> {
        let arguments = match to_arguments(statement.args) {
            Ok(arguments) => arguments,
            Err(error) => {
                self.rollback().await;
                return Err(error);
            }
        };

        let result = sqlx::query_with(&statement.sql, arguments)
            .execute(&mut *self.transaction)
            .await;

        match result {
            Ok(_) => Ok(AuditedWrite {
                transaction: self.transaction,
                operation: self.operation,
            }),
            Err(error) => {
                let operation = self.operation;
                self.rollback().await;
                Err(AppError::audit(
                    format!("failed to write audit entry to {operation}"),
                    error,
                ))
            }
        }
    }

    /// Passes `result` through, rolling back first when it is an error.
    pub(crate) async fn check<T>(self, result: AppResult<T>) -> AppResult<(Self, T)> {
        match result {
            Ok(value) => Ok((self, value)),
            Err(error) => {
                self.rollback().await;
                Err(error)
            }
        }
    }

    /// Rolls back without auditing, for mutations that matched no row.
    pub(crate) async fn abandon(self) {
        self.rollback().await;
    }

    async fn rollback(self) {
        if let Err(error) = self.transaction.rollback().await {
            tracing::warn!(
                operation = self.operation,
                error = %error,
                "failed to roll back transaction"
            );
        }
    }
}

impl AuditedWrite {
    /// Continues the transaction with another audited mutation.
    pub(crate) fn then(self) -> PendingWrite {
        PendingWrite {
            transaction: self.transaction,
            operation: self.operation,
        }
    }

    /// Runs a follow-up mutation and audits it when it matched rows. A step
    /// that changed nothing leaves the transaction audited as it was.
    pub(crate) async fn then_audited(
        self,
        statement: Statement,
        event: &AuditEvent,
    ) -> AppResult<Self> {
        let (pending, affected) = self.then().execute(statement).await?;
        if affected == 0 {
            return Ok(Self {
                transaction: pending.transaction,
                operation: pending.operation,
            });
        }

        pending.record(event).await
    }

    /// Commits. A failure here leaves the outcome ambiguous.
    pub(crate) async fn commit(self) -> AppResult<()> {
        let operation = self.operation;
        self.transaction.commit().await.map_err(|error| {
            AppError::commit(format!("failed to commit transaction to {operation}"), error)
        })
    }
}

fn write_error(operation: &str, error: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(database_error) = &error
        && database_error.code().as_deref() == Some(UNIQUE_VIOLATION)
    {
        return AppError::Conflict(format!("failed to {operation}: {database_error}"));
    }

    AppError::write(format!("failed to {operation}"), error)
}
