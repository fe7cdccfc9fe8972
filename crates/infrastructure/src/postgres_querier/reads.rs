//! Read helpers shared by every entity. None of them opens a transaction.

use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use todo_core::{AppError, AppResult};
use todo_domain::{AuditLogEntry, AuditSubject, ListPage, Pagination, QueryFilter};

use super::binding::to_arguments;
use super::rows::{AuditLogRow, EntityRow};
use crate::query_builder::{
    ListScope, Statement, TableSpec, build_audit_log_lookup_query, build_list_query,
};

pub(super) async fn fetch_exists(
    pool: &PgPool,
    statement: Statement,
    operation: &str,
) -> AppResult<bool> {
    let arguments = to_arguments(statement.args)?;
    sqlx::query_scalar_with::<_, bool, _>(&statement.sql, arguments)
        .fetch_one(pool)
        .await
        .map_err(|error| AppError::read(format!("failed to {operation}"), error))
}

pub(super) async fn fetch_count(
    pool: &PgPool,
    statement: Statement,
    operation: &str,
) -> AppResult<u64> {
    let arguments = to_arguments(statement.args)?;
    let count = sqlx::query_scalar_with::<_, i64, _>(&statement.sql, arguments)
        .fetch_one(pool)
        .await
        .map_err(|error| AppError::read(format!("failed to {operation}"), error))?;

    Ok(u64::try_from(count).unwrap_or_default())
}

/// Fetches one row. No rows is `NotFound`, never an error log.
pub(super) async fn fetch_entity<R: EntityRow>(
    pool: &PgPool,
    statement: Statement,
    description: &str,
) -> AppResult<R::Entity> {
    let arguments = to_arguments(statement.args)?;
    let row = sqlx::query_as_with::<_, R, _>(&statement.sql, arguments)
        .fetch_optional(pool)
        .await
        .map_err(|error| AppError::read(format!("failed to fetch {description}"), error))?
        .ok_or_else(|| AppError::NotFound(format!("{description} was not found")))?;

    row.into_entity()
}

pub(super) async fn fetch_entities<R: EntityRow>(
    pool: &PgPool,
    statement: Statement,
    operation: &str,
) -> AppResult<Vec<R::Entity>> {
    let arguments = to_arguments(statement.args)?;
    sqlx::query_as_with::<_, R, _>(&statement.sql, arguments)
        .fetch_all(pool)
        .await
        .map_err(|error| AppError::read(format!("failed to {operation}"), error))?
        .into_iter()
        .map(EntityRow::into_entity)
        .collect()
}

/// Runs a list query and reads the count columns off the first row.
///
/// An empty page reports zero for both counts.
pub(super) async fn fetch_list<R: EntityRow>(
    pool: &PgPool,
    table: &TableSpec,
    scope: ListScope,
    filter: Option<&QueryFilter>,
    operation: &str,
) -> AppResult<ListPage<R::Entity>> {
    let filter = filter.cloned().unwrap_or_default();
    let statement = build_list_query(table, scope, &filter);
    let arguments = to_arguments(statement.args)?;

    let rows: Vec<PgRow> = sqlx::query_with(&statement.sql, arguments)
        .fetch_all(pool)
        .await
        .map_err(|error| AppError::read(format!("failed to {operation}"), error))?;

    let mut pagination = Pagination::for_filter(&filter);
    if let Some(first) = rows.first() {
        pagination.total_count = read_count(first, "total_count")?;
        pagination.filtered_count = read_count(first, "filtered_count")?;
    }

    let data = rows
        .iter()
        .map(|row| {
            R::from_row(row)
                .map_err(|error| AppError::read(format!("failed to decode {operation}"), error))
                .and_then(EntityRow::into_entity)
        })
        .collect::<AppResult<Vec<_>>>()?;

    Ok(ListPage { data, pagination })
}

fn read_count(row: &PgRow, column: &str) -> AppResult<u64> {
    let count: i64 = row
        .try_get(column)
        .map_err(|error| AppError::read(format!("failed to read {column}"), error))?;

    Ok(u64::try_from(count).unwrap_or_default())
}

/// Audit entries that mention `subject`, oldest first.
pub(super) async fn fetch_audit_entries(
    pool: &PgPool,
    subject: AuditSubject,
) -> AppResult<Vec<AuditLogEntry>> {
    let statement = build_audit_log_lookup_query(subject.context_key(), subject.context_value());
    fetch_entities::<AuditLogRow>(pool, statement, "list audit log entries").await
}
