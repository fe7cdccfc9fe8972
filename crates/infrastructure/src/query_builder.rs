//! Parameterized SQL construction for every entity table.
//!
//! Builders are pure: they return the statement text with `$n` placeholders
//! and the positional arguments in placeholder order. They never fail. Unsafe
//! identifier fragments are a programming defect and are reported through
//! `tracing` with `query_error = true`, after which the text is still returned.

mod tables;


use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use serde_json::Value;
use todo_domain::QueryFilter;

pub use tables::{
    ACCOUNT_SUBSCRIPTION_PLANS, ACCOUNT_USER_MEMBERSHIPS, ACCOUNTS, API_CLIENTS, AUDIT_LOG, ITEMS,
    TableSpec, USERS, WEBHOOKS,
};

/// Column every table uses as primary key.
pub const ID_COLUMN: &str = "id";
/// Soft-archive timestamp column.
pub const ARCHIVED_ON_COLUMN: &str = "archived_on";
/// Last modification timestamp column.
pub const LAST_UPDATED_ON_COLUMN: &str = "last_updated_on";
/// Creation timestamp column.
pub const CREATED_ON_COLUMN: &str = "created_on";

/// One positional argument.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    /// `BIGINT`.
    BigInt(i64),
    /// Nullable `BIGINT`.
    OptionalBigInt(Option<i64>),
    /// `TEXT`.
    Text(String),
    /// Nullable `TEXT`.
    OptionalText(Option<String>),
    /// `BOOLEAN`.
    Bool(bool),
    /// `BYTEA`.
    Bytes(Vec<u8>),
    /// `TIMESTAMPTZ`.
    Timestamp(DateTime<Utc>),
    /// Nullable `TIMESTAMPTZ`.
    OptionalTimestamp(Option<DateTime<Utc>>),
    /// `BIGINT[]`.
    BigIntArray(Vec<i64>),
    /// `JSONB`.
    Json(Value),
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        Self::BigInt(value)
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<bool> for SqlValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// Statement text plus its positional arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    /// SQL text with `$n` placeholders.
    pub sql: String,
    /// Arguments in placeholder order.
    pub args: Vec<SqlValue>,
}

/// Which rows a list or id-set query may see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListScope {
    /// Rows owned by the given id.
    Owner(i64),
    /// Every row; archived rows only when the filter asks for them.
    Admin,
}

/// Accumulates SQL text and numbers placeholders as values are bound.
#[derive(Debug, Default)]
struct SqlWriter {
    sql: String,
    args: Vec<SqlValue>,
}

impl SqlWriter {
    fn new(initial: &str) -> Self {
        Self {
            sql: initial.to_owned(),
            args: Vec::new(),
        }
    }

    fn push(&mut self, fragment: &str) -> &mut Self {
        self.sql.push_str(fragment);
        self
    }

    fn push_identifier(&mut self, identifier: &str) -> &mut Self {
        check_identifier(identifier);
        self.sql.push_str(identifier);
        self
    }

    fn push_column(&mut self, table: &TableSpec, column: &str) -> &mut Self {
        self.push_identifier(table.name).push(".").push_identifier(column)
    }

    fn push_bind(&mut self, value: SqlValue) -> &mut Self {
        self.args.push(value);
        // Writing into a String cannot fail.
        let _ = write!(self.sql, "${}", self.args.len());
        self
    }

    fn finish(self) -> Statement {
        Statement {
            sql: self.sql,
            args: self.args,
        }
    }
}

#[derive(Debug, Clone)]
enum Predicate {
    IsNull(&'static str),
    Eq(&'static str, SqlValue),
    Gt(&'static str, SqlValue),
    Lt(&'static str, SqlValue),
    ILike(&'static str, SqlValue),
}

impl Predicate {
    /// Writes the predicate, qualifying the column when `qualifier` is given.
    fn write(&self, writer: &mut SqlWriter, qualifier: Option<&str>) {
        let (column, operator, value) = match self {
            Self::IsNull(column) => (*column, " IS NULL", None),
            Self::Eq(column, value) => (*column, " = ", Some(value)),
            Self::Gt(column, value) => (*column, " > ", Some(value)),
            Self::Lt(column, value) => (*column, " < ", Some(value)),
            Self::ILike(column, value) => (*column, " ILIKE ", Some(value)),
        };

        if let Some(qualifier) = qualifier {
            writer.push_identifier(qualifier).push(".");
        }
        writer.push_identifier(column);
        writer.push(operator);
        if let Some(value) = value {
            writer.push_bind(value.clone());
        }
    }
}

fn push_where(writer: &mut SqlWriter, qualifier: Option<&str>, predicates: &[Predicate]) {
    push_predicates(writer, qualifier, predicates, true);
}

fn push_predicates(
    writer: &mut SqlWriter,
    qualifier: Option<&str>,
    predicates: &[Predicate],
    opens_where: bool,
) {
    for (index, predicate) in predicates.iter().enumerate() {
        writer.push(if index == 0 && opens_where { " WHERE " } else { " AND " });
        predicate.write(writer, qualifier);
    }
}

fn push_select_columns(writer: &mut SqlWriter, table: &TableSpec) {
    if table.columns.is_empty() {
        tracing::error!(
            query_error = true,
            table = table.name,
            "select requested for a table without columns"
        );
    }

    for (index, column) in table.columns.iter().enumerate() {
        if index > 0 {
            writer.push(", ");
        }
        writer.push_column(table, column);
    }
}

/// Logs identifiers that are not plain lowercase snake case.
fn check_identifier(identifier: &str) {
    let mut characters = identifier.chars();
    let valid = characters
        .next()
        .is_some_and(|first| first.is_ascii_lowercase() || first == '_')
        && characters.all(|character| {
            character.is_ascii_lowercase() || character.is_ascii_digit() || character == '_'
        });

    if !valid {
        tracing::error!(
            query_error = true,
            identifier,
            "unsafe SQL identifier in query construction"
        );
    }
}

/// `archived_on IS NULL` plus the ownership match, in that order.
fn live_row_predicates(table: &TableSpec, owner_id: Option<i64>) -> Vec<Predicate> {
    let mut predicates = Vec::new();

    if table.archivable {
        predicates.push(Predicate::IsNull(ARCHIVED_ON_COLUMN));
    }

    match (table.ownership_column, owner_id) {
        (Some(column), Some(owner_id)) => {
            predicates.push(Predicate::Eq(column, SqlValue::BigInt(owner_id)));
        }
        (None, Some(_)) => {
            tracing::error!(
                query_error = true,
                table = table.name,
                "owner id supplied for a table without ownership column"
            );
        }
        _ => {}
    }

    predicates
}

fn eq_predicates(matches: Vec<(&'static str, SqlValue)>) -> Vec<Predicate> {
    matches
        .into_iter()
        .map(|(column, value)| Predicate::Eq(column, value))
        .collect()
}

// Escapes LIKE wildcards so the prefix only ever matches literally.
fn literal_prefix_pattern(prefix: &str) -> String {
    let mut pattern = String::with_capacity(prefix.len() + 1);
    for character in prefix.chars() {
        if matches!(character, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(character);
    }
    pattern.push('%');
    pattern
}

fn by_id_predicates(table: &TableSpec, id: i64, owner_id: Option<i64>) -> Vec<Predicate> {
    let mut predicates = vec![Predicate::Eq(ID_COLUMN, SqlValue::BigInt(id))];
    predicates.extend(live_row_predicates(table, owner_id));
    predicates
}

/// Predicates shared by the total count of a list query.
fn scope_predicates(table: &TableSpec, scope: ListScope, include_archived: bool) -> Vec<Predicate> {
    let mut predicates = Vec::new();

    let skip_archived = matches!(scope, ListScope::Admin) && include_archived;
    if table.archivable && !skip_archived {
        predicates.push(Predicate::IsNull(ARCHIVED_ON_COLUMN));
    }

    if let ListScope::Owner(owner_id) = scope {
        match table.ownership_column {
            Some(column) => predicates.push(Predicate::Eq(column, SqlValue::BigInt(owner_id))),
            None => tracing::error!(
                query_error = true,
                table = table.name,
                "owner-scoped list requested for a table without ownership column"
            ),
        }
    }

    predicates
}

fn time_bound_predicates(table: &TableSpec, filter: &QueryFilter) -> Vec<Predicate> {
    let mut predicates = Vec::new();

    if let Some(created_after) = filter.created_after {
        predicates.push(Predicate::Gt(
            CREATED_ON_COLUMN,
            SqlValue::Timestamp(created_after),
        ));
    }
    if let Some(created_before) = filter.created_before {
        predicates.push(Predicate::Lt(
            CREATED_ON_COLUMN,
            SqlValue::Timestamp(created_before),
        ));
    }

    // Only archivable tables track modifications.
    if table.archivable {
        if let Some(updated_after) = filter.updated_after {
            predicates.push(Predicate::Gt(
                LAST_UPDATED_ON_COLUMN,
                SqlValue::Timestamp(updated_after),
            ));
        }
        if let Some(updated_before) = filter.updated_before {
            predicates.push(Predicate::Lt(
                LAST_UPDATED_ON_COLUMN,
                SqlValue::Timestamp(updated_before),
            ));
        }
    }

    predicates
}

fn push_count_subquery(
    writer: &mut SqlWriter,
    table: &TableSpec,
    predicates: &[Predicate],
    alias: &str,
) {
    writer
        .push("(SELECT COUNT(")
        .push_column(table, ID_COLUMN)
        .push(") FROM ")
        .push_identifier(table.name);
    push_where(writer, Some(table.name), predicates);
    writer.push(") AS ").push_identifier(alias);
}

/// `SELECT EXISTS (SELECT id FROM t WHERE id = $1 AND archived_on IS NULL [AND owner = $2])`.
#[must_use]
pub fn build_exists_query(table: &TableSpec, id: i64, owner_id: Option<i64>) -> Statement {
    let mut writer = SqlWriter::new("SELECT EXISTS (SELECT ");
    writer.push_column(table, ID_COLUMN).push(" FROM ").push_identifier(table.name);
    push_where(&mut writer, Some(table.name), &by_id_predicates(table, id, owner_id));
    writer.push(")");
    writer.finish()
}

/// Single live row by id, optionally owner-scoped.
#[must_use]
pub fn build_get_query(table: &TableSpec, id: i64, owner_id: Option<i64>) -> Statement {
    let mut writer = SqlWriter::new("SELECT ");
    push_select_columns(&mut writer, table);
    writer.push(" FROM ").push_identifier(table.name);
    push_where(&mut writer, Some(table.name), &by_id_predicates(table, id, owner_id));
    writer.finish()
}

/// Single live row matched on arbitrary equality columns.
#[must_use]
pub fn build_get_matching_query(
    table: &TableSpec,
    matches: Vec<(&'static str, SqlValue)>,
) -> Statement {
    let mut writer = SqlWriter::new("SELECT ");
    push_select_columns(&mut writer, table);
    writer.push(" FROM ").push_identifier(table.name);

    let mut predicates = eq_predicates(matches);
    predicates.extend(live_row_predicates(table, None));
    push_where(&mut writer, Some(table.name), &predicates);
    writer.finish()
}

/// Count of every live row in the table.
#[must_use]
pub fn build_get_all_count_query(table: &TableSpec) -> Statement {
    let mut writer = SqlWriter::new("SELECT COUNT(");
    writer
        .push_column(table, ID_COLUMN)
        .push(") FROM ")
        .push_identifier(table.name);
    push_where(&mut writer, Some(table.name), &live_row_predicates(table, None));
    writer.finish()
}

/// One page of rows with `total_count` and `filtered_count` columns.
///
/// The total count applies only the archived and ownership predicates; the
/// filtered count and the outer query add the filter's time bounds. An admin
/// scope drops ownership, and with `include_archived` also drops the archived
/// predicate everywhere.
#[must_use]
pub fn build_list_query(table: &TableSpec, scope: ListScope, filter: &QueryFilter) -> Statement {
    let include_archived = matches!(scope, ListScope::Admin) && filter.include_archived;
    let total_predicates = scope_predicates(table, scope, include_archived);
    let mut filtered_predicates = total_predicates.clone();
    filtered_predicates.extend(time_bound_predicates(table, filter));

    let mut writer = SqlWriter::new("SELECT ");
    push_select_columns(&mut writer, table);
    writer.push(", ");
    push_count_subquery(&mut writer, table, &total_predicates, "total_count");
    writer.push(", ");
    push_count_subquery(&mut writer, table, &filtered_predicates, "filtered_count");
    writer.push(" FROM ").push_identifier(table.name);
    push_where(&mut writer, Some(table.name), &filtered_predicates);

    writer
        .push(" GROUP BY ")
        .push_column(table, ID_COLUMN)
        .push(" ORDER BY ")
        .push_column(table, ID_COLUMN)
        .push(" ")
        .push(filter.sort_by.as_sql())
        .push(" LIMIT ")
        .push_bind(SqlValue::BigInt(i64::from(filter.effective_limit())))
        .push(" OFFSET ")
        .push_bind(SqlValue::BigInt(
            i64::try_from(filter.offset()).unwrap_or(i64::MAX),
        ));

    writer.finish()
}

/// Rows with `begin_id < id < end_id`, regardless of owner or archival.
#[must_use]
pub fn build_batch_range_query(table: &TableSpec, begin_id: i64, end_id: i64) -> Statement {
    let mut writer = SqlWriter::new("SELECT ");
    push_select_columns(&mut writer, table);
    writer.push(" FROM ").push_identifier(table.name);
    push_where(
        &mut writer,
        Some(table.name),
        &[
            Predicate::Gt(ID_COLUMN, SqlValue::BigInt(begin_id)),
            Predicate::Lt(ID_COLUMN, SqlValue::BigInt(end_id)),
        ],
    );
    writer.finish()
}

/// Live rows whose id is in `ids`, returned in the order of `ids`.
///
/// Order comes from an ordinality join on the unnested array; `IN` gives no
/// ordering guarantee.
#[must_use]
pub fn build_id_set_query(
    table: &TableSpec,
    scope: ListScope,
    limit: u16,
    ids: &[i64],
) -> Statement {
    let mut writer = SqlWriter::new("SELECT ");
    push_select_columns(&mut writer, table);
    writer
        .push(" FROM ")
        .push_identifier(table.name)
        .push(" JOIN unnest(")
        .push_bind(SqlValue::BigIntArray(ids.to_vec()))
        .push("::BIGINT[]) WITH ORDINALITY AS requested(id, ord) ON requested.id = ")
        .push_column(table, ID_COLUMN);
    push_where(&mut writer, Some(table.name), &scope_predicates(table, scope, false));
    writer
        .push(" ORDER BY requested.ord LIMIT ")
        .push_bind(SqlValue::BigInt(i64::from(limit)));
    writer.finish()
}

/// `INSERT ... RETURNING id, created_on`.
#[must_use]
pub fn build_insert_query(table: &TableSpec, values: Vec<(&'static str, SqlValue)>) -> Statement {
    if values.is_empty() {
        tracing::error!(
            query_error = true,
            table = table.name,
            "insert requested without values"
        );
    }

    let mut writer = SqlWriter::new("INSERT INTO ");
    writer.push_identifier(table.name).push(" (");
    for (index, (column, _)) in values.iter().enumerate() {
        if index > 0 {
            writer.push(", ");
        }
        writer.push_identifier(column);
    }
    writer.push(") VALUES (");
    for (index, (_, value)) in values.into_iter().enumerate() {
        if index > 0 {
            writer.push(", ");
        }
        writer.push_bind(value);
    }
    writer
        .push(") RETURNING ")
        .push_identifier(ID_COLUMN)
        .push(", ")
        .push_identifier(CREATED_ON_COLUMN);
    writer.finish()
}

/// Updates a live row by id and ownership, stamping `last_updated_on`.
#[must_use]
pub fn build_update_query(
    table: &TableSpec,
    assignments: Vec<(&'static str, SqlValue)>,
    id: i64,
    owner_id: Option<i64>,
) -> Statement {
    build_update(table, assignments, by_id_predicates(table, id, owner_id))
}

/// Updates live rows matched on equality columns, stamping `last_updated_on`.
#[must_use]
pub fn build_update_matching_query(
    table: &TableSpec,
    assignments: Vec<(&'static str, SqlValue)>,
    matches: Vec<(&'static str, SqlValue)>,
) -> Statement {
    let mut predicates = eq_predicates(matches);
    predicates.extend(live_row_predicates(table, None));
    build_update(table, assignments, predicates)
}

fn build_update(
    table: &TableSpec,
    assignments: Vec<(&'static str, SqlValue)>,
    predicates: Vec<Predicate>,
) -> Statement {
    let mut writer = SqlWriter::new("UPDATE ");
    writer.push_identifier(table.name).push(" SET ");
    for (column, value) in assignments {
        writer.push_identifier(column).push(" = ").push_bind(value).push(", ");
    }
    writer.push_identifier(LAST_UPDATED_ON_COLUMN).push(" = now()");
    // Bare column names: the UPDATE target is the only table in scope.
    push_where(&mut writer, None, &predicates);
    writer.finish()
}

/// Soft-archives a live row by id and ownership.
#[must_use]
pub fn build_archive_query(table: &TableSpec, id: i64, owner_id: Option<i64>) -> Statement {
    build_archive(table, by_id_predicates(table, id, owner_id))
}

/// Soft-archives live rows matched on equality columns.
#[must_use]
pub fn build_archive_matching_query(
    table: &TableSpec,
    matches: Vec<(&'static str, SqlValue)>,
) -> Statement {
    let mut predicates = eq_predicates(matches);
    predicates.extend(live_row_predicates(table, None));
    build_archive(table, predicates)
}

fn build_archive(table: &TableSpec, predicates: Vec<Predicate>) -> Statement {
    if !table.archivable {
        tracing::error!(
            query_error = true,
            table = table.name,
            "archive requested for a table without archival"
        );
    }

    let mut writer = SqlWriter::new("UPDATE ");
    writer
        .push_identifier(table.name)
        .push(" SET ")
        .push_identifier(LAST_UPDATED_ON_COLUMN)
        .push(" = now(), ")
        .push_identifier(ARCHIVED_ON_COLUMN)
        .push(" = now()");
    // Bare column names: the UPDATE target is the only table in scope.
    push_where(&mut writer, None, &predicates);
    writer.finish()
}

/// Live rows whose `column` starts with `prefix`, ignoring case, ordered by
/// that column.
#[must_use]
pub fn build_prefix_search_query(
    table: &TableSpec,
    column: &'static str,
    prefix: &str,
    limit: i64,
) -> Statement {
    let mut predicates = vec![Predicate::ILike(
        column,
        SqlValue::Text(literal_prefix_pattern(prefix)),
    )];
    predicates.extend(live_row_predicates(table, None));

    let mut writer = SqlWriter::new("SELECT ");
    push_select_columns(&mut writer, table);
    writer.push(" FROM ").push_identifier(table.name);
    push_where(&mut writer, Some(table.name), &predicates);
    writer
        .push(" ORDER BY ")
        .push_column(table, column)
        .push(" LIMIT ")
        .push_bind(SqlValue::BigInt(limit));
    writer.finish()
}

const COPY_SOURCE_ALIAS: &str = "source";

/// Copies `column` from the live row matching `source` onto the live rows
/// matching `target`, stamping `last_updated_on`.
///
/// Both sides live in the same table; the source is joined as `source`.
#[must_use]
pub fn build_copy_column_query(
    table: &TableSpec,
    column: &'static str,
    target: Vec<(&'static str, SqlValue)>,
    source: Vec<(&'static str, SqlValue)>,
) -> Statement {
    let mut target_predicates = eq_predicates(target);
    target_predicates.extend(live_row_predicates(table, None));
    let mut source_predicates = eq_predicates(source);
    source_predicates.extend(live_row_predicates(table, None));

    let mut writer = SqlWriter::new("UPDATE ");
    writer
        .push_identifier(table.name)
        .push(" SET ")
        .push_identifier(column)
        .push(" = ")
        .push_identifier(COPY_SOURCE_ALIAS)
        .push(".")
        .push_identifier(column)
        .push(", ")
        .push_identifier(LAST_UPDATED_ON_COLUMN)
        .push(" = now() FROM ")
        .push_identifier(table.name)
        .push(" AS ")
        .push_identifier(COPY_SOURCE_ALIAS);
    push_where(&mut writer, Some(table.name), &target_predicates);
    push_predicates(
        &mut writer,
        Some(COPY_SOURCE_ALIAS),
        &source_predicates,
        target_predicates.is_empty(),
    );
    writer.finish()
}

/// Audit entries whose context holds `key = value`, oldest first.
#[must_use]
pub fn build_audit_log_lookup_query(context_key: &str, value: String) -> Statement {
    let table = &AUDIT_LOG;
    let mut writer = SqlWriter::new("SELECT ");
    push_select_columns(&mut writer, table);
    writer
        .push(" FROM ")
        .push_identifier(table.name)
        .push(" WHERE ")
        .push_column(table, "context")
        .push("->>'")
        .push_identifier(context_key)
        .push("' = ")
        .push_bind(SqlValue::Text(value))
        .push(" ORDER BY ")
        .push_column(table, CREATED_ON_COLUMN)
        .push(", ")
        .push_column(table, ID_COLUMN);
    writer.finish()
}
