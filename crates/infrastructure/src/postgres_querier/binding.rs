use sqlx::Arguments;
use sqlx::postgres::PgArguments;
use todo_core::{AppError, AppResult};

use crate::query_builder::SqlValue;

/// Converts builder arguments into driver arguments, in placeholder order.
pub(super) fn to_arguments(values: Vec<SqlValue>) -> AppResult<PgArguments> {
    let mut arguments = PgArguments::default();

    for value in values {
        let added = match value {
            SqlValue::BigInt(value) => arguments.add(value),
            SqlValue::OptionalBigInt(value) => arguments.add(value),
            SqlValue::Text(value) => arguments.add(value),
            SqlValue::OptionalText(value) => arguments.add(value),
            SqlValue::Bool(value) => arguments.add(value),
            SqlValue::Bytes(value) => arguments.add(value),
            SqlValue::Timestamp(value) => arguments.add(value),
            SqlValue::OptionalTimestamp(value) => arguments.add(value),
            SqlValue::BigIntArray(value) => arguments.add(value),
            SqlValue::Json(value) => arguments.add(value),
        };

        added.map_err(|error| {
            AppError::Internal(format!("failed to encode query argument: {error}"))
        })?;
    }

    Ok(arguments)
}

/// Converts a row id for binding.
pub(super) fn id_argument(id: u64) -> i64 {
    i64::try_from(id).unwrap_or(i64::MAX)
}
