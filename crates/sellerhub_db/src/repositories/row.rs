//! Column conversions shared by the SQL repositories.
//!
//! `sqlx::Any` cannot decode `DateTime<Utc>`, so timestamps are stored as Unix seconds and
//! booleans as 0/1 integers.

use crate::error::DbError;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::any::AnyRow;
use sqlx::Row;

pub(crate) fn get_string(row: &AnyRow, column: &str) -> Result<String, DbError> {
    let value: Option<String> = row
        .try_get(column)
        .map_err(|e| DbError::RowMapping(format!("{}: {}", column, e)))?;
    Ok(value.unwrap_or_default())
}

pub(crate) fn get_i64(row: &AnyRow, column: &str) -> Result<i64, DbError> {
    row.try_get(column)
        .map_err(|e| DbError::RowMapping(format!("{}: {}", column, e)))
}

pub(crate) fn get_opt_i64(row: &AnyRow, column: &str) -> Result<Option<i64>, DbError> {
    row.try_get(column)
        .map_err(|e| DbError::RowMapping(format!("{}: {}", column, e)))
}

pub(crate) fn get_timestamp(row: &AnyRow, column: &str) -> Result<DateTime<Utc>, DbError> {
    let secs = get_i64(row, column)?;
    from_unix(secs, column)
}

pub(crate) fn get_opt_timestamp(
    row: &AnyRow,
    column: &str,
) -> Result<Option<DateTime<Utc>>, DbError> {
    get_opt_i64(row, column)?
        .map(|secs| from_unix(secs, column))
        .transpose()
}

pub(crate) fn get_json<T: DeserializeOwned>(row: &AnyRow, column: &str) -> Result<T, DbError> {
    let raw = get_string(row, column)?;
    serde_json::from_str(&raw).map_err(|e| DbError::RowMapping(format!("{}: {}", column, e)))
}

pub(crate) fn to_json<T: Serialize>(value: &T, what: &str) -> Result<String, DbError> {
    serde_json::to_string(value).map_err(|e| DbError::RowMapping(format!("{}: {}", what, e)))
}

fn from_unix(secs: i64, column: &str) -> Result<DateTime<Utc>, DbError> {
    DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| DbError::RowMapping(format!("{}: timestamp {} out of range", column, secs)))
}
