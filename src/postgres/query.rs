use chrono::NaiveDateTime;
use serde_json::Value as JsonValue;

use crate::error::SqlBridgeError;
use crate::results::RowSet;
use crate::types::SqlValue;

/// Build a `RowSet` from raw Postgres rows.
///
/// # Errors
/// Returns errors from row value extraction.
pub fn build_row_set_from_rows(rows: &[tokio_postgres::Row]) -> Result<RowSet, SqlBridgeError> {
    let mut row_set = RowSet::with_capacity(rows.len());
    if let Some(row) = rows.first() {
        let cols: Vec<String> = row.columns().iter().map(|c| c.name().to_string()).collect();
        row_set.set_column_names(std::sync::Arc::new(cols));
    }

    for row in rows {
        let col_count = row.columns().len();
        let mut values = Vec::with_capacity(col_count);
        for idx in 0..col_count {
            values.push(pg_extract_value(row, idx)?);
        }
        row_set.add_row_values(values);
    }

    Ok(row_set)
}

/// Extract a `SqlValue` from a `tokio_postgres` row at the given index.
///
/// # Errors
/// Returns `SqlBridgeError` if the column cannot be retrieved.
pub fn pg_extract_value(
    row: &tokio_postgres::Row,
    idx: usize,
) -> Result<SqlValue, SqlBridgeError> {
    let type_name = row.columns()[idx].type_().name();

    if type_name == "int2" {
        let val: Option<i16> = row.try_get(idx)?;
        Ok(val.map_or(SqlValue::Null, |v| SqlValue::Int(i64::from(v))))
    } else if type_name == "int4" {
        let val: Option<i32> = row.try_get(idx)?;
        Ok(val.map_or(SqlValue::Null, |v| SqlValue::Int(i64::from(v))))
    } else if type_name == "int8" {
        let val: Option<i64> = row.try_get(idx)?;
        Ok(val.map_or(SqlValue::Null, SqlValue::Int))
    } else if type_name == "float4" || type_name == "float8" {
        let val: Option<f64> = row.try_get(idx)?;
        Ok(val.map_or(SqlValue::Null, SqlValue::Float))
    } else if type_name == "bool" {
        let val: Option<bool> = row.try_get(idx)?;
        Ok(val.map_or(SqlValue::Null, SqlValue::Bool))
    } else if type_name == "timestamp" || type_name == "timestamptz" {
        let val: Option<NaiveDateTime> = row.try_get(idx)?;
        Ok(val.map_or(SqlValue::Null, SqlValue::Timestamp))
    } else if type_name == "json" || type_name == "jsonb" {
        let val: Option<JsonValue> = row.try_get(idx)?;
        Ok(val.map_or(SqlValue::Null, SqlValue::Json))
    } else if type_name == "bytea" {
        let val: Option<Vec<u8>> = row.try_get(idx)?;
        Ok(val.map_or(SqlValue::Null, SqlValue::Blob))
    } else if type_name == "_int8" {
        let val: Option<Vec<i64>> = row.try_get(idx)?;
        Ok(val.map_or(SqlValue::Null, |v| {
            SqlValue::Array(v.into_iter().map(SqlValue::Int).collect())
        }))
    } else if type_name == "_text" {
        let val: Option<Vec<String>> = row.try_get(idx)?;
        Ok(val.map_or(SqlValue::Null, |v| {
            SqlValue::Array(v.into_iter().map(SqlValue::Text).collect())
        }))
    } else {
        // For other types, attempt to get as string
        let val: Option<String> = row.try_get(idx)?;
        Ok(val.map_or(SqlValue::Null, SqlValue::Text))
    }
}
