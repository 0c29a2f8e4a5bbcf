use std::error::Error;

use tokio_postgres::types::{IsNull, ToSql, Type, to_sql_checked};
use tokio_util::bytes;

use crate::types::SqlValue;

impl ToSql for SqlValue {
    fn to_sql(
        &self,
        ty: &Type,
        out: &mut bytes::BytesMut,
    ) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        match self {
            SqlValue::Int(i) => (*i).to_sql(ty, out),
            SqlValue::Float(f) => (*f).to_sql(ty, out),
            SqlValue::Text(s) => s.to_sql(ty, out),
            SqlValue::Bool(b) => (*b).to_sql(ty, out),
            SqlValue::Timestamp(dt) => dt.to_sql(ty, out),
            SqlValue::Null => Ok(IsNull::Yes),
            SqlValue::Json(jsval) => jsval.to_sql(ty, out),
            SqlValue::Blob(bytes) => bytes.to_sql(ty, out),
            SqlValue::Array(values) => array_to_sql(values, ty, out),
            // tuple building unwraps these, but binding directly still works
            SqlValue::EntityId(inner) => inner.as_ref().to_sql(ty, out),
        }
    }

    fn accepts(ty: &Type) -> bool {
        match *ty {
            // Integer types
            Type::INT2 | Type::INT4 | Type::INT8 => true,
            // Floating point types
            Type::FLOAT4 | Type::FLOAT8 => true,
            // Text types
            Type::TEXT | Type::VARCHAR | Type::CHAR | Type::NAME => true,
            // Boolean type
            Type::BOOL => true,
            // Date/time types
            Type::TIMESTAMP | Type::TIMESTAMPTZ | Type::DATE => true,
            // JSON types
            Type::JSON | Type::JSONB => true,
            // Binary data
            Type::BYTEA => true,
            // Array types
            Type::INT8_ARRAY | Type::FLOAT8_ARRAY | Type::TEXT_ARRAY | Type::BOOL_ARRAY => true,
            // For any other type, we don't accept
            _ => false,
        }
    }

    to_sql_checked!();
}

// Postgres arrays are homogeneous; bind through the matching Vec<T> impl.
fn array_to_sql(
    values: &[SqlValue],
    ty: &Type,
    out: &mut bytes::BytesMut,
) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
    if values.iter().all(|v| matches!(v, SqlValue::Int(_))) {
        let ints: Vec<i64> = values.iter().filter_map(|v| v.as_int().copied()).collect();
        ints.to_sql(ty, out)
    } else if values.iter().all(|v| matches!(v, SqlValue::Text(_))) {
        let texts: Vec<&str> = values.iter().filter_map(SqlValue::as_text).collect();
        texts.to_sql(ty, out)
    } else if values.iter().all(|v| matches!(v, SqlValue::Float(_))) {
        let floats: Vec<f64> = values.iter().filter_map(SqlValue::as_float).collect();
        floats.to_sql(ty, out)
    } else if values.iter().all(|v| matches!(v, SqlValue::Bool(_))) {
        let bools: Vec<bool> = values.iter().filter_map(|v| v.as_bool().copied()).collect();
        bools.to_sql(ty, out)
    } else {
        Err(format!("cannot bind a mixed-type array of {} values", values.len()).into())
    }
}

/// Borrow a tuple as the `&dyn ToSql` slice tokio-postgres expects.
#[must_use]
pub fn as_param_refs(tuple: &[SqlValue]) -> Vec<&(dyn ToSql + Sync)> {
    tuple.iter().map(|p| p as &(dyn ToSql + Sync)).collect()
}
