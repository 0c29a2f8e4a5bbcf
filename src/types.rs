use chrono::NaiveDateTime;
use serde_json::Value as JsonValue;

/// Values that can be bound as query parameters or read back from a row.
///
/// One enum shared by the preparation pipeline and every executor, so helper
/// code never branches on driver types:
/// ```rust
/// use sql_bridge::prelude::*;
///
/// let params = vec![
///     SqlValue::Int(1),
///     SqlValue::Text("alice".into()),
///     SqlValue::Bool(true),
/// ];
/// # let _ = params;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    /// Integer value (64-bit)
    Int(i64),
    /// Floating point value (64-bit)
    Float(f64),
    /// Text/string value
    Text(String),
    /// Boolean value
    Bool(bool),
    /// Timestamp value
    Timestamp(NaiveDateTime),
    /// NULL value
    Null,
    /// JSON value
    Json(JsonValue),
    /// Binary data
    Blob(Vec<u8>),
    /// Array value, bound as the driver's native array representation
    Array(Vec<SqlValue>),
    /// Domain-identifier wrapper; the tuple builder unwraps it to the inner
    /// scalar before binding
    EntityId(Box<SqlValue>),
}

impl SqlValue {
    /// Check if this value is NULL
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_int(&self) -> Option<&i64> {
        if let SqlValue::Int(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        if let SqlValue::Text(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<&bool> {
        if let SqlValue::Bool(value) = self {
            return Some(value);
        } else if let Some(i) = self.as_int() {
            if *i == 1 {
                return Some(&true);
            } else if *i == 0 {
                return Some(&false);
            }
        }
        None
    }

    #[must_use]
    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        if let SqlValue::Timestamp(value) = self {
            return Some(*value);
        } else if let Some(s) = self.as_text() {
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
                return Some(dt);
            }
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S.%3f") {
                return Some(dt);
            }
        }
        None
    }

    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        if let SqlValue::Float(value) = self {
            Some(*value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_json(&self) -> Option<&JsonValue> {
        if let SqlValue::Json(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_blob(&self) -> Option<&[u8]> {
        if let SqlValue::Blob(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_array(&self) -> Option<&[SqlValue]> {
        if let SqlValue::Array(values) = self {
            Some(values)
        } else {
            None
        }
    }
}

/// Type tag the statement generator pairs with each bound argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    BigInt,
    Double,
    Text,
    Bool,
    Timestamp,
    Json,
    Blob,
    Array,
    EntityId,
    Other,
}

impl ColumnType {
    /// Infer the tag from a value, for statement sources that carry plain
    /// values rather than a typed column model.
    #[must_use]
    pub fn of(value: &SqlValue) -> Self {
        match value {
            SqlValue::Int(_) => ColumnType::BigInt,
            SqlValue::Float(_) => ColumnType::Double,
            SqlValue::Text(_) => ColumnType::Text,
            SqlValue::Bool(_) => ColumnType::Bool,
            SqlValue::Timestamp(_) => ColumnType::Timestamp,
            SqlValue::Json(_) => ColumnType::Json,
            SqlValue::Blob(_) => ColumnType::Blob,
            SqlValue::Array(_) => ColumnType::Array,
            SqlValue::EntityId(_) => ColumnType::EntityId,
            SqlValue::Null => ColumnType::Other,
        }
    }
}

/// Ordered driver-native values, positionally bound to the translated SQL's
/// marker sequence.
pub type ArgumentTuple = Vec<SqlValue>;

/// One statement's typed arguments as produced by a single render pass.
pub type ArgumentSet = Vec<(ColumnType, SqlValue)>;
