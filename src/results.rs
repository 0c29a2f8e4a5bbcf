use std::collections::HashMap;
use std::sync::Arc;

use crate::types::SqlValue;

/// A single row of a query result.
///
/// Column names and the name-to-index map are shared across all rows of one
/// result set.
#[derive(Debug, Clone)]
pub struct SqlRow {
    /// The column names for this row (shared across the result set)
    pub column_names: Arc<Vec<String>>,
    /// The values for this row
    pub values: Vec<SqlValue>,
    column_index: Arc<HashMap<String, usize>>,
}

impl SqlRow {
    /// Get a value by column name.
    #[must_use]
    pub fn get(&self, column_name: &str) -> Option<&SqlValue> {
        self.column_index
            .get(column_name)
            .and_then(|&idx| self.values.get(idx))
    }

    /// Get a value by column index.
    #[must_use]
    pub fn get_by_index(&self, index: usize) -> Option<&SqlValue> {
        self.values.get(index)
    }
}

/// The executor's result for one statement: returned rows plus the affected
/// row count reported by the driver.
#[derive(Debug, Clone, Default)]
pub struct RowSet {
    /// The rows returned by the query
    pub rows: Vec<SqlRow>,
    /// The number of rows affected (for DML statements)
    pub rows_affected: u64,
    column_names: Option<Arc<Vec<String>>>,
    column_index: Option<Arc<HashMap<String, usize>>>,
}

impl RowSet {
    /// Create a row set with preallocated row capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> RowSet {
        RowSet {
            rows: Vec::with_capacity(capacity),
            rows_affected: 0,
            column_names: None,
            column_index: None,
        }
    }

    /// Result of a DML statement that returns no rows.
    #[must_use]
    pub fn from_rows_affected(rows_affected: u64) -> RowSet {
        RowSet {
            rows_affected,
            ..RowSet::default()
        }
    }

    /// Set the column names shared by all rows; builds the lookup index once.
    pub fn set_column_names(&mut self, column_names: Arc<Vec<String>>) {
        let index = Arc::new(
            column_names
                .iter()
                .enumerate()
                .map(|(i, name)| (name.clone(), i))
                .collect::<HashMap<_, _>>(),
        );
        self.column_names = Some(column_names);
        self.column_index = Some(index);
    }

    #[must_use]
    pub fn get_column_names(&self) -> Option<&Arc<Vec<String>>> {
        self.column_names.as_ref()
    }

    /// Append a row. Column names must have been set first.
    pub fn add_row_values(&mut self, values: Vec<SqlValue>) {
        if let (Some(column_names), Some(column_index)) =
            (&self.column_names, &self.column_index)
        {
            self.rows.push(SqlRow {
                column_names: column_names.clone(),
                values,
                column_index: column_index.clone(),
            });
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Map every row through `f`, in row order.
    pub fn map_rows<T>(&self, f: impl FnMut(&SqlRow) -> T) -> Vec<T> {
        self.rows.iter().map(f).collect()
    }
}
