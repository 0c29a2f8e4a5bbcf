use async_trait::async_trait;

use crate::error::SqlBridgeError;
use crate::results::RowSet;
use crate::types::ArgumentTuple;

/// The reactive executor capability the pipeline drives.
///
/// Implementations submit the SQL text for preparation, then execute it with
/// the bound tuple if present or as a no-argument execution if absent. Driver
/// failures propagate unmodified; no retries happen at this layer.
///
/// Every method is a suspension point; the surrounding pipeline computations
/// (translation, tuple building, validation) never suspend.
#[async_trait]
pub trait SqlExecutor: Send {
    /// Prepare and execute one statement.
    ///
    /// # Errors
    /// Returns the driver's error unmodified.
    async fn execute(
        &mut self,
        sql: &str,
        args: Option<&ArgumentTuple>,
    ) -> Result<RowSet, SqlBridgeError>;

    /// Prepare `sql` once and execute it with every tuple, returning one
    /// result per tuple in input order.
    ///
    /// # Errors
    /// Returns the driver's error unmodified; on error no partial results are
    /// returned.
    async fn execute_batch(
        &mut self,
        sql: &str,
        batches: Vec<ArgumentTuple>,
    ) -> Result<Vec<RowSet>, SqlBridgeError>;
}

/// A single exclusive connection that can scope work in a transaction.
///
/// Pools hand out exclusive per-call-chain connections implementing this;
/// the `&mut` receivers keep one connection from being driven by two call
/// chains at once.
#[async_trait]
pub trait Connection: SqlExecutor {
    /// Begin a transaction on this connection.
    ///
    /// # Errors
    /// Returns the driver's error unmodified.
    async fn begin(&mut self) -> Result<(), SqlBridgeError>;

    /// Commit the open transaction.
    ///
    /// # Errors
    /// Returns the driver's error unmodified.
    async fn commit(&mut self) -> Result<(), SqlBridgeError>;

    /// Roll back the open transaction.
    ///
    /// # Errors
    /// Returns the driver's error unmodified.
    async fn rollback(&mut self) -> Result<(), SqlBridgeError>;
}

/// Per-statement results of one batch call, in input statement order.
///
/// Single pass by construction: iterating consumes the results, so a batch
/// can never be re-consumed by accident.
#[derive(Debug)]
pub struct BatchResults {
    inner: std::vec::IntoIter<RowSet>,
}

impl BatchResults {
    #[must_use]
    pub fn empty() -> Self {
        Self {
            inner: Vec::new().into_iter(),
        }
    }

    #[must_use]
    pub fn from_row_sets(row_sets: Vec<RowSet>) -> Self {
        Self {
            inner: row_sets.into_iter(),
        }
    }

    /// Number of results not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.inner.len()
    }

    /// Consume the results into per-statement affected-row counts.
    #[must_use]
    pub fn update_counts(self) -> Vec<u64> {
        self.map(|rs| rs.rows_affected).collect()
    }
}

impl Iterator for BatchResults {
    type Item = RowSet;

    fn next(&mut self) -> Option<RowSet> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}
