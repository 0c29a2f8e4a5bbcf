//! In-memory executor for exercising the pipeline without a database server.
//!
//! Models a single table as a list of tuples, with transaction and savepoint
//! snapshots, and records every driver call so tests can assert on the
//! protocol (how many prepared texts, batch sizes, commit vs rollback).
//!
//! Only a handful of statement shapes are interpreted: `INSERT` appends the
//! bound tuple, `SELECT COUNT` returns the row count as `cnt`, any other
//! `SELECT` returns all rows, `UPDATE` reports a scripted affected count,
//! `DELETE` clears the table, and the savepoint control statements manage
//! snapshots.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;

use crate::error::SqlBridgeError;
use crate::executor::{Connection, SqlExecutor};
use crate::results::RowSet;
use crate::session::{LocalSession, SessionOptions, SessionSource};
use crate::types::{ArgumentTuple, SqlValue};

/// One recorded driver call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutorCall {
    Execute { sql: String, args: Option<usize> },
    ExecuteBatch { sql: String, tuples: usize },
    Begin,
    Commit,
    Rollback,
}

#[derive(Debug, Default)]
struct MemoryState {
    rows: Vec<Vec<SqlValue>>,
    tx_snapshot: Option<Vec<Vec<SqlValue>>>,
    savepoints: Vec<(String, Vec<Vec<SqlValue>>)>,
    scripted_update_counts: VecDeque<u64>,
    control_rows_affected: u64,
    calls: Vec<ExecutorCall>,
}

/// Cloneable handle to one shared in-memory database; clones observe the same
/// state, so tests keep a handle while the client owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryExecutor {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryExecutor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// All rows currently visible.
    #[must_use]
    pub fn rows(&self) -> Vec<Vec<SqlValue>> {
        self.lock().rows.clone()
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.lock().rows.len()
    }

    /// Every driver call recorded so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<ExecutorCall> {
        self.lock().calls.clone()
    }

    /// Script the affected count the next `UPDATE` reports.
    pub fn push_update_count(&self, count: u64) {
        self.lock().scripted_update_counts.push_back(count);
    }

    /// Make control statements misreport this affected count, to exercise the
    /// controller's zero-row assertion.
    pub fn misreport_control_rows(&self, count: u64) {
        self.lock().control_rows_affected = count;
    }

    fn run_sql(
        state: &mut MemoryState,
        sql: &str,
        args: Option<&ArgumentTuple>,
    ) -> Result<RowSet, SqlBridgeError> {
        let trimmed = sql.trim().trim_end_matches(';').trim();
        let upper = trimmed.to_ascii_uppercase();

        if upper.starts_with("INSERT") {
            state.rows.push(args.cloned().unwrap_or_default());
            Ok(RowSet::from_rows_affected(1))
        } else if upper.starts_with("SELECT COUNT") {
            let mut row_set = RowSet::with_capacity(1);
            row_set.set_column_names(Arc::new(vec!["cnt".to_string()]));
            row_set.add_row_values(vec![SqlValue::Int(state.rows.len() as i64)]);
            Ok(row_set)
        } else if upper.starts_with("SELECT") {
            let width = state.rows.first().map_or(0, Vec::len);
            let mut row_set = RowSet::with_capacity(state.rows.len());
            row_set.set_column_names(Arc::new(
                (0..width).map(|i| format!("c{i}")).collect::<Vec<_>>(),
            ));
            for row in &state.rows {
                row_set.add_row_values(row.clone());
            }
            Ok(row_set)
        } else if upper.starts_with("UPDATE") {
            let count = state
                .scripted_update_counts
                .pop_front()
                .unwrap_or(state.rows.len() as u64);
            Ok(RowSet::from_rows_affected(count))
        } else if upper.starts_with("DELETE") {
            let count = state.rows.len() as u64;
            state.rows.clear();
            Ok(RowSet::from_rows_affected(count))
        } else if upper.starts_with("ROLLBACK TO SAVEPOINT") {
            let name = quoted_name(trimmed)?;
            let snapshot = state
                .savepoints
                .iter()
                .rev()
                .find(|(n, _)| n == &name)
                .map(|(_, s)| s.clone())
                .ok_or_else(|| {
                    SqlBridgeError::DriverError(format!("no savepoint named {name:?}"))
                })?;
            state.rows = snapshot;
            Ok(RowSet::from_rows_affected(state.control_rows_affected))
        } else if upper.starts_with("RELEASE SAVEPOINT") {
            let name = quoted_name(trimmed)?;
            let pos = state
                .savepoints
                .iter()
                .rposition(|(n, _)| n == &name)
                .ok_or_else(|| {
                    SqlBridgeError::DriverError(format!("no savepoint named {name:?}"))
                })?;
            state.savepoints.remove(pos);
            Ok(RowSet::from_rows_affected(state.control_rows_affected))
        } else if upper.starts_with("SAVEPOINT") {
            let name = quoted_name(trimmed)?;
            // a new savepoint silently replaces one with the same name
            state.savepoints.retain(|(n, _)| n != &name);
            let snapshot = state.rows.clone();
            state.savepoints.push((name, snapshot));
            Ok(RowSet::from_rows_affected(state.control_rows_affected))
        } else {
            Ok(RowSet::default())
        }
    }
}

fn quoted_name(sql: &str) -> Result<String, SqlBridgeError> {
    sql.split('"')
        .nth(1)
        .map(str::to_string)
        .ok_or_else(|| SqlBridgeError::DriverError(format!("missing quoted name in {sql:?}")))
}

#[async_trait]
impl SqlExecutor for MemoryExecutor {
    async fn execute(
        &mut self,
        sql: &str,
        args: Option<&ArgumentTuple>,
    ) -> Result<RowSet, SqlBridgeError> {
        let mut state = self.lock();
        state.calls.push(ExecutorCall::Execute {
            sql: sql.to_string(),
            args: args.map(Vec::len),
        });
        Self::run_sql(&mut state, sql, args)
    }

    async fn execute_batch(
        &mut self,
        sql: &str,
        batches: Vec<ArgumentTuple>,
    ) -> Result<Vec<RowSet>, SqlBridgeError> {
        let mut state = self.lock();
        state.calls.push(ExecutorCall::ExecuteBatch {
            sql: sql.to_string(),
            tuples: batches.len(),
        });
        batches
            .iter()
            .map(|tuple| Self::run_sql(&mut state, sql, Some(tuple)))
            .collect()
    }
}

#[async_trait]
impl Connection for MemoryExecutor {
    async fn begin(&mut self) -> Result<(), SqlBridgeError> {
        let mut state = self.lock();
        if state.tx_snapshot.is_some() {
            return Err(SqlBridgeError::DriverError(
                "transaction already open".to_string(),
            ));
        }
        let snapshot = state.rows.clone();
        state.tx_snapshot = Some(snapshot);
        state.calls.push(ExecutorCall::Begin);
        Ok(())
    }

    async fn commit(&mut self) -> Result<(), SqlBridgeError> {
        let mut state = self.lock();
        state
            .tx_snapshot
            .take()
            .ok_or_else(|| SqlBridgeError::DriverError("no open transaction".to_string()))?;
        state.savepoints.clear();
        state.calls.push(ExecutorCall::Commit);
        Ok(())
    }

    async fn rollback(&mut self) -> Result<(), SqlBridgeError> {
        let mut state = self.lock();
        let snapshot = state
            .tx_snapshot
            .take()
            .ok_or_else(|| SqlBridgeError::DriverError("no open transaction".to_string()))?;
        state.rows = snapshot;
        state.savepoints.clear();
        state.calls.push(ExecutorCall::Rollback);
        Ok(())
    }
}

/// Session source counting how many sessions were opened; lets tests assert
/// the provider was never touched (empty-batch short-circuit) or touched
/// exactly once per batch.
#[derive(Debug, Clone, Default)]
pub struct CountingSessionSource {
    opened: Arc<AtomicUsize>,
}

impl CountingSessionSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }
}

impl SessionSource for CountingSessionSource {
    type Session = LocalSession;

    fn open_session(&self, options: &SessionOptions) -> Result<Self::Session, SqlBridgeError> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(LocalSession::new(*options))
    }
}
