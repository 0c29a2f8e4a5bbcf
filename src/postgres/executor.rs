use async_trait::async_trait;
use deadpool_postgres::Object;
use futures_util::TryStreamExt;
use futures_util::future::try_join_all;
use futures_util::pin_mut;

use super::params::as_param_refs;
use super::query::build_row_set_from_rows;
use crate::error::SqlBridgeError;
use crate::executor::{Connection, SqlExecutor};
use crate::results::RowSet;
use crate::types::ArgumentTuple;

/// One exclusive pooled Postgres connection.
pub struct PgConnection {
    conn: Object,
}

impl PgConnection {
    #[must_use]
    pub fn new(conn: Object) -> Self {
        Self { conn }
    }

    /// Borrow the underlying tokio-postgres client.
    #[must_use]
    pub fn client(&self) -> &tokio_postgres::Client {
        &self.conn
    }
}

async fn run_prepared(
    client: &tokio_postgres::Client,
    statement: &tokio_postgres::Statement,
    args: Option<&ArgumentTuple>,
) -> Result<RowSet, SqlBridgeError> {
    // Sync-bounded refs keep the future Send while borrowed across the await
    let params = args.map(|tuple| as_param_refs(tuple)).unwrap_or_default();

    let stream = client.query_raw(statement, params).await?;
    pin_mut!(stream);

    let mut rows = Vec::new();
    while let Some(row) = stream.try_next().await? {
        rows.push(row);
    }
    // rows_affected is only known once the stream is exhausted
    let rows_affected = stream.rows_affected().unwrap_or(0);

    let mut row_set = build_row_set_from_rows(&rows)?;
    row_set.rows_affected = rows_affected;
    Ok(row_set)
}

#[async_trait]
impl SqlExecutor for PgConnection {
    async fn execute(
        &mut self,
        sql: &str,
        args: Option<&ArgumentTuple>,
    ) -> Result<RowSet, SqlBridgeError> {
        let statement = self.conn.prepare(sql).await?;
        run_prepared(&self.conn, &statement, args).await
    }

    async fn execute_batch(
        &mut self,
        sql: &str,
        batches: Vec<ArgumentTuple>,
    ) -> Result<Vec<RowSet>, SqlBridgeError> {
        let statement = self.conn.prepare(sql).await?;
        let client: &tokio_postgres::Client = &self.conn;

        // One future per tuple, polled concurrently: tokio-postgres pipelines
        // them over the single connection, and try_join_all keeps results in
        // input order.
        let executions = batches
            .iter()
            .map(|tuple| run_prepared(client, &statement, Some(tuple)));
        try_join_all(executions).await
    }
}

#[async_trait]
impl Connection for PgConnection {
    async fn begin(&mut self) -> Result<(), SqlBridgeError> {
        self.conn.batch_execute("BEGIN").await?;
        Ok(())
    }

    async fn commit(&mut self) -> Result<(), SqlBridgeError> {
        self.conn.batch_execute("COMMIT").await?;
        Ok(())
    }

    async fn rollback(&mut self) -> Result<(), SqlBridgeError> {
        self.conn.batch_execute("ROLLBACK").await?;
        Ok(())
    }
}
