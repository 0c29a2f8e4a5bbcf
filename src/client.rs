use tracing::debug;

use crate::error::SqlBridgeError;
use crate::executor::{BatchResults, SqlExecutor};
use crate::preparer::{prepare_statement, to_argument_tuple};
use crate::provider::PreparationProvider;
use crate::results::{RowSet, SqlRow};
use crate::statement::Statement;
use crate::translation::{PlaceholderStyle, translate_placeholders};
use crate::types::{ArgumentSet, ArgumentTuple};

/// Orchestrates the preparation pipeline over one executor: renders
/// statements through the preparation provider, translates placeholder
/// markers, and drives single, batch, and plain-SQL execution.
///
/// `validate_batch` controls whether batch elements are checked for
/// identical generated SQL; keep it enabled for tests, disable it for
/// throughput once batches are known to come from a single template.
pub struct DatabaseClient<E, P> {
    pub(crate) executor: E,
    pub(crate) provider: P,
    pub(crate) style: PlaceholderStyle,
    pub(crate) validate_batch: bool,
    pub(crate) log_sql: bool,
}

impl<E: SqlExecutor, P: PreparationProvider> DatabaseClient<E, P> {
    #[must_use]
    pub fn new(executor: E, provider: P, style: PlaceholderStyle) -> Self {
        Self {
            executor,
            provider,
            style,
            validate_batch: true,
            log_sql: false,
        }
    }

    #[must_use]
    pub fn with_validate_batch(mut self, validate_batch: bool) -> Self {
        self.validate_batch = validate_batch;
        self
    }

    #[must_use]
    pub fn with_log_sql(mut self, log_sql: bool) -> Self {
        self.log_sql = log_sql;
        self
    }

    pub fn executor_mut(&mut self) -> &mut E {
        &mut self.executor
    }

    /// Execute SQL text as-is, without preparation-pipeline involvement.
    ///
    /// # Errors
    /// Returns the driver's error unmodified.
    pub async fn execute_plain_sql(&mut self, sql: &str) -> Result<RowSet, SqlBridgeError> {
        self.executor.execute(sql, None).await
    }

    /// Execute SQL text as-is and return the affected row count.
    ///
    /// # Errors
    /// Returns the driver's error unmodified.
    pub async fn execute_plain_sql_update(&mut self, sql: &str) -> Result<u64, SqlBridgeError> {
        Ok(self.execute_plain_sql(sql).await?.rows_affected)
    }

    /// Prepare and execute one statement.
    ///
    /// # Errors
    /// Returns preparation validation errors, or the driver's error
    /// unmodified.
    pub async fn execute(&mut self, statement: &dyn Statement) -> Result<RowSet, SqlBridgeError> {
        let prepared = prepare_statement(statement, &mut self.provider, self.style)?;
        if self.log_sql {
            debug!(sql = %prepared.sql, "prepared sql");
        }
        self.executor
            .execute(&prepared.sql, prepared.args.as_ref())
            .await
    }

    /// Execute one statement and map every returned row through `mapper`.
    ///
    /// # Errors
    /// Returns preparation validation errors, or the driver's error
    /// unmodified.
    pub async fn execute_with_mapping<T>(
        &mut self,
        statement: &dyn Statement,
        mapper: impl FnMut(&SqlRow) -> T,
    ) -> Result<Vec<T>, SqlBridgeError> {
        Ok(self.execute(statement).await?.map_rows(mapper))
    }

    /// Execute an update statement and return the affected row count.
    ///
    /// # Errors
    /// Returns preparation validation errors, or the driver's error
    /// unmodified.
    pub async fn execute_update(&mut self, statement: &dyn Statement) -> Result<u64, SqlBridgeError> {
        Ok(self.execute(statement).await?.rows_affected)
    }

    /// Execute an update that must touch exactly one row.
    ///
    /// # Errors
    /// Returns `SqlBridgeError::SingleUpdate` with the actual count when the
    /// update touched zero or more than one row.
    pub async fn execute_single_update(
        &mut self,
        statement: &dyn Statement,
    ) -> Result<(), SqlBridgeError> {
        match self.execute_update(statement).await? {
            1 => Ok(()),
            n => Err(SqlBridgeError::SingleUpdate(n)),
        }
    }

    /// Execute an update that may touch zero or one row; `false` for zero,
    /// `true` for one.
    ///
    /// # Errors
    /// Returns `SqlBridgeError::SingleUpdate` with the actual count when the
    /// update touched more than one row.
    pub async fn execute_single_or_no_update(
        &mut self,
        statement: &dyn Statement,
    ) -> Result<bool, SqlBridgeError> {
        match self.execute_update(statement).await? {
            0 => Ok(false),
            1 => Ok(true),
            n => Err(SqlBridgeError::SingleUpdate(n)),
        }
    }

    /// Cheap connectivity probe.
    pub async fn is_working(&mut self) -> bool {
        self.execute_plain_sql("SELECT 1;").await.is_ok()
    }

    /// Execute a homogeneous batch: one prepared SQL text, one argument tuple
    /// per statement, one batch call to the driver.
    ///
    /// The first statement's rendered text is the batch's canonical SQL. When
    /// `validate_batch` is on, every further statement is rendered too and
    /// must produce character-identical text; when off, only its arguments
    /// are extracted and the canonical text is used regardless.
    ///
    /// An empty input returns an empty result without touching the
    /// preparation provider or the driver.
    ///
    /// # Errors
    /// Returns `SqlBridgeError::ValidationError` on text drift or on a batch
    /// statement without exactly one argument set; driver errors propagate
    /// unmodified.
    pub async fn execute_batch<'a, I>(&mut self, statements: I) -> Result<BatchResults, SqlBridgeError>
    where
        I: IntoIterator<Item = &'a dyn Statement>,
    {
        let mut iter = statements.into_iter();
        let Some(first) = iter.next() else {
            return Ok(BatchResults::empty());
        };

        let validate = self.validate_batch;
        // One session for the whole batch, not one per element.
        let (raw_sql, tuples) = self.provider.with_preparation_session(|session| {
            let first_rendered = first.render(session)?;
            let mut tuples = vec![batch_tuple(&first_rendered.argument_sets, &first_rendered.sql)?];
            let canonical_sql = first_rendered.sql;

            for statement in iter {
                if validate {
                    let rendered = statement.render(session)?;
                    if rendered.sql != canonical_sql {
                        return Err(SqlBridgeError::ValidationError(format!(
                            "batch statements must generate the same prepared SQL; \
                             previous statements generated {canonical_sql:?} \
                             but the current statement generated {:?}",
                            rendered.sql
                        )));
                    }
                    tuples.push(batch_tuple(&rendered.argument_sets, &rendered.sql)?);
                } else {
                    let sets = statement.arguments(session)?;
                    tuples.push(batch_tuple(&sets, &canonical_sql)?);
                }
            }

            Ok((canonical_sql, tuples))
        })?;

        let sql = translate_placeholders(&raw_sql, self.style);
        if self.log_sql {
            debug!(sql = %sql, tuples = tuples.len(), "prepared batch sql");
        }
        let row_sets = self.executor.execute_batch(&sql, tuples).await?;
        Ok(BatchResults::from_row_sets(row_sets))
    }

    /// Execute a batch of update statements and return per-statement affected
    /// row counts, in input order.
    ///
    /// # Errors
    /// Same conditions as [`execute_batch`](Self::execute_batch).
    pub async fn execute_batch_update<'a, I>(
        &mut self,
        statements: I,
    ) -> Result<Vec<u64>, SqlBridgeError>
    where
        I: IntoIterator<Item = &'a dyn Statement>,
    {
        Ok(self.execute_batch(statements).await?.update_counts())
    }

    /// Execute a batch of queries and map every row of every result through
    /// `mapper`.
    ///
    /// # Errors
    /// Same conditions as [`execute_batch`](Self::execute_batch).
    pub async fn execute_batch_with_mapping<'a, I, T>(
        &mut self,
        statements: I,
        mut mapper: impl FnMut(&SqlRow) -> T,
    ) -> Result<Vec<Vec<T>>, SqlBridgeError>
    where
        I: IntoIterator<Item = &'a dyn Statement>,
    {
        Ok(self
            .execute_batch(statements)
            .await?
            .map(|row_set| row_set.map_rows(&mut mapper))
            .collect())
    }
}

fn batch_tuple(sets: &[ArgumentSet], sql: &str) -> Result<ArgumentTuple, SqlBridgeError> {
    match sets {
        [single] => Ok(to_argument_tuple(single)),
        [] => Err(SqlBridgeError::ValidationError(format!(
            "the prepared query of a batch statement should have arguments: {sql}"
        ))),
        many => Err(SqlBridgeError::ValidationError(format!(
            "a batch statement rendered {} argument sets where exactly one is required: {sql}",
            many.len()
        ))),
    }
}

impl<E, P> std::fmt::Debug for DatabaseClient<E, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseClient")
            .field("style", &self.style)
            .field("validate_batch", &self.validate_batch)
            .field("log_sql", &self.log_sql)
            .finish_non_exhaustive()
    }
}
