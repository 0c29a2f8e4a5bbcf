use futures_util::future::BoxFuture;
use lazy_static::lazy_static;
use regex::Regex;

use crate::client::DatabaseClient;
use crate::error::SqlBridgeError;
use crate::executor::Connection;
use crate::provider::PreparationProvider;

lazy_static! {
    // ASCII word characters only; savepoint names are interpolated into SQL
    // text because they cannot be bound as ordinary parameters.
    static ref SAVEPOINT_NAME_RE: Regex = Regex::new("^[0-9A-Za-z_]+$").expect("valid regex");
}

/// Caller-chosen outcome of a savepoint body: release the savepoint or roll
/// back to it, without raising an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SavepointOutcome<R, C> {
    /// Roll back to the savepoint and keep the payload.
    RollbackTo(R),
    /// Release the savepoint and keep the payload.
    Release(C),
}

fn validate_savepoint_name(name: &str) -> Result<(), SqlBridgeError> {
    if SAVEPOINT_NAME_RE.is_match(name) {
        Ok(())
    } else {
        Err(SqlBridgeError::ValidationError(format!(
            "savepoint name must match ^[0-9A-Za-z_]+$, got {name:?}"
        )))
    }
}

impl<E, P> DatabaseClient<E, P>
where
    E: Connection,
    P: PreparationProvider + Send,
{
    /// Run `body` inside a transaction on this client's connection.
    ///
    /// On body success the transaction commits; on body error it rolls back
    /// and the body's error propagates. A rollback failure supersedes the
    /// body's error. Dropping the returned future mid-flight cannot run the
    /// async rollback; the driver or pool clears the abandoned transaction
    /// when the connection is next reused.
    ///
    /// # Errors
    /// Returns the body's error, or a begin/commit/rollback driver error.
    pub async fn with_transaction<T, F>(&mut self, body: F) -> Result<T, SqlBridgeError>
    where
        F: for<'a> FnOnce(&'a mut Self) -> BoxFuture<'a, Result<T, SqlBridgeError>>,
    {
        self.executor.begin().await?;
        match body(self).await {
            Ok(value) => {
                self.executor.commit().await?;
                Ok(value)
            }
            Err(e) => {
                self.executor.rollback().await?;
                Err(e)
            }
        }
    }

    /// Run `body` inside a transaction, letting the body choose commit or
    /// rollback without raising: `Some` commits, `None` rolls back.
    ///
    /// # Errors
    /// Returns the body's error, or a begin/commit/rollback driver error.
    pub async fn with_transaction_commit_or_rollback<T, F>(
        &mut self,
        body: F,
    ) -> Result<Option<T>, SqlBridgeError>
    where
        F: for<'a> FnOnce(&'a mut Self) -> BoxFuture<'a, Result<Option<T>, SqlBridgeError>>,
    {
        self.executor.begin().await?;
        match body(self).await {
            Ok(Some(value)) => {
                self.executor.commit().await?;
                Ok(Some(value))
            }
            Ok(None) => {
                self.executor.rollback().await?;
                Ok(None)
            }
            Err(e) => {
                self.executor.rollback().await?;
                Err(e)
            }
        }
    }

    /// Run `body` under a named savepoint. Must already be inside an open
    /// transaction. On body success the savepoint is released; on body error
    /// execution rolls back to the savepoint and the error propagates.
    ///
    /// A savepoint destroys an earlier one with the same name; avoiding name
    /// collisions within one transaction is the caller's responsibility.
    ///
    /// # Errors
    /// Returns a `ValidationError` for a name outside `^\w+$`, the body's
    /// error, or a driver error from the savepoint statements.
    pub async fn with_savepoint<T, F>(
        &mut self,
        savepoint_name: &str,
        body: F,
    ) -> Result<T, SqlBridgeError>
    where
        F: for<'a> FnOnce(&'a mut Self) -> BoxFuture<'a, Result<T, SqlBridgeError>>,
    {
        validate_savepoint_name(savepoint_name)?;
        self.savepoint(savepoint_name).await?;

        match body(self).await {
            Ok(value) => {
                self.release_savepoint(savepoint_name).await?;
                Ok(value)
            }
            Err(e) => {
                self.rollback_to_savepoint(savepoint_name).await?;
                Err(e)
            }
        }
    }

    /// Run `body` under a named savepoint, letting the body choose release or
    /// rollback-to without raising an error.
    ///
    /// # Errors
    /// Returns a `ValidationError` for a name outside `^\w+$`, the body's
    /// error, or a driver error from the savepoint statements.
    pub async fn with_savepoint_outcome<R, C, F>(
        &mut self,
        savepoint_name: &str,
        body: F,
    ) -> Result<SavepointOutcome<R, C>, SqlBridgeError>
    where
        F: for<'a> FnOnce(
            &'a mut Self,
        ) -> BoxFuture<'a, Result<SavepointOutcome<R, C>, SqlBridgeError>>,
    {
        validate_savepoint_name(savepoint_name)?;
        self.savepoint(savepoint_name).await?;

        match body(self).await {
            Ok(outcome) => {
                match &outcome {
                    SavepointOutcome::RollbackTo(_) => {
                        self.rollback_to_savepoint(savepoint_name).await?;
                    }
                    SavepointOutcome::Release(_) => {
                        self.release_savepoint(savepoint_name).await?;
                    }
                }
                Ok(outcome)
            }
            Err(e) => {
                self.rollback_to_savepoint(savepoint_name).await?;
                Err(e)
            }
        }
    }

    /// `Option` sugar over [`with_savepoint_outcome`](Self::with_savepoint_outcome):
    /// `Some` releases, `None` rolls back to the savepoint.
    ///
    /// # Errors
    /// Same conditions as [`with_savepoint_outcome`](Self::with_savepoint_outcome).
    pub async fn with_savepoint_or_none<T, F>(
        &mut self,
        savepoint_name: &str,
        body: F,
    ) -> Result<Option<T>, SqlBridgeError>
    where
        F: for<'a> FnOnce(&'a mut Self) -> BoxFuture<'a, Result<Option<T>, SqlBridgeError>>,
    {
        validate_savepoint_name(savepoint_name)?;
        self.savepoint(savepoint_name).await?;

        match body(self).await {
            Ok(Some(value)) => {
                self.release_savepoint(savepoint_name).await?;
                Ok(Some(value))
            }
            Ok(None) => {
                self.rollback_to_savepoint(savepoint_name).await?;
                Ok(None)
            }
            Err(e) => {
                self.rollback_to_savepoint(savepoint_name).await?;
                Err(e)
            }
        }
    }

    async fn savepoint(&mut self, savepoint_name: &str) -> Result<(), SqlBridgeError> {
        self.control_statement(&format!("SAVEPOINT \"{savepoint_name}\""))
            .await
    }

    async fn rollback_to_savepoint(&mut self, savepoint_name: &str) -> Result<(), SqlBridgeError> {
        self.control_statement(&format!("ROLLBACK TO SAVEPOINT \"{savepoint_name}\""))
            .await
    }

    async fn release_savepoint(&mut self, savepoint_name: &str) -> Result<(), SqlBridgeError> {
        self.control_statement(&format!("RELEASE SAVEPOINT \"{savepoint_name}\""))
            .await
    }

    // A savepoint control statement never touches rows; a non-zero count
    // means the controller and driver disagree about what just ran.
    async fn control_statement(&mut self, sql: &str) -> Result<(), SqlBridgeError> {
        let rows_affected = self.execute_plain_sql_update(sql).await?;
        if rows_affected == 0 {
            Ok(())
        } else {
            Err(SqlBridgeError::InternalAssertion(format!(
                "control statement {sql:?} reported {rows_affected} affected rows"
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_word_savepoint_names() {
        for name in ["sp1", "retry_point", "S", "_x", "0"] {
            assert!(validate_savepoint_name(name).is_ok(), "{name}");
        }
    }

    #[test]
    fn rejects_injectable_savepoint_names() {
        for name in ["", "sp 1", "sp\"; DROP TABLE t; --", "sp-1", "sp;"] {
            assert!(
                matches!(
                    validate_savepoint_name(name),
                    Err(SqlBridgeError::ValidationError(_))
                ),
                "{name}"
            );
        }
    }
}
