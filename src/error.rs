use thiserror::Error;

/// Error type shared by the preparation pipeline, executors, and transaction
/// controller.
///
/// Validation failures are raised before any driver I/O; driver errors pass
/// through unmodified and are never retried here.
#[derive(Debug, Error)]
pub enum SqlBridgeError {
    #[cfg(feature = "postgres")]
    #[error(transparent)]
    PostgresError(#[from] tokio_postgres::Error),

    #[cfg(feature = "postgres")]
    #[error(transparent)]
    PoolErrorPostgres(#[from] deadpool_postgres::PoolError),

    /// Batch shape drift, missing/multiple argument sets, or a savepoint name
    /// that fails the identifier pattern.
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// An update expected to touch exactly one row touched this many.
    #[error("update row count: {0}")]
    SingleUpdate(u64),

    /// A control statement (savepoint create/rollback-to/release) reported a
    /// non-zero row count.
    #[error("Internal assertion failed: {0}")]
    InternalAssertion(String),

    /// Failure from a non-postgres executor implementation.
    #[error("Driver error: {0}")]
    DriverError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),
}
