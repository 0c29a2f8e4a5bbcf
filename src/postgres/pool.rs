use deadpool_postgres::Pool;

use super::config::PgConfig;
use super::executor::PgConnection;
use crate::error::SqlBridgeError;

/// Connection pool handing out exclusive per-call-chain [`PgConnection`]s.
///
/// The pool is the only component that may share a physical connection across
/// time; a checked-out connection belongs to exactly one call chain until it
/// is dropped back.
#[derive(Clone)]
pub struct PgPool {
    pool: Pool,
}

impl PgPool {
    /// Create a pool from a configuration.
    ///
    /// # Errors
    /// Returns `SqlBridgeError::ConfigError` or
    /// `SqlBridgeError::ConnectionError` if the pool cannot be built.
    pub fn new(config: &PgConfig) -> Result<Self, SqlBridgeError> {
        Ok(Self {
            pool: config.create_pool()?,
        })
    }

    /// Check out one exclusive connection.
    ///
    /// # Errors
    /// Returns `SqlBridgeError::PoolErrorPostgres` if checkout fails.
    pub async fn get_connection(&self) -> Result<PgConnection, SqlBridgeError> {
        let conn = self.pool.get().await?;
        Ok(PgConnection::new(conn))
    }
}

impl std::fmt::Debug for PgPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgPool")
            .field("status", &self.pool.status())
            .finish()
    }
}
