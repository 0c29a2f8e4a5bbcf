use serde::{Deserialize, Serialize};
use tokio_postgres::NoTls;

use crate::error::SqlBridgeError;

/// How to reach the server: a TCP endpoint or a unix domain socket directory
/// (peer-authenticated local connections).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionTarget {
    Tcp { host: String, port: u16 },
    UnixSocket { dir: String },
}

/// PostgreSQL connection configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PgConfig {
    pub target: ConnectionTarget,
    pub dbname: String,
    pub user: String,
    pub password: Option<String>,
}

impl PgConfig {
    /// Build a deadpool connection pool from this configuration.
    ///
    /// # Errors
    /// Returns `SqlBridgeError::ConfigError` if required fields are empty or
    /// `SqlBridgeError::ConnectionError` if pool creation fails.
    pub fn create_pool(&self) -> Result<deadpool_postgres::Pool, SqlBridgeError> {
        if self.dbname.is_empty() {
            return Err(SqlBridgeError::ConfigError("dbname is required".to_string()));
        }
        if self.user.is_empty() {
            return Err(SqlBridgeError::ConfigError("user is required".to_string()));
        }

        let mut cfg = deadpool_postgres::Config::new();
        cfg.dbname = Some(self.dbname.clone());
        cfg.user = Some(self.user.clone());
        cfg.password = self.password.clone();
        match &self.target {
            ConnectionTarget::Tcp { host, port } => {
                cfg.host = Some(host.clone());
                cfg.port = Some(*port);
            }
            ConnectionTarget::UnixSocket { dir } => {
                // tokio-postgres treats a path-shaped host as a socket directory
                cfg.host = Some(dir.clone());
            }
        }

        cfg.create_pool(Some(deadpool_postgres::Runtime::Tokio1), NoTls)
            .map_err(|e| {
                SqlBridgeError::ConnectionError(format!("Failed to create Postgres pool: {e}"))
            })
    }
}
