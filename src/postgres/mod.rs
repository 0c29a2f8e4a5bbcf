// PostgreSQL backend - binds the preparation pipeline to tokio-postgres.
//
// - config: connection target (TCP or unix socket) and pool setup
// - params: binding SqlValue as tokio-postgres parameters
// - query: building RowSet from returned rows
// - executor: SqlExecutor/Connection implementation over a pooled connection

pub mod config;
pub mod executor;
pub mod params;
pub mod pool;
pub mod query;

pub use config::{ConnectionTarget, PgConfig};
pub use executor::PgConnection;
pub use pool::PgPool;
pub use query::build_row_set_from_rows;
