//! Convenient imports for common functionality.
//!
//! Pulls in the client, the trait seams, and the value types most callers
//! touch, so `use sql_bridge::prelude::*;` is enough to get started.

pub use crate::client::DatabaseClient;
pub use crate::error::SqlBridgeError;
pub use crate::executor::{BatchResults, Connection, SqlExecutor};
pub use crate::preparer::{PreparedSql, prepare_statement, to_argument_tuple};
pub use crate::provider::{PreparationProvider, ReusedSession, SessionPerCall};
pub use crate::results::{RowSet, SqlRow};
pub use crate::session::{
    IsolationLevel, LocalSession, LocalSessionSource, PreparationSession, SessionOptions,
    SessionSource,
};
pub use crate::statement::{QueryAndParams, RenderedStatement, Statement};
pub use crate::transactions::SavepointOutcome;
pub use crate::translation::{PlaceholderStyle, translate_placeholders};
pub use crate::types::{ArgumentSet, ArgumentTuple, ColumnType, SqlValue};

#[cfg(feature = "postgres")]
pub use crate::postgres::{ConnectionTarget, PgConfig, PgConnection, PgPool};
