//! Bridge between a SQL-generating layer and an asynchronous executing layer.
//!
//! The generating side hands over statements that render themselves into
//! `?`-placeholder SQL plus typed argument sets; this crate translates the
//! placeholders into the executor's native style, extracts the bound argument
//! tuples, and drives single, batch, transactional, and savepoint execution
//! through a driver-agnostic [`SqlExecutor`]/[`Connection`] seam.

pub mod client;
pub mod error;
pub mod executor;
pub mod preparer;
pub mod prelude;
pub mod provider;
pub mod results;
pub mod session;
pub mod statement;
pub mod transactions;
pub mod translation;
pub mod types;

#[cfg(feature = "postgres")]
pub mod postgres;

#[cfg(feature = "test-utils")]
pub mod test_utils;

pub use client::DatabaseClient;
pub use error::SqlBridgeError;
pub use executor::{BatchResults, Connection, SqlExecutor};
pub use preparer::{PreparedSql, prepare_statement, to_argument_tuple};
pub use provider::{PreparationProvider, ReusedSession, SessionPerCall};
pub use results::{RowSet, SqlRow};
pub use session::{
    IsolationLevel, LocalSession, LocalSessionSource, PreparationSession, SessionOptions,
    SessionSource,
};
pub use statement::{QueryAndParams, RenderedStatement, Statement};
pub use transactions::SavepointOutcome;
pub use translation::{PlaceholderStyle, translate_placeholders};
pub use types::{ArgumentSet, ArgumentTuple, ColumnType, SqlValue};
