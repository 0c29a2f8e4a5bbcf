use crate::error::SqlBridgeError;
use crate::session::PreparationSession;
use crate::types::{ArgumentSet, ColumnType, SqlValue};

/// Output of one render pass: the SQL text with `?` markers and the typed
/// argument sets that bind to them, in marker order.
///
/// Zero sets means a no-argument statement. More than one set only occurs on
/// batch-native generator paths; the single-statement preparer rejects it.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedStatement {
    pub sql: String,
    pub argument_sets: Vec<ArgumentSet>,
}

/// A statement produced by an external SQL-generating layer.
///
/// Rendering may consume session ordinals for generated names, so two render
/// calls against the same session are not guaranteed to produce identically
/// numbered text. The preparer therefore reads SQL text and arguments from a
/// single [`render`](Self::render) call.
///
/// Statements are value objects held across executor awaits, so trait objects
/// must be shareable between threads.
pub trait Statement: Send + Sync {
    /// Render the statement against the given session.
    ///
    /// # Errors
    /// Returns an error if the statement cannot be rendered.
    fn render(&self, session: &mut dyn PreparationSession)
    -> Result<RenderedStatement, SqlBridgeError>;

    /// Extract only the argument sets, for batch callers that skip text
    /// validation. The default renders and discards the text; generators that
    /// can produce arguments without a text render should override this.
    ///
    /// # Errors
    /// Returns an error if the statement cannot be rendered.
    fn arguments(
        &self,
        session: &mut dyn PreparationSession,
    ) -> Result<Vec<ArgumentSet>, SqlBridgeError> {
        Ok(self.render(session)?.argument_sets)
    }
}

/// A raw SQL template with `?` markers and its parameter values.
///
/// The crate's built-in [`Statement`] for callers without a typed statement
/// generator:
/// ```rust
/// use sql_bridge::prelude::*;
///
/// let stmt = QueryAndParams::new(
///     "INSERT INTO scores (player, score) VALUES (?, ?)",
///     vec![SqlValue::Text("alice".into()), SqlValue::Int(42)],
/// );
/// # let _ = stmt;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct QueryAndParams {
    pub query: String,
    pub params: Vec<SqlValue>,
}

impl QueryAndParams {
    #[must_use]
    pub fn new(query: impl Into<String>, params: Vec<SqlValue>) -> Self {
        Self {
            query: query.into(),
            params,
        }
    }

    /// Convenience constructor for a statement without parameters.
    #[must_use]
    pub fn new_without_params(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            params: Vec::new(),
        }
    }
}

impl Statement for QueryAndParams {
    fn render(
        &self,
        _session: &mut dyn PreparationSession,
    ) -> Result<RenderedStatement, SqlBridgeError> {
        let argument_sets = if self.params.is_empty() {
            Vec::new()
        } else {
            vec![
                self.params
                    .iter()
                    .map(|v| (ColumnType::of(v), v.clone()))
                    .collect(),
            ]
        };
        Ok(RenderedStatement {
            sql: self.query.clone(),
            argument_sets,
        })
    }
}
