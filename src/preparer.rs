use crate::error::SqlBridgeError;
use crate::provider::PreparationProvider;
use crate::statement::{RenderedStatement, Statement};
use crate::translation::{PlaceholderStyle, translate_placeholders};
use crate::types::{ArgumentSet, ArgumentTuple, SqlValue};

/// A statement ready for the executor: translated SQL text plus its bound
/// tuple. `args` is `None` for a zero-parameter statement, which some
/// executors treat differently from an empty tuple.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedSql {
    pub sql: String,
    pub args: Option<ArgumentTuple>,
}

/// Convert one typed argument set into a driver-agnostic ordered tuple.
///
/// Coercions: `EntityId` wrappers unwrap to their inner scalar (recursively),
/// arrays pass through as the driver-native array representation, everything
/// else is unchanged. Input order is preserved exactly; it is positionally
/// bound to the translated SQL's marker sequence.
#[must_use]
pub fn to_argument_tuple(args: &ArgumentSet) -> ArgumentTuple {
    args.iter().map(|(_, v)| coerce_value(v.clone())).collect()
}

fn coerce_value(value: SqlValue) -> SqlValue {
    match value {
        SqlValue::EntityId(inner) => coerce_value(*inner),
        other => other,
    }
}

/// Turn one statement into `(sql, tuple)` inside a single provider session.
///
/// Text and arguments come from the same render pass; a second render is not
/// guaranteed to number generated names identically.
///
/// # Errors
/// Returns a `ValidationError` if the statement renders more than one
/// argument set, or any render/session error.
pub fn prepare_statement<P: PreparationProvider>(
    statement: &dyn Statement,
    provider: &mut P,
    style: PlaceholderStyle,
) -> Result<PreparedSql, SqlBridgeError> {
    let rendered = provider.with_preparation_session(|session| statement.render(session))?;
    let args = single_argument_tuple(&rendered)?;
    let sql = translate_placeholders(&rendered.sql, style).into_owned();
    Ok(PreparedSql { sql, args })
}

pub(crate) fn single_argument_tuple(
    rendered: &RenderedStatement,
) -> Result<Option<ArgumentTuple>, SqlBridgeError> {
    match rendered.argument_sets.as_slice() {
        [] => Ok(None),
        [single] => Ok(Some(to_argument_tuple(single))),
        many => Err(SqlBridgeError::ValidationError(format!(
            "statement rendered {} argument sets where exactly one is required: {}",
            many.len(),
            rendered.sql
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::SessionPerCall;
    use crate::session::LocalSessionSource;
    use crate::statement::QueryAndParams;
    use crate::types::ColumnType;

    #[test]
    fn entity_ids_unwrap_to_their_scalar() {
        let args: ArgumentSet = vec![
            (
                ColumnType::EntityId,
                SqlValue::EntityId(Box::new(SqlValue::Int(42))),
            ),
            (ColumnType::Text, SqlValue::Text("x".into())),
        ];
        let tuple = to_argument_tuple(&args);
        assert_eq!(tuple, vec![SqlValue::Int(42), SqlValue::Text("x".into())]);
    }

    #[test]
    fn nested_entity_ids_unwrap_recursively() {
        let args: ArgumentSet = vec![(
            ColumnType::EntityId,
            SqlValue::EntityId(Box::new(SqlValue::EntityId(Box::new(SqlValue::Int(7))))),
        )];
        assert_eq!(to_argument_tuple(&args), vec![SqlValue::Int(7)]);
    }

    #[test]
    fn arrays_pass_through_unchanged() {
        let array = SqlValue::Array(vec![SqlValue::Int(1), SqlValue::Int(2)]);
        let args: ArgumentSet = vec![(ColumnType::Array, array.clone())];
        assert_eq!(to_argument_tuple(&args), vec![array]);
    }

    #[test]
    fn tuple_preserves_input_order() {
        let args: ArgumentSet = vec![
            (ColumnType::BigInt, SqlValue::Int(1)),
            (ColumnType::Text, SqlValue::Text("b".into())),
            (ColumnType::Bool, SqlValue::Bool(true)),
        ];
        let tuple = to_argument_tuple(&args);
        assert_eq!(
            tuple,
            vec![
                SqlValue::Int(1),
                SqlValue::Text("b".into()),
                SqlValue::Bool(true)
            ]
        );
    }

    #[test]
    fn prepare_translates_and_extracts_in_one_pass() {
        let stmt = QueryAndParams::new(
            "insert into t (a, b) values (?, ?)",
            vec![SqlValue::Int(1), SqlValue::Text("x".into())],
        );
        let mut provider = SessionPerCall::new(LocalSessionSource);
        let prepared =
            prepare_statement(&stmt, &mut provider, PlaceholderStyle::Postgres).unwrap();
        assert_eq!(prepared.sql, "insert into t (a, b) values ($1, $2)");
        assert_eq!(
            prepared.args,
            Some(vec![SqlValue::Int(1), SqlValue::Text("x".into())])
        );
    }

    #[test]
    fn zero_parameter_statement_prepares_without_a_tuple() {
        let stmt = QueryAndParams::new_without_params("select count(*) from t");
        let mut provider = SessionPerCall::new(LocalSessionSource);
        let prepared =
            prepare_statement(&stmt, &mut provider, PlaceholderStyle::Postgres).unwrap();
        assert_eq!(prepared.args, None);
    }

    #[test]
    fn multiple_argument_sets_are_rejected() {
        let rendered = RenderedStatement {
            sql: "insert into t values (?)".into(),
            argument_sets: vec![
                vec![(ColumnType::BigInt, SqlValue::Int(1))],
                vec![(ColumnType::BigInt, SqlValue::Int(2))],
            ],
        };
        assert!(matches!(
            single_argument_tuple(&rendered),
            Err(SqlBridgeError::ValidationError(_))
        ));
    }
}
