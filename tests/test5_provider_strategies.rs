use sql_bridge::prelude::*;

/// Statement whose text depends on session ordinals, the way generators name
/// derived tables and aliases.
struct AliasedQuery;

impl Statement for AliasedQuery {
    fn render(
        &self,
        session: &mut dyn PreparationSession,
    ) -> Result<RenderedStatement, SqlBridgeError> {
        let t = session.next_ordinal();
        let u = session.next_ordinal();
        Ok(RenderedStatement {
            sql: format!(
                "SELECT t{t}.id FROM scores t{t} JOIN players t{u} ON t{t}.player = t{u}.name \
                 WHERE t{u}.active = ?"
            ),
            argument_sets: vec![vec![(ColumnType::Bool, SqlValue::Bool(true))]],
        })
    }
}

#[test]
fn fresh_and_reused_providers_prepare_identically() -> Result<(), SqlBridgeError> {
    let mut fresh = SessionPerCall::new(LocalSessionSource);
    let mut reused = ReusedSession::from_source(&LocalSessionSource, &SessionOptions::default())?;

    for _ in 0..50 {
        let a = prepare_statement(&AliasedQuery, &mut fresh, PlaceholderStyle::Postgres)?;
        let b = prepare_statement(&AliasedQuery, &mut reused, PlaceholderStyle::Postgres)?;
        assert_eq!(a, b);
        assert_eq!(
            a.sql,
            "SELECT t1.id FROM scores t1 JOIN players t2 ON t1.player = t2.name \
             WHERE t2.active = $1"
        );
    }
    Ok(())
}

#[test]
fn reused_provider_does_not_leak_state_after_a_render_failure() {
    struct Failing;
    impl Statement for Failing {
        fn render(
            &self,
            session: &mut dyn PreparationSession,
        ) -> Result<RenderedStatement, SqlBridgeError> {
            session.next_ordinal();
            session.next_ordinal();
            session.next_ordinal();
            Err(SqlBridgeError::ValidationError("unrenderable".into()))
        }
    }

    let mut reused =
        ReusedSession::from_source(&LocalSessionSource, &SessionOptions::default()).unwrap();
    assert!(prepare_statement(&Failing, &mut reused, PlaceholderStyle::Postgres).is_err());

    let prepared =
        prepare_statement(&AliasedQuery, &mut reused, PlaceholderStyle::Postgres).unwrap();
    assert!(prepared.sql.starts_with("SELECT t1.id"));
}

#[test]
fn mssql_style_numbers_with_at_p_prefix() -> Result<(), SqlBridgeError> {
    let mut provider = SessionPerCall::new(LocalSessionSource);
    let prepared = prepare_statement(&AliasedQuery, &mut provider, PlaceholderStyle::Mssql)?;
    assert!(prepared.sql.ends_with("WHERE t2.active = @p1"));
    Ok(())
}
