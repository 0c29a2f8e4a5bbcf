use sql_bridge::prelude::*;
use sql_bridge::test_utils::{CountingSessionSource, ExecutorCall, MemoryExecutor};

type MemClient = DatabaseClient<MemoryExecutor, SessionPerCall<CountingSessionSource>>;

fn client(executor: MemoryExecutor, source: CountingSessionSource) -> MemClient {
    DatabaseClient::new(
        executor,
        SessionPerCall::new(source),
        PlaceholderStyle::Postgres,
    )
}

fn insert_score(player: &str, score: i64) -> QueryAndParams {
    QueryAndParams::new(
        "INSERT INTO scores (player, score) VALUES (?, ?)",
        vec![SqlValue::Text(player.to_string()), SqlValue::Int(score)],
    )
}

fn as_statements(stmts: &[QueryAndParams]) -> impl Iterator<Item = &dyn Statement> {
    stmts.iter().map(|s| s as &dyn Statement)
}

#[tokio::test]
async fn empty_batch_touches_neither_provider_nor_driver() -> Result<(), SqlBridgeError> {
    let executor = MemoryExecutor::new();
    let store = executor.clone();
    let source = CountingSessionSource::new();
    let sessions = source.clone();
    let mut client = client(executor, source);

    let results = client.execute_batch(as_statements(&[])).await?;
    assert_eq!(results.remaining(), 0);
    assert_eq!(sessions.opened(), 0);
    assert!(store.calls().is_empty());
    Ok(())
}

#[tokio::test]
async fn batch_runs_one_driver_call_with_one_result_per_statement() -> Result<(), SqlBridgeError> {
    let executor = MemoryExecutor::new();
    let store = executor.clone();
    let source = CountingSessionSource::new();
    let sessions = source.clone();
    let mut client = client(executor, source);

    let stmts = vec![
        insert_score("alice", 1),
        insert_score("bob", 2),
        insert_score("carol", 3),
    ];
    let counts = client.execute_batch_update(as_statements(&stmts)).await?;

    assert_eq!(counts, vec![1, 1, 1]);
    // one session for the whole batch, one prepared text for the whole batch
    assert_eq!(sessions.opened(), 1);
    assert_eq!(
        store.calls(),
        vec![ExecutorCall::ExecuteBatch {
            sql: "INSERT INTO scores (player, score) VALUES ($1, $2)".to_string(),
            tuples: 3,
        }]
    );
    assert_eq!(store.row_count(), 3);
    assert_eq!(
        store.rows()[2],
        vec![SqlValue::Text("carol".into()), SqlValue::Int(3)]
    );
    Ok(())
}

#[tokio::test]
async fn batch_validation_rejects_text_drift_naming_both_texts() {
    let executor = MemoryExecutor::new();
    let store = executor.clone();
    let mut client = client(executor, CountingSessionSource::new());

    let stmts = vec![
        insert_score("alice", 1),
        QueryAndParams::new(
            "INSERT INTO other (player) VALUES (?)",
            vec![SqlValue::Text("bob".into())],
        ),
    ];
    let err = client
        .execute_batch(as_statements(&stmts))
        .await
        .unwrap_err();

    let SqlBridgeError::ValidationError(msg) = err else {
        panic!("expected a validation error, got {err:?}");
    };
    assert!(msg.contains("INSERT INTO scores (player, score) VALUES (?, ?)"));
    assert!(msg.contains("INSERT INTO other (player) VALUES (?)"));
    // nothing reached the driver
    assert!(store.calls().is_empty());
}

#[tokio::test]
async fn unvalidated_batch_runs_every_tuple_on_the_canonical_text()
-> Result<(), SqlBridgeError> {
    let executor = MemoryExecutor::new();
    let store = executor.clone();
    let mut client =
        client(executor, CountingSessionSource::new()).with_validate_batch(false);

    // drifting text is never rendered, only its arguments are taken
    let stmts = vec![
        insert_score("alice", 1),
        QueryAndParams::new(
            "INSERT INTO other (player, score) VALUES (?, ?)",
            vec![SqlValue::Text("bob".into()), SqlValue::Int(2)],
        ),
    ];
    let counts = client.execute_batch_update(as_statements(&stmts)).await?;

    assert_eq!(counts, vec![1, 1]);
    assert_eq!(
        store.calls(),
        vec![ExecutorCall::ExecuteBatch {
            sql: "INSERT INTO scores (player, score) VALUES ($1, $2)".to_string(),
            tuples: 2,
        }]
    );
    Ok(())
}

#[tokio::test]
async fn batch_statement_without_arguments_is_rejected() {
    let executor = MemoryExecutor::new();
    let mut client = client(executor, CountingSessionSource::new());

    let stmts = vec![QueryAndParams::new_without_params(
        "INSERT INTO scores DEFAULT VALUES",
    )];
    let err = client
        .execute_batch(as_statements(&stmts))
        .await
        .unwrap_err();
    let SqlBridgeError::ValidationError(msg) = err else {
        panic!("expected a validation error, got {err:?}");
    };
    assert!(msg.contains("should have arguments"));
}

#[tokio::test]
async fn batch_with_mapping_keeps_per_statement_grouping() -> Result<(), SqlBridgeError> {
    let executor = MemoryExecutor::new();
    let mut client = client(executor, CountingSessionSource::new());

    client
        .execute(&insert_score("alice", 1))
        .await?;

    let queries = vec![
        QueryAndParams::new("SELECT COUNT(*) FROM scores WHERE score > ?", vec![
            SqlValue::Int(0),
        ]),
        QueryAndParams::new("SELECT COUNT(*) FROM scores WHERE score > ?", vec![
            SqlValue::Int(100),
        ]),
    ];
    let grouped = client
        .execute_batch_with_mapping(as_statements(&queries), |row| {
            row.get("cnt").and_then(|v| v.as_int()).copied()
        })
        .await?;

    // the in-memory count ignores the predicate; grouping is what matters
    assert_eq!(grouped, vec![vec![Some(1)], vec![Some(1)]]);
    Ok(())
}
