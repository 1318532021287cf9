use std::sync::Arc;

use d1_middleware::prelude::*;
use serde_json::json;

fn runner_with(stub: &Arc<StubDatabase>) -> D1QueryRunner {
    let driver = D1Driver::new(D1ConnectionOptions::new(stub.clone())).unwrap();
    driver.create_query_runner().unwrap()
}

#[tokio::test]
async fn select_returns_bare_rows() {
    let stub = Arc::new(StubDatabase::new());
    stub.queue_result(D1Result::ok_with_rows(vec![json!({"id": 1, "name": "a"})]));
    let mut runner = runner_with(&stub);

    let value = runner.query("SELECT * FROM t", &[]).await.unwrap();
    assert_eq!(value, QueryValue::Rows(vec![json!({"id": 1, "name": "a"})]));

    // Select-like statements go through `all`.
    assert_eq!(stub.calls()[0].method, "all");
}

#[tokio::test]
async fn select_structured_wraps_rows() {
    let stub = Arc::new(StubDatabase::new());
    stub.queue_result(D1Result::ok_with_rows(vec![json!({"id": 1, "name": "a"})]));
    let mut runner = runner_with(&stub);

    let result = runner.query_structured("SELECT * FROM t", &[]).await.unwrap();
    assert_eq!(result.raw, json!([{"id": 1, "name": "a"}]));
    assert_eq!(result.records, vec![json!({"id": 1, "name": "a"})]);
    assert_eq!(result.affected, 0);
}

#[tokio::test]
async fn insert_returns_last_row_id() {
    let stub = Arc::new(StubDatabase::new());
    stub.queue_result(D1Result::ok_write(Some(7), 1));
    let mut runner = runner_with(&stub);

    let value = runner
        .query("INSERT INTO t (name) VALUES (?)", &[BindValue::Text("a".into())])
        .await
        .unwrap();
    assert_eq!(value, QueryValue::InsertId(Some(7)));

    // Inserts go through `run`.
    assert_eq!(stub.calls()[0].method, "run");
}

#[tokio::test]
async fn insert_structured_carries_id_and_affected() {
    let stub = Arc::new(StubDatabase::new());
    stub.queue_result(D1Result::ok_write(Some(7), 1));
    let mut runner = runner_with(&stub);

    let result = runner
        .query_structured("INSERT INTO t (name) VALUES (?)", &[BindValue::Text("a".into())])
        .await
        .unwrap();
    assert_eq!(result.raw, json!(7));
    assert!(result.records.is_empty());
    assert_eq!(result.affected, 1);
}

#[tokio::test]
async fn generic_mutations_return_nothing() {
    let stub = Arc::new(StubDatabase::new());
    stub.queue_result(D1Result::ok_write(None, 3));
    let mut runner = runner_with(&stub);

    let value = runner.query("UPDATE t SET a = 1", &[]).await.unwrap();
    assert_eq!(value, QueryValue::None);
}

#[tokio::test]
async fn unset_parameters_are_submitted_as_null() {
    let stub = Arc::new(StubDatabase::new());
    let mut runner = runner_with(&stub);

    runner
        .query(
            "INSERT INTO t (a, b, c) VALUES (?, ?, ?)",
            &[
                BindValue::Integer(1),
                BindValue::Unset,
                BindValue::Text("x".into()),
            ],
        )
        .await
        .unwrap();

    let calls = stub.calls();
    assert_eq!(calls[0].params, vec![json!(1), json!(null), json!("x")]);
}

#[tokio::test]
async fn failed_envelope_becomes_a_classified_query_error() {
    let stub = Arc::new(StubDatabase::new());
    stub.queue_result(D1Result::failed("UNIQUE constraint failed: users.email"));
    let mut runner = runner_with(&stub);

    let err = runner
        .query("INSERT INTO users (email) VALUES (?)", &[BindValue::Text("a@b".into())])
        .await
        .unwrap_err();
    assert_eq!(err.code(), Some(ErrorCode::UniqueConstraint));
    assert!(err.to_string().contains("INSERT INTO users"));
}

#[tokio::test]
async fn thrown_handle_error_becomes_the_same_error_shape() {
    let stub = Arc::new(StubDatabase::new());
    stub.queue_error(
        HandleError::new("D1_EXEC_ERROR")
            .with_cause(HandleError::new("FOREIGN KEY constraint failed")),
    );
    let mut runner = runner_with(&stub);

    let err = runner.query("DELETE FROM parents", &[]).await.unwrap_err();
    assert_eq!(err.code(), Some(ErrorCode::ForeignKeyConstraint));
    assert!(err.to_string().contains("FOREIGN KEY constraint failed"));
}

#[tokio::test]
async fn released_runner_refuses_to_execute() {
    let stub = Arc::new(StubDatabase::new());
    let mut runner = runner_with(&stub);
    runner.release();

    let err = runner.query("SELECT 1", &[]).await.unwrap_err();
    assert!(matches!(err, D1MiddlewareError::ConnectionError(_)));
    assert!(stub.calls().is_empty());
}
