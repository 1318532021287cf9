use std::sync::Arc;

use d1_middleware::prelude::*;

fn runner_with(stub: &Arc<StubDatabase>) -> D1QueryRunner {
    let driver = D1Driver::new(D1ConnectionOptions::new(stub.clone())).unwrap();
    driver.create_query_runner().unwrap()
}

#[test]
fn start_twice_fails() {
    let stub = Arc::new(StubDatabase::new());
    let mut runner = runner_with(&stub);

    runner.start_transaction().unwrap();
    let err = runner.start_transaction().unwrap_err();
    assert!(matches!(err, D1MiddlewareError::TransactionError(_)));
}

#[test]
fn commit_and_rollback_require_an_active_transaction() {
    let stub = Arc::new(StubDatabase::new());
    let mut runner = runner_with(&stub);

    assert!(matches!(
        runner.commit_transaction(),
        Err(D1MiddlewareError::TransactionError(_))
    ));
    assert!(matches!(
        runner.rollback_transaction(),
        Err(D1MiddlewareError::TransactionError(_))
    ));
}

#[tokio::test]
async fn statements_execute_immediately_inside_a_transaction() {
    let stub = Arc::new(StubDatabase::new());
    let mut runner = runner_with(&stub);

    runner.start_transaction().unwrap();
    runner
        .query("INSERT INTO t (a) VALUES (?)", &[BindValue::Integer(1)])
        .await
        .unwrap();

    // The statement hit the handle before any commit.
    assert_eq!(stub.executed_sql(), vec!["INSERT INTO t (a) VALUES (?)".to_string()]);
    assert_eq!(
        runner.tracked_statements(),
        ["INSERT INTO t (a) VALUES (?)".to_string()]
    );
    assert_eq!(runner.tracked_params(), [vec![BindValue::Integer(1)]]);
}

#[tokio::test]
async fn commit_only_clears_bookkeeping() {
    let stub = Arc::new(StubDatabase::new());
    let mut runner = runner_with(&stub);

    runner.start_transaction().unwrap();
    runner.query("DELETE FROM t", &[]).await.unwrap();
    runner.commit_transaction().unwrap();

    assert!(!runner.is_transaction_active());
    assert!(runner.tracked_statements().is_empty());
    // Nothing was replayed or batched at commit time.
    assert_eq!(stub.executed_sql().len(), 1);
}

#[tokio::test]
async fn rollback_undoes_nothing() {
    let stub = Arc::new(StubDatabase::new());
    let mut runner = runner_with(&stub);

    runner.start_transaction().unwrap();
    runner.query("DELETE FROM t", &[]).await.unwrap();
    runner.rollback_transaction().unwrap();

    // The delete already ran; rollback is cleanup only.
    assert_eq!(stub.executed_sql(), vec!["DELETE FROM t".to_string()]);
    assert!(!runner.is_transaction_active());
    assert!(runner.tracked_statements().is_empty());
}

#[tokio::test]
async fn statements_outside_a_transaction_are_not_tracked() {
    let stub = Arc::new(StubDatabase::new());
    let mut runner = runner_with(&stub);

    runner.query("DELETE FROM t", &[]).await.unwrap();
    assert!(runner.tracked_statements().is_empty());
}

#[test]
fn release_ends_the_transaction_and_the_runner() {
    let stub = Arc::new(StubDatabase::new());
    let mut runner = runner_with(&stub);

    runner.start_transaction().unwrap();
    runner.release();

    assert!(runner.is_released());
    assert!(!runner.is_transaction_active());
    assert!(matches!(
        runner.start_transaction(),
        Err(D1MiddlewareError::ConnectionError(_))
    ));
}
