//! Blocking Transaction Tests
//!
//! Close dispatch, commit-to-rollback fallback, release-once and statement
//! results on [`ExplicitTransaction`].

use crate::*;

// =============================================================================
// CLOSE DISPATCH
// =============================================================================

#[test]
fn test_close_commits_when_marked_success() {
    let connection = MockConnection::new();
    let resources = RecordingResources::new();
    let tx = begin(&connection, &resources);

    tx.run("CREATE (n)", Params::new()).unwrap();
    tx.success();
    tx.close().unwrap();

    assert_eq!(
        connection.sent(),
        vec![
            "RUN BEGIN",
            "PULL_ALL",
            "RUN CREATE (n)",
            "PULL_ALL",
            "RUN COMMIT",
            "PULL_ALL"
        ]
    );
    assert_eq!(tx.state(), TransactionState::Committed);
    assert_eq!(connection.releases(), 1);
    assert_eq!(resources.closed(), vec![tx.id()]);
}

#[test]
fn test_close_rolls_back_when_active() {
    let (tx, connection, resources) = transaction_in(TransactionState::Active);

    tx.close().unwrap();

    assert_eq!(connection.sent(), vec!["RUN ROLLBACK", "PULL_ALL"]);
    assert_eq!(tx.state(), TransactionState::RolledBack);
    assert_eq!(resources.closed_count(), 1);
}

#[test]
fn test_close_rolls_back_when_marked_failed() {
    let (tx, connection, _resources) = transaction_in(TransactionState::MarkedFailed);

    tx.close().unwrap();

    assert_eq!(connection.sent(), vec!["RUN ROLLBACK", "PULL_ALL"]);
    assert_eq!(tx.state(), TransactionState::RolledBack);
}

#[test]
fn test_close_failed_sends_nothing() {
    let (tx, connection, resources) = transaction_in(TransactionState::Failed);

    tx.close().unwrap();

    assert!(connection.sent().is_empty());
    assert_eq!(tx.state(), TransactionState::RolledBack);
    assert_eq!(connection.releases(), 1);
    assert_eq!(resources.closed_count(), 1);
}

#[test]
fn test_close_twice_sends_and_notifies_once() {
    let (tx, connection, resources) = transaction_in(TransactionState::MarkedSuccess);

    tx.close().unwrap();
    let after_first = connection.sent();
    tx.close().unwrap();

    assert_eq!(connection.sent(), after_first);
    assert_eq!(connection.releases(), 1);
    assert_eq!(resources.closed_count(), 1);
}

#[test]
fn test_close_on_disconnected_connection_finalizes_locally() {
    for state in [
        TransactionState::Active,
        TransactionState::MarkedFailed,
        TransactionState::Failed,
    ] {
        let (tx, connection, resources) = transaction_in(state);
        connection.disconnect();

        tx.close().unwrap();

        assert!(connection.sent().is_empty(), "{}", state);
        assert_eq!(tx.state(), TransactionState::RolledBack);
        assert_eq!(connection.releases(), 1);
        assert_eq!(resources.closed_count(), 1);
    }
}

#[test]
fn test_close_on_disconnected_connection_fails_pending_commit() {
    let (tx, connection, resources) = transaction_in(TransactionState::MarkedSuccess);
    connection.disconnect();

    let err = tx.close().unwrap_err();

    assert!(matches!(err, Error::Connection(_)));
    assert!(connection.sent().is_empty());
    assert_eq!(tx.state(), TransactionState::RolledBack);
    assert_eq!(connection.releases(), 1);
    assert_eq!(resources.closed_count(), 1);
}

#[test]
fn test_commit_on_disconnected_connection_is_not_reported_as_success() {
    let (tx, connection, resources) = transaction_in(TransactionState::Active);
    connection.disconnect();
    let id = tx.id();

    assert!(tx.commit().is_err());

    assert_eq!(connection.count("RUN COMMIT"), 0);
    assert_eq!(connection.releases(), 1);
    assert_eq!(resources.closed(), vec![id]);
}

// =============================================================================
// COMMIT FALLBACK
// =============================================================================

#[test]
fn test_commit_failure_falls_back_to_rollback() {
    let (tx, connection, resources) = transaction_in(TransactionState::MarkedSuccess);
    connection.fail_statement("COMMIT", commit_error());

    let err = tx.close().unwrap_err();

    assert_eq!(err, commit_error());
    assert_eq!(
        connection.sent(),
        vec!["RUN COMMIT", "PULL_ALL", "RUN ROLLBACK", "PULL_ALL"]
    );
    assert_eq!(tx.state(), TransactionState::RolledBack);
    assert_eq!(connection.releases(), 1);
    assert_eq!(resources.closed_count(), 1);
}

#[test]
fn test_rollback_failure_after_commit_failure_is_swallowed() {
    let (tx, connection, _resources) = transaction_in(TransactionState::MarkedSuccess);
    connection.fail_statement("COMMIT", commit_error());
    connection.fail_statement("ROLLBACK", broken_pipe());

    let err = tx.close().unwrap_err();

    assert_eq!(err, commit_error());
    assert_eq!(connection.count("RUN ROLLBACK"), 1);
    assert_eq!(tx.state(), TransactionState::RolledBack);
    assert_eq!(connection.releases(), 1);
}

#[test]
fn test_rollback_failure_still_releases() {
    let (tx, connection, resources) = transaction_in(TransactionState::Active);
    connection.fail_statement("ROLLBACK", broken_pipe());

    assert_eq!(tx.close().unwrap_err(), broken_pipe());
    assert_eq!(tx.state(), TransactionState::RolledBack);
    assert_eq!(connection.releases(), 1);
    assert_eq!(resources.closed_count(), 1);
}

#[test]
fn test_pending_statement_failure_fails_commit() {
    let connection = MockConnection::new();
    let resources = RecordingResources::new();
    let tx = begin(&connection, &resources);
    connection.fail_statement("CREATE (n", syntax_error());

    tx.run("CREATE (n", Params::new()).unwrap();
    tx.success();
    let err = tx.close().unwrap_err();

    assert_eq!(err, syntax_error());
    assert_eq!(connection.count("RUN ROLLBACK"), 1);
    assert_eq!(tx.state(), TransactionState::RolledBack);
}

// =============================================================================
// CONSUMING CLOSE AND DROP
// =============================================================================

#[test]
fn test_commit_consumes_transaction() {
    let connection = MockConnection::new();
    let resources = RecordingResources::new();
    let tx = begin(&connection, &resources);
    let id = tx.id();

    tx.run("CREATE (n)", Params::new()).unwrap();
    tx.commit().unwrap();

    assert_eq!(connection.count("RUN COMMIT"), 1);
    assert_eq!(connection.releases(), 1);
    assert_eq!(resources.closed(), vec![id]);
}

#[test]
fn test_rollback_overrides_success() {
    let connection = MockConnection::new();
    let resources = RecordingResources::new();
    let tx = begin(&connection, &resources);

    tx.success();
    tx.rollback().unwrap();

    assert_eq!(connection.count("RUN COMMIT"), 0);
    assert_eq!(connection.count("RUN ROLLBACK"), 1);
    assert_eq!(connection.releases(), 1);
}

#[test]
fn test_drop_closes_open_transaction() {
    let connection = MockConnection::new();
    let resources = RecordingResources::new();
    {
        let tx = begin(&connection, &resources);
        tx.run("CREATE (n)", Params::new()).unwrap();
        tx.success();
    }

    assert_eq!(connection.count("RUN COMMIT"), 1);
    assert_eq!(connection.releases(), 1);
    assert_eq!(resources.closed_count(), 1);
}

#[test]
fn test_drop_after_close_does_nothing() {
    let (tx, connection, resources) = transaction_in(TransactionState::Active);
    tx.close().unwrap();
    let sent = connection.sent();

    drop(tx);

    assert_eq!(connection.sent(), sent);
    assert_eq!(connection.releases(), 1);
    assert_eq!(resources.closed_count(), 1);
}

#[test]
fn test_drop_swallows_close_error() {
    let connection = MockConnection::new();
    let resources = RecordingResources::new();
    connection.fail_statement("COMMIT", commit_error());
    {
        let tx = begin(&connection, &resources);
        tx.success();
    }

    assert_eq!(connection.count("RUN ROLLBACK"), 1);
    assert_eq!(connection.releases(), 1);
}

// =============================================================================
// BEGIN
// =============================================================================

#[test]
fn test_begin_without_bookmark_does_not_wait() {
    let connection = MockConnection::new();
    let resources = RecordingResources::new();
    let _tx = begin(&connection, &resources);

    assert_eq!(connection.sent(), vec!["RUN BEGIN", "PULL_ALL"]);
    assert_eq!(connection.queued(), 2);
}

#[test]
fn test_begin_failure_releases_connection() {
    init_tracing();
    let connection = MockConnection::new();
    let resources = RecordingResources::new();
    connection.fail_statement("BEGIN", broken_pipe());
    let config = TransactionConfig::new().bookmark(bookmark(3));

    let err = ExplicitTransaction::begin(connection.clone(), resources.clone(), &config)
        .unwrap_err();

    assert_eq!(err, broken_pipe());
    assert_eq!(connection.releases(), 1);
    assert_eq!(resources.closed_count(), 1);
    assert_eq!(connection.count("RUN ROLLBACK"), 0);
}

#[test]
fn test_begin_send_failure_releases_connection() {
    init_tracing();
    let connection = MockConnection::new();
    let resources = RecordingResources::new();
    connection.fail_sends(broken_pipe());

    let result =
        ExplicitTransaction::begin(connection.clone(), resources.clone(), &TransactionConfig::new());

    assert!(result.is_err());
    assert_eq!(connection.releases(), 1);
    assert_eq!(resources.closed_count(), 1);
}

// =============================================================================
// STATEMENT RESULTS
// =============================================================================

#[test]
fn test_statement_result_records() {
    let connection = MockConnection::new();
    let resources = RecordingResources::new();
    connection.records(
        "MATCH (p:Person) RETURN p.name AS name",
        &["name"],
        vec![vec![Value::from("Alice")], vec![Value::from("Bob")]],
    );
    let tx = begin(&connection, &resources);

    let result = tx
        .run("MATCH (p:Person) RETURN p.name AS name", Params::new())
        .unwrap();

    assert_eq!(result.keys().unwrap(), vec!["name".to_string()]);
    let names: Vec<_> = result
        .records()
        .unwrap()
        .iter()
        .map(|r| r.get("name").cloned())
        .collect();
    assert_eq!(
        names,
        vec![Some(Value::from("Alice")), Some(Value::from("Bob"))]
    );
    assert!(result.consume().is_ok());
    assert_eq!(tx.state(), TransactionState::Active);
}

#[test]
fn test_statement_parameters_are_forwarded() {
    let connection = MockConnection::new();
    let resources = RecordingResources::new();
    let tx = begin(&connection, &resources);

    let result = tx
        .run("CREATE (n {name: $name})", param("name", "Alice"))
        .unwrap();

    assert!(result.consume().is_ok());
    assert_eq!(result.cursor().statement(), "CREATE (n {name: $name})");
}

#[test]
fn test_statement_send_failure_marks_failed() {
    let connection = MockConnection::new();
    let resources = RecordingResources::new();
    let tx = begin(&connection, &resources);

    connection.fail_sends(broken_pipe());
    assert_eq!(tx.run("RETURN 1", Params::new()).unwrap_err(), broken_pipe());
    assert_eq!(tx.state(), TransactionState::Failed);

    let err = tx.run("RETURN 2", Params::new()).unwrap_err();
    assert!(err.is_usage());
}
