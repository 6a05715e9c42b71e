//! Integration tests for reconciliation against a real SQLite database.
//!
//! Schemas are SQLite attached databases, so every test that needs more
//! than one namespace attaches fresh in-memory databases.

mod common;

use common::{column_names, exec, index_names, memory_session, session_with_schemas, test_table};
use oxide_reconcile::prelude::*;

// =============================================================================
// Creation and idempotence
// =============================================================================

#[tokio::test]
async fn test_new_table_in_empty_schema() {
    let mut session = session_with_schemas(&["schema1"]).await;
    let table = test_table();

    assert!(!session.exists(&table).await.unwrap());

    let report = Reconciler::new()
        .reconcile(&mut session, std::slice::from_ref(&table))
        .await;

    assert!(report.is_success(), "{report:?}");
    assert_eq!(report.schema, Some(Schema::new("schema1")));
    assert_eq!(report.statement_count(), 2);
    assert!(session.exists(&table).await.unwrap());
    assert_eq!(
        column_names(&mut session, "schema1", "test_table").await,
        ["id", "name"]
    );
    assert_eq!(
        index_names(&mut session, "schema1", "test_table").await,
        ["test_table_name"]
    );
}

#[tokio::test]
async fn test_second_run_is_a_no_op() {
    let mut session = session_with_schemas(&["schema1"]).await;
    let tables = [test_table()];
    let reconciler = Reconciler::new();

    let first = reconciler.reconcile(&mut session, &tables).await;
    assert_eq!(first.statement_count(), 2);

    let second = reconciler.reconcile(&mut session, &tables).await;
    assert!(second.is_success());
    assert_eq!(second.statement_count(), 0);
    assert!(second.get("test_table").unwrap().is_up_to_date());
}

#[tokio::test]
async fn test_default_schema_is_main() {
    let mut session = memory_session().await;
    assert_eq!(session.current_schema().await.unwrap(), Schema::new("main"));

    let report = Reconciler::new().reconcile(&mut session, &[test_table()]).await;
    assert!(report.is_success());
    assert!(session
        .exists_in("test_table", &Schema::new("main"))
        .await
        .unwrap());
}

#[tokio::test]
async fn test_statement_order_for_new_table() {
    let table = Table::builder("orders")
        .column(Column::new("id", ColumnType::BigInt))
        .column(Column::new("customer", ColumnType::Text).not_null())
        .column(Column::new("placed_at", ColumnType::Timestamp))
        .primary_key(["id"])
        .index(Index::new("orders_placed_at", ["placed_at"]))
        .index(Index::new("orders_customer", ["customer"]).unique())
        .build()
        .unwrap();
    let mut session = session_with_schemas(&["shop"]).await;
    let report = Reconciler::new().reconcile(&mut session, &[table]).await;

    let applied = &report.get("orders").unwrap().applied;
    assert_eq!(applied.len(), 3);
    assert!(applied[0].starts_with("CREATE TABLE \"shop\".\"orders\""));
    assert_eq!(
        applied[1],
        "CREATE INDEX \"shop\".\"orders_placed_at\" ON \"orders\" (\"placed_at\")"
    );
    assert_eq!(
        applied[2],
        "CREATE UNIQUE INDEX \"shop\".\"orders_customer\" ON \"orders\" (\"customer\")"
    );
}

// =============================================================================
// Schema isolation
// =============================================================================

#[tokio::test]
async fn test_schemas_are_isolated() {
    let mut session = session_with_schemas(&["schema1", "schema2"]).await;
    let table = test_table();
    let reconciler = Reconciler::new();

    reconciler
        .reconcile(&mut session, std::slice::from_ref(&table))
        .await;
    assert!(session
        .exists_in("test_table", &Schema::new("schema1"))
        .await
        .unwrap());
    assert!(!session
        .exists_in("test_table", &Schema::new("schema2"))
        .await
        .unwrap());

    session
        .set_current_schema(Schema::new("schema2"))
        .await
        .unwrap();
    assert!(!session.exists(&table).await.unwrap());

    let report = reconciler
        .reconcile(&mut session, std::slice::from_ref(&table))
        .await;
    assert_eq!(report.schema, Some(Schema::new("schema2")));
    assert_eq!(report.statement_count(), 2);
    assert!(session.exists(&table).await.unwrap());
}

#[tokio::test]
async fn test_reset_returns_to_default_schema() {
    let mut session = session_with_schemas(&["schema1"]).await;
    session.reset().await.unwrap();
    assert_eq!(session.context(), &SchemaContext::Unset);
    assert_eq!(session.current_schema().await.unwrap(), Schema::new("main"));
}

// =============================================================================
// Additive changes
// =============================================================================

#[tokio::test]
async fn test_missing_column_and_index_are_added() {
    let mut session = session_with_schemas(&["app"]).await;
    exec(
        &mut session,
        "CREATE TABLE \"app\".\"test_table\" (id INTEGER PRIMARY KEY, name VARCHAR(42), legacy TEXT)",
    )
    .await;
    exec(
        &mut session,
        "CREATE INDEX \"app\".\"test_table_name\" ON \"test_table\" (name)",
    )
    .await;

    let table = Table::builder("test_table")
        .column(Column::new("id", ColumnType::Integer))
        .column(Column::new("name", ColumnType::Varchar(42)))
        .column(Column::new("email", ColumnType::Varchar(100)))
        .primary_key(["id"])
        .auto_index(["name"], false)
        .auto_index(["email"], true)
        .build()
        .unwrap();

    let report = Reconciler::new().reconcile(&mut session, &[table]).await;
    let applied = &report.get("test_table").unwrap().applied;

    assert_eq!(
        applied,
        &[
            "ALTER TABLE \"app\".\"test_table\" ADD COLUMN \"email\" VARCHAR(100)".to_string(),
            "CREATE UNIQUE INDEX \"app\".\"test_table_email_unique\" ON \"test_table\" (\"email\")"
                .to_string(),
        ]
    );
    // the undeclared column is left alone
    assert_eq!(
        column_names(&mut session, "app", "test_table").await,
        ["id", "name", "legacy", "email"]
    );
}

#[tokio::test]
async fn test_type_drift_is_ignored() {
    let mut session = memory_session().await;
    exec(
        &mut session,
        "CREATE TABLE test_table (id INTEGER PRIMARY KEY, name TEXT)",
    )
    .await;
    exec(&mut session, "CREATE INDEX test_table_name ON test_table (name)").await;

    let report = Reconciler::new().reconcile(&mut session, &[test_table()]).await;
    assert_eq!(report.statement_count(), 0);
}

#[tokio::test]
async fn test_differently_cased_table_is_recognized() {
    let mut session = memory_session().await;
    exec(
        &mut session,
        "CREATE TABLE \"Test_Table\" (\"ID\" INTEGER PRIMARY KEY, \"Name\" VARCHAR(42))",
    )
    .await;
    exec(&mut session, "CREATE INDEX \"Test_Table_Name\" ON \"Test_Table\" (\"Name\")").await;

    assert!(session.exists(&test_table()).await.unwrap());
    let report = Reconciler::new().reconcile(&mut session, &[test_table()]).await;
    assert!(report.is_success(), "{report:?}");
    assert_eq!(report.statement_count(), 0);
}

// =============================================================================
// Failures
// =============================================================================

#[tokio::test]
async fn test_unsupported_index_type_is_rejected() {
    let table = Table::builder("test_table")
        .column(Column::new("id", ColumnType::Integer))
        .column(Column::new("name", ColumnType::Varchar(42)))
        .primary_key(["id"])
        .index(Index::new("test_table_name_nc", ["name"]).index_type("NONCLUSTERED"))
        .index(Index::new("test_table_name_hash", ["name"]).index_type("HASH"))
        .build()
        .unwrap();
    let mut session = session_with_schemas(&["schema1"]).await;
    let report = Reconciler::new().reconcile(&mut session, &[table]).await;

    let table_report = report.get("test_table").unwrap();
    assert!(table_report.error.is_none());
    assert_eq!(table_report.rejected.len(), 1);
    assert!(matches!(
        &table_report.rejected[0],
        ReconcileError::UnsupportedIndexType { index, dialect: DialectKind::Sqlite, .. }
            if index == "test_table_name_nc"
    ));
    // HASH falls back to a default index on SQLite
    assert_eq!(
        index_names(&mut session, "schema1", "test_table").await,
        ["test_table_name_hash"]
    );
}

#[tokio::test]
async fn test_rejected_statement_halts_only_its_table() {
    let mut session = memory_session().await;
    exec(&mut session, "CREATE TABLE other (x INTEGER)").await;
    exec(&mut session, "CREATE INDEX shared_idx ON other (x)").await;

    let clashing = Table::builder("first")
        .column(Column::new("id", ColumnType::Integer))
        .index(Index::new("shared_idx", ["id"]))
        .index(Index::new("first_id", ["id"]))
        .build()
        .unwrap();
    let tables = [clashing, test_table()];
    let report = Reconciler::new().reconcile(&mut session, &tables).await;

    let first = report.get("first").unwrap();
    assert_eq!(first.applied.len(), 1);
    let err = first.error.as_ref().unwrap();
    assert_eq!(err.kind(), ErrorKind::StatementExecution);
    assert!(err.to_string().contains("shared_idx"));
    // the statement after the failure never ran
    assert!(index_names(&mut session, "main", "first").await.is_empty());

    let second = report.get("test_table").unwrap();
    assert!(second.is_success());
    assert_eq!(second.applied.len(), 2);
    assert!(!report.is_success());
}

#[tokio::test]
async fn test_dry_run_leaves_database_untouched() {
    let mut session = session_with_schemas(&["schema1"]).await;
    let reconciler = Reconciler::with_options(ReconcileOptions::new().dry_run(true));
    let report = reconciler.reconcile(&mut session, &[test_table()]).await;

    assert!(report.dry_run);
    assert_eq!(report.statement_count(), 2);
    assert!(!session.exists(&test_table()).await.unwrap());
}

// =============================================================================
// Persistence
// =============================================================================

#[tokio::test]
async fn test_on_disk_database_round_trip() {
    use sqlx::sqlite::SqliteConnectOptions;
    use sqlx::ConnectOptions as _;

    let dir = tempfile::tempdir().unwrap();
    let options = SqliteConnectOptions::new()
        .filename(dir.path().join("app.db"))
        .create_if_missing(true);
    let tables = [test_table()];

    let conn = options.connect().await.unwrap();
    let mut session = Session::new(conn);
    let report = Reconciler::new().reconcile(&mut session, &tables).await;
    assert_eq!(report.statement_count(), 2);
    drop(session.into_inner());

    let conn = options.connect().await.unwrap();
    let mut session = Session::new(conn);
    assert!(session.exists(&tables[0]).await.unwrap());
    let report = Reconciler::new().reconcile(&mut session, &tables).await;
    assert_eq!(report.statement_count(), 0);
}
