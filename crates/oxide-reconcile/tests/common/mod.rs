#![allow(dead_code)]

use oxide_reconcile::prelude::*;
use sqlx::Connection as _;
use sqlx::SqliteConnection;

pub async fn memory_session() -> Session<SqliteConnection> {
    let conn = SqliteConnection::connect("sqlite::memory:")
        .await
        .unwrap_or_else(|e| panic!("Failed to open in-memory SQLite: {e}"));
    Session::new(conn)
}

/// A session with `schemas` attached and the first one active.
pub async fn session_with_schemas(schemas: &[&str]) -> Session<SqliteConnection> {
    let mut session = memory_session().await;
    for name in schemas {
        session
            .create_schema(&Schema::new(*name))
            .await
            .unwrap_or_else(|e| panic!("Failed to attach {name}: {e}"));
    }
    if let Some(first) = schemas.first() {
        session
            .set_current_schema(Schema::new(*first))
            .await
            .unwrap();
    }
    session
}

/// `test_table(id int PK, name varchar(42))` with a plain index on `name`.
pub fn test_table() -> Table {
    Table::builder("test_table")
        .column(Column::new("id", ColumnType::Integer))
        .column(Column::new("name", ColumnType::Varchar(42)))
        .primary_key(["id"])
        .auto_index(["name"], false)
        .build()
        .unwrap()
}

/// Runs a raw statement, panicking on failure.
pub async fn exec(session: &mut Session<SqliteConnection>, sql: &str) {
    Connection::execute(session.connection_mut(), sql)
        .await
        .unwrap_or_else(|e| panic!("Failed to execute {sql}: {e}"));
}

/// Names of the columns of `schema.table`, in order.
pub async fn column_names(
    session: &mut Session<SqliteConnection>,
    schema: &str,
    table: &str,
) -> Vec<String> {
    Catalog::for_dialect(DialectKind::Sqlite)
        .introspect(session.connection_mut(), &Schema::new(schema), table)
        .await
        .unwrap()
        .map(|t| t.columns().iter().map(|c| c.name().to_string()).collect())
        .unwrap_or_default()
}

/// Names of the secondary indexes of `schema.table`.
pub async fn index_names(
    session: &mut Session<SqliteConnection>,
    schema: &str,
    table: &str,
) -> Vec<String> {
    let mut names: Vec<String> = Catalog::for_dialect(DialectKind::Sqlite)
        .introspect(session.connection_mut(), &Schema::new(schema), table)
        .await
        .unwrap()
        .map(|t| t.indexes().iter().map(|i| i.name().to_string()).collect())
        .unwrap_or_default();
    names.sort();
    names
}
