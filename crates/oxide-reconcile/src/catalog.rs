//! Catalog introspection.
//!
//! Reads live table metadata through the dialect's catalog queries and turns
//! it into the same [`Table`] model callers declare, so the diff engine can
//! compare the two. Every query is scoped to one schema: a table realized in
//! one schema is invisible when looking at another.

use tracing::debug;

use crate::connection::{Connection, Row, RowSet};
use crate::dialect::{CapabilityProfile, DialectKind};
use crate::error::{ReconcileError, Result};
use crate::schema::{Column, ColumnType, Index, Schema, Table};

/// Reads table metadata from a live database.
#[derive(Debug, Clone, Copy)]
pub struct Catalog {
    profile: &'static CapabilityProfile,
}

impl Catalog {
    /// Creates an introspector using a dialect profile.
    #[must_use]
    pub fn new(profile: &'static CapabilityProfile) -> Self {
        Self { profile }
    }

    /// Creates an introspector for a dialect.
    #[must_use]
    pub fn for_dialect(kind: DialectKind) -> Self {
        Self::new(kind.capabilities())
    }

    /// Returns whether `table` exists in `schema`.
    pub async fn table_exists<C: Connection>(
        &self,
        conn: &mut C,
        schema: &Schema,
        table: &str,
    ) -> Result<bool> {
        let sql = self
            .profile
            .catalog_sql(self.profile.catalog().tables, schema, table);
        debug!(schema = %schema, table = %table, sql = %sql, "Checking table existence");
        let rows = conn.query(&sql).await?;
        Ok(!rows.is_empty())
    }

    /// Reads the current definition of `table` in `schema`, or `None` if the
    /// table does not exist there.
    pub async fn introspect<C: Connection>(
        &self,
        conn: &mut C,
        schema: &Schema,
        table: &str,
    ) -> Result<Option<Table>> {
        if !self.table_exists(conn, schema, table).await? {
            return Ok(None);
        }

        let catalog = self.profile.catalog();
        let sql = self.profile.catalog_sql(catalog.columns, schema, table);
        debug!(schema = %schema, table = %table, sql = %sql, "Reading columns");
        let column_rows = conn.query(&sql).await?;

        let sql = self.profile.catalog_sql(catalog.indexes, schema, table);
        debug!(schema = %schema, table = %table, sql = %sql, "Reading indexes");
        let index_rows = conn.query(&sql).await?;

        let (columns, primary_key) = parse_columns(table, column_rows)?;
        let indexes = parse_indexes(table, index_rows)?;

        Ok(Some(Table::from_catalog(
            table.to_string(),
            columns,
            primary_key,
            indexes,
        )))
    }

    /// Asks the database which schema the session currently targets.
    pub async fn current_schema<C: Connection>(&self, conn: &mut C) -> Result<Schema> {
        let rows = conn.query(self.profile.catalog().current_schema).await?;
        rows.rows()
            .first()
            .and_then(|row| row.first().cloned().flatten())
            .map(Schema::new)
            .ok_or_else(|| ReconcileError::catalog_parse("", "database reported no current schema"))
    }
}

fn field<'r>(table: &str, row: &'r Row, index: usize, what: &str) -> Result<Option<&'r str>> {
    row.get(index)
        .map(Option::as_deref)
        .ok_or_else(|| {
            ReconcileError::catalog_parse(
                table,
                format!("expected {} at position {}, row has {} values", what, index, row.len()),
            )
        })
}

fn required<'r>(table: &str, row: &'r Row, index: usize, what: &str) -> Result<&'r str> {
    field(table, row, index, what)?
        .ok_or_else(|| ReconcileError::catalog_parse(table, format!("{} is NULL", what)))
}

fn flag(table: &str, row: &Row, index: usize, what: &str) -> Result<bool> {
    match required(table, row, index, what)?.trim() {
        "1" => Ok(true),
        "0" => Ok(false),
        other => Err(ReconcileError::catalog_parse(
            table,
            format!("{} flag '{}' is neither 0 nor 1", what, other),
        )),
    }
}

type ParsedColumns = (Vec<Column>, Option<Vec<String>>);

fn parse_columns(table: &str, rows: RowSet) -> Result<ParsedColumns> {
    if rows.is_empty() {
        return Err(ReconcileError::catalog_parse(
            table,
            "table exists but the catalog lists no columns",
        ));
    }

    let mut columns = Vec::with_capacity(rows.len());
    let mut key_parts: Vec<(u32, String)> = Vec::new();
    for row in rows.rows() {
        let name = required(table, row, 0, "column name")?;
        let data_type = required(table, row, 1, "column type")?;
        let nullable = flag(table, row, 2, "nullable")?;
        let position = required(table, row, 3, "primary key position")?;
        let position: u32 = position.trim().parse().map_err(|_| {
            ReconcileError::catalog_parse(
                table,
                format!("primary key position '{}' is not a number", position),
            )
        })?;

        let mut column = Column::new(name, ColumnType::Custom(data_type.to_string()));
        if !nullable {
            column = column.not_null();
        }
        if position > 0 {
            key_parts.push((position, name.to_string()));
        }
        columns.push(column);
    }

    key_parts.sort_by_key(|(position, _)| *position);
    let primary_key = if key_parts.is_empty() {
        None
    } else {
        Some(key_parts.into_iter().map(|(_, name)| name).collect())
    };

    Ok((columns, primary_key))
}

fn parse_indexes(table: &str, rows: RowSet) -> Result<Vec<Index>> {
    let mut parts: Vec<(String, Vec<String>, bool, Option<String>)> = Vec::new();
    for row in rows.rows() {
        let name = required(table, row, 0, "index name")?;
        let column = field(table, row, 1, "index column")?;
        let unique = flag(table, row, 2, "unique")?;
        let index_type = field(table, row, 3, "index type")?;

        let position = match parts.iter().position(|(n, ..)| n == name) {
            Some(position) => position,
            None => {
                parts.push((
                    name.to_string(),
                    Vec::new(),
                    unique,
                    index_type.map(str::to_string),
                ));
                parts.len() - 1
            }
        };
        // expression parts of an index have no column name
        if let Some(column) = column {
            parts[position].1.push(column.to_string());
        }
    }

    Ok(parts
        .into_iter()
        .map(|(name, columns, unique, index_type)| {
            let mut index = Index::new(name, columns);
            if unique {
                index = index.unique();
            }
            match index_type {
                Some(index_type) => index.index_type(index_type),
                None => index,
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::mock::{row, rows, MockConnection};

    fn sqlite_catalog() -> Catalog {
        Catalog::for_dialect(DialectKind::Sqlite)
    }

    fn live_table_conn() -> MockConnection {
        MockConnection::new(DialectKind::Sqlite)
            .respond("sqlite_master", rows(&[&["test_table"]]))
            .respond(
                "pragma_table_info",
                rows(&[
                    &["id", "INTEGER", "0", "1"],
                    &["name", "VARCHAR(42)", "1", "0"],
                ]),
            )
            .respond(
                "pragma_index_list",
                RowSet::new(vec![
                    row(&[Some("test_table_id_name"), Some("id"), Some("0"), None]),
                    row(&[Some("test_table_id_name"), Some("name"), Some("0"), None]),
                    row(&[Some("test_table_id_unique"), Some("id"), Some("1"), None]),
                ]),
            )
    }

    #[tokio::test]
    async fn test_introspect_builds_table() {
        let mut conn = live_table_conn();
        let table = sqlite_catalog()
            .introspect(&mut conn, &Schema::new("main"), "test_table")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(table.name(), "test_table");
        assert_eq!(table.columns().len(), 2);
        assert!(!table.get_column("id").unwrap().is_nullable());
        assert_eq!(
            table.get_column("name").unwrap().column_type(),
            &ColumnType::Custom("VARCHAR(42)".into())
        );
        assert_eq!(table.primary_key().unwrap().columns(), ["id"]);

        let composite = table.get_index("test_table_id_name").unwrap();
        assert_eq!(composite.columns(), ["id", "name"]);
        assert!(!composite.is_unique());
        assert!(table.get_index("test_table_id_unique").unwrap().is_unique());
    }

    #[tokio::test]
    async fn test_queries_are_scoped_to_schema() {
        let mut conn = live_table_conn();
        sqlite_catalog()
            .introspect(&mut conn, &Schema::new("schema1"), "test_table")
            .await
            .unwrap();

        assert_eq!(conn.queries.len(), 3);
        assert!(conn.queries[0].contains("\"schema1\".sqlite_master"));
        assert!(conn.queries[1].contains("pragma_table_info('test_table', 'schema1')"));
        assert!(conn.queries[2].contains("pragma_index_list('test_table', 'schema1')"));
    }

    #[tokio::test]
    async fn test_missing_table_is_none() {
        let mut conn = MockConnection::new(DialectKind::Postgres);
        let table = Catalog::for_dialect(DialectKind::Postgres)
            .introspect(&mut conn, &Schema::new("public"), "test_table")
            .await
            .unwrap();

        assert!(table.is_none());
        // only the existence query runs
        assert_eq!(conn.queries.len(), 1);
        assert!(conn.queries[0].contains("table_schema = 'public'"));
    }

    #[tokio::test]
    async fn test_bad_flag_is_parse_error() {
        let mut conn = MockConnection::new(DialectKind::Sqlite)
            .respond("sqlite_master", rows(&[&["t"]]))
            .respond("pragma_table_info", rows(&[&["id", "INTEGER", "maybe", "0"]]));

        let err = sqlite_catalog()
            .introspect(&mut conn, &Schema::new("main"), "t")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CatalogParse);
        assert!(err.to_string().contains("'maybe'"));
    }

    #[tokio::test]
    async fn test_short_row_is_parse_error() {
        let mut conn = MockConnection::new(DialectKind::Sqlite)
            .respond("sqlite_master", rows(&[&["t"]]))
            .respond("pragma_table_info", rows(&[&["id", "INTEGER"]]));

        let err = sqlite_catalog()
            .introspect(&mut conn, &Schema::new("main"), "t")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CatalogParse);
    }

    #[tokio::test]
    async fn test_table_without_columns_is_parse_error() {
        let mut conn =
            MockConnection::new(DialectKind::Sqlite).respond("sqlite_master", rows(&[&["t"]]));

        let err = sqlite_catalog()
            .introspect(&mut conn, &Schema::new("main"), "t")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CatalogParse);
    }

    #[tokio::test]
    async fn test_query_failure_is_connection_error() {
        let mut conn = MockConnection::new(DialectKind::Sqlite)
            .fail_on("sqlite_master", crate::mock::rejected("unknown database schema9"));

        let err = sqlite_catalog()
            .table_exists(&mut conn, &Schema::new("schema9"), "t")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Connection);
    }

    #[tokio::test]
    async fn test_expression_index_columns_are_skipped() {
        let mut conn = MockConnection::new(DialectKind::Postgres)
            .respond("information_schema.tables", rows(&[&["t"]]))
            .respond("information_schema.columns", rows(&[&["id", "integer", "0", "1"]]))
            .respond(
                "pg_index",
                RowSet::new(vec![
                    row(&[Some("t_lower"), None, Some("0"), Some("BTREE")]),
                    row(&[Some("t_hash"), Some("id"), Some("0"), Some("HASH")]),
                ]),
            );

        let table = Catalog::for_dialect(DialectKind::Postgres)
            .introspect(&mut conn, &Schema::new("public"), "t")
            .await
            .unwrap()
            .unwrap();

        assert!(table.get_index("t_lower").unwrap().columns().is_empty());
        assert_eq!(table.get_index("t_hash").unwrap().storage_type(), Some("HASH"));
    }

    #[tokio::test]
    async fn test_current_schema() {
        let mut conn = MockConnection::new(DialectKind::Postgres)
            .respond("current_schema()", rows(&[&["public"]]));
        let schema = Catalog::for_dialect(DialectKind::Postgres)
            .current_schema(&mut conn)
            .await
            .unwrap();
        assert_eq!(schema, Schema::new("public"));
    }
}
