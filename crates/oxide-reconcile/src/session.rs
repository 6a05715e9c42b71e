//! Sessions and their schema context.
//!
//! A [`Session`] pairs a connection with the schema that DDL and catalog
//! lookups target. The context is explicit per-session state: two sessions
//! never share it, and a session is driven through `&mut`, so its schema
//! cannot change while work on it is in flight.

use tracing::{debug, info};

use crate::catalog::Catalog;
use crate::connection::Connection;
use crate::dialect::{CapabilityProfile, DialectKind};
use crate::error::{ReconcileError, Result};
use crate::schema::{Schema, Table};

/// Which schema a session targets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SchemaContext {
    /// No schema chosen; the database's own default applies.
    #[default]
    Unset,
    /// An explicitly chosen schema.
    Active(Schema),
}

/// A connection together with its schema context.
#[derive(Debug)]
pub struct Session<C> {
    conn: C,
    context: SchemaContext,
}

impl<C: Connection> Session<C> {
    /// Wraps a connection; the schema context starts unset.
    pub fn new(conn: C) -> Self {
        Self {
            conn,
            context: SchemaContext::Unset,
        }
    }

    /// The connection's dialect.
    pub fn dialect(&self) -> DialectKind {
        self.conn.dialect()
    }

    /// The capability profile of the connection's dialect.
    pub fn capabilities(&self) -> &'static CapabilityProfile {
        self.dialect().capabilities()
    }

    /// The current schema context.
    pub fn context(&self) -> &SchemaContext {
        &self.context
    }

    /// Makes `schema` the target of subsequent DDL and lookups.
    ///
    /// Runs the dialect's set-schema statement when it has one. No table is
    /// created, dropped or altered. On failure the context is left as it was.
    pub async fn set_current_schema(&mut self, schema: Schema) -> Result<()> {
        if let Some(sql) = self.capabilities().set_schema_sql(&schema) {
            debug!(schema = %schema, sql = %sql, "Setting current schema");
            self.conn
                .execute(&sql)
                .await
                .map_err(|source| ReconcileError::StatementExecution {
                    statement: sql,
                    source,
                })?;
        }
        info!(schema = %schema, "Current schema set");
        self.context = SchemaContext::Active(schema);
        Ok(())
    }

    /// The schema this session targets.
    ///
    /// When no schema was set, asks the database for its current schema.
    pub async fn current_schema(&mut self) -> Result<Schema> {
        match &self.context {
            SchemaContext::Active(schema) => Ok(schema.clone()),
            SchemaContext::Unset => {
                Catalog::new(self.capabilities())
                    .current_schema(&mut self.conn)
                    .await
            }
        }
    }

    /// Restores the database's default schema and clears the context.
    pub async fn reset(&mut self) -> Result<()> {
        if let Some(sql) = self.capabilities().reset_schema_sql() {
            debug!(sql = %sql, "Resetting current schema");
            self.conn
                .execute(sql)
                .await
                .map_err(|source| ReconcileError::StatementExecution {
                    statement: sql.to_string(),
                    source,
                })?;
        }
        self.context = SchemaContext::Unset;
        Ok(())
    }

    /// Creates a schema (an attached database on SQLite).
    pub async fn create_schema(&mut self, schema: &Schema) -> Result<()> {
        let Some(sql) = self.capabilities().create_schema_sql(schema) else {
            return Err(ReconcileError::UnsupportedOperation {
                operation: "create schema",
                dialect: self.dialect(),
            });
        };
        info!(schema = %schema, sql = %sql, "Creating schema");
        self.conn
            .execute(&sql)
            .await
            .map_err(|source| ReconcileError::StatementExecution {
                statement: sql,
                source,
            })
    }

    /// Whether `table` exists in the current schema.
    pub async fn exists(&mut self, table: &Table) -> Result<bool> {
        let schema = self.current_schema().await?;
        self.exists_in(table.name(), &schema).await
    }

    /// Whether a table named `table` exists in `schema`.
    pub async fn exists_in(&mut self, table: &str, schema: &Schema) -> Result<bool> {
        Catalog::new(self.capabilities())
            .table_exists(&mut self.conn, schema, table)
            .await
    }

    /// Mutable access to the underlying connection.
    pub fn connection_mut(&mut self) -> &mut C {
        &mut self.conn
    }

    /// Gives the connection back.
    pub fn into_inner(self) -> C {
        self.conn
    }
}
