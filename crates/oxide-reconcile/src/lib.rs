//! Declarative schema reconciliation across SQL dialects.
//!
//! `oxide-reconcile` takes tables declared in code (or JSON), compares them
//! with what a live database actually has, and applies only the additive DDL
//! needed to close the gap:
//! - Missing tables are created with their primary key and indexes
//! - Missing columns are added, missing indexes are created
//! - Nothing is ever dropped or altered, so re-running is a no-op
//!
//! # Architecture
//!
//! - **Dialect** - Static capability profiles per database product
//! - **Catalog** - Reads live table metadata, scoped to one schema
//! - **Diff** - Lists what the live table lacks
//! - **DDL** - Turns the diff into schema-qualified statements
//! - **Session** - A connection plus its current-schema context
//! - **Reconciler** - Drives the above and reports per-table outcomes
//!
//! # Example
//!
//! ```rust,ignore
//! use oxide_reconcile::prelude::*;
//! use sqlx::Connection as _;
//!
//! let conn = sqlx::SqliteConnection::connect("sqlite::memory:").await?;
//! let mut session = Session::new(conn);
//!
//! let users = Table::builder("users")
//!     .column(Column::new("id", ColumnType::BigInt))
//!     .column(Column::new("username", ColumnType::Varchar(255)).not_null())
//!     .primary_key(["id"])
//!     .auto_index(["username"], true)
//!     .build()?;
//!
//! let report = Reconciler::new().reconcile(&mut session, &[users]).await;
//! assert!(report.is_success());
//! ```
//!
//! # CLI Usage
//!
//! ```bash
//! # Bring the database up to the tables declared in schema.json
//! oxide-reconcile --database sqlite:app.db reconcile schema.json
//!
//! # Show the statements without running them
//! oxide-reconcile reconcile schema.json --dry-run
//!
//! # Check for a table in a given schema
//! oxide-reconcile --schema reporting exists daily_totals
//! ```

pub mod catalog;
pub mod connection;
pub mod ddl;
pub mod dialect;
pub mod diff;
pub mod error;
pub mod reconcile;
pub mod schema;
pub mod session;

#[cfg(test)]
mod mock;

pub use dialect::DialectKind;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::catalog::Catalog;
    pub use crate::connection::{Connection, Row, RowSet};
    pub use crate::ddl::DdlGenerator;
    pub use crate::dialect::{
        capabilities_for, CapabilityProfile, DialectKind, IndexTypePlacement, IndexTypeSupport,
        NameMatching,
    };
    pub use crate::diff::{diff, diff_matching, StructuralDiff};
    pub use crate::error::{ConnectionError, ErrorKind, ReconcileError, Result};
    pub use crate::reconcile::{ReconcileOptions, ReconciliationReport, Reconciler, TableReport};
    pub use crate::schema::{
        Column, ColumnType, DefaultValue, Index, PrimaryKey, Schema, Table, TableBuilder,
    };
    pub use crate::session::{SchemaContext, Session};
}
