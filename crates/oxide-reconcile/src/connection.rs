//! The connection collaborator.
//!
//! The engine never opens, pools or configures connections. It only needs to
//! run a DDL statement and read back a small text result set, which is what
//! [`Connection`] captures. Adapters for sqlx connections are provided behind
//! the `sqlite`, `postgres` and `mysql` features.

use std::future::Future;

#[cfg(any(feature = "sqlite", feature = "postgres", feature = "mysql"))]
use futures::future::BoxFuture;

use crate::dialect::DialectKind;
use crate::error::ConnectionError;

/// A row of a catalog result; every value is rendered as text.
pub type Row = Vec<Option<String>>;

/// Result of [`Connection::query`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowSet {
    rows: Vec<Row>,
}

impl RowSet {
    /// Creates a row set.
    #[must_use]
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    /// All rows, in the order the database returned them.
    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the result is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl FromIterator<Row> for RowSet {
    fn from_iter<I: IntoIterator<Item = Row>>(iter: I) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for RowSet {
    type Item = Row;
    type IntoIter = std::vec::IntoIter<Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

/// A database session able to run DDL and catalog queries.
///
/// Each call must complete before the next is issued; implementations may
/// assume they are driven sequentially.
pub trait Connection: Send {
    /// The SQL dialect spoken by this connection.
    fn dialect(&self) -> DialectKind;

    /// Executes a statement that returns no rows.
    fn execute(&mut self, sql: &str) -> impl Future<Output = Result<(), ConnectionError>> + Send;

    /// Runs a query and returns every value as text.
    fn query(&mut self, sql: &str) -> impl Future<Output = Result<RowSet, ConnectionError>> + Send;
}

impl<C: Connection> Connection for &mut C {
    fn dialect(&self) -> DialectKind {
        (**self).dialect()
    }

    fn execute(&mut self, sql: &str) -> impl Future<Output = Result<(), ConnectionError>> + Send {
        (**self).execute(sql)
    }

    fn query(&mut self, sql: &str) -> impl Future<Output = Result<RowSet, ConnectionError>> + Send {
        (**self).query(sql)
    }
}

#[cfg(any(feature = "sqlite", feature = "postgres", feature = "mysql"))]
macro_rules! impl_sqlx_connection {
    ($connection:ty, $dialect:expr) => {
        impl Connection for $connection {
            fn dialect(&self) -> DialectKind {
                $dialect
            }

            // sqlx executor futures are not Send for every borrow lifetime;
            // boxed they are.
            async fn execute(&mut self, sql: &str) -> Result<(), ConnectionError> {
                let fut: BoxFuture<'_, Result<(), ConnectionError>> = Box::pin(async move {
                    sqlx::Executor::execute(&mut *self, sqlx::raw_sql(sql)).await?;
                    Ok(())
                });
                fut.await
            }

            async fn query(&mut self, sql: &str) -> Result<RowSet, ConnectionError> {
                let fut: BoxFuture<'_, Result<RowSet, ConnectionError>> = Box::pin(async move {
                    use sqlx::Row as _;

                    let rows = sqlx::query(sql).fetch_all(&mut *self).await?;
                    let mut result = Vec::with_capacity(rows.len());
                    for row in &rows {
                        let values = (0..row.len())
                            .map(|i| row.try_get::<Option<String>, _>(i))
                            .collect::<Result<Row, sqlx::Error>>()?;
                        result.push(values);
                    }
                    Ok(RowSet::new(result))
                });
                fut.await
            }
        }
    };
}

#[cfg(feature = "sqlite")]
impl_sqlx_connection!(sqlx::SqliteConnection, DialectKind::Sqlite);

#[cfg(feature = "postgres")]
impl_sqlx_connection!(sqlx::PgConnection, DialectKind::Postgres);

#[cfg(feature = "mysql")]
impl_sqlx_connection!(sqlx::MySqlConnection, DialectKind::MySql);
