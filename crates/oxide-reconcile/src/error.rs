//! Error types for the reconciliation engine.

use crate::dialect::DialectKind;

/// Failure reported by a [`Connection`](crate::connection::Connection).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConnectionError {
    /// The database received the statement and refused it.
    #[error("database rejected statement: {message}")]
    Rejected {
        /// Vendor error code, when the driver exposes one.
        code: Option<String>,
        /// Vendor error message.
        message: String,
    },

    /// The statement never got a verdict (I/O, auth, pool, protocol).
    #[error("connection failure: {0}")]
    Transport(String),
}

impl From<sqlx::Error> for ConnectionError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db) => Self::Rejected {
                code: db.code().map(|c| c.into_owned()),
                message: db.message().to_string(),
            },
            other => Self::Transport(other.to_string()),
        }
    }
}

/// Errors that can occur while introspecting or reconciling a schema.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReconcileError {
    /// Transport or authentication failure talking to the database.
    #[error("Connection error: {0}")]
    Connection(#[from] ConnectionError),

    /// The catalog returned metadata that could not be understood.
    #[error("Unparsable catalog metadata for table '{table}': {message}")]
    CatalogParse {
        /// Table being introspected.
        table: String,
        /// What was wrong with the metadata.
        message: String,
    },

    /// An index declares a storage type the target dialect cannot create.
    #[error("Index '{index}' on '{table}' uses storage type '{index_type}', which {dialect} does not support")]
    UnsupportedIndexType {
        /// Owning table.
        table: String,
        /// Index name.
        index: String,
        /// The rejected storage-type token.
        index_type: String,
        /// Target dialect.
        dialect: DialectKind,
    },

    /// The database rejected a generated statement.
    #[error("Statement failed: {statement}: {source}")]
    StatementExecution {
        /// The offending statement text.
        statement: String,
        /// What the database said.
        source: ConnectionError,
    },

    /// A table declaration violates a model invariant.
    #[error("Invalid definition of table '{table}': {message}")]
    InvalidDefinition {
        /// Declared table name.
        table: String,
        /// Violated invariant.
        message: String,
    },

    /// The dialect has no way to perform the requested operation.
    #[error("{operation} is not supported by {dialect}")]
    UnsupportedOperation {
        /// Operation name.
        operation: &'static str,
        /// Target dialect.
        dialect: DialectKind,
    },

    /// A dialect name did not match any supported database.
    #[error("Unknown dialect: {0}")]
    UnknownDialect(String),
}

/// Discriminant of [`ReconcileError`], convenient for inspecting reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`ReconcileError::Connection`].
    Connection,
    /// See [`ReconcileError::CatalogParse`].
    CatalogParse,
    /// See [`ReconcileError::UnsupportedIndexType`].
    UnsupportedIndexType,
    /// See [`ReconcileError::StatementExecution`].
    StatementExecution,
    /// See [`ReconcileError::InvalidDefinition`].
    InvalidDefinition,
    /// See [`ReconcileError::UnsupportedOperation`].
    UnsupportedOperation,
    /// See [`ReconcileError::UnknownDialect`].
    UnknownDialect,
}

impl ReconcileError {
    /// Returns the kind of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Connection(_) => ErrorKind::Connection,
            Self::CatalogParse { .. } => ErrorKind::CatalogParse,
            Self::UnsupportedIndexType { .. } => ErrorKind::UnsupportedIndexType,
            Self::StatementExecution { .. } => ErrorKind::StatementExecution,
            Self::InvalidDefinition { .. } => ErrorKind::InvalidDefinition,
            Self::UnsupportedOperation { .. } => ErrorKind::UnsupportedOperation,
            Self::UnknownDialect(_) => ErrorKind::UnknownDialect,
        }
    }

    pub(crate) fn catalog_parse(table: &str, message: impl Into<String>) -> Self {
        Self::CatalogParse {
            table: table.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn invalid_definition(table: &str, message: impl Into<String>) -> Self {
        Self::InvalidDefinition {
            table: table.to_string(),
            message: message.into(),
        }
    }
}

/// Result type for reconciliation operations.
pub type Result<T> = std::result::Result<T, ReconcileError>;
