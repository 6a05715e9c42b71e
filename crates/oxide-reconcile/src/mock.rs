//! Scripted connection for unit tests.

use crate::connection::{Connection, Row, RowSet};
use crate::dialect::DialectKind;
use crate::error::ConnectionError;

/// Records every statement and answers queries from canned results.
///
/// Responses and failures are matched by substring; the first match wins.
/// Queries with no matching response return an empty row set.
pub(crate) struct MockConnection {
    dialect: DialectKind,
    pub(crate) executed: Vec<String>,
    pub(crate) queries: Vec<String>,
    responses: Vec<(String, RowSet)>,
    failures: Vec<(String, ConnectionError)>,
}

impl MockConnection {
    pub(crate) fn new(dialect: DialectKind) -> Self {
        Self {
            dialect,
            executed: Vec::new(),
            queries: Vec::new(),
            responses: Vec::new(),
            failures: Vec::new(),
        }
    }

    pub(crate) fn respond(mut self, needle: &str, rows: RowSet) -> Self {
        self.responses.push((needle.to_string(), rows));
        self
    }

    pub(crate) fn fail_on(mut self, needle: &str, err: ConnectionError) -> Self {
        self.failures.push((needle.to_string(), err));
        self
    }

    fn failure(&self, sql: &str) -> Option<ConnectionError> {
        self.failures
            .iter()
            .find(|(needle, _)| sql.contains(needle.as_str()))
            .map(|(_, err)| err.clone())
    }
}

impl Connection for MockConnection {
    fn dialect(&self) -> DialectKind {
        self.dialect
    }

    async fn execute(&mut self, sql: &str) -> Result<(), ConnectionError> {
        if let Some(err) = self.failure(sql) {
            return Err(err);
        }
        self.executed.push(sql.to_string());
        Ok(())
    }

    async fn query(&mut self, sql: &str) -> Result<RowSet, ConnectionError> {
        self.queries.push(sql.to_string());
        if let Some(err) = self.failure(sql) {
            return Err(err);
        }
        Ok(self
            .responses
            .iter()
            .find(|(needle, _)| sql.contains(needle.as_str()))
            .map(|(_, rows)| rows.clone())
            .unwrap_or_default())
    }
}

/// Builds a catalog row from optional text values.
pub(crate) fn row(values: &[Option<&str>]) -> Row {
    values.iter().map(|v| v.map(str::to_string)).collect()
}

/// Builds a row set from rows of non-null text values.
pub(crate) fn rows(values: &[&[&str]]) -> RowSet {
    values
        .iter()
        .map(|r| r.iter().map(|v| Some((*v).to_string())).collect())
        .collect()
}

pub(crate) fn rejected(message: &str) -> ConnectionError {
    ConnectionError::Rejected {
        code: None,
        message: message.to_string(),
    }
}
