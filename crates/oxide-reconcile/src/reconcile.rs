//! Reconciliation entry point.
//!
//! For every declared table, in order: introspect the live table in the
//! session's schema, diff it against the declaration, generate the missing
//! DDL and execute it statement by statement. A failure halts only the
//! table it happened on; the batch moves on to the next table and every
//! outcome ends up in the [`ReconciliationReport`].

use tracing::{debug, info, warn};

use crate::catalog::Catalog;
use crate::connection::Connection;
use crate::ddl::DdlGenerator;
use crate::diff::diff_matching;
use crate::error::{ConnectionError, ReconcileError};
use crate::schema::{Schema, Table};
use crate::session::Session;

/// Options for the reconciler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileOptions {
    /// Plan statements without executing them.
    pub dry_run: bool,
}

impl ReconcileOptions {
    /// Creates default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables dry-run mode (introspection runs, DDL does not).
    #[must_use]
    pub fn dry_run(mut self, enabled: bool) -> Self {
        self.dry_run = enabled;
        self
    }
}

/// Outcome of reconciling one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableReport {
    /// Declared table name.
    pub table: String,
    /// Statements executed, in order (planned, in dry-run mode).
    pub applied: Vec<String>,
    /// Indexes skipped because the dialect cannot create their storage type.
    pub rejected: Vec<ReconcileError>,
    /// The error that halted this table, if any.
    pub error: Option<ReconcileError>,
}

impl TableReport {
    fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            applied: Vec::new(),
            rejected: Vec::new(),
            error: None,
        }
    }

    /// Whether the table now matches its declaration.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.error.is_none() && self.rejected.is_empty()
    }

    /// Whether the table needed no change.
    #[must_use]
    pub fn is_up_to_date(&self) -> bool {
        self.is_success() && self.applied.is_empty()
    }
}

/// Outcome of a reconciliation batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciliationReport {
    /// The schema reconciled into, if it could be determined.
    pub schema: Option<Schema>,
    /// Whether statements were only planned.
    pub dry_run: bool,
    /// One entry per declared table, in declaration order.
    pub tables: Vec<TableReport>,
}

impl ReconciliationReport {
    /// The report for a table (ASCII case-insensitive).
    #[must_use]
    pub fn get(&self, table: &str) -> Option<&TableReport> {
        self.tables
            .iter()
            .find(|report| report.table.eq_ignore_ascii_case(table))
    }

    /// Whether every table was reconciled without error or rejection.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.tables.iter().all(TableReport::is_success)
    }

    /// Total number of statements applied across tables.
    #[must_use]
    pub fn statement_count(&self) -> usize {
        self.tables.iter().map(|report| report.applied.len()).sum()
    }
}

/// Brings live tables up to their declarations.
#[derive(Debug, Clone, Default)]
pub struct Reconciler {
    options: ReconcileOptions,
}

impl Reconciler {
    /// Creates a reconciler with default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a reconciler with custom options.
    #[must_use]
    pub fn with_options(options: ReconcileOptions) -> Self {
        Self { options }
    }

    /// The options in use.
    #[must_use]
    pub fn options(&self) -> ReconcileOptions {
        self.options
    }

    /// Reconciles `tables` into the session's current schema.
    ///
    /// Never fails as a whole: every error is recorded against the table it
    /// belongs to.
    pub async fn reconcile<C: Connection>(
        &self,
        session: &mut Session<C>,
        tables: &[Table],
    ) -> ReconciliationReport {
        self.run(session, tables, self.options.dry_run).await
    }

    /// Computes the statements `reconcile` would run, without running them.
    pub async fn plan<C: Connection>(
        &self,
        session: &mut Session<C>,
        tables: &[Table],
    ) -> ReconciliationReport {
        self.run(session, tables, true).await
    }

    async fn run<C: Connection>(
        &self,
        session: &mut Session<C>,
        tables: &[Table],
        dry_run: bool,
    ) -> ReconciliationReport {
        let schema = match session.current_schema().await {
            Ok(schema) => schema,
            Err(err) => {
                warn!(error = %err, "Could not determine current schema");
                return ReconciliationReport {
                    schema: None,
                    dry_run,
                    tables: tables
                        .iter()
                        .map(|table| TableReport {
                            error: Some(err.clone()),
                            ..TableReport::new(table.name())
                        })
                        .collect(),
                };
            }
        };

        info!(
            schema = %schema,
            dialect = %session.dialect(),
            tables = tables.len(),
            dry_run,
            "Reconciling schema"
        );

        let mut reports = Vec::with_capacity(tables.len());
        for table in tables {
            let report = reconcile_table(session, &schema, table, dry_run).await;
            reports.push(report);
        }

        ReconciliationReport {
            schema: Some(schema),
            dry_run,
            tables: reports,
        }
    }
}

async fn reconcile_table<C: Connection>(
    session: &mut Session<C>,
    schema: &Schema,
    table: &Table,
    dry_run: bool,
) -> TableReport {
    let mut report = TableReport::new(table.name());
    let profile = session.capabilities();

    let current = match Catalog::new(profile)
        .introspect(session.connection_mut(), schema, table.name())
        .await
    {
        Ok(current) => current,
        Err(err) => {
            warn!(table = %table.name(), error = %err, "Introspection failed, skipping table");
            report.error = Some(err);
            return report;
        }
    };

    let entries = diff_matching(table, current.as_ref(), profile.name_matching());
    if entries.is_empty() {
        debug!(table = %table.name(), "Table is up to date");
        return report;
    }
    info!(table = %table.name(), changes = entries.len(), "Reconciling table");

    for statement in DdlGenerator::new(profile).generate(&entries, schema) {
        let sql = match statement {
            Ok(sql) => sql,
            Err(err) => {
                warn!(table = %table.name(), error = %err, "Skipping index");
                report.rejected.push(err);
                continue;
            }
        };

        if dry_run {
            debug!(table = %table.name(), sql = %sql, "Planned statement");
            report.applied.push(sql);
            continue;
        }

        debug!(table = %table.name(), sql = %sql, "Executing statement");
        if let Err(err) = session.connection_mut().execute(&sql).await {
            let err = execution_error(sql, err);
            warn!(table = %table.name(), error = %err, "Statement failed, halting table");
            report.error = Some(err);
            break;
        }
        report.applied.push(sql);
    }

    report
}

fn execution_error(statement: String, err: ConnectionError) -> ReconcileError {
    match err {
        ConnectionError::Rejected { .. } => ReconcileError::StatementExecution {
            statement,
            source: err,
        },
        ConnectionError::Transport(_) => ReconcileError::Connection(err),
    }
}
