//! DDL generation.
//!
//! Turns [`StructuralDiff`] entries into schema-qualified statements for one
//! dialect. All dialect knowledge comes from the [`CapabilityProfile`]; the
//! generator itself never branches on [`DialectKind`](crate::DialectKind).

use crate::dialect::{CapabilityProfile, IndexQualification, IndexTypePlacement, IndexTypeSupport};
use crate::diff::StructuralDiff;
use crate::error::{ReconcileError, Result};
use crate::schema::{Column, Index, Schema, Table};

/// Generates DDL statements for a dialect.
#[derive(Debug, Clone, Copy)]
pub struct DdlGenerator {
    profile: &'static CapabilityProfile,
}

impl DdlGenerator {
    /// Creates a generator for a dialect profile.
    #[must_use]
    pub fn new(profile: &'static CapabilityProfile) -> Self {
        Self { profile }
    }

    /// The profile statements are generated for.
    #[must_use]
    pub fn profile(&self) -> &'static CapabilityProfile {
        self.profile
    }

    /// Generates the statements closing a diff, in execution order.
    ///
    /// A missing table yields `CREATE TABLE` followed by one `CREATE INDEX`
    /// per declared index. An index whose storage type the dialect cannot
    /// create yields an `Err` in its slot; every other slot is unaffected.
    #[must_use]
    pub fn generate(&self, diff: &[StructuralDiff<'_>], schema: &Schema) -> Vec<Result<String>> {
        let mut statements = Vec::new();
        for entry in diff {
            match *entry {
                StructuralDiff::MissingTable(table) => {
                    statements.push(Ok(self.create_table(table, schema)));
                    for index in table.indexes() {
                        statements.push(self.create_index(table, index, schema));
                    }
                }
                StructuralDiff::MissingColumn { table, column } => {
                    statements.push(Ok(self.add_column(table, column, schema)));
                }
                StructuralDiff::MissingIndex { table, index } => {
                    statements.push(self.create_index(table, index, schema));
                }
            }
        }
        statements
    }

    /// `CREATE TABLE` with an inline, named primary key constraint.
    ///
    /// The constraint is named `pk_{table}` unless the declaration names it.
    #[must_use]
    pub fn create_table(&self, table: &Table, schema: &Schema) -> String {
        let mut parts: Vec<String> = table
            .columns()
            .iter()
            .map(|column| self.column_definition(column))
            .collect();

        if let Some(pk) = table.primary_key() {
            let name = pk
                .name()
                .map_or_else(|| format!("pk_{}", table.name()), str::to_string);
            parts.push(format!(
                "CONSTRAINT {} PRIMARY KEY ({})",
                self.profile.quote_identifier(&name),
                self.column_list(pk.columns())
            ));
        }

        format!(
            "CREATE TABLE {} ({})",
            self.profile.qualify(schema, table.name()),
            parts.join(", ")
        )
    }

    /// `ALTER TABLE ... ADD [COLUMN] ...`.
    #[must_use]
    pub fn add_column(&self, table: &Table, column: &Column, schema: &Schema) -> String {
        format!(
            "ALTER TABLE {} {} {}",
            self.profile.qualify(schema, table.name()),
            self.profile.add_column_keyword(),
            self.column_definition(column)
        )
    }

    /// `CREATE [UNIQUE] INDEX`, honoring the index's storage-type hint.
    pub fn create_index(&self, table: &Table, index: &Index, schema: &Schema) -> Result<String> {
        let clause = match index.storage_type() {
            None => None,
            Some(token) => match self.profile.index_type_support(token) {
                None => {
                    return Err(ReconcileError::UnsupportedIndexType {
                        table: table.name().to_string(),
                        index: index.name().to_string(),
                        index_type: token.to_string(),
                        dialect: self.profile.kind(),
                    })
                }
                Some(IndexTypeSupport::DefaultFallback) => None,
                Some(IndexTypeSupport::Native) => {
                    Some(self.profile.index_type_clause().render(token))
                }
            },
        };
        let placement = self.profile.index_type_clause().placement;
        let clause_at = |at: IndexTypePlacement| clause.as_deref().filter(|_| placement == at);

        let (index_name, target) = match self.profile.index_qualification() {
            IndexQualification::Table => (
                self.profile.quote_identifier(index.name()),
                self.profile.qualify(schema, table.name()),
            ),
            IndexQualification::IndexName => (
                self.profile.qualify(schema, index.name()),
                self.profile.quote_identifier(table.name()),
            ),
        };

        let mut sql = String::from("CREATE ");
        if index.is_unique() {
            sql.push_str("UNIQUE ");
        }
        if let Some(clause) = clause_at(IndexTypePlacement::BeforeIndexKeyword) {
            sql.push_str(clause);
            sql.push(' ');
        }
        sql.push_str("INDEX ");
        sql.push_str(&index_name);
        sql.push_str(" ON ");
        sql.push_str(&target);
        if let Some(clause) = clause_at(IndexTypePlacement::BeforeColumns) {
            sql.push(' ');
            sql.push_str(clause);
        }
        sql.push_str(" (");
        sql.push_str(&self.column_list(index.columns()));
        sql.push(')');
        if let Some(clause) = clause_at(IndexTypePlacement::AfterColumns) {
            sql.push(' ');
            sql.push_str(clause);
        }
        Ok(sql)
    }

    /// A column definition as used in `CREATE TABLE` and `ADD COLUMN`.
    #[must_use]
    pub fn column_definition(&self, column: &Column) -> String {
        let mut sql = format!(
            "{} {}",
            self.profile.quote_identifier(column.name()),
            self.profile.type_name(column.column_type())
        );
        if let Some(default) = column.default() {
            sql.push_str(" DEFAULT ");
            sql.push_str(&self.profile.default_literal(default));
        }
        if !column.is_nullable() {
            sql.push_str(" NOT NULL");
        }
        sql
    }

    fn column_list(&self, columns: &[String]) -> String {
        columns
            .iter()
            .map(|c| self.profile.quote_identifier(c))
            .collect::<Vec<_>>()
            .join(", ")
    }
}
