//! Structural diff between a declared table and its live counterpart.
//!
//! The diff is additive only: it lists what the database lacks, never what
//! it has in excess, and it ignores type or nullability drift on columns
//! that already exist.

use crate::dialect::NameMatching;
use crate::schema::{Column, Index, Table};

/// One missing piece of a declared table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructuralDiff<'a> {
    /// The table does not exist at all.
    MissingTable(&'a Table),
    /// The table exists but lacks a declared column.
    MissingColumn {
        /// Declared table.
        table: &'a Table,
        /// Column to add.
        column: &'a Column,
    },
    /// The table exists but lacks a declared index.
    MissingIndex {
        /// Declared table.
        table: &'a Table,
        /// Index to create.
        index: &'a Index,
    },
}

impl<'a> StructuralDiff<'a> {
    /// The declared table this entry belongs to.
    #[must_use]
    pub fn table(&self) -> &'a Table {
        match *self {
            Self::MissingTable(table)
            | Self::MissingColumn { table, .. }
            | Self::MissingIndex { table, .. } => table,
        }
    }
}

/// Compares a declared table with its live definition.
///
/// `current` is `None` when the table does not exist. Otherwise every
/// declared column absent from `current` is listed first, then every absent
/// index, each group in declaration order. Names compare ASCII
/// case-insensitively; use [`diff_matching`] to follow a dialect's rule.
#[must_use]
pub fn diff<'a>(declared: &'a Table, current: Option<&Table>) -> Vec<StructuralDiff<'a>> {
    diff_matching(declared, current, NameMatching::CaseInsensitive)
}

/// Like [`diff`], comparing names with `matching`.
#[must_use]
pub fn diff_matching<'a>(
    declared: &'a Table,
    current: Option<&Table>,
    matching: NameMatching,
) -> Vec<StructuralDiff<'a>> {
    let Some(current) = current else {
        return vec![StructuralDiff::MissingTable(declared)];
    };

    let columns = declared
        .columns()
        .iter()
        .filter(|column| {
            !current
                .columns()
                .iter()
                .any(|live| matching.matches(live.name(), column.name()))
        })
        .map(|column| StructuralDiff::MissingColumn {
            table: declared,
            column,
        });

    let indexes = declared
        .indexes()
        .iter()
        .filter(|index| {
            !current
                .indexes()
                .iter()
                .any(|live| matching.matches(live.name(), index.name()))
        })
        .map(|index| StructuralDiff::MissingIndex {
            table: declared,
            index,
        });

    columns.chain(indexes).collect()
}
