//! Declared schema model.
//!
//! These types describe the tables a caller wants to exist. The same types
//! are produced by the catalog introspector when reading the live database,
//! so the diff engine can compare like with like.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ReconcileError, Result};

/// A database namespace that tables are realized in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schema {
    name: String,
}

impl Schema {
    /// Creates a schema reference by name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Returns the schema name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Logical column types.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    /// Integer (32-bit).
    Integer,
    /// Big integer (64-bit).
    BigInt,
    /// Small integer (16-bit).
    SmallInt,
    /// Variable-length character string.
    Varchar(u32),
    /// Fixed-length character string.
    Char(u32),
    /// Unbounded text.
    Text,
    /// Boolean.
    Boolean,
    /// Floating point (single precision).
    Real,
    /// Floating point (double precision).
    Double,
    /// Decimal with precision and scale.
    Decimal(u8, u8),
    /// Date only.
    Date,
    /// Date and time.
    Timestamp,
    /// Binary large object.
    Blob,
    /// UUID.
    Uuid,
    /// A raw, dialect-specific type name.
    Custom(String),
}

/// Default value for a column.
///
/// Rendered per dialect by
/// [`CapabilityProfile::default_literal`](crate::dialect::CapabilityProfile::default_literal).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefaultValue {
    /// NULL default.
    Null,
    /// Boolean default.
    Bool(bool),
    /// Integer default.
    Integer(i64),
    /// String literal default.
    String(String),
    /// SQL expression (e.g., "CURRENT_TIMESTAMP").
    Expression(String),
}

/// A table column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    name: String,
    column_type: ColumnType,
    #[serde(default = "nullable_by_default")]
    nullable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    default: Option<DefaultValue>,
}

fn nullable_by_default() -> bool {
    true
}

impl Column {
    /// Creates a nullable column.
    #[must_use]
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            nullable: true,
            default: None,
        }
    }

    /// Sets the column as NOT NULL.
    #[must_use]
    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Sets the default value.
    #[must_use]
    pub fn default_value(mut self, value: DefaultValue) -> Self {
        self.default = Some(value);
        self
    }

    /// Column name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Column type.
    #[must_use]
    pub fn column_type(&self) -> &ColumnType {
        &self.column_type
    }

    /// Whether NULL is allowed.
    #[must_use]
    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// Default value, if any.
    #[must_use]
    pub fn default(&self) -> Option<&DefaultValue> {
        self.default.as_ref()
    }
}

/// Primary key of a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimaryKey {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    columns: Vec<String>,
}

impl PrimaryKey {
    /// Constraint name, if one was given explicitly.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Key columns in order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }
}

/// A secondary index.
///
/// `index_type` is an optional storage-type hint such as `HASH` or
/// `NONCLUSTERED`. It is stored upper-case; `None` means the dialect's
/// default index kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Index {
    name: String,
    columns: Vec<String>,
    #[serde(default)]
    unique: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    index_type: Option<String>,
}

impl Index {
    /// Creates a non-unique index over `columns`.
    #[must_use]
    pub fn new<I, S>(name: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            columns: columns.into_iter().map(Into::into).collect(),
            unique: false,
            index_type: None,
        }
    }

    /// Marks the index as unique.
    #[must_use]
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Sets the storage-type hint.
    #[must_use]
    pub fn index_type(mut self, index_type: impl AsRef<str>) -> Self {
        self.index_type = Some(index_type.as_ref().trim().to_ascii_uppercase());
        self
    }

    /// Index name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Indexed columns in order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Whether the index enforces uniqueness.
    #[must_use]
    pub fn is_unique(&self) -> bool {
        self.unique
    }

    /// Storage-type hint, if any.
    #[must_use]
    pub fn storage_type(&self) -> Option<&str> {
        self.index_type.as_deref()
    }
}

/// A table definition.
///
/// Tables are immutable once built; use [`Table::builder`] to declare one.
/// Deserialization runs the same validation as [`TableBuilder::build`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TableDef")]
pub struct Table {
    name: String,
    columns: Vec<Column>,
    #[serde(skip_serializing_if = "Option::is_none")]
    primary_key: Option<PrimaryKey>,
    indexes: Vec<Index>,
}

#[derive(Deserialize)]
struct TableDef {
    name: String,
    columns: Vec<Column>,
    #[serde(default)]
    primary_key: Option<PrimaryKey>,
    #[serde(default)]
    indexes: Vec<Index>,
}

impl TryFrom<TableDef> for Table {
    type Error = ReconcileError;

    fn try_from(def: TableDef) -> Result<Self> {
        let mut builder = Table::builder(def.name);
        builder.columns = def.columns;
        builder.primary_key = def.primary_key;
        builder.indexes = def.indexes;
        builder.build()
    }
}

impl Table {
    /// Starts declaring a table.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> TableBuilder {
        TableBuilder {
            name: name.into(),
            columns: Vec::new(),
            primary_key: None,
            indexes: Vec::new(),
        }
    }

    /// Table name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Columns in declaration order.
    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Primary key, if declared.
    #[must_use]
    pub fn primary_key(&self) -> Option<&PrimaryKey> {
        self.primary_key.as_ref()
    }

    /// Indexes in declaration order.
    #[must_use]
    pub fn indexes(&self) -> &[Index] {
        &self.indexes
    }

    /// Gets a column by name (ASCII case-insensitive).
    #[must_use]
    pub fn get_column(&self, name: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Gets an index by name (ASCII case-insensitive).
    #[must_use]
    pub fn get_index(&self, name: &str) -> Option<&Index> {
        self.indexes
            .iter()
            .find(|i| i.name.eq_ignore_ascii_case(name))
    }

    /// Builds a table from introspected parts without re-validating them.
    pub(crate) fn from_catalog(
        name: String,
        columns: Vec<Column>,
        primary_key: Option<Vec<String>>,
        indexes: Vec<Index>,
    ) -> Self {
        Self {
            name,
            columns,
            primary_key: primary_key.map(|columns| PrimaryKey {
                name: None,
                columns,
            }),
            indexes,
        }
    }
}

/// Builder for [`Table`].
#[derive(Debug, Clone)]
pub struct TableBuilder {
    name: String,
    columns: Vec<Column>,
    primary_key: Option<PrimaryKey>,
    indexes: Vec<Index>,
}

impl TableBuilder {
    /// Adds a column.
    #[must_use]
    pub fn column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    /// Sets the primary key columns.
    #[must_use]
    pub fn primary_key<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.primary_key = Some(PrimaryKey {
            name: None,
            columns: columns.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// Sets a primary key with an explicit constraint name.
    #[must_use]
    pub fn named_primary_key<I, S>(mut self, name: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.primary_key = Some(PrimaryKey {
            name: Some(name.into()),
            columns: columns.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// Adds an index.
    #[must_use]
    pub fn index(mut self, index: Index) -> Self {
        self.indexes.push(index);
        self
    }

    /// Adds an index named after the table and its columns:
    /// `{table}_{col}_{col}`, with a `_unique` suffix for unique indexes.
    #[must_use]
    pub fn auto_index<I, S>(self, columns: I, unique: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        let mut name = format!("{}_{}", self.name, columns.join("_"));
        if unique {
            name.push_str("_unique");
        }
        let index = Index::new(name, columns);
        self.index(if unique { index.unique() } else { index })
    }

    /// Validates the declaration and produces the table.
    pub fn build(mut self) -> Result<Table> {
        let table = self.name.as_str();
        if table.trim().is_empty() {
            return Err(ReconcileError::invalid_definition(table, "table name is empty"));
        }
        if self.columns.is_empty() {
            return Err(ReconcileError::invalid_definition(table, "table has no columns"));
        }

        let mut seen = HashSet::new();
        for column in &self.columns {
            if !seen.insert(column.name.to_ascii_lowercase()) {
                return Err(ReconcileError::invalid_definition(
                    table,
                    format!("duplicate column '{}'", column.name),
                ));
            }
        }

        if let Some(pk) = &self.primary_key {
            if pk.columns.is_empty() {
                return Err(ReconcileError::invalid_definition(
                    table,
                    "primary key has no columns",
                ));
            }
            for name in &pk.columns {
                if !seen.contains(&name.to_ascii_lowercase()) {
                    return Err(ReconcileError::invalid_definition(
                        table,
                        format!("primary key references unknown column '{}'", name),
                    ));
                }
            }
        }

        let mut index_names = HashSet::new();
        for index in &self.indexes {
            if !index_names.insert(index.name.to_ascii_lowercase()) {
                return Err(ReconcileError::invalid_definition(
                    table,
                    format!("duplicate index '{}'", index.name),
                ));
            }
            if index.columns.is_empty() {
                return Err(ReconcileError::invalid_definition(
                    table,
                    format!("index '{}' has no columns", index.name),
                ));
            }
            if let Some(missing) = index
                .columns
                .iter()
                .find(|c| !seen.contains(&c.to_ascii_lowercase()))
            {
                return Err(ReconcileError::invalid_definition(
                    table,
                    format!("index '{}' references unknown column '{}'", index.name, missing),
                ));
            }
        }

        for index in &mut self.indexes {
            if let Some(index_type) = &mut index.index_type {
                *index_type = index_type.trim().to_ascii_uppercase();
            }
        }

        // Primary keys are always NOT NULL
        if let Some(pk) = &self.primary_key {
            for column in &mut self.columns {
                if pk
                    .columns
                    .iter()
                    .any(|c| c.eq_ignore_ascii_case(&column.name))
                {
                    column.nullable = false;
                }
            }
        }

        Ok(Table {
            name: self.name,
            columns: self.columns,
            primary_key: self.primary_key,
            indexes: self.indexes,
        })
    }
}
