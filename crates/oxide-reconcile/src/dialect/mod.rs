//! Dialect capability table.
//!
//! Everything the engine needs to know about a database product lives in
//! one [`CapabilityProfile`] per [`DialectKind`]: identifier quoting, which
//! index storage types exist and how they are spelled, how DDL is
//! schema-qualified, and which catalog queries describe a table. Statement
//! generation and introspection consult the profile instead of branching on
//! the dialect themselves.

mod profiles;

use std::fmt;
use std::str::FromStr;

use crate::error::ReconcileError;
use crate::schema::{ColumnType, DefaultValue, Schema};

/// The closed set of supported database products.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DialectKind {
    /// SQLite; schemas are attached databases.
    Sqlite,
    /// PostgreSQL.
    Postgres,
    /// MySQL / MariaDB; schemas are databases.
    MySql,
    /// Microsoft SQL Server.
    SqlServer,
    /// Oracle Database; schemas are users.
    Oracle,
}

impl DialectKind {
    /// All supported dialects.
    pub const ALL: [Self; 5] = [
        Self::Sqlite,
        Self::Postgres,
        Self::MySql,
        Self::SqlServer,
        Self::Oracle,
    ];

    /// Human-readable product name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Sqlite => "SQLite",
            Self::Postgres => "PostgreSQL",
            Self::MySql => "MySQL",
            Self::SqlServer => "SQL Server",
            Self::Oracle => "Oracle",
        }
    }

    /// Returns the capability profile of this dialect.
    #[must_use]
    pub fn capabilities(self) -> &'static CapabilityProfile {
        capabilities_for(self)
    }
}

impl fmt::Display for DialectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DialectKind {
    type Err = ReconcileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlite" | "sqlite3" => Ok(Self::Sqlite),
            "postgres" | "postgresql" | "pg" => Ok(Self::Postgres),
            "mysql" | "mariadb" => Ok(Self::MySql),
            "sqlserver" | "mssql" => Ok(Self::SqlServer),
            "oracle" => Ok(Self::Oracle),
            _ => Err(ReconcileError::UnknownDialect(s.to_string())),
        }
    }
}

/// Returns the capability profile for a dialect.
#[must_use]
pub fn capabilities_for(kind: DialectKind) -> &'static CapabilityProfile {
    match kind {
        DialectKind::Sqlite => &profiles::SQLITE,
        DialectKind::Postgres => &profiles::POSTGRES,
        DialectKind::MySql => &profiles::MYSQL,
        DialectKind::SqlServer => &profiles::SQL_SERVER,
        DialectKind::Oracle => &profiles::ORACLE,
    }
}

/// How a dialect handles a storage-type hint it accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexTypeSupport {
    /// The token is rendered with the dialect's clause template.
    Native,
    /// The token is accepted but omitted; the default index kind is created.
    DefaultFallback,
}

/// Where the storage-type clause goes in `CREATE INDEX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexTypePlacement {
    /// `CREATE [UNIQUE] <clause> INDEX ...`
    BeforeIndexKeyword,
    /// `CREATE INDEX i ON t <clause> (cols)`
    BeforeColumns,
    /// `CREATE INDEX i ON t (cols) <clause>`
    AfterColumns,
}

/// Template and position of the storage-type clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexTypeClause {
    /// Clause position.
    pub placement: IndexTypePlacement,
    /// Clause text; `{type}` is replaced by the token.
    pub template: &'static str,
}

impl IndexTypeClause {
    /// Renders the clause for a token.
    #[must_use]
    pub fn render(&self, token: &str) -> String {
        render_template(self.template, &[("type", token)])
    }
}

/// Which name a schema-qualified `CREATE INDEX` qualifies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexQualification {
    /// `CREATE INDEX i ON s.t (...)`
    Table,
    /// `CREATE INDEX s.i ON t (...)`
    IndexName,
}

/// How identifiers compare when matching declared names with the catalog.
///
/// Follows how the dialect treats the quoted identifiers the generator
/// emits: a name that matches must refer to the same object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameMatching {
    /// Byte-for-byte; quoted identifiers are case-sensitive.
    Exact,
    /// ASCII case-insensitive; the dialect folds or ignores case.
    CaseInsensitive,
}

impl NameMatching {
    /// Whether two names refer to the same object.
    #[must_use]
    pub fn matches(self, a: &str, b: &str) -> bool {
        match self {
            Self::Exact => a == b,
            Self::CaseInsensitive => a.eq_ignore_ascii_case(b),
        }
    }
}

/// Catalog query templates.
///
/// Placeholders: `{schema}` and `{table}` become escaped string literals,
/// `{schema_ident}` becomes a quoted identifier. Result shapes:
///
/// - `tables`: `[table_name]`
/// - `columns`: `[name, data_type, nullable '1'|'0', pk_position '0' if none]`
/// - `indexes`: `[index_name, column_name?, unique '1'|'0', index_type?]`,
///   ordered by index then column position, primary key excluded
/// - `current_schema`: `[schema_name]`
#[derive(Debug, Clone, Copy)]
pub struct CatalogQueries {
    /// Lists the named table if it exists in the schema.
    pub tables: &'static str,
    /// Lists the table's columns.
    pub columns: &'static str,
    /// Lists the table's secondary index columns.
    pub indexes: &'static str,
    /// Returns the session's current schema.
    pub current_schema: &'static str,
}

/// Per-dialect facts consulted by statement generation and introspection.
pub struct CapabilityProfile {
    pub(crate) kind: DialectKind,
    pub(crate) quote: (char, char),
    pub(crate) backslash_escapes: bool,
    pub(crate) index_types: &'static [(&'static str, IndexTypeSupport)],
    pub(crate) index_type_clause: IndexTypeClause,
    pub(crate) index_qualification: IndexQualification,
    pub(crate) add_column_keyword: &'static str,
    pub(crate) type_name: fn(&ColumnType) -> String,
    pub(crate) bool_literals: (&'static str, &'static str),
    pub(crate) name_matching: NameMatching,
    pub(crate) set_schema: Option<&'static str>,
    pub(crate) reset_schema: Option<&'static str>,
    pub(crate) create_schema: Option<&'static str>,
    pub(crate) catalog: CatalogQueries,
}

impl fmt::Debug for CapabilityProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapabilityProfile")
            .field("kind", &self.kind)
            .field("quote", &self.quote)
            .field("index_types", &self.index_types)
            .field("index_type_clause", &self.index_type_clause)
            .field("index_qualification", &self.index_qualification)
            .finish_non_exhaustive()
    }
}

impl CapabilityProfile {
    /// The dialect this profile describes.
    #[must_use]
    pub fn kind(&self) -> DialectKind {
        self.kind
    }

    /// How the dialect handles a storage-type token, `None` if unsupported.
    #[must_use]
    pub fn index_type_support(&self, token: &str) -> Option<IndexTypeSupport> {
        self.index_types
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(token.trim()))
            .map(|&(_, support)| support)
    }

    /// Whether an index with this storage-type token can be created.
    #[must_use]
    pub fn supports_index_type(&self, token: &str) -> bool {
        self.index_type_support(token).is_some()
    }

    /// Storage-type clause template.
    #[must_use]
    pub fn index_type_clause(&self) -> IndexTypeClause {
        self.index_type_clause
    }

    /// Which name `CREATE INDEX` schema-qualifies.
    #[must_use]
    pub fn index_qualification(&self) -> IndexQualification {
        self.index_qualification
    }

    /// `ADD COLUMN` or `ADD`.
    #[must_use]
    pub fn add_column_keyword(&self) -> &'static str {
        self.add_column_keyword
    }

    /// Opening and closing identifier quote characters.
    #[must_use]
    pub fn identifier_quote(&self) -> (char, char) {
        self.quote
    }

    /// Quotes an identifier, doubling embedded closing quotes.
    #[must_use]
    pub fn quote_identifier(&self, name: &str) -> String {
        let (open, close) = self.quote;
        let mut quoted = String::with_capacity(name.len() + 2);
        quoted.push(open);
        for ch in name.chars() {
            if ch == close {
                quoted.push(close);
            }
            quoted.push(ch);
        }
        quoted.push(close);
        quoted
    }

    /// Quotes a string literal.
    #[must_use]
    pub fn quote_literal(&self, value: &str) -> String {
        let mut escaped = value.replace('\'', "''");
        if self.backslash_escapes {
            escaped = escaped.replace('\\', "\\\\");
        }
        format!("'{}'", escaped)
    }

    /// `schema.name`, both quoted.
    #[must_use]
    pub fn qualify(&self, schema: &Schema, name: &str) -> String {
        format!(
            "{}.{}",
            self.quote_identifier(schema.name()),
            self.quote_identifier(name)
        )
    }

    /// Dialect spelling of a column type.
    #[must_use]
    pub fn type_name(&self, column_type: &ColumnType) -> String {
        (self.type_name)(column_type)
    }

    /// Renders a column default: booleans use the dialect's literals and
    /// strings are quoted with [`quote_literal`](Self::quote_literal).
    #[must_use]
    pub fn default_literal(&self, value: &DefaultValue) -> String {
        let (true_literal, false_literal) = self.bool_literals;
        match value {
            DefaultValue::Null => "NULL".to_string(),
            DefaultValue::Bool(true) => true_literal.to_string(),
            DefaultValue::Bool(false) => false_literal.to_string(),
            DefaultValue::Integer(i) => i.to_string(),
            DefaultValue::String(s) => self.quote_literal(s),
            DefaultValue::Expression(expr) => expr.clone(),
        }
    }

    /// How declared names are matched against catalog names.
    #[must_use]
    pub fn name_matching(&self) -> NameMatching {
        self.name_matching
    }

    /// Statement making `schema` the session's current schema, if the
    /// dialect has one.
    #[must_use]
    pub fn set_schema_sql(&self, schema: &Schema) -> Option<String> {
        self.set_schema.map(|template| {
            render_template(template, &[("schema", &self.quote_identifier(schema.name()))])
        })
    }

    /// Statement restoring the session's default schema, if any.
    #[must_use]
    pub fn reset_schema_sql(&self) -> Option<&'static str> {
        self.reset_schema
    }

    /// Statement creating a schema, if the dialect can.
    #[must_use]
    pub fn create_schema_sql(&self, schema: &Schema) -> Option<String> {
        self.create_schema.map(|template| {
            render_template(template, &[("schema", &self.quote_identifier(schema.name()))])
        })
    }

    /// Catalog query templates.
    #[must_use]
    pub fn catalog(&self) -> &CatalogQueries {
        &self.catalog
    }

    /// Renders a catalog query for a schema and table.
    #[must_use]
    pub fn catalog_sql(&self, template: &str, schema: &Schema, table: &str) -> String {
        render_template(
            template,
            &[
                ("schema", &self.quote_literal(schema.name())),
                ("schema_ident", &self.quote_identifier(schema.name())),
                ("table", &self.quote_literal(table)),
            ],
        )
    }
}

/// Substitutes `{name}` placeholders in a single pass. Unknown placeholders
/// are left as-is, and substituted values are never rescanned.
pub(crate) fn render_template(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let replaced = after.find('}').and_then(|end| {
            let key = &after[..end];
            vars.iter()
                .find(|(name, _)| *name == key)
                .map(|(_, value)| (*value, end))
        });
        match replaced {
            Some((value, end)) => {
                out.push_str(value);
                rest = &after[end + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}
