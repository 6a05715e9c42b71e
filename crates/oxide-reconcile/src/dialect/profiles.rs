//! The capability profiles themselves, one static per dialect.

use crate::schema::ColumnType;

use super::{
    CapabilityProfile, CatalogQueries, DialectKind, IndexQualification, IndexTypeClause,
    IndexTypePlacement, IndexTypeSupport, NameMatching,
};

use IndexTypeSupport::{DefaultFallback, Native};

pub(super) static SQLITE: CapabilityProfile = CapabilityProfile {
    kind: DialectKind::Sqlite,
    quote: ('"', '"'),
    backslash_escapes: false,
    // SQLite only has b-tree indexes; hints for it are accepted and dropped.
    index_types: &[("BTREE", DefaultFallback), ("HASH", DefaultFallback)],
    index_type_clause: IndexTypeClause {
        placement: IndexTypePlacement::AfterColumns,
        template: "",
    },
    index_qualification: IndexQualification::IndexName,
    add_column_keyword: "ADD COLUMN",
    type_name: sqlite_type_name,
    bool_literals: ("1", "0"),
    name_matching: NameMatching::CaseInsensitive,
    set_schema: None,
    reset_schema: None,
    create_schema: Some("ATTACH DATABASE '' AS {schema}"),
    catalog: CatalogQueries {
        tables: "SELECT name FROM {schema_ident}.sqlite_master \
                 WHERE type = 'table' AND name = {table} COLLATE NOCASE",
        columns: "SELECT name, type, CASE WHEN \"notnull\" = 0 THEN '1' ELSE '0' END, \
                  CAST(pk AS TEXT) \
                  FROM pragma_table_info({table}, {schema}) ORDER BY cid",
        indexes: "SELECT il.name, ii.name, CAST(il.\"unique\" AS TEXT), NULL \
                  FROM pragma_index_list({table}, {schema}) AS il, \
                       pragma_index_info(il.name, {schema}) AS ii \
                  WHERE il.origin <> 'pk' \
                  ORDER BY il.name, ii.seqno",
        current_schema: "SELECT 'main'",
    },
};

pub(super) static POSTGRES: CapabilityProfile = CapabilityProfile {
    kind: DialectKind::Postgres,
    quote: ('"', '"'),
    backslash_escapes: false,
    index_types: &[
        ("BTREE", Native),
        ("HASH", Native),
        ("GIN", Native),
        ("GIST", Native),
        ("BRIN", Native),
        ("SPGIST", Native),
    ],
    index_type_clause: IndexTypeClause {
        placement: IndexTypePlacement::BeforeColumns,
        template: "USING {type}",
    },
    index_qualification: IndexQualification::Table,
    add_column_keyword: "ADD COLUMN",
    type_name: postgres_type_name,
    bool_literals: ("TRUE", "FALSE"),
    name_matching: NameMatching::Exact,
    set_schema: Some("SET search_path TO {schema}"),
    reset_schema: Some("RESET search_path"),
    create_schema: Some("CREATE SCHEMA IF NOT EXISTS {schema}"),
    catalog: CatalogQueries {
        tables: "SELECT table_name::text FROM information_schema.tables \
                 WHERE table_schema = {schema} AND table_name = {table} \
                 AND table_type = 'BASE TABLE'",
        columns: "SELECT c.column_name::text, c.data_type::text, \
                  CASE WHEN c.is_nullable = 'YES' THEN '1' ELSE '0' END, \
                  COALESCE((SELECT k.ordinal_position::text \
                            FROM information_schema.table_constraints tc \
                            JOIN information_schema.key_column_usage k \
                              ON k.constraint_schema = tc.constraint_schema \
                             AND k.constraint_name = tc.constraint_name \
                            WHERE tc.constraint_type = 'PRIMARY KEY' \
                              AND tc.table_schema = c.table_schema \
                              AND tc.table_name = c.table_name \
                              AND k.column_name = c.column_name), '0') \
                  FROM information_schema.columns c \
                  WHERE c.table_schema = {schema} AND c.table_name = {table} \
                  ORDER BY c.ordinal_position",
        indexes: "SELECT i.relname::text, a.attname::text, \
                  CASE WHEN ix.indisunique THEN '1' ELSE '0' END, upper(am.amname)::text \
                  FROM pg_class t \
                  JOIN pg_namespace n ON n.oid = t.relnamespace \
                  JOIN pg_index ix ON ix.indrelid = t.oid \
                  JOIN pg_class i ON i.oid = ix.indexrelid \
                  JOIN pg_am am ON am.oid = i.relam \
                  JOIN LATERAL unnest(ix.indkey) WITH ORDINALITY AS ord(attnum, ordinality) ON true \
                  LEFT JOIN pg_attribute a ON a.attrelid = t.oid AND a.attnum = ord.attnum \
                  WHERE n.nspname = {schema} AND t.relname = {table} AND NOT ix.indisprimary \
                  ORDER BY i.relname, ord.ordinality",
        current_schema: "SELECT current_schema()::text",
    },
};

pub(super) static MYSQL: CapabilityProfile = CapabilityProfile {
    kind: DialectKind::MySql,
    quote: ('`', '`'),
    backslash_escapes: true,
    index_types: &[("BTREE", Native), ("HASH", Native)],
    index_type_clause: IndexTypeClause {
        placement: IndexTypePlacement::AfterColumns,
        template: "USING {type}",
    },
    index_qualification: IndexQualification::Table,
    add_column_keyword: "ADD COLUMN",
    type_name: mysql_type_name,
    bool_literals: ("1", "0"),
    name_matching: NameMatching::CaseInsensitive,
    set_schema: Some("USE {schema}"),
    reset_schema: None,
    create_schema: Some("CREATE SCHEMA IF NOT EXISTS {schema}"),
    catalog: CatalogQueries {
        tables: "SELECT CAST(TABLE_NAME AS CHAR) FROM information_schema.TABLES \
                 WHERE TABLE_SCHEMA = {schema} AND TABLE_NAME = {table} \
                 AND TABLE_TYPE = 'BASE TABLE'",
        columns: "SELECT CAST(c.COLUMN_NAME AS CHAR), CAST(c.COLUMN_TYPE AS CHAR), \
                  CASE WHEN c.IS_NULLABLE = 'YES' THEN '1' ELSE '0' END, \
                  CAST(COALESCE((SELECT s.SEQ_IN_INDEX FROM information_schema.STATISTICS s \
                                 WHERE s.TABLE_SCHEMA = c.TABLE_SCHEMA \
                                   AND s.TABLE_NAME = c.TABLE_NAME \
                                   AND s.INDEX_NAME = 'PRIMARY' \
                                   AND s.COLUMN_NAME = c.COLUMN_NAME), 0) AS CHAR) \
                  FROM information_schema.COLUMNS c \
                  WHERE c.TABLE_SCHEMA = {schema} AND c.TABLE_NAME = {table} \
                  ORDER BY c.ORDINAL_POSITION",
        indexes: "SELECT CAST(INDEX_NAME AS CHAR), CAST(COLUMN_NAME AS CHAR), \
                  CASE WHEN NON_UNIQUE = 0 THEN '1' ELSE '0' END, CAST(INDEX_TYPE AS CHAR) \
                  FROM information_schema.STATISTICS \
                  WHERE TABLE_SCHEMA = {schema} AND TABLE_NAME = {table} \
                  AND INDEX_NAME <> 'PRIMARY' \
                  ORDER BY INDEX_NAME, SEQ_IN_INDEX",
        current_schema: "SELECT CAST(DATABASE() AS CHAR)",
    },
};

pub(super) static SQL_SERVER: CapabilityProfile = CapabilityProfile {
    kind: DialectKind::SqlServer,
    quote: ('[', ']'),
    backslash_escapes: false,
    index_types: &[("CLUSTERED", Native), ("NONCLUSTERED", Native)],
    index_type_clause: IndexTypeClause {
        placement: IndexTypePlacement::BeforeIndexKeyword,
        template: "{type}",
    },
    index_qualification: IndexQualification::Table,
    add_column_keyword: "ADD",
    type_name: sql_server_type_name,
    bool_literals: ("1", "0"),
    name_matching: NameMatching::CaseInsensitive,
    // The default schema belongs to the login, not the session.
    set_schema: None,
    reset_schema: None,
    create_schema: Some("CREATE SCHEMA {schema}"),
    catalog: CatalogQueries {
        tables: "SELECT CAST(t.name AS NVARCHAR(128)) FROM sys.tables t \
                 JOIN sys.schemas s ON s.schema_id = t.schema_id \
                 WHERE s.name = N{schema} AND t.name = N{table}",
        columns: "SELECT CAST(c.COLUMN_NAME AS NVARCHAR(128)), CAST(c.DATA_TYPE AS NVARCHAR(128)), \
                  CASE WHEN c.IS_NULLABLE = 'YES' THEN '1' ELSE '0' END, \
                  CAST(COALESCE((SELECT k.ORDINAL_POSITION \
                                 FROM INFORMATION_SCHEMA.TABLE_CONSTRAINTS tc \
                                 JOIN INFORMATION_SCHEMA.KEY_COLUMN_USAGE k \
                                   ON k.CONSTRAINT_SCHEMA = tc.CONSTRAINT_SCHEMA \
                                  AND k.CONSTRAINT_NAME = tc.CONSTRAINT_NAME \
                                 WHERE tc.CONSTRAINT_TYPE = 'PRIMARY KEY' \
                                   AND tc.TABLE_SCHEMA = c.TABLE_SCHEMA \
                                   AND tc.TABLE_NAME = c.TABLE_NAME \
                                   AND k.COLUMN_NAME = c.COLUMN_NAME), 0) AS NVARCHAR(10)) \
                  FROM INFORMATION_SCHEMA.COLUMNS c \
                  WHERE c.TABLE_SCHEMA = N{schema} AND c.TABLE_NAME = N{table} \
                  ORDER BY c.ORDINAL_POSITION",
        indexes: "SELECT CAST(i.name AS NVARCHAR(128)), CAST(c.name AS NVARCHAR(128)), \
                  CASE WHEN i.is_unique = 1 THEN '1' ELSE '0' END, \
                  CAST(i.type_desc AS NVARCHAR(60)) \
                  FROM sys.indexes i \
                  JOIN sys.tables t ON t.object_id = i.object_id \
                  JOIN sys.schemas s ON s.schema_id = t.schema_id \
                  JOIN sys.index_columns ic ON ic.object_id = i.object_id AND ic.index_id = i.index_id \
                  JOIN sys.columns c ON c.object_id = ic.object_id AND c.column_id = ic.column_id \
                  WHERE s.name = N{schema} AND t.name = N{table} \
                  AND i.is_primary_key = 0 AND i.type > 0 \
                  ORDER BY i.name, ic.key_ordinal",
        current_schema: "SELECT CAST(SCHEMA_NAME() AS NVARCHAR(128))",
    },
};

pub(super) static ORACLE: CapabilityProfile = CapabilityProfile {
    kind: DialectKind::Oracle,
    quote: ('"', '"'),
    backslash_escapes: false,
    index_types: &[("BITMAP", Native)],
    index_type_clause: IndexTypeClause {
        placement: IndexTypePlacement::BeforeIndexKeyword,
        template: "{type}",
    },
    index_qualification: IndexQualification::Table,
    add_column_keyword: "ADD",
    type_name: oracle_type_name,
    bool_literals: ("1", "0"),
    name_matching: NameMatching::Exact,
    set_schema: Some("ALTER SESSION SET CURRENT_SCHEMA = {schema}"),
    reset_schema: None,
    // Oracle schemas are users; creating one is an administrative task.
    create_schema: None,
    catalog: CatalogQueries {
        tables: "SELECT TABLE_NAME FROM ALL_TABLES \
                 WHERE OWNER = {schema} AND TABLE_NAME = {table}",
        columns: "SELECT c.COLUMN_NAME, c.DATA_TYPE, \
                  CASE WHEN c.NULLABLE = 'Y' THEN '1' ELSE '0' END, \
                  TO_CHAR(NVL((SELECT cc.POSITION FROM ALL_CONSTRAINTS k \
                               JOIN ALL_CONS_COLUMNS cc \
                                 ON cc.OWNER = k.OWNER AND cc.CONSTRAINT_NAME = k.CONSTRAINT_NAME \
                               WHERE k.CONSTRAINT_TYPE = 'P' AND k.OWNER = c.OWNER \
                                 AND k.TABLE_NAME = c.TABLE_NAME \
                                 AND cc.COLUMN_NAME = c.COLUMN_NAME), 0)) \
                  FROM ALL_TAB_COLUMNS c \
                  WHERE c.OWNER = {schema} AND c.TABLE_NAME = {table} \
                  ORDER BY c.COLUMN_ID",
        indexes: "SELECT i.INDEX_NAME, ic.COLUMN_NAME, \
                  CASE WHEN i.UNIQUENESS = 'UNIQUE' THEN '1' ELSE '0' END, i.INDEX_TYPE \
                  FROM ALL_INDEXES i \
                  JOIN ALL_IND_COLUMNS ic \
                    ON ic.INDEX_OWNER = i.OWNER AND ic.INDEX_NAME = i.INDEX_NAME \
                  WHERE i.TABLE_OWNER = {schema} AND i.TABLE_NAME = {table} \
                  AND NOT EXISTS (SELECT 1 FROM ALL_CONSTRAINTS k \
                                  WHERE k.OWNER = i.TABLE_OWNER AND k.TABLE_NAME = i.TABLE_NAME \
                                    AND k.CONSTRAINT_TYPE = 'P' AND k.INDEX_NAME = i.INDEX_NAME) \
                  ORDER BY i.INDEX_NAME, ic.COLUMN_POSITION",
        current_schema: "SELECT SYS_CONTEXT('USERENV', 'CURRENT_SCHEMA') FROM DUAL",
    },
};

fn sqlite_type_name(column_type: &ColumnType) -> String {
    match column_type {
        ColumnType::Integer => "INTEGER".to_string(),
        ColumnType::BigInt => "BIGINT".to_string(),
        ColumnType::SmallInt => "SMALLINT".to_string(),
        ColumnType::Varchar(len) => format!("VARCHAR({})", len),
        ColumnType::Char(len) => format!("CHAR({})", len),
        ColumnType::Text | ColumnType::Uuid => "TEXT".to_string(),
        ColumnType::Boolean => "BOOLEAN".to_string(),
        ColumnType::Real | ColumnType::Double => "REAL".to_string(),
        ColumnType::Decimal(p, s) => format!("DECIMAL({}, {})", p, s),
        ColumnType::Date => "DATE".to_string(),
        ColumnType::Timestamp => "TIMESTAMP".to_string(),
        ColumnType::Blob => "BLOB".to_string(),
        ColumnType::Custom(name) => name.clone(),
    }
}

fn postgres_type_name(column_type: &ColumnType) -> String {
    match column_type {
        ColumnType::Integer => "INTEGER".to_string(),
        ColumnType::BigInt => "BIGINT".to_string(),
        ColumnType::SmallInt => "SMALLINT".to_string(),
        ColumnType::Varchar(len) => format!("VARCHAR({})", len),
        ColumnType::Char(len) => format!("CHAR({})", len),
        ColumnType::Text => "TEXT".to_string(),
        ColumnType::Boolean => "BOOLEAN".to_string(),
        ColumnType::Real => "REAL".to_string(),
        ColumnType::Double => "DOUBLE PRECISION".to_string(),
        ColumnType::Decimal(p, s) => format!("DECIMAL({}, {})", p, s),
        ColumnType::Date => "DATE".to_string(),
        ColumnType::Timestamp => "TIMESTAMP".to_string(),
        ColumnType::Blob => "BYTEA".to_string(),
        ColumnType::Uuid => "UUID".to_string(),
        ColumnType::Custom(name) => name.clone(),
    }
}

fn mysql_type_name(column_type: &ColumnType) -> String {
    match column_type {
        ColumnType::Integer => "INT".to_string(),
        ColumnType::BigInt => "BIGINT".to_string(),
        ColumnType::SmallInt => "SMALLINT".to_string(),
        ColumnType::Varchar(len) => format!("VARCHAR({})", len),
        ColumnType::Char(len) => format!("CHAR({})", len),
        ColumnType::Text => "TEXT".to_string(),
        ColumnType::Boolean => "BOOLEAN".to_string(),
        ColumnType::Real => "FLOAT".to_string(),
        ColumnType::Double => "DOUBLE".to_string(),
        ColumnType::Decimal(p, s) => format!("DECIMAL({}, {})", p, s),
        ColumnType::Date => "DATE".to_string(),
        ColumnType::Timestamp => "DATETIME(6)".to_string(),
        ColumnType::Blob => "LONGBLOB".to_string(),
        ColumnType::Uuid => "BINARY(16)".to_string(),
        ColumnType::Custom(name) => name.clone(),
    }
}

fn sql_server_type_name(column_type: &ColumnType) -> String {
    match column_type {
        ColumnType::Integer => "INT".to_string(),
        ColumnType::BigInt => "BIGINT".to_string(),
        ColumnType::SmallInt => "SMALLINT".to_string(),
        ColumnType::Varchar(len) => format!("NVARCHAR({})", len),
        ColumnType::Char(len) => format!("NCHAR({})", len),
        ColumnType::Text => "NVARCHAR(MAX)".to_string(),
        ColumnType::Boolean => "BIT".to_string(),
        ColumnType::Real => "REAL".to_string(),
        ColumnType::Double => "FLOAT".to_string(),
        ColumnType::Decimal(p, s) => format!("DECIMAL({}, {})", p, s),
        ColumnType::Date => "DATE".to_string(),
        ColumnType::Timestamp => "DATETIME2".to_string(),
        ColumnType::Blob => "VARBINARY(MAX)".to_string(),
        ColumnType::Uuid => "UNIQUEIDENTIFIER".to_string(),
        ColumnType::Custom(name) => name.clone(),
    }
}

fn oracle_type_name(column_type: &ColumnType) -> String {
    match column_type {
        ColumnType::Integer => "NUMBER(10)".to_string(),
        ColumnType::BigInt => "NUMBER(19)".to_string(),
        ColumnType::SmallInt => "NUMBER(5)".to_string(),
        ColumnType::Varchar(len) => format!("VARCHAR2({} CHAR)", len),
        ColumnType::Char(len) => format!("CHAR({})", len),
        ColumnType::Text => "CLOB".to_string(),
        ColumnType::Boolean => "NUMBER(1)".to_string(),
        ColumnType::Real => "BINARY_FLOAT".to_string(),
        ColumnType::Double => "BINARY_DOUBLE".to_string(),
        ColumnType::Decimal(p, s) => format!("NUMBER({}, {})", p, s),
        ColumnType::Date => "DATE".to_string(),
        ColumnType::Timestamp => "TIMESTAMP".to_string(),
        ColumnType::Blob => "BLOB".to_string(),
        ColumnType::Uuid => "RAW(16)".to_string(),
        ColumnType::Custom(name) => name.clone(),
    }
}
