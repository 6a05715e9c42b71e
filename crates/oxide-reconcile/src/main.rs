//! oxide-reconcile CLI
//!
//! Command-line tool for reconciling a database with declared tables.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::str::FromStr;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use oxide_reconcile::prelude::*;

/// Declarative schema reconciliation.
#[derive(Parser)]
#[command(name = "oxide-reconcile")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Database URL (sqlite:, postgres: or mysql:).
    #[arg(short, long, env = "DATABASE_URL", default_value = "sqlite:db.sqlite3")]
    database: String,

    /// Schema to target instead of the database's default.
    #[arg(short, long)]
    schema: Option<String>,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create missing tables, columns and indexes.
    Reconcile {
        /// JSON file declaring the tables.
        file: PathBuf,

        /// Show SQL without executing (dry run).
        #[arg(long)]
        dry_run: bool,
    },

    /// Check whether a table exists in the target schema.
    Exists {
        /// Table name.
        table: String,
    },

    /// Print the schema DDL would target.
    CurrentSchema,

    /// Create a schema (an attached database on SQLite).
    CreateSchema {
        /// Schema name.
        name: String,
    },
}

/// The declared-tables document read by `reconcile`.
#[derive(Deserialize)]
struct SchemaDocument {
    tables: Vec<Table>,
}

fn load_tables(path: &Path) -> anyhow::Result<Vec<Table>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let document: SchemaDocument = serde_json::from_str(&text)
        .with_context(|| format!("parsing {}", path.display()))?;
    Ok(document.tables)
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let scheme = cli
        .database
        .split_once(':')
        .map_or(cli.database.as_str(), |(scheme, _)| scheme);
    let dialect = DialectKind::from_str(scheme)
        .with_context(|| format!("unsupported database URL '{}'", cli.database))?;

    // Connect to database
    let success: bool = match dialect {
        #[cfg(feature = "sqlite")]
        DialectKind::Sqlite => {
            use sqlx::sqlite::SqliteConnectOptions;
            use sqlx::ConnectOptions as _;

            let conn = SqliteConnectOptions::from_str(&cli.database)?
                .create_if_missing(true)
                .connect()
                .await?;
            run(conn, cli).await?
        }
        #[cfg(feature = "postgres")]
        DialectKind::Postgres => {
            use sqlx::Connection as _;

            let conn = sqlx::PgConnection::connect(&cli.database).await?;
            run(conn, cli).await?
        }
        #[cfg(feature = "mysql")]
        DialectKind::MySql => {
            use sqlx::Connection as _;

            let conn = sqlx::MySqlConnection::connect(&cli.database).await?;
            run(conn, cli).await?
        }
        other => bail!("no {} driver is compiled into this binary", other),
    };

    Ok(if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Runs the command; `Ok(false)` means it completed with a negative answer.
async fn run<C: Connection>(conn: C, cli: Cli) -> anyhow::Result<bool> {
    let mut session = Session::new(conn);
    if let Some(schema) = cli.schema {
        session.set_current_schema(Schema::new(schema)).await?;
    }

    match cli.command {
        Commands::Reconcile { file, dry_run } => {
            let tables = load_tables(&file)?;
            if dry_run {
                info!("Dry run mode - SQL will be printed but not executed.");
            }

            let reconciler = Reconciler::with_options(ReconcileOptions::new().dry_run(dry_run));
            let report = reconciler.reconcile(&mut session, &tables).await;

            for table in &report.tables {
                let mark = if table.is_up_to_date() {
                    " "
                } else if table.is_success() {
                    "X"
                } else {
                    "!"
                };
                println!(" [{}] {}", mark, table.table);
                for sql in &table.applied {
                    println!("     {};", sql);
                }
                for err in table.rejected.iter().chain(&table.error) {
                    println!("     error: {}", err);
                }
            }

            info!(
                statements = report.statement_count(),
                tables = report.tables.len(),
                "Reconciliation finished"
            );
            if !report.is_success() {
                bail!("some tables could not be fully reconciled");
            }
        }

        Commands::Exists { table } => {
            let schema = session.current_schema().await?;
            let exists = session.exists_in(&table, &schema).await?;
            println!("{}", exists);
            return Ok(exists);
        }

        Commands::CurrentSchema => {
            println!("{}", session.current_schema().await?);
        }

        Commands::CreateSchema { name } => {
            let schema = Schema::new(name);
            session.create_schema(&schema).await?;
            info!("Created schema {}", schema);
        }
    }

    Ok(true)
}

#[cfg(all(test, feature = "sqlite"))]
mod tests {
    use super::*;
    use sqlx::Connection as _;

    async fn memory() -> sqlx::SqliteConnection {
        sqlx::SqliteConnection::connect("sqlite::memory:")
            .await
            .expect("Failed to open in-memory SQLite connection")
    }

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("oxide-reconcile").chain(args.iter().copied()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_exists_reports_absent_table_as_failure() {
        assert!(!run(memory().await, cli(&["exists", "missing"])).await.unwrap());
    }

    #[tokio::test]
    async fn test_exists_reports_present_table_as_success() {
        let mut conn = memory().await;
        Connection::execute(&mut conn, "CREATE TABLE present (id INTEGER)")
            .await
            .unwrap();
        assert!(run(conn, cli(&["exists", "present"])).await.unwrap());
    }

    #[tokio::test]
    async fn test_current_schema_succeeds() {
        assert!(run(memory().await, cli(&["current-schema"])).await.unwrap());
    }
}
