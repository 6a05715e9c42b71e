//! Example: Blog Application Schema
//!
//! This example reconciles an in-memory SQLite database with the tables of
//! a small blog: users, posts and comments. It runs three times to show
//! creation, idempotence, and an additive change.
//!
//! Run with: cargo run --example reconcile_blog -p oxide-reconcile

use oxide_reconcile::prelude::*;
use sqlx::Connection as _;

// =============================================================================
// Table Declarations
// =============================================================================

fn users() -> Result<Table> {
    Table::builder("users")
        .column(Column::new("id", ColumnType::BigInt))
        .column(Column::new("username", ColumnType::Varchar(100)).not_null())
        .column(Column::new("email", ColumnType::Varchar(255)).not_null())
        .column(
            Column::new("is_active", ColumnType::Boolean)
                .not_null()
                .default_value(DefaultValue::Bool(true)),
        )
        .column(
            Column::new("created_at", ColumnType::Timestamp)
                .not_null()
                .default_value(DefaultValue::Expression("CURRENT_TIMESTAMP".to_string())),
        )
        .primary_key(["id"])
        .auto_index(["username"], true)
        .auto_index(["email"], true)
        .build()
}

fn posts(with_summary: bool) -> Result<Table> {
    let mut builder = Table::builder("posts")
        .column(Column::new("id", ColumnType::BigInt))
        .column(Column::new("author_id", ColumnType::BigInt).not_null())
        .column(Column::new("title", ColumnType::Varchar(200)).not_null())
        .column(Column::new("slug", ColumnType::Varchar(200)).not_null())
        .column(Column::new("content", ColumnType::Text).not_null())
        .column(Column::new("published_at", ColumnType::Timestamp));
    if with_summary {
        builder = builder.column(Column::new("summary", ColumnType::Varchar(500)));
    }
    builder
        .primary_key(["id"])
        .auto_index(["slug"], true)
        .auto_index(["author_id"], false)
        // SQLite has no hash indexes; this becomes a regular index
        .index(Index::new("posts_published_hash", ["published_at"]).index_type("HASH"))
        .build()
}

fn comments() -> Result<Table> {
    Table::builder("comments")
        .column(Column::new("id", ColumnType::BigInt))
        .column(Column::new("post_id", ColumnType::BigInt).not_null())
        .column(Column::new("author_id", ColumnType::BigInt))
        .column(Column::new("body", ColumnType::Text).not_null())
        .primary_key(["id"])
        .auto_index(["post_id", "author_id"], false)
        .build()
}

fn print_report(report: &ReconciliationReport) {
    for table in &report.tables {
        let mark = if table.is_success() { "X" } else { "!" };
        println!("    [{}] {}", mark, table.table);
        for sql in &table.applied {
            println!("        {};", sql);
        }
        for err in table.rejected.iter().chain(&table.error) {
            println!("        error: {}", err);
        }
    }
    println!(
        "    {} statements, {}\n",
        report.statement_count(),
        if report.is_success() { "OK" } else { "FAILED" }
    );
}

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    println!("{}", "=".repeat(70));
    println!(" OXIDE-RECONCILE: Blog Application Example");
    println!("{}", "=".repeat(70));
    println!();

    // Create in-memory SQLite database
    let conn = sqlx::SqliteConnection::connect("sqlite::memory:").await?;
    let mut session = Session::new(conn);

    println!("[1] Attaching schema 'blog'...");
    let schema = Schema::new("blog");
    session.create_schema(&schema).await?;
    session.set_current_schema(schema).await?;
    println!();

    let reconciler = Reconciler::new();
    let tables = vec![users()?, posts(false)?, comments()?];

    println!("[2] Planning against an empty schema...\n");
    print_report(&reconciler.plan(&mut session, &tables).await);

    println!("[3] Reconciling...\n");
    print_report(&reconciler.reconcile(&mut session, &tables).await);

    println!("[4] Reconciling again (nothing to do)...\n");
    print_report(&reconciler.reconcile(&mut session, &tables).await);

    println!("[5] Adding posts.summary...\n");
    let tables = vec![users()?, posts(true)?, comments()?];
    print_report(&reconciler.reconcile(&mut session, &tables).await);

    for table in &tables {
        println!("    {} exists: {}", table.name(), session.exists(table).await?);
    }

    Ok(())
}
