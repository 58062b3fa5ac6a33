//! # Database Migrations
//!
//! Embedded SQL migrations plus the legacy `cost_price` column upgrade.
//!
//! ## How Migrations Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Migration Process                                  │
//! │                                                                         │
//! │  Startup                                                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  MIGRATOR.run()                                                        │
//! │       │   0001_initial_schema.sql  (CREATE TABLE IF NOT EXISTS)        │
//! │       │   → fresh database: tables created with cost_price             │
//! │       │   → existing shop database: tables left untouched              │
//! │       ▼                                                                 │
//! │  ensure_cost_price_columns()                                           │
//! │       │   PRAGMA table_info(inventory)     cost_price? ── no ──► ALTER │
//! │       │   PRAGMA table_info(sell_history)  cost_price? ── no ──► ALTER │
//! │       ▼                                                                 │
//! │  Repositories can assume both columns exist                            │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Adding New Migrations
//!
//! 1. Create a new file in `migrations/sqlite/` with the next sequence number
//! 2. Name format: `NNNN_description.sql`
//! 3. Write idempotent SQL (use `IF NOT EXISTS` where possible)
//! 4. **NEVER** modify existing migrations - always add new ones

use sqlx::{Row, SqlitePool};
use tracing::{debug, info};

use crate::error::DbResult;

/// Embedded migrations from the `migrations/sqlite` directory.
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

/// Tables that gained a `cost_price` column after the first release.
const COST_PRICE_TABLES: [&str; 2] = ["inventory", "sell_history"];

/// Runs all pending migrations, then the legacy column upgrade.
///
/// ## Safety
/// - Idempotent: safe to run multiple times
/// - Transactional: each migration runs in a transaction
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    info!("Checking for pending migrations");

    MIGRATOR.run(pool).await?;

    let added = ensure_cost_price_columns(pool).await?;
    if !added.is_empty() {
        info!(tables = ?added, "Added cost_price column to legacy tables");
    }

    info!("All migrations applied successfully");
    Ok(())
}

/// Adds `cost_price REAL DEFAULT 0` to each table that lacks it.
///
/// Returns the tables that were altered; empty when nothing was missing.
pub async fn ensure_cost_price_columns(pool: &SqlitePool) -> DbResult<Vec<&'static str>> {
    let mut added = Vec::new();

    for table in COST_PRICE_TABLES {
        if has_column(pool, table, "cost_price").await? {
            debug!(table, "cost_price column present");
            continue;
        }

        sqlx::query(&format!(
            "ALTER TABLE {table} ADD COLUMN cost_price REAL DEFAULT 0"
        ))
        .execute(pool)
        .await?;

        added.push(table);
    }

    Ok(added)
}

/// Column-existence check via `PRAGMA table_info`.
async fn has_column(pool: &SqlitePool, table: &str, column: &str) -> DbResult<bool> {
    let rows = sqlx::query(&format!("PRAGMA table_info({table})"))
        .fetch_all(pool)
        .await?;

    for row in rows {
        let name: String = row.try_get("name")?;
        if name == column {
            return Ok(true);
        }
    }

    Ok(false)
}

/// Returns information about migrations.
///
/// ## Returns
/// Tuple of (total_migrations, applied_migrations)
pub async fn migration_status(pool: &SqlitePool) -> DbResult<(usize, usize)> {
    let total = MIGRATOR.migrations.len();

    let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations")
        .fetch_one(pool)
        .await?;

    Ok((total, applied as usize))
}

// =============================================================================
// Unit Tests
// =============================================================================
