//! # Stockbook Console Entry Point
//!
//! Operator binary over the stock store and the sales ledger.
//!
//! ## Application Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        stockbook (this crate)                           │
//! │                                                                         │
//! │  main.rs ─────► logging, config, database, dispatch                    │
//! │  cli.rs ──────► clap subcommands and flags                             │
//! │  commands.rs ─► items, sell, reports, customer fixes                   │
//! │  export.rs ───► bill files, CSV export                                 │
//! │  config.rs ───► stockbook.toml + STOCKBOOK_* overrides                 │
//! │  error.rs ────► AppError { code, message }                             │
//! │                                 │                                       │
//! │                                 ▼                                       │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                         SQLite Database                          │  │
//! │  │  stockbook.db (local file, WAL mode)                             │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Exit Status
//! 0 on success, otherwise [`ErrorCode::exit_code`](error::ErrorCode::exit_code).

mod cli;
mod commands;
mod config;
mod error;
mod export;

use clap::Parser;
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::commands::Console;
use crate::config::AppConfig;
use crate::error::{AppError, AppResult, ErrorCode};
use stockbook_db::Database;

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        // --help and --version
        Err(err) if !err.use_stderr() => {
            let _ = err.print();
            return ExitCode::SUCCESS;
        }
        Err(err) => {
            if std::env::args().any(|arg| arg == "--json") {
                return report(AppError::from(err), true);
            }
            let _ = err.print();
            return ExitCode::from(AppError::from(err).code.exit_code() as u8);
        }
    };

    let json = cli.json;
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => report(err, json),
    }
}

fn report(err: AppError, json: bool) -> ExitCode {
    if json {
        match serde_json::to_string_pretty(&err) {
            Ok(text) => eprintln!("{}", text),
            Err(_) => eprintln!("{}", err),
        }
    } else {
        eprintln!("Error: {}", err.message);
    }
    ExitCode::from(err.code.exit_code() as u8)
}

async fn run(cli: Cli) -> AppResult<()> {
    let config = AppConfig::load(cli.config.clone())?;
    debug!(?config, "Configuration loaded");

    let db = Database::new(config.db_config()).await?;
    if !db.health_check().await {
        db.close().await;
        return Err(AppError::new(
            ErrorCode::DatabaseError,
            format!("Database at {} is not usable", config.database.path.display()),
        ));
    }
    info!(path = %config.database.path.display(), "Database ready");

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let result = Console::new(&db, &config, cli.json)
        .run(cli.command, &mut out)
        .await;

    db.close().await;
    result
}

/// Initializes the tracing subscriber for logging.
///
/// Logs go to stderr so `--json` output on stdout stays parseable.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=stockbook=trace` - Show trace for stockbook crates only
/// - Default: `info,stockbook=debug,sqlx=warn`
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,stockbook=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
