//! # stockbook-db: Database Layer for Stockbook
//!
//! This crate persists the stock store and the sales ledger in SQLite and
//! runs the sale transaction that ties them together.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stockbook Data Flow                              │
//! │                                                                         │
//! │  Console command (sell)                                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   stockbook-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │ inventory.rs  │    │  (embedded)  │  │   │
//! │  │   │               │    │ ledger.rs     │    │ + cost_price │  │   │
//! │  │   │ SqlitePool    │◄───│               │    │   upgrade    │  │   │
//! │  │   └───────────────┘    └───────▲───────┘    └──────────────┘  │   │
//! │  │                                │                               │   │
//! │  │          ┌─────────────────────┴──────────────┐                │   │
//! │  │          │ checkout.rs        reports.rs      │                │   │
//! │  │          │ SaleProcessor      ReportService   │                │   │
//! │  │          └────────────────────────────────────┘                │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │   SQLite: inventory, sell_history                               │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded migrations and legacy column upgrade
//! - [`error`] - Database error types
//! - [`repository`] - Stock store and sales ledger
//! - [`checkout`] - Sale transaction processor
//! - [`reports`] - Report loading
//!
//! ## Usage
//!
//! ```rust,ignore
//! use stockbook_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/stockbook.db")).await?;
//!
//! let hits = db.inventory().search("shirt").await?;
//! let summary = db.reports().summary().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod checkout;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod reports;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use checkout::SaleProcessor;
pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use reports::ReportService;

// Repository re-exports for convenience
pub use repository::inventory::InventoryRepository;
pub use repository::ledger::LedgerRepository;
