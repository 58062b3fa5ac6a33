//! # Repository Module
//!
//! Database repository implementations for Stockbook.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  Console command                                                       │
//! │       │                                                                 │
//! │       │  db.inventory().search("shirt")                                │
//! │       ▼                                                                 │
//! │  InventoryRepository            LedgerRepository                       │
//! │  ├── add / update / remove      ├── append                             │
//! │  ├── decrement                  ├── list_all / get / count             │
//! │  └── find_by_name / search      └── correct_customer_identity          │
//! │       │                                 │                               │
//! │       │  SQL Query                      │                               │
//! │       ▼                                 ▼                               │
//! │  inventory table                sell_history table                     │
//! │                                                                         │
//! │  Rows pass through InventoryRow / LedgerRow, which decode leniently    │
//! │  and hand out canonical Item / SaleRecord values.                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`InventoryRepository`](inventory::InventoryRepository) - Stock store
//! - [`LedgerRepository`](ledger::LedgerRepository) - Sales ledger

pub mod inventory;
pub mod ledger;

use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use stockbook_core::money::or_zero;

/// Column reader that never fails.
///
/// Rows written by older tools can hold NULL, or text where a number is
/// expected. Values are read without sqlx's type check so SQLite applies its
/// own conversion (numeric text → number, other text → 0). NULL, missing or
/// undecodable columns fall back to zero/blank and are recorded in
/// `missing` so the caller can log the row.
pub(crate) struct LenientRow<'r> {
    row: &'r SqliteRow,
    pub(crate) missing: Vec<&'static str>,
}

impl<'r> LenientRow<'r> {
    pub(crate) fn new(row: &'r SqliteRow) -> Self {
        LenientRow {
            row,
            missing: Vec::new(),
        }
    }

    pub(crate) fn real(&mut self, column: &'static str) -> f64 {
        match self.row.try_get_unchecked::<Option<f64>, _>(column) {
            Ok(Some(value)) if value.is_finite() => value,
            Ok(value) => {
                self.missing.push(column);
                or_zero(value)
            }
            Err(_) => {
                self.missing.push(column);
                0.0
            }
        }
    }

    pub(crate) fn integer(&mut self, column: &'static str) -> i64 {
        match self.row.try_get_unchecked::<Option<i64>, _>(column) {
            Ok(Some(value)) => value,
            _ => {
                self.missing.push(column);
                0
            }
        }
    }

    pub(crate) fn text(&mut self, column: &'static str) -> String {
        match self.optional_text(column) {
            Some(value) => value,
            None => {
                self.missing.push(column);
                String::new()
            }
        }
    }

    /// Text column where absence is normal; blank counts as absent.
    pub(crate) fn optional_text(&self, column: &'static str) -> Option<String> {
        self.row
            .try_get_unchecked::<Option<String>, _>(column)
            .ok()
            .flatten()
            .filter(|value| !value.is_empty())
    }
}
