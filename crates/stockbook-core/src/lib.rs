//! # stockbook-core: Pure Business Logic for Stockbook
//!
//! This crate holds the arithmetic and rules of the inventory & sales ledger
//! as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stockbook Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │            Presentation (console binary, any UI)                │   │
//! │  │      add item ──► sell ──► receipt ──► reports / export         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ stockbook-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  report   │  │ validation│  │   │
//! │  │   │   Item    │  │ SaleTotals│  │  Summary  │  │   rules   │  │   │
//! │  │   │SaleRecord │  │  Outcome  │  │ ProfitLoss│  │  parsing  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 stockbook-db (Database Layer)                   │   │
//! │  │        inventory + sell_history tables, sale transaction        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Item, SaleRecord, SaleRequest, ...)
//! - [`money`] - Sale totals, profit/loss outcome, display formatting
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation and text parsing
//! - [`report`] - Summary, profit/loss, customer and stock reports
//! - [`receipt`] - Receipt text and bill file naming
//!
//! ## Example Usage
//!
//! ```rust
//! use stockbook_core::money::SaleTotals;
//!
//! // 3 shirts at 200 with a 10% discount
//! let totals = SaleTotals::compute(3, 200.0, 10.0);
//!
//! assert_eq!(totals.total_sale, 600.0);
//! assert_eq!(totals.discount_amount, 60.0);
//! assert_eq!(totals.final_total, 540.0);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod receipt;
pub mod report;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, UnknownCostBasis, ValidationError};
pub use money::SaleTotals;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Fixed format of every ledger timestamp (`2025-03-14 09:26:53`).
///
/// Lexicographic order of strings in this format equals chronological order,
/// which the ledger relies on to keep timestamps non-decreasing.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Number of digits in a customer contact number.
pub const CONTACT_NUMBER_LEN: usize = 10;

/// Upper bound of the discount percent range `[0, 100]`.
pub const MAX_DISCOUNT_PERCENT: f64 = 100.0;

/// Decimal places used when a monetary value is shown to a person.
pub const DISPLAY_DECIMALS: usize = 2;
