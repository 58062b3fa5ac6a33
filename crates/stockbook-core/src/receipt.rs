//! # Receipt Module
//!
//! Plain-text receipt rendering and bill file naming for a completed sale.
//!
//! ## Bill Layout on Disk
//! ```text
//! <bills_dir>/
//! └── March/                         (%B of the sale time)
//!     └── 2025-03-14/                (%Y-%m-%d)
//!         └── bill_9876543210_20250314_092653.txt
//! ```
//!
//! This module only computes text and paths; writing the file is left to
//! the caller.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;

use crate::money::format_amount;
use crate::types::SaleRecord;

const RULE: &str = "-----------------------------";

/// A printable receipt for one sale.
///
/// ## Example
/// ```rust
/// use stockbook_core::receipt::Receipt;
/// # use stockbook_core::SaleRecord;
/// # let record = SaleRecord {
/// #     id: 1, item_name: "Shirt".into(), quantity_sold: 3, unit_price: 200.0,
/// #     total_sale: 600.0, discount_percent: 10.0, discount_amount: 60.0,
/// #     final_total: 540.0, cost_price_snapshot: 120.0,
/// #     timestamp: "2025-03-14 09:26:53".into(),
/// #     customer_name: "Asha Rao".into(), customer_contact: "9876543210".into(),
/// # };
///
/// let text = Receipt::new("Corner Store", &record).to_string();
/// assert!(text.contains("Final Total: 540.00"));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Receipt<'a> {
    store_name: &'a str,
    record: &'a SaleRecord,
}

impl<'a> Receipt<'a> {
    pub fn new(store_name: &'a str, record: &'a SaleRecord) -> Self {
        Receipt { store_name, record }
    }
}

impl fmt::Display for Receipt<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = self.record;

        if !self.store_name.is_empty() {
            writeln!(f, "{}", self.store_name)?;
        }
        writeln!(f, "BILL #{}", r.id)?;
        writeln!(f, "Date/Time: {}", r.timestamp)?;
        writeln!(f, "{RULE}")?;
        writeln!(f, "Customer Name: {}", r.customer_name)?;
        writeln!(f, "Contact Number: {}", r.customer_contact)?;
        writeln!(f, "{RULE}")?;
        writeln!(f, "Item: {}", r.item_name)?;
        writeln!(f, "Quantity: {}", r.quantity_sold)?;
        writeln!(f, "Price per item: {}", format_amount(r.unit_price))?;
        writeln!(f, "Total: {}", format_amount(r.total_sale))?;
        writeln!(f, "Discount: {}%", r.discount_percent)?;
        writeln!(f, "Discount Price: {}", format_amount(r.discount_amount))?;
        writeln!(f, "Final Total: {}", format_amount(r.final_total))?;
        writeln!(f, "{RULE}")?;
        write!(f, "Thank you for your purchase!")
    }
}

/// Computes where the bill for `record` is saved under `root`.
///
/// The folder and file name come from the record's timestamp; `fallback`
/// (normally the current time) is used when the stored timestamp does not
/// parse. Characters that would break the path are dropped from the contact.
pub fn bill_path(
    root: &Path,
    record: &SaleRecord,
    fallback: NaiveDateTime,
    extension: &str,
) -> PathBuf {
    let at = record.sold_at().unwrap_or(fallback);

    let contact: String = record
        .customer_contact
        .chars()
        .filter(|c| !matches!(c, ' ' | '/' | '\\'))
        .collect();

    let file_name = format!(
        "bill_{}_{}.{}",
        contact,
        at.format("%Y%m%d_%H%M%S"),
        extension.trim_start_matches('.')
    );

    root.join(at.format("%B").to_string())
        .join(at.format("%Y-%m-%d").to_string())
        .join(file_name)
}

// =============================================================================
// Unit Tests
// =============================================================================
