//! # File Output
//!
//! Writes bills and ledger exports. Paths and text come from
//! `stockbook_core::receipt`; this module only touches the filesystem.
//!
//! ```text
//! bills/
//! └── March/
//!     └── 2025-03-14/
//!         └── bill_9876543210_20250314_101500.txt
//!
//! exports/
//! └── sell_history_20250314_180000.csv
//! ```

use chrono::NaiveDateTime;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::AppResult;
use stockbook_core::receipt::{bill_path, Receipt};
use stockbook_core::SaleRecord;

/// Column order of the CSV export, named after the `sell_history` columns.
pub const HISTORY_HEADER: [&str; 12] = [
    "id",
    "name",
    "quantity_sold",
    "price",
    "total_sale",
    "discount_percent",
    "discount_price",
    "final_total",
    "timestamp",
    "customer_name",
    "contact_number",
    "cost_price",
];

/// Writes the receipt for `record` under `root` and returns its path.
///
/// An existing bill is never overwritten: when another sale for the same
/// contact already took the name, the sale id is appended to it.
pub fn save_bill(
    root: &Path,
    extension: &str,
    store_name: &str,
    record: &SaleRecord,
    now: NaiveDateTime,
) -> AppResult<PathBuf> {
    let mut path = bill_path(root, record, now, extension);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let text = Receipt::new(store_name, record).to_string();
    match write_new(&path, &text) {
        Ok(()) => {}
        Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
            let stem = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            path.set_file_name(format!(
                "{stem}_{}.{}",
                record.id,
                extension.trim_start_matches('.')
            ));
            write_new(&path, &text)?;
        }
        Err(err) => return Err(err.into()),
    }

    debug!(sale_id = record.id, path = %path.display(), "Bill saved");
    Ok(path)
}

fn write_new(path: &Path, contents: &str) -> io::Result<()> {
    let mut file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)?;
    file.write_all(contents.as_bytes())
}

/// Writes `records` as CSV, one row per sale, amounts at full precision.
pub fn write_history_csv<W: Write>(writer: W, records: &[SaleRecord]) -> AppResult<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer.write_record(HISTORY_HEADER)?;
    for record in records {
        csv_writer.write_record(&[
            record.id.to_string(),
            record.item_name.clone(),
            record.quantity_sold.to_string(),
            record.unit_price.to_string(),
            record.total_sale.to_string(),
            record.discount_percent.to_string(),
            record.discount_amount.to_string(),
            record.final_total.to_string(),
            record.timestamp.clone(),
            record.customer_name.clone(),
            record.customer_contact.clone(),
            record.cost_price_snapshot.to_string(),
        ])?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Exports the ledger to `dir/sell_history_<YYYYMMDD_HHMMSS>.csv`.
pub fn export_history(
    dir: &Path,
    records: &[SaleRecord],
    now: NaiveDateTime,
) -> AppResult<PathBuf> {
    fs::create_dir_all(dir)?;

    let path = dir.join(format!("sell_history_{}.csv", now.format("%Y%m%d_%H%M%S")));
    let file = fs::File::create(&path)?;
    write_history_csv(std::io::BufWriter::new(file), records)?;

    debug!(records = records.len(), path = %path.display(), "Sell history exported");
    Ok(path)
}
