//! # Console Commands
//!
//! Executes a parsed [`Command`] against the database and prints the result,
//! as aligned text or, with `--json`, as pretty JSON.
//!
//! ## Command Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  stockbook sell --item Shirt --quantity 3 --discount 10 ...             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  cli::Cli (clap)          text → typed values (core parsers)            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Console::run             resolve item, build SaleRequest               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SaleProcessor            validate → decrement → append (one tx)        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Receipt + save_bill      print receipt, write bill file                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! No arithmetic happens here; every number printed was computed by
//! `stockbook-core`.

use chrono::Local;
use serde::Serialize;
use std::io::Write;
use tracing::{info, warn};

use crate::cli::{Command, CustomerFix, ItemRef, SellArgs};
use crate::config::AppConfig;
use crate::error::{AppError, AppResult};
use crate::export;
use stockbook_core::money::format_amount;
use stockbook_core::receipt::Receipt;
use stockbook_core::report::{CustomerReport, ProfitLossReport, SalesSummary, StockReport};
use stockbook_core::{CustomerKey, Item, SaleRecord, SaleRequest};
use stockbook_db::Database;

/// Runs commands for one invocation of the binary.
pub struct Console<'a> {
    db: &'a Database,
    config: &'a AppConfig,
    json: bool,
}

impl<'a> Console<'a> {
    pub fn new(db: &'a Database, config: &'a AppConfig, json: bool) -> Self {
        Console { db, config, json }
    }

    /// Executes `command`, writing its output to `out`.
    pub async fn run<W: Write>(&self, command: Command, out: &mut W) -> AppResult<()> {
        match command {
            Command::Items { search } => {
                let items = match search {
                    Some(query) => self.db.inventory().search(&query).await?,
                    None => self.db.inventory().list_all().await?,
                };
                self.emit(out, &items[..], print_items)?;
            }
            Command::AddItem(args) => {
                let item = self.db.inventory().add(&args.to_new_item()).await?;
                self.emit(out, &item, |out, item| {
                    writeln!(out, "Added item #{}: {}", item.id, item.name)
                })?;
            }
            Command::EditItem(args) => {
                let item = self.db.inventory().update(args.id, &args.update()).await?;
                self.emit(out, &item, |out, item| {
                    writeln!(out, "Updated item #{}", item.id)?;
                    print_items(out, std::slice::from_ref(item))
                })?;
            }
            Command::RemoveItem { id } => {
                self.db.inventory().remove(id).await?;
                self.emit(out, &serde_json::json!({ "removed": id }), |out, _| {
                    writeln!(out, "Removed item #{}", id)
                })?;
            }
            Command::Sell(args) => self.sell(args, out).await?,
            Command::History => {
                let records = self.db.ledger().list_all().await?;
                self.emit(out, &records[..], print_history)?;
            }
            Command::Summary => {
                let summary = self.db.reports().summary().await?;
                self.emit(out, &summary, print_summary)?;
            }
            Command::ProfitLoss { basis } => {
                let basis = basis.unwrap_or(self.config.reports.cost_basis);
                let report = self.db.reports().profit_loss(basis).await?;
                self.emit(out, &report, print_profit_loss)?;
            }
            Command::Customers => {
                let report = self.db.reports().customer_aggregate().await?;
                self.emit(out, &report, print_customers)?;
            }
            Command::CustomerList => {
                let customers = self.db.ledger().customers().await?;
                self.emit(out, &customers[..], print_customer_list)?;
            }
            Command::CustomerName { contact } => {
                let name = self
                    .db
                    .ledger()
                    .customer_name_for_contact(&contact)
                    .await?
                    .ok_or_else(|| AppError::not_found("Customer", &contact))?;
                self.emit(
                    out,
                    &serde_json::json!({ "contact": contact, "name": name }),
                    |out, _| writeln!(out, "{}", name),
                )?;
            }
            Command::FixCustomer(fix) => self.fix_customer(fix, out).await?,
            Command::StockReport => {
                let report = self.db.reports().stock_report().await?;
                self.emit(out, &report, print_stock_report)?;
            }
            Command::ExportHistory { dir } => {
                let records = self.db.ledger().list_all().await?;
                let dir = dir.unwrap_or_else(|| self.config.reports.export_dir.clone());
                let path = export::export_history(&dir, &records, Local::now().naive_local())?;

                info!(records = records.len(), path = %path.display(), "Exported sell history");
                self.emit(
                    out,
                    &serde_json::json!({ "path": path, "records": records.len() }),
                    |out, _| {
                        writeln!(out, "Exported {} sales to {}", records.len(), path.display())
                    },
                )?;
            }
        }

        Ok(())
    }

    async fn sell<W: Write>(&self, args: SellArgs, out: &mut W) -> AppResult<()> {
        let item_ref = args
            .item_ref()
            .ok_or_else(|| AppError::usage("sell needs --id or --item"))?;
        let item = self.resolve_item(&item_ref).await?;

        let mut request = SaleRequest::for_item(
            &item,
            args.quantity,
            args.discount,
            args.customer,
            args.contact,
        );
        if let Some(unit_price) = args.price {
            request.unit_price = unit_price;
        }

        let record = self.db.sales().process_sale(&request).await?;

        // The sale is committed; a bill that fails to save does not undo it.
        let bill = if self.config.receipts.save_bills {
            match export::save_bill(
                &self.config.receipts.bills_dir,
                &self.config.receipts.extension,
                &self.config.store.name,
                &record,
                Local::now().naive_local(),
            ) {
                Ok(path) => Some(path),
                Err(err) => {
                    warn!(sale_id = record.id, error = %err, "Failed to save bill");
                    eprintln!("Warning: bill for sale #{} was not saved: {}", record.id, err.message);
                    None
                }
            }
        } else {
            None
        };

        let payload = serde_json::json!({ "sale": record, "bill": bill });
        self.emit(out, &payload, |out, _| {
            writeln!(out, "{}", Receipt::new(&self.config.store.name, &record))?;
            if let Some(path) = &bill {
                writeln!(out, "Bill saved to {}", path.display())?;
            }
            Ok(())
        })
    }

    async fn resolve_item(&self, item: &ItemRef) -> AppResult<Item> {
        match item {
            ItemRef::Id(id) => Ok(self.db.inventory().get(*id).await?),
            ItemRef::Name(name) => self
                .db
                .inventory()
                .find_by_name(name)
                .await?
                .ok_or_else(|| AppError::not_found("Item", name)),
        }
    }

    async fn fix_customer<W: Write>(&self, fix: CustomerFix, out: &mut W) -> AppResult<()> {
        let count = self
            .db
            .ledger()
            .correct_customer_identity(
                &fix.old_name,
                &fix.old_contact,
                &fix.new_name,
                &fix.new_contact,
            )
            .await?;

        self.emit(out, &serde_json::json!({ "updated": count }), |out, _| {
            if count == 0 {
                writeln!(
                    out,
                    "No sales found for {} ({})",
                    fix.old_name, fix.old_contact
                )
            } else {
                writeln!(out, "Updated {} sales", count)
            }
        })
    }

    /// Prints `value` as JSON or through `text`.
    fn emit<T, W, F>(&self, out: &mut W, value: &T, text: F) -> AppResult<()>
    where
        T: Serialize + ?Sized,
        W: Write,
        F: FnOnce(&mut W, &T) -> std::io::Result<()>,
    {
        if self.json {
            serde_json::to_writer_pretty(&mut *out, value)?;
            writeln!(out)?;
        } else {
            text(out, value)?;
        }
        Ok(())
    }
}

// =============================================================================
// Text Rendering
// =============================================================================

fn print_items<W: Write>(out: &mut W, items: &[Item]) -> std::io::Result<()> {
    if items.is_empty() {
        return writeln!(out, "No items.");
    }

    writeln!(
        out,
        "{:>5}  {:<28} {:>6} {:>10} {:>10}  Barcode",
        "ID", "Name", "Qty", "Price", "Cost"
    )?;
    for item in items {
        writeln!(
            out,
            "{:>5}  {:<28} {:>6} {:>10} {:>10}  {}",
            item.id,
            item.name,
            item.quantity,
            format_amount(item.price),
            format_amount(item.cost_price),
            item.barcode.as_deref().unwrap_or("")
        )?;
    }
    Ok(())
}

fn print_history<W: Write>(out: &mut W, records: &[SaleRecord]) -> std::io::Result<()> {
    if records.is_empty() {
        return writeln!(out, "No sales recorded.");
    }

    writeln!(
        out,
        "{:>5}  {:<19}  {:<24} {:>5} {:>10} {:>6} {:>10}  Customer",
        "Bill", "Date/Time", "Item", "Qty", "Total", "Disc%", "Final"
    )?;
    for r in records {
        writeln!(
            out,
            "{:>5}  {:<19}  {:<24} {:>5} {:>10} {:>6} {:>10}  {}",
            r.id,
            r.timestamp,
            r.item_name,
            r.quantity_sold,
            format_amount(r.total_sale),
            format_amount(r.discount_percent),
            format_amount(r.final_total),
            r.customer_key()
        )?;
    }
    Ok(())
}

fn print_summary<W: Write>(out: &mut W, summary: &SalesSummary) -> std::io::Result<()> {
    writeln!(out, "Sales recorded: {}", summary.count)?;
    writeln!(out, "Total sales:    {}", format_amount(summary.total_sales))?;
    writeln!(out, "Total discount: {}", format_amount(summary.total_discount))?;
    writeln!(out, "Total revenue:  {}", format_amount(summary.total_revenue))
}

fn print_profit_loss<W: Write>(out: &mut W, report: &ProfitLossReport) -> std::io::Result<()> {
    writeln!(out, "Cost basis: {}", report.basis)?;
    writeln!(
        out,
        "{:>5}  {:<24} {:>5} {:>10} {:>10} {:>10} {:>10} {:>10}",
        "Bill", "Item", "Qty", "Cost", "Cost Total", "Final", "Profit", "Loss"
    )?;
    for row in &report.rows {
        writeln!(
            out,
            "{:>5}  {:<24} {:>5} {:>10} {:>10} {:>10} {:>10} {:>10}",
            row.sale_id,
            row.item_name,
            row.quantity_sold,
            format_amount(row.cost_price),
            format_amount(row.cost_total),
            format_amount(row.final_total),
            format_amount(row.profit),
            format_amount(row.loss)
        )?;
    }
    writeln!(out, "Total profit: {}", format_amount(report.total_profit))?;
    writeln!(out, "Total loss:   {}", format_amount(report.total_loss))
}

fn print_customers<W: Write>(out: &mut W, report: &CustomerReport) -> std::io::Result<()> {
    if report.is_empty() {
        return writeln!(out, "No customers yet.");
    }

    writeln!(
        out,
        "{:<24} {:<12} {:>9} {:>12}",
        "Customer", "Contact", "Purchases", "Total Spent"
    )?;
    for c in &report.customers {
        writeln!(
            out,
            "{:<24} {:<12} {:>9} {:>12}",
            c.name,
            c.contact,
            c.purchase_count,
            format_amount(c.total_spent)
        )?;
    }
    Ok(())
}

fn print_customer_list<W: Write>(out: &mut W, customers: &[CustomerKey]) -> std::io::Result<()> {
    if customers.is_empty() {
        return writeln!(out, "No customers yet.");
    }

    for customer in customers {
        writeln!(out, "{}", customer)?;
    }
    Ok(())
}

fn print_stock_report<W: Write>(out: &mut W, report: &StockReport) -> std::io::Result<()> {
    writeln!(
        out,
        "{:>5}  {:<28} {:>6} {:>10} {:>12}",
        "ID", "Name", "Qty", "Price", "Value"
    )?;
    for row in &report.rows {
        writeln!(
            out,
            "{:>5}  {:<28} {:>6} {:>10} {:>12}",
            row.item_id,
            row.name,
            row.quantity,
            format_amount(row.price),
            format_amount(row.value)
        )?;
    }
    writeln!(out, "Grand total: {}", format_amount(report.grand_total))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use crate::error::ErrorCode;
    use clap::Parser;
    use stockbook_db::DbConfig;

    struct Harness {
        db: Database,
        config: AppConfig,
        _dir: tempfile::TempDir,
    }

    impl Harness {
        async fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let mut config = AppConfig::default();
            config.store.name = "Corner Store".to_string();
            config.receipts.bills_dir = dir.path().join("bills");
            config.reports.export_dir = dir.path().join("exports");

            Harness {
                db: Database::new(DbConfig::in_memory()).await.unwrap(),
                config,
                _dir: dir,
            }
        }

        async fn run(&self, line: &[&str]) -> AppResult<String> {
            let args = std::iter::once("stockbook").chain(line.iter().copied());
            let cli = Cli::try_parse_from(args)?;

            let mut out = Vec::new();
            Console::new(&self.db, &self.config, cli.json)
                .run(cli.command, &mut out)
                .await?;
            Ok(String::from_utf8(out).unwrap())
        }
    }

    async fn stocked() -> Harness {
        let h = Harness::new().await;
        h.run(&["add-item", "--name", "Shirt", "--quantity", "10", "--price", "200", "--cost", "120"])
            .await
            .unwrap();
        h
    }

    fn sell_shirt(quantity: &str) -> Vec<&str> {
        vec![
            "sell", "--item", "Shirt", "--quantity", quantity, "--discount", "10",
            "--customer", "Asha Rao", "--contact", "9876543210",
        ]
    }

    #[tokio::test]
    async fn test_sell_prints_receipt_and_saves_bill() {
        let h = stocked().await;

        let out = h.run(&sell_shirt("3")).await.unwrap();

        assert!(out.contains("Corner Store"));
        assert!(out.contains("Final Total: 540.00"));
        assert!(out.contains("Bill saved to"));

        let items = h.db.inventory().list_all().await.unwrap();
        assert_eq!(items[0].quantity, 7);

        let month_dirs: Vec<_> = std::fs::read_dir(&h.config.receipts.bills_dir)
            .unwrap()
            .collect();
        assert_eq!(month_dirs.len(), 1);
    }

    #[tokio::test]
    async fn test_oversell_reports_insufficient_stock() {
        let h = stocked().await;

        let err = h.run(&sell_shirt("11")).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::InsufficientStock);
        assert_eq!(h.db.ledger().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_sell_unknown_item() {
        let h = stocked().await;
        let err = h
            .run(&["sell", "--id", "99", "--quantity", "1", "--customer", "Asha", "--contact", "9876543210"])
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_json_reports() {
        let h = stocked().await;
        h.run(&sell_shirt("3")).await.unwrap();

        let out = h.run(&["--json", "profit-loss"]).await.unwrap();
        let report: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(report["basis"], "current_stock");
        assert_eq!(report["total_profit"], 180.0);

        let out = h.run(&["--json", "summary"]).await.unwrap();
        let summary: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(summary["total_revenue"], 540.0);
        assert_eq!(summary["count"], 1);
    }

    #[tokio::test]
    async fn test_text_reports() {
        let h = stocked().await;
        h.run(&sell_shirt("3")).await.unwrap();

        let out = h.run(&["summary"]).await.unwrap();
        assert!(out.contains("Total revenue:  540.00"));

        let out = h.run(&["stock-report"]).await.unwrap();
        assert!(out.contains("Grand total: 1400.00"));

        let out = h.run(&["customers"]).await.unwrap();
        assert!(out.contains("Asha Rao"));
        assert!(out.contains("540.00"));
    }

    #[tokio::test]
    async fn test_customer_list_skips_blank_identities() {
        let h = stocked().await;
        h.run(&sell_shirt("1")).await.unwrap();
        h.run(&[
            "sell", "--item", "Shirt", "--quantity", "1", "--customer", "Ravi", "--contact",
            "9123456780",
        ])
        .await
        .unwrap();
        h.run(&sell_shirt("1")).await.unwrap();
        sqlx::query(
            "INSERT INTO sell_history (name, quantity_sold, price, timestamp, customer_name, contact_number)
             VALUES ('Shirt', 1, 200, '2024-01-02 10:00:00', NULL, NULL)",
        )
        .execute(h.db.pool())
        .await
        .unwrap();

        let out = h.run(&["customer-list"]).await.unwrap();
        assert_eq!(out, "Asha Rao (9876543210)\nRavi (9123456780)\n");

        let out = h.run(&["--json", "customer-list"]).await.unwrap();
        let customers: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(customers.as_array().unwrap().len(), 2);
        assert_eq!(customers[1]["name"], "Ravi");
    }

    #[tokio::test]
    async fn test_bad_flag_value_is_validation_error() {
        let h = stocked().await;

        let err = h
            .run(&["add-item", "--name", "Cap", "--quantity", "ten", "--price", "50"])
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let err = h.run(&["edit-item", "--id", "1"]).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Usage);
    }

    #[tokio::test]
    async fn test_fix_customer_and_lookup() {
        let h = stocked().await;
        h.run(&sell_shirt("1")).await.unwrap();

        let out = h
            .run(&[
                "fix-customer", "--old-name", "Asha Rao", "--old-contact", "9876543210",
                "--new-name", "Asha R", "--new-contact", "9876543210",
            ])
            .await
            .unwrap();
        assert_eq!(out.trim(), "Updated 1 sales");

        let out = h.run(&["customer-name", "--contact", "9876543210"]).await.unwrap();
        assert_eq!(out.trim(), "Asha R");

        let err = h
            .run(&["customer-name", "--contact", "9000000000"])
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_edit_search_and_remove() {
        let h = stocked().await;
        h.run(&["add-item", "--name", "Cap", "--quantity", "5", "--price", "50"])
            .await
            .unwrap();

        let out = h.run(&["items", "--search", "shi"]).await.unwrap();
        assert!(out.contains("Shirt"));
        assert!(!out.contains("Cap"));

        h.run(&["edit-item", "--id", "1", "--price", "250"]).await.unwrap();
        assert_eq!(h.db.inventory().get(1).await.unwrap().price, 250.0);

        h.run(&["remove-item", "--id", "1"]).await.unwrap();
        let err = h.run(&["remove-item", "--id", "1"]).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_export_history() {
        let h = stocked().await;
        h.run(&sell_shirt("2")).await.unwrap();

        let out = h.run(&["--json", "export-history"]).await.unwrap();
        let result: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(result["records"], 1);

        let path = result["path"].as_str().unwrap();
        let csv = std::fs::read_to_string(path).unwrap();
        assert!(csv.starts_with("id,name,quantity_sold"));
        assert_eq!(csv.lines().count(), 2);
    }
}
