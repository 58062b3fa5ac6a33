//! # Report Module
//!
//! Read-only aggregates derived from ledger records and current stock.
//!
//! ## Report Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   Vec<SaleRecord> (insertion order)        Vec<Item> (id order)         │
//! │          │                                      │                       │
//! │          ├──────────► summarize() ──► SalesSummary                      │
//! │          │                                      │                       │
//! │          ├──────────► profit_loss() ◄───────────┤ (cost by name)        │
//! │          │                 │                    │                       │
//! │          │                 ▼                    │                       │
//! │          │          ProfitLossReport            │                       │
//! │          │                                      │                       │
//! │          └──────────► customer_report() ──► CustomerReport              │
//! │                                                 │                       │
//! │                                stock_report() ◄─┘ ──► StockReport       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every function here is pure: same inputs, same output. Callers re-read
//! the store for each report, so there is no cache to go stale.
//!
//! Rows keep the order of their input. Aggregation keys compare strings
//! exactly.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::ProfitOutcome;
use crate::types::{CostBasis, CustomerKey, Item, SaleRecord};

// =============================================================================
// Sales Summary
// =============================================================================

/// Totals over the whole ledger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SalesSummary {
    /// Sum of `total_sale`.
    pub total_sales: f64,
    /// Sum of `discount_amount`.
    pub total_discount: f64,
    /// Sum of `final_total`.
    pub total_revenue: f64,
    /// Number of records.
    pub count: usize,
}

/// Sums the stored totals of every record.
///
/// ## Example
/// ```rust
/// use stockbook_core::report::summarize;
///
/// let summary = summarize(&[]);
/// assert_eq!(summary.count, 0);
/// assert_eq!(summary.total_revenue, 0.0);
/// ```
pub fn summarize(records: &[SaleRecord]) -> SalesSummary {
    records
        .iter()
        .fold(SalesSummary::default(), |mut acc, record| {
            acc.total_sales += record.total_sale;
            acc.total_discount += record.discount_amount;
            acc.total_revenue += record.final_total;
            acc.count += 1;
            acc
        })
}

// =============================================================================
// Profit / Loss
// =============================================================================

/// One ledger record priced against its cost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProfitLossRow {
    pub sale_id: i64,
    pub item_name: String,
    pub quantity_sold: i64,
    /// Unit cost charged for this row (see [`CostBasis`]).
    pub cost_price: f64,
    /// `cost_price × quantity_sold`.
    pub cost_total: f64,
    pub final_total: f64,
    pub profit: f64,
    pub loss: f64,
}

/// Per-record profit/loss rows plus running totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProfitLossReport {
    pub basis: CostBasis,
    pub rows: Vec<ProfitLossRow>,
    pub total_profit: f64,
    pub total_loss: f64,
}

/// Builds the profit/loss report.
///
/// With [`CostBasis::CurrentStock`] each record's unit cost is the current
/// `cost_price` of the first item in `items` whose name equals the record's
/// `item_name`; records whose item is gone are charged 0. `items` is expected
/// in id order so "first" means lowest id.
///
/// With [`CostBasis::SaleSnapshot`] the record's own `cost_price_snapshot` is
/// used and `items` is ignored.
pub fn profit_loss(records: &[SaleRecord], items: &[Item], basis: CostBasis) -> ProfitLossReport {
    let current_cost = first_cost_by_name(items);

    let mut total_profit = 0.0;
    let mut total_loss = 0.0;

    let rows = records
        .iter()
        .map(|record| {
            let cost_price = match basis {
                CostBasis::CurrentStock => current_cost
                    .get(record.item_name.as_str())
                    .copied()
                    .unwrap_or(0.0),
                CostBasis::SaleSnapshot => record.cost_price_snapshot,
            };
            let cost_total = cost_price * record.quantity_sold as f64;
            let outcome = ProfitOutcome::assess(record.final_total, cost_total);

            total_profit += outcome.profit;
            total_loss += outcome.loss;

            ProfitLossRow {
                sale_id: record.id,
                item_name: record.item_name.clone(),
                quantity_sold: record.quantity_sold,
                cost_price,
                cost_total,
                final_total: record.final_total,
                profit: outcome.profit,
                loss: outcome.loss,
            }
        })
        .collect();

    ProfitLossReport {
        basis,
        rows,
        total_profit,
        total_loss,
    }
}

fn first_cost_by_name(items: &[Item]) -> HashMap<&str, f64> {
    let mut costs = HashMap::with_capacity(items.len());
    for item in items {
        costs.entry(item.name.as_str()).or_insert(item.cost_price);
    }
    costs
}

// =============================================================================
// Customers
// =============================================================================

/// Purchases attributed to one `(name, contact)` identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CustomerAggregate {
    pub name: String,
    pub contact: String,
    /// One per ledger record.
    pub purchase_count: usize,
    /// Sum of `final_total`.
    pub total_spent: f64,
}

/// Customer aggregates in order of first appearance in the ledger.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CustomerReport {
    pub customers: Vec<CustomerAggregate>,
}

impl CustomerReport {
    /// Looks up the aggregate for an exact `(name, contact)` pair.
    pub fn get(&self, name: &str, contact: &str) -> Option<&CustomerAggregate> {
        self.customers
            .iter()
            .find(|c| c.name == name && c.contact == contact)
    }

    pub fn len(&self) -> usize {
        self.customers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.customers.is_empty()
    }
}

/// Groups records by exact `(customer_name, customer_contact)`.
pub fn customer_report(records: &[SaleRecord]) -> CustomerReport {
    let mut index: HashMap<CustomerKey, usize> = HashMap::new();
    let mut customers: Vec<CustomerAggregate> = Vec::new();

    for record in records {
        let slot = *index.entry(record.customer_key()).or_insert_with(|| {
            customers.push(CustomerAggregate {
                name: record.customer_name.clone(),
                contact: record.customer_contact.clone(),
                purchase_count: 0,
                total_spent: 0.0,
            });
            customers.len() - 1
        });

        let aggregate = &mut customers[slot];
        aggregate.purchase_count += 1;
        aggregate.total_spent += record.final_total;
    }

    CustomerReport { customers }
}

// =============================================================================
// Stock Report
// =============================================================================

/// Value of one item's stock at its current price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StockReportRow {
    pub item_id: i64,
    pub name: String,
    pub quantity: i64,
    pub price: f64,
    /// `quantity × price`.
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StockReport {
    pub rows: Vec<StockReportRow>,
    pub grand_total: f64,
}

/// Values every item at `quantity × price`.
pub fn stock_report(items: &[Item]) -> StockReport {
    let rows: Vec<StockReportRow> = items
        .iter()
        .map(|item| StockReportRow {
            item_id: item.id,
            name: item.name.clone(),
            quantity: item.quantity,
            price: item.price,
            value: item.stock_value(),
        })
        .collect();

    let grand_total = rows.iter().map(|row| row.value).sum();

    StockReport { rows, grand_total }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::SaleTotals;

    fn item(id: i64, name: &str, quantity: i64, price: f64, cost_price: f64) -> Item {
        Item {
            id,
            name: name.to_string(),
            quantity,
            price,
            barcode: None,
            cost_price,
        }
    }

    fn record(id: i64, name: &str, qty: i64, price: f64, pct: f64, customer: (&str, &str)) -> SaleRecord {
        let totals = SaleTotals::compute(qty, price, pct);
        SaleRecord {
            id,
            item_name: name.to_string(),
            quantity_sold: qty,
            unit_price: price,
            total_sale: totals.total_sale,
            discount_percent: pct,
            discount_amount: totals.discount_amount,
            final_total: totals.final_total,
            cost_price_snapshot: 100.0,
            timestamp: "2025-03-14 09:26:53".to_string(),
            customer_name: customer.0.to_string(),
            customer_contact: customer.1.to_string(),
        }
    }

    const ASHA: (&str, &str) = ("Asha Rao", "9876543210");
    const RAVI: (&str, &str) = ("Ravi", "9123456780");

    #[test]
    fn test_summarize() {
        let records = vec![
            record(1, "Shirt", 3, 200.0, 10.0, ASHA),
            record(2, "Cap", 2, 50.0, 0.0, RAVI),
        ];
        let summary = summarize(&records);

        assert_eq!(summary.count, 2);
        assert_eq!(summary.total_sales, 700.0);
        assert_eq!(summary.total_discount, 60.0);
        assert_eq!(summary.total_revenue, 640.0);
    }

    #[test]
    fn test_summarize_zeroed_legacy_record() {
        let mut legacy = record(1, "Old", 1, 10.0, 0.0, ASHA);
        legacy.total_sale = 0.0;
        legacy.discount_amount = 0.0;
        legacy.final_total = 0.0;

        let summary = summarize(&[legacy, record(2, "Cap", 2, 50.0, 0.0, RAVI)]);
        assert_eq!(summary.count, 2);
        assert_eq!(summary.total_revenue, 100.0);
    }

    #[test]
    fn test_profit_loss_scenario() {
        let records = vec![record(1, "Shirt", 3, 200.0, 10.0, ASHA)];
        let items = vec![item(1, "Shirt", 7, 200.0, 120.0)];

        let report = profit_loss(&records, &items, CostBasis::CurrentStock);
        let row = &report.rows[0];

        assert_eq!(row.cost_price, 120.0);
        assert_eq!(row.cost_total, 360.0);
        assert_eq!(row.final_total, 540.0);
        assert_eq!(row.profit, 180.0);
        assert_eq!(row.loss, 0.0);
        assert_eq!(report.total_profit, 180.0);
        assert_eq!(report.total_loss, 0.0);
    }

    #[test]
    fn test_profit_loss_missing_item_costs_zero() {
        let records = vec![record(1, "Discontinued", 2, 30.0, 0.0, ASHA)];

        let report = profit_loss(&records, &[], CostBasis::CurrentStock);
        assert_eq!(report.rows[0].cost_price, 0.0);
        assert_eq!(report.rows[0].profit, 60.0);
    }

    #[test]
    fn test_profit_loss_loss_and_break_even() {
        let records = vec![
            record(1, "Cap", 2, 50.0, 50.0, ASHA),
            record(2, "Cap", 1, 80.0, 0.0, RAVI),
        ];
        let items = vec![item(1, "Cap", 5, 80.0, 80.0)];

        let report = profit_loss(&records, &items, CostBasis::CurrentStock);
        assert_eq!(report.rows[0].loss, 110.0);
        assert_eq!(report.rows[0].profit, 0.0);
        assert_eq!(report.rows[1].profit, 0.0);
        assert_eq!(report.rows[1].loss, 0.0);
        assert_eq!(report.total_loss, 110.0);
    }

    #[test]
    fn test_profit_loss_duplicate_names_use_first_item() {
        let records = vec![record(1, "Shirt", 1, 200.0, 0.0, ASHA)];
        let items = vec![
            item(3, "Shirt", 1, 200.0, 150.0),
            item(8, "Shirt", 1, 200.0, 50.0),
        ];

        let report = profit_loss(&records, &items, CostBasis::CurrentStock);
        assert_eq!(report.rows[0].cost_price, 150.0);
    }

    #[test]
    fn test_profit_loss_snapshot_basis() {
        let records = vec![record(1, "Shirt", 3, 200.0, 10.0, ASHA)];
        let items = vec![item(1, "Shirt", 7, 200.0, 120.0)];

        let report = profit_loss(&records, &items, CostBasis::SaleSnapshot);
        assert_eq!(report.basis, CostBasis::SaleSnapshot);
        assert_eq!(report.rows[0].cost_price, 100.0);
        assert_eq!(report.rows[0].profit, 240.0);
    }

    #[test]
    fn test_reports_are_idempotent() {
        let records = vec![
            record(1, "Shirt", 3, 200.0, 10.0, ASHA),
            record(2, "Cap", 2, 50.0, 0.0, RAVI),
        ];
        let items = vec![item(1, "Shirt", 7, 200.0, 120.0)];

        assert_eq!(summarize(&records), summarize(&records));
        assert_eq!(
            profit_loss(&records, &items, CostBasis::CurrentStock),
            profit_loss(&records, &items, CostBasis::CurrentStock)
        );
    }

    #[test]
    fn test_customer_report() {
        let records = vec![
            record(1, "Shirt", 1, 200.0, 0.0, ASHA),
            record(2, "Cap", 2, 50.0, 0.0, RAVI),
            record(3, "Cap", 1, 50.0, 0.0, ASHA),
            record(4, "Cap", 1, 50.0, 0.0, ("asha rao", "9876543210")),
        ];
        let report = customer_report(&records);

        assert_eq!(report.len(), 3);
        assert_eq!(report.customers[0].name, "Asha Rao");
        assert_eq!(report.customers[1].name, "Ravi");

        let asha = report.get("Asha Rao", "9876543210").unwrap();
        assert_eq!(asha.purchase_count, 2);
        assert_eq!(asha.total_spent, 250.0);

        assert_eq!(report.get("asha rao", "9876543210").unwrap().purchase_count, 1);
        assert!(report.get("Nobody", "0000000000").is_none());
    }

    #[test]
    fn test_stock_report() {
        let items = vec![
            item(1, "Shirt", 7, 200.0, 120.0),
            item(2, "Cap", 0, 50.0, 20.0),
            item(3, "Sock", 12, 2.5, 1.0),
        ];
        let report = stock_report(&items);

        assert_eq!(report.rows.len(), 3);
        assert_eq!(report.rows[0].value, 1400.0);
        assert_eq!(report.rows[1].value, 0.0);
        assert_eq!(report.grand_total, 1430.0);
    }
}
