//! # Reporting Service
//!
//! Loads ledger and stock state and hands it to the pure report functions
//! in `stockbook_core::report`.
//!
//! Nothing is cached: every call re-reads the tables. Reports that need
//! both tables read them inside one transaction so they see the same
//! snapshot.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use crate::repository::inventory::InventoryRepository;
use crate::repository::ledger::LedgerRepository;
use stockbook_core::report::{
    self, CustomerReport, ProfitLossReport, SalesSummary, StockReport,
};
use stockbook_core::CostBasis;

/// Read-only reports over the stock store and the ledger.
#[derive(Debug, Clone)]
pub struct ReportService {
    pool: SqlitePool,
}

impl ReportService {
    /// Creates a new ReportService.
    pub fn new(pool: SqlitePool) -> Self {
        ReportService { pool }
    }

    /// Totals of sales, discounts and revenue plus the record count.
    pub async fn summary(&self) -> DbResult<SalesSummary> {
        let mut conn = self.pool.acquire().await?;
        let records = LedgerRepository::list_all_on(&mut conn).await?;

        debug!(records = records.len(), "Building sales summary");
        Ok(report::summarize(&records))
    }

    /// Per-sale profit/loss with running totals.
    pub async fn profit_loss(&self, basis: CostBasis) -> DbResult<ProfitLossReport> {
        let mut tx = self.pool.begin().await?;
        let records = LedgerRepository::list_all_on(&mut tx).await?;
        let items = InventoryRepository::list_all_on(&mut tx).await?;
        tx.commit().await?;

        debug!(
            records = records.len(),
            items = items.len(),
            basis = %basis,
            "Building profit/loss report"
        );
        Ok(report::profit_loss(&records, &items, basis))
    }

    /// Purchase count and total spent per `(name, contact)`.
    pub async fn customer_aggregate(&self) -> DbResult<CustomerReport> {
        let mut conn = self.pool.acquire().await?;
        let records = LedgerRepository::list_all_on(&mut conn).await?;

        Ok(report::customer_report(&records))
    }

    /// Stock value per item and grand total.
    pub async fn stock_report(&self) -> DbResult<StockReport> {
        let mut conn = self.pool.acquire().await?;
        let items = InventoryRepository::list_all_on(&mut conn).await?;

        Ok(report::stock_report(&items))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
