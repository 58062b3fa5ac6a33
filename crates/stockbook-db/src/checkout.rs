//! # Sale Processing
//!
//! Turns a [`SaleRequest`] into a committed ledger entry.
//!
//! ## Sale Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     process_sale(request)                               │
//! │                                                                         │
//! │  1. find item by id ─────────────────────── none ──► ItemNotFound      │
//! │  2. request.check(item)   (core, pure)  ─── fail ──► Validation /      │
//! │       quantity, stock, price, discount,              InsufficientStock │
//! │       name, contact                                                    │
//! │                           nothing written so far                       │
//! │  ─────────────────────── BEGIN ──────────────────────────────────────  │
//! │  3. conditional decrement ──────────────── no row ─► InsufficientStock │
//! │       (name + cost snapshot from RETURNING)            ROLLBACK        │
//! │  4. timestamp = max(now, last ledger timestamp)                        │
//! │  5. append to sell_history ─────────────── error ──► ROLLBACK          │
//! │  ─────────────────────── COMMIT ─────────────────────────────────────  │
//! │  6. return the stored SaleRecord                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The decrement runs before the append, so the ledger can never hold a
//! sale that did not reduce stock.

use chrono::{Local, NaiveDateTime};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::repository::inventory::InventoryRepository;
use crate::repository::ledger::LedgerRepository;
use stockbook_core::{CoreError, SaleRecord, SaleRequest, TIMESTAMP_FORMAT};

/// The only writer that creates new ledger entries.
#[derive(Debug, Clone)]
pub struct SaleProcessor {
    pool: SqlitePool,
}

impl SaleProcessor {
    /// Creates a new SaleProcessor.
    pub fn new(pool: SqlitePool) -> Self {
        SaleProcessor { pool }
    }

    /// Validates, prices and commits a sale at the current local time.
    ///
    /// ## Returns
    /// * `Ok(SaleRecord)` - The stored record, ready for a receipt
    /// * `Err(DbError::Domain(ItemNotFound))` - `item_id` does not resolve
    /// * `Err(DbError::Domain(InsufficientStock))` - Not enough on hand,
    ///   including when another sale took the stock first
    /// * `Err(DbError::Domain(Validation(..)))` - Malformed request
    ///
    /// On any error neither the stock nor the ledger has changed.
    pub async fn process_sale(&self, request: &SaleRequest) -> DbResult<SaleRecord> {
        self.process_sale_at(request, Local::now().naive_local())
            .await
    }

    /// [`process_sale`](Self::process_sale) with an explicit clock reading.
    pub async fn process_sale_at(
        &self,
        request: &SaleRequest,
        now: NaiveDateTime,
    ) -> DbResult<SaleRecord> {
        let item = InventoryRepository::new(self.pool.clone())
            .find(request.item_id)
            .await?
            .ok_or(CoreError::ItemNotFound(request.item_id))?;

        let priced = request.check(&item)?;

        debug!(
            item_id = item.id,
            quantity = priced.quantity_sold,
            final_total = priced.totals.final_total,
            "Sale validated"
        );

        let mut tx = self.pool.begin().await?;

        let after = InventoryRepository::decrement_on(&mut tx, item.id, priced.quantity_sold)
            .await
            .map_err(|err| match err {
                // Deleted between lookup and decrement.
                DbError::NotFound { .. } => CoreError::ItemNotFound(item.id).into(),
                other => other,
            })?;

        let last = LedgerRepository::last_timestamp_on(&mut tx).await?;
        let timestamp = monotonic_timestamp(now, last.as_deref());

        let new_record = priced.into_new_record(after.name.clone(), after.cost_price, timestamp);
        let record = LedgerRepository::append_on(&mut tx, &new_record).await?;

        tx.commit().await?;

        info!(
            sale_id = record.id,
            item_id = after.id,
            quantity = record.quantity_sold,
            final_total = record.final_total,
            remaining = after.quantity,
            "Sale completed"
        );

        Ok(record)
    }
}

/// Formats `now`, but never earlier than the previous record's timestamp.
///
/// Both values use [`TIMESTAMP_FORMAT`], whose string order is time order.
/// A previous timestamp that does not parse is ignored.
fn monotonic_timestamp(now: NaiveDateTime, last: Option<&str>) -> String {
    let now = now.format(TIMESTAMP_FORMAT).to_string();

    match last {
        Some(last)
            if NaiveDateTime::parse_from_str(last, TIMESTAMP_FORMAT).is_ok()
                && last > now.as_str() =>
        {
            last.to_string()
        }
        _ => now,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::NaiveDate;
    use stockbook_core::{Item, NewItem, ValidationError};

    async fn setup() -> (Database, Item) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let shirt = db
            .inventory()
            .add(&NewItem::new("Shirt", 10, 200.0, 120.0))
            .await
            .unwrap();
        (db, shirt)
    }

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 14)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    fn asha(item: &Item, quantity: i64, discount: f64) -> SaleRequest {
        SaleRequest::for_item(item, quantity, discount, "Asha Rao", "9876543210")
    }

    #[tokio::test]
    async fn test_scenario_sale_updates_stock_and_ledger() {
        let (db, shirt) = setup().await;

        let record = db
            .sales()
            .process_sale(&asha(&shirt, 3, 10.0))
            .await
            .unwrap();

        assert_eq!(record.total_sale, 600.0);
        assert_eq!(record.discount_amount, 60.0);
        assert_eq!(record.final_total, 540.0);
        assert_eq!(record.cost_price_snapshot, 120.0);
        assert_eq!(record.item_name, "Shirt");
        assert!(record.sold_at().is_some());

        assert_eq!(db.inventory().get(shirt.id).await.unwrap().quantity, 7);
        assert_eq!(db.ledger().list_all().await.unwrap(), vec![record]);
    }

    #[tokio::test]
    async fn test_oversell_leaves_everything_untouched() {
        let (db, shirt) = setup().await;

        let err = db
            .sales()
            .process_sale(&asha(&shirt, 11, 10.0))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DbError::Domain(CoreError::InsufficientStock {
                available: 10,
                requested: 11,
                ..
            })
        ));
        assert_eq!(db.inventory().get(shirt.id).await.unwrap().quantity, 10);
        assert_eq!(db.ledger().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unknown_item() {
        let (db, shirt) = setup().await;
        let mut request = asha(&shirt, 1, 0.0);
        request.item_id = shirt.id + 1;

        let err = db.sales().process_sale(&request).await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::ItemNotFound(_))));
    }

    #[tokio::test]
    async fn test_validation_failures_leave_everything_untouched() {
        let (db, shirt) = setup().await;

        let mut bad_contact = asha(&shirt, 2, 0.0);
        bad_contact.customer_contact = "98765".to_string();

        let mut bad_discount = asha(&shirt, 2, 0.0);
        bad_discount.discount_percent = 150.0;

        let mut bad_price = asha(&shirt, 2, 0.0);
        bad_price.unit_price = -1.0;

        for request in [bad_contact, bad_discount, bad_price] {
            let err = db.sales().process_sale(&request).await.unwrap_err();
            assert!(matches!(err, DbError::Domain(CoreError::Validation(_))));
        }

        assert_eq!(db.inventory().get(shirt.id).await.unwrap().quantity, 10);
        assert_eq!(db.ledger().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_zero_quantity_is_invalid_quantity() {
        let (db, shirt) = setup().await;

        let err = db
            .sales()
            .process_sale(&asha(&shirt, 0, 0.0))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::Validation(ValidationError::InvalidQuantity { .. }))
        ));
    }

    #[tokio::test]
    async fn test_snapshots_survive_item_changes() {
        let (db, shirt) = setup().await;
        let record = db
            .sales()
            .process_sale(&asha(&shirt, 1, 0.0))
            .await
            .unwrap();

        db.inventory()
            .update(
                shirt.id,
                &stockbook_core::ItemUpdate {
                    name: Some("Linen Shirt".to_string()),
                    cost_price: Some(999.0),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        db.inventory().remove(shirt.id).await.unwrap();

        let stored = db.ledger().get(record.id).await.unwrap();
        assert_eq!(stored.item_name, "Shirt");
        assert_eq!(stored.cost_price_snapshot, 120.0);
    }

    #[tokio::test]
    async fn test_timestamps_never_go_backwards() {
        let (db, shirt) = setup().await;
        let sales = db.sales();

        let first = sales
            .process_sale_at(&asha(&shirt, 1, 0.0), at(12, 0, 0))
            .await
            .unwrap();
        // Clock stepped back.
        let second = sales
            .process_sale_at(&asha(&shirt, 1, 0.0), at(11, 59, 0))
            .await
            .unwrap();
        let third = sales
            .process_sale_at(&asha(&shirt, 1, 0.0), at(12, 5, 0))
            .await
            .unwrap();

        assert_eq!(first.timestamp, "2025-03-14 12:00:00");
        assert_eq!(second.timestamp, "2025-03-14 12:00:00");
        assert_eq!(third.timestamp, "2025-03-14 12:05:00");
    }

    #[tokio::test]
    async fn test_concurrent_sales_never_oversell() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(DbConfig::new(dir.path().join("race.db")).max_connections(4))
            .await
            .unwrap();
        let cap = db
            .inventory()
            .add(&NewItem::new("Cap", 5, 50.0, 20.0))
            .await
            .unwrap();

        let request = SaleRequest::for_item(&cap, 3, 0.0, "Ravi", "9123456780");
        let (s1, s2, s3) = (db.sales(), db.sales(), db.sales());
        let (a, b, c) = tokio::join!(
            s1.process_sale(&request),
            s2.process_sale(&request),
            s3.process_sale(&request),
        );

        let results = [a, b, c];
        let succeeded = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(succeeded, 1);
        for result in results.iter().filter(|r| r.is_err()) {
            assert!(matches!(
                result,
                Err(DbError::Domain(CoreError::InsufficientStock { .. }))
            ));
        }

        assert_eq!(db.inventory().get(cap.id).await.unwrap().quantity, 2);
        assert_eq!(db.ledger().count().await.unwrap(), 1);
        db.close().await;
    }

    #[test]
    fn test_monotonic_timestamp() {
        assert_eq!(monotonic_timestamp(at(9, 0, 0), None), "2025-03-14 09:00:00");
        assert_eq!(
            monotonic_timestamp(at(9, 0, 0), Some("2025-03-14 10:00:00")),
            "2025-03-14 10:00:00"
        );
        assert_eq!(
            monotonic_timestamp(at(9, 0, 0), Some("2025-03-14 08:00:00")),
            "2025-03-14 09:00:00"
        );
        assert_eq!(
            monotonic_timestamp(at(9, 0, 0), Some("not a time")),
            "2025-03-14 09:00:00"
        );
    }
}
