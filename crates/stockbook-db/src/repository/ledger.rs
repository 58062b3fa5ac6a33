//! # Ledger Repository
//!
//! The append-only sales ledger stored in `sell_history`.
//!
//! ## Column Mapping
//! ```text
//! sell_history column   SaleRecord field
//! ───────────────────   ───────────────────
//! id                    id
//! name                  item_name
//! quantity_sold         quantity_sold
//! price                 unit_price
//! total_sale            total_sale
//! discount_percent      discount_percent
//! discount_price        discount_amount
//! final_total           final_total
//! cost_price            cost_price_snapshot
//! timestamp             timestamp
//! customer_name         customer_name
//! contact_number        customer_contact
//! discount              (legacy, never written or read)
//! ```
//!
//! Records are only ever added through [`LedgerRepository::append`] and
//! listed in `id` order. The one in-place edit is
//! [`LedgerRepository::correct_customer_identity`].

use sqlx::sqlite::{SqliteConnection, SqliteRow};
use sqlx::{FromRow, SqlitePool};
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult};
use crate::repository::LenientRow;
use stockbook_core::validation::{validate_contact_number, validate_customer_name};
use stockbook_core::{CustomerKey, NewSaleRecord, SaleRecord};

const RECORD_COLUMNS: &str = "id, name, quantity_sold, price, total_sale, discount_percent, \
     discount_price, final_total, cost_price, timestamp, customer_name, contact_number";

// =============================================================================
// Row Mapping
// =============================================================================

/// Raw `sell_history` row, decoded leniently.
///
/// Every numeric field that is NULL or unreadable becomes 0 and every text
/// field becomes blank; the record is still returned.
#[derive(Debug, Clone)]
pub(crate) struct LedgerRow {
    record: SaleRecord,
    missing: Vec<&'static str>,
}

impl<'r> FromRow<'r, SqliteRow> for LedgerRow {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let mut lenient = LenientRow::new(row);

        let record = SaleRecord {
            id: lenient.integer("id"),
            item_name: lenient.text("name"),
            quantity_sold: lenient.integer("quantity_sold"),
            unit_price: lenient.real("price"),
            total_sale: lenient.real("total_sale"),
            discount_percent: lenient.real("discount_percent"),
            discount_amount: lenient.real("discount_price"),
            final_total: lenient.real("final_total"),
            cost_price_snapshot: lenient.real("cost_price"),
            timestamp: lenient.text("timestamp"),
            customer_name: lenient.text("customer_name"),
            customer_contact: lenient.text("contact_number"),
        };

        Ok(LedgerRow {
            record,
            missing: lenient.missing,
        })
    }
}

impl From<LedgerRow> for SaleRecord {
    fn from(row: LedgerRow) -> Self {
        if !row.missing.is_empty() {
            warn!(
                sale_id = row.record.id,
                fields = ?row.missing,
                "Ledger row has missing fields; treated as zero"
            );
        }
        row.record
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for the `sell_history` table.
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    pool: SqlitePool,
}

impl LedgerRepository {
    /// Creates a new LedgerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        LedgerRepository { pool }
    }

    /// Appends a record and returns it with its assigned id.
    ///
    /// Sales should go through `SaleProcessor`, which pairs the append with
    /// the stock decrement; this is exposed for imports and tests.
    pub async fn append(&self, record: &NewSaleRecord) -> DbResult<SaleRecord> {
        let mut conn = self.pool.acquire().await?;
        Self::append_on(&mut conn, record).await
    }

    pub(crate) async fn append_on(
        conn: &mut SqliteConnection,
        record: &NewSaleRecord,
    ) -> DbResult<SaleRecord> {
        debug!(item = %record.item_name, quantity = record.quantity_sold, "Appending sale");

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO sell_history (
                name, quantity_sold, price, total_sale,
                discount_percent, discount_price, final_total,
                timestamp, customer_name, contact_number, cost_price
            ) VALUES (
                ?1, ?2, ?3, ?4,
                ?5, ?6, ?7,
                ?8, ?9, ?10, ?11
            )
            RETURNING id
            "#,
        )
        .bind(&record.item_name)
        .bind(record.quantity_sold)
        .bind(record.unit_price)
        .bind(record.total_sale)
        .bind(record.discount_percent)
        .bind(record.discount_amount)
        .bind(record.final_total)
        .bind(&record.timestamp)
        .bind(&record.customer_name)
        .bind(&record.customer_contact)
        .bind(record.cost_price_snapshot)
        .fetch_one(&mut *conn)
        .await?;

        Ok(record.clone().into_record(id))
    }

    /// Lists every record in insertion order.
    pub async fn list_all(&self) -> DbResult<Vec<SaleRecord>> {
        let mut conn = self.pool.acquire().await?;
        Self::list_all_on(&mut conn).await
    }

    pub(crate) async fn list_all_on(conn: &mut SqliteConnection) -> DbResult<Vec<SaleRecord>> {
        let rows: Vec<LedgerRow> = sqlx::query_as(&format!(
            "SELECT {RECORD_COLUMNS} FROM sell_history ORDER BY id"
        ))
        .fetch_all(&mut *conn)
        .await?;

        Ok(rows.into_iter().map(SaleRecord::from).collect())
    }

    /// Gets a record by id, failing with `NotFound` when absent.
    pub async fn get(&self, id: i64) -> DbResult<SaleRecord> {
        let row: Option<LedgerRow> = sqlx::query_as(&format!(
            "SELECT {RECORD_COLUMNS} FROM sell_history WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(SaleRecord::from)
            .ok_or_else(|| DbError::not_found("Sale", id))
    }

    /// Counts records.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sell_history")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Timestamp of the most recently appended record, if any.
    pub(crate) async fn last_timestamp_on(conn: &mut SqliteConnection) -> DbResult<Option<String>> {
        let row: Option<SqliteRow> =
            sqlx::query("SELECT timestamp FROM sell_history ORDER BY id DESC LIMIT 1")
                .fetch_optional(&mut *conn)
                .await?;

        Ok(row.and_then(|row| LenientRow::new(&row).optional_text("timestamp")))
    }

    /// Rewrites the customer identity on every matching record.
    ///
    /// Matches `old_name`/`old_contact` exactly, with NULL read as blank the
    /// way reports show it. The new values are checked with the same rules
    /// as a sale and stored trimmed.
    ///
    /// ## Returns
    /// * `Ok(n)` - Number of records rewritten (0 when nothing matched)
    /// * `Err(DbError::Domain)` - New name or contact is invalid
    pub async fn correct_customer_identity(
        &self,
        old_name: &str,
        old_contact: &str,
        new_name: &str,
        new_contact: &str,
    ) -> DbResult<u64> {
        let new_name = validate_customer_name(new_name)?;
        let new_contact = validate_contact_number(new_contact)?;

        let result = sqlx::query(
            r#"
            UPDATE sell_history
            SET customer_name = ?3, contact_number = ?4
            WHERE COALESCE(customer_name, '') = ?1
              AND COALESCE(contact_number, '') = ?2
            "#,
        )
        .bind(old_name)
        .bind(old_contact)
        .bind(&new_name)
        .bind(&new_contact)
        .execute(&self.pool)
        .await?;

        let count = result.rows_affected();
        info!(
            from = %CustomerKey::new(old_name, old_contact),
            to = %CustomerKey::new(&new_name, &new_contact),
            count,
            "Corrected customer identity"
        );

        Ok(count)
    }

    /// Name on the most recent record with this contact number.
    pub async fn customer_name_for_contact(&self, contact: &str) -> DbResult<Option<String>> {
        let row: Option<SqliteRow> = sqlx::query(
            r#"
            SELECT customer_name FROM sell_history
            WHERE contact_number = ?1
              AND customer_name IS NOT NULL AND customer_name <> ''
            ORDER BY id DESC
            LIMIT 1
            "#,
        )
        .bind(contact.trim())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.and_then(|row| LenientRow::new(&row).optional_text("customer_name")))
    }

    /// Distinct `(name, contact)` pairs in order of first appearance.
    ///
    /// Records with a blank name or contact are left out.
    pub async fn customers(&self) -> DbResult<Vec<CustomerKey>> {
        let rows: Vec<SqliteRow> = sqlx::query(
            r#"
            SELECT customer_name, contact_number
            FROM sell_history
            WHERE TRIM(COALESCE(customer_name, '')) <> ''
              AND TRIM(COALESCE(contact_number, '')) <> ''
            GROUP BY customer_name, contact_number
            ORDER BY MIN(id)
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| {
                let lenient = LenientRow::new(row);
                CustomerKey::new(
                    lenient.optional_text("customer_name").unwrap_or_default(),
                    lenient.optional_text("contact_number").unwrap_or_default(),
                )
            })
            .collect())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
