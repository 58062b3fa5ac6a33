//! # Inventory Repository
//!
//! The stock store: item CRUD, lookup, and the atomic sale decrement.
//!
//! ## Stock Decrement
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                    Stock Update Strategy                            │
//! │                                                                     │
//! │  ❌ WRONG: read, check, write (lost update between steps)           │
//! │     SELECT quantity ...  → 10                                       │
//! │     UPDATE inventory SET quantity = 7 ...                           │
//! │                                                                     │
//! │  ✅ CORRECT: one conditional delta update                           │
//! │     UPDATE inventory SET quantity = quantity - 3                    │
//! │     WHERE id = ? AND quantity >= 3                                  │
//! │     RETURNING ...                                                   │
//! │                                                                     │
//! │  No row returned → the item is gone or stock ran out.              │
//! │  Two sellers racing for the last units: one wins, one gets         │
//! │  InsufficientStock; quantity never goes below zero.                │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::sqlite::{SqliteConnection, SqliteRow};
use sqlx::{FromRow, SqlitePool};
use tracing::{debug, warn};

use crate::error::{DbError, DbResult};
use crate::repository::LenientRow;
use stockbook_core::validation::validate_sale_quantity;
use stockbook_core::{CoreError, Item, ItemUpdate, NewItem};

const ITEM_COLUMNS: &str = "id, name, quantity, price, barcode, cost_price";

// =============================================================================
// Row Mapping
// =============================================================================

/// Raw `inventory` row, decoded leniently.
#[derive(Debug, Clone)]
pub(crate) struct InventoryRow {
    item: Item,
    missing: Vec<&'static str>,
}

impl<'r> FromRow<'r, SqliteRow> for InventoryRow {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let mut lenient = LenientRow::new(row);

        let item = Item {
            id: lenient.integer("id"),
            name: lenient.text("name"),
            quantity: lenient.integer("quantity").max(0),
            price: lenient.real("price"),
            barcode: lenient.optional_text("barcode"),
            cost_price: lenient.real("cost_price"),
        };

        Ok(InventoryRow {
            item,
            missing: lenient.missing,
        })
    }
}

impl From<InventoryRow> for Item {
    fn from(row: InventoryRow) -> Self {
        if !row.missing.is_empty() {
            warn!(
                item_id = row.item.id,
                fields = ?row.missing,
                "Inventory row has missing fields; treated as zero"
            );
        }
        row.item
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for the `inventory` table.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.inventory();
///
/// let shirt = repo.add(&NewItem::new("Shirt", 10, 200.0, 120.0)).await?;
/// let hits = repo.search("shi").await?;
/// let after = repo.decrement(shirt.id, 3).await?;
/// ```
#[derive(Debug, Clone)]
pub struct InventoryRepository {
    pool: SqlitePool,
}

impl InventoryRepository {
    /// Creates a new InventoryRepository.
    pub fn new(pool: SqlitePool) -> Self {
        InventoryRepository { pool }
    }

    /// Adds an item and returns it with its assigned id.
    ///
    /// ## Returns
    /// * `Ok(Item)` - Stored item
    /// * `Err(DbError::Domain)` - Empty name or negative quantity/price/cost
    pub async fn add(&self, new_item: &NewItem) -> DbResult<Item> {
        new_item.validate()?;

        let name = new_item.name.trim().to_string();
        let barcode = new_item
            .barcode
            .as_deref()
            .map(str::trim)
            .filter(|b| !b.is_empty())
            .map(str::to_string);

        debug!(name = %name, quantity = new_item.quantity, "Adding item");

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO inventory (name, quantity, price, barcode, cost_price)
            VALUES (?1, ?2, ?3, ?4, ?5)
            RETURNING id
            "#,
        )
        .bind(&name)
        .bind(new_item.quantity)
        .bind(new_item.price)
        .bind(barcode.as_deref().unwrap_or(""))
        .bind(new_item.cost_price)
        .fetch_one(&self.pool)
        .await?;

        Ok(Item {
            id,
            name,
            quantity: new_item.quantity,
            price: new_item.price,
            barcode,
            cost_price: new_item.cost_price,
        })
    }

    /// Gets an item by id, failing with `NotFound` when absent.
    pub async fn get(&self, id: i64) -> DbResult<Item> {
        self.find(id)
            .await?
            .ok_or_else(|| DbError::not_found("Item", id))
    }

    /// Gets an item by id.
    ///
    /// ## Returns
    /// * `Ok(Some(Item))` - Item found
    /// * `Ok(None)` - Item not found
    pub async fn find(&self, id: i64) -> DbResult<Option<Item>> {
        let row: Option<InventoryRow> = sqlx::query_as(&format!(
            "SELECT {ITEM_COLUMNS} FROM inventory WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Item::from))
    }

    /// Applies a partial update. Unspecified fields keep their value.
    ///
    /// ## Returns
    /// * `Ok(Item)` - The item after the update
    /// * `Err(DbError::NotFound)` - Item doesn't exist
    /// * `Err(DbError::Domain)` - A given field failed validation
    pub async fn update(&self, id: i64, update: &ItemUpdate) -> DbResult<Item> {
        let current = self.get(id).await?;
        update.apply_to(&current)?;

        debug!(item_id = id, "Updating item");

        // Unset fields keep the stored value; `current` is never written back.
        let row: Option<InventoryRow> = sqlx::query_as(&format!(
            r#"
            UPDATE inventory SET
                name = COALESCE(?2, name),
                quantity = COALESCE(?3, quantity),
                price = COALESCE(?4, price),
                cost_price = COALESCE(?5, cost_price)
            WHERE id = ?1
            RETURNING {ITEM_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(update.name.as_deref().map(str::trim))
        .bind(update.quantity)
        .bind(update.price)
        .bind(update.cost_price)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Item::from).ok_or_else(|| DbError::not_found("Item", id))
    }

    /// Deletes an item. The ledger is not touched.
    pub async fn remove(&self, id: i64) -> DbResult<()> {
        debug!(item_id = id, "Removing item");

        let result = sqlx::query("DELETE FROM inventory WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Item", id));
        }

        Ok(())
    }

    /// Removes `amount` units from stock as one check-and-set.
    ///
    /// ## Returns
    /// * `Ok(Item)` - The item after the decrement
    /// * `Err(DbError::NotFound)` - Item doesn't exist
    /// * `Err(DbError::Domain(InsufficientStock))` - Not enough on hand
    pub async fn decrement(&self, id: i64, amount: i64) -> DbResult<Item> {
        validate_sale_quantity(amount)?;

        let mut conn = self.pool.acquire().await?;
        Self::decrement_on(&mut conn, id, amount).await
    }

    /// Decrement on a caller-supplied connection (usually a transaction).
    pub(crate) async fn decrement_on(
        conn: &mut SqliteConnection,
        id: i64,
        amount: i64,
    ) -> DbResult<Item> {
        debug!(item_id = id, amount, "Decrementing stock");

        let row: Option<InventoryRow> = sqlx::query_as(&format!(
            r#"
            UPDATE inventory
            SET quantity = quantity - ?2
            WHERE id = ?1 AND quantity >= ?2
            RETURNING {ITEM_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(amount)
        .fetch_optional(&mut *conn)
        .await?;

        if let Some(row) = row {
            return Ok(row.into());
        }

        // Nothing updated: tell a missing item apart from short stock.
        let current: Option<InventoryRow> = sqlx::query_as(&format!(
            "SELECT {ITEM_COLUMNS} FROM inventory WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        match current.map(Item::from) {
            None => Err(DbError::not_found("Item", id)),
            Some(item) => Err(CoreError::InsufficientStock {
                item: item.name,
                available: item.quantity,
                requested: amount,
            }
            .into()),
        }
    }

    /// First item (lowest id) whose name equals `name` exactly.
    ///
    /// For interactive lookup only; duplicate names are not disambiguated.
    pub async fn find_by_name(&self, name: &str) -> DbResult<Option<Item>> {
        let row: Option<InventoryRow> = sqlx::query_as(&format!(
            "SELECT {ITEM_COLUMNS} FROM inventory WHERE name = ?1 ORDER BY id LIMIT 1"
        ))
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Item::from))
    }

    /// Lists every item in id order.
    pub async fn list_all(&self) -> DbResult<Vec<Item>> {
        let mut conn = self.pool.acquire().await?;
        Self::list_all_on(&mut conn).await
    }

    pub(crate) async fn list_all_on(conn: &mut SqliteConnection) -> DbResult<Vec<Item>> {
        let rows: Vec<InventoryRow> = sqlx::query_as(&format!(
            "SELECT {ITEM_COLUMNS} FROM inventory ORDER BY id"
        ))
        .fetch_all(&mut *conn)
        .await?;

        Ok(rows.into_iter().map(Item::from).collect())
    }

    /// Case-insensitive substring search on the name.
    ///
    /// An empty (or blank) query lists every item.
    pub async fn search(&self, query: &str) -> DbResult<Vec<Item>> {
        let query = query.trim().to_lowercase();

        debug!(query = %query, "Searching items");

        let items = self.list_all().await?;
        if query.is_empty() {
            return Ok(items);
        }

        let matches: Vec<Item> = items
            .into_iter()
            .filter(|item| item.name.to_lowercase().contains(&query))
            .collect();

        debug!(count = matches.len(), "Search returned items");
        Ok(matches)
    }

    /// Counts items.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM inventory")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
