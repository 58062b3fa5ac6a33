//! # Domain Types
//!
//! Core domain types used throughout Stockbook.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      Item       │   │   SaleRequest   │   │   SaleRecord    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (i64)       │──►│  item_id        │──►│  id (i64)       │       │
//! │  │  name           │   │  quantity_sold  │   │  item_name  (❄) │       │
//! │  │  quantity       │   │  unit_price     │   │  totals         │       │
//! │  │  price          │   │  discount_%     │   │  cost_snapshot ❄│       │
//! │  │  cost_price     │   │  customer       │   │  timestamp      │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    NewItem      │   │   ItemUpdate    │   │   CustomerKey   │       │
//! │  │  add() input    │   │  partial edit   │   │  (name,contact) │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ❄ = frozen at sale time, never re-read from the item                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! A [`SaleRecord`] copies the item's name and cost price when the sale is
//! made. Renaming or deleting the item later never changes history.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, UnknownCostBasis, ValidationResult};
use crate::money::SaleTotals;
use crate::validation;
use crate::TIMESTAMP_FORMAT;

// =============================================================================
// Item
// =============================================================================

/// A stock item available for sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Item {
    /// Unique identifier, assigned on creation and never reused.
    pub id: i64,

    /// Display name. Not unique; duplicates are told apart by id.
    pub name: String,

    /// Units on hand. Never negative.
    pub quantity: i64,

    /// Current unit selling price.
    pub price: f64,

    /// Optional barcode (blank when not given).
    pub barcode: Option<String>,

    /// Latest acquisition cost per unit; 0 when unknown.
    pub cost_price: f64,
}

impl Item {
    /// Value of the units on hand at the current selling price.
    #[inline]
    pub fn stock_value(&self) -> f64 {
        self.quantity as f64 * self.price
    }

    /// Checks whether `quantity` units can be sold from current stock.
    #[inline]
    pub fn can_sell(&self, quantity: i64) -> bool {
        quantity <= self.quantity
    }
}

/// Input for adding an item to the stock store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewItem {
    pub name: String,
    pub quantity: i64,
    pub price: f64,
    #[serde(default)]
    pub cost_price: f64,
    #[serde(default)]
    pub barcode: Option<String>,
}

impl NewItem {
    /// Creates an item input with no barcode.
    pub fn new(name: impl Into<String>, quantity: i64, price: f64, cost_price: f64) -> Self {
        NewItem {
            name: name.into(),
            quantity,
            price,
            cost_price,
            barcode: None,
        }
    }

    /// Sets the barcode.
    pub fn with_barcode(mut self, barcode: impl Into<String>) -> Self {
        self.barcode = Some(barcode.into());
        self
    }

    /// Checks every field, in declaration order.
    pub fn validate(&self) -> ValidationResult<()> {
        validation::validate_item_name(&self.name)?;
        validation::validate_stock_quantity(self.quantity)?;
        validation::validate_amount("price", self.price)?;
        validation::validate_amount("cost_price", self.cost_price)?;
        Ok(())
    }
}

/// Partial update of an item. `None` fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ItemUpdate {
    pub name: Option<String>,
    pub quantity: Option<i64>,
    pub price: Option<f64>,
    pub cost_price: Option<f64>,
}

impl ItemUpdate {
    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.quantity.is_none()
            && self.price.is_none()
            && self.cost_price.is_none()
    }

    /// Validates the given fields and merges them onto `item`.
    ///
    /// ## Example
    /// ```rust
    /// use stockbook_core::{Item, ItemUpdate};
    ///
    /// let item = Item {
    ///     id: 1,
    ///     name: "Shirt".into(),
    ///     quantity: 10,
    ///     price: 200.0,
    ///     barcode: None,
    ///     cost_price: 120.0,
    /// };
    /// let update = ItemUpdate { price: Some(250.0), ..Default::default() };
    ///
    /// let updated = update.apply_to(&item).unwrap();
    /// assert_eq!(updated.price, 250.0);
    /// assert_eq!(updated.quantity, 10);
    /// ```
    pub fn apply_to(&self, item: &Item) -> ValidationResult<Item> {
        let merged = Item {
            id: item.id,
            name: self.name.clone().unwrap_or_else(|| item.name.clone()),
            quantity: self.quantity.unwrap_or(item.quantity),
            price: self.price.unwrap_or(item.price),
            barcode: item.barcode.clone(),
            cost_price: self.cost_price.unwrap_or(item.cost_price),
        };

        validation::validate_item_name(&merged.name)?;
        validation::validate_stock_quantity(merged.quantity)?;
        validation::validate_amount("price", merged.price)?;
        validation::validate_amount("cost_price", merged.cost_price)?;

        Ok(merged)
    }
}

// =============================================================================
// Sale Request
// =============================================================================

/// A request to sell some units of one item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleRequest {
    pub item_id: i64,
    pub quantity_sold: i64,
    pub unit_price: f64,
    #[serde(default)]
    pub discount_percent: f64,
    pub customer_name: String,
    pub customer_contact: String,
}

impl SaleRequest {
    /// Builds a request at the item's current selling price.
    pub fn for_item(
        item: &Item,
        quantity_sold: i64,
        discount_percent: f64,
        customer_name: impl Into<String>,
        customer_contact: impl Into<String>,
    ) -> Self {
        SaleRequest {
            item_id: item.id,
            quantity_sold,
            unit_price: item.price,
            discount_percent,
            customer_name: customer_name.into(),
            customer_contact: customer_contact.into(),
        }
    }

    /// Validates the request against the resolved item and prices it.
    ///
    /// Checks run in a fixed order and stop at the first failure:
    ///
    /// ```text
    /// quantity > 0 ─► quantity ≤ stock ─► price ≥ 0 ─► discount ∈ [0,100]
    ///              ─► customer name ─► contact number ─► PricedSale
    /// ```
    ///
    /// Nothing is mutated here; the caller decrements stock and appends the
    /// record only after this returns `Ok`.
    pub fn check(&self, item: &Item) -> CoreResult<PricedSale> {
        validation::validate_sale_quantity(self.quantity_sold)?;

        if !item.can_sell(self.quantity_sold) {
            return Err(CoreError::InsufficientStock {
                item: item.name.clone(),
                available: item.quantity,
                requested: self.quantity_sold,
            });
        }

        validation::validate_amount("unit_price", self.unit_price)?;
        validation::validate_discount_percent(self.discount_percent)?;
        let customer_name = validation::validate_customer_name(&self.customer_name)?;
        let customer_contact = validation::validate_contact_number(&self.customer_contact)?;

        Ok(PricedSale {
            item_id: item.id,
            quantity_sold: self.quantity_sold,
            unit_price: self.unit_price,
            discount_percent: self.discount_percent,
            totals: SaleTotals::compute(
                self.quantity_sold,
                self.unit_price,
                self.discount_percent,
            ),
            customer_name,
            customer_contact,
        })
    }
}

/// A validated and priced sale, ready to be committed.
#[derive(Debug, Clone, PartialEq)]
pub struct PricedSale {
    pub item_id: i64,
    pub quantity_sold: i64,
    pub unit_price: f64,
    pub discount_percent: f64,
    pub totals: SaleTotals,
    pub customer_name: String,
    pub customer_contact: String,
}

impl PricedSale {
    /// Freezes the sale into a ledger entry with the item snapshot and timestamp.
    pub fn into_new_record(
        self,
        item_name: String,
        cost_price_snapshot: f64,
        timestamp: String,
    ) -> NewSaleRecord {
        NewSaleRecord {
            item_name,
            quantity_sold: self.quantity_sold,
            unit_price: self.unit_price,
            total_sale: self.totals.total_sale,
            discount_percent: self.discount_percent,
            discount_amount: self.totals.discount_amount,
            final_total: self.totals.final_total,
            cost_price_snapshot,
            timestamp,
            customer_name: self.customer_name,
            customer_contact: self.customer_contact,
        }
    }
}

// =============================================================================
// Sale Record
// =============================================================================

/// An entry in the sales ledger.
///
/// Immutable once written, except for the customer identity correction path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleRecord {
    /// Insertion-order key.
    pub id: i64,
    /// Item name at sale time (frozen).
    pub item_name: String,
    pub quantity_sold: i64,
    pub unit_price: f64,
    /// `quantity_sold × unit_price`.
    pub total_sale: f64,
    pub discount_percent: f64,
    /// `total_sale × discount_percent / 100`.
    pub discount_amount: f64,
    /// `total_sale − discount_amount`.
    pub final_total: f64,
    /// Item cost price at sale time (frozen).
    pub cost_price_snapshot: f64,
    /// Completion time in [`TIMESTAMP_FORMAT`].
    pub timestamp: String,
    pub customer_name: String,
    pub customer_contact: String,
}

impl SaleRecord {
    /// Parses the stored timestamp. `None` for blank or legacy-garbled values.
    pub fn sold_at(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.timestamp, TIMESTAMP_FORMAT).ok()
    }

    /// The `(name, contact)` identity this sale is attributed to.
    pub fn customer_key(&self) -> CustomerKey {
        CustomerKey::new(&self.customer_name, &self.customer_contact)
    }
}

/// A ledger entry that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSaleRecord {
    pub item_name: String,
    pub quantity_sold: i64,
    pub unit_price: f64,
    pub total_sale: f64,
    pub discount_percent: f64,
    pub discount_amount: f64,
    pub final_total: f64,
    pub cost_price_snapshot: f64,
    pub timestamp: String,
    pub customer_name: String,
    pub customer_contact: String,
}

impl NewSaleRecord {
    /// Attaches the id assigned by the ledger.
    pub fn into_record(self, id: i64) -> SaleRecord {
        SaleRecord {
            id,
            item_name: self.item_name,
            quantity_sold: self.quantity_sold,
            unit_price: self.unit_price,
            total_sale: self.total_sale,
            discount_percent: self.discount_percent,
            discount_amount: self.discount_amount,
            final_total: self.final_total,
            cost_price_snapshot: self.cost_price_snapshot,
            timestamp: self.timestamp,
            customer_name: self.customer_name,
            customer_contact: self.customer_contact,
        }
    }
}

// =============================================================================
// Customer Identity
// =============================================================================

/// Aggregation key for customers: exact `(name, contact)` equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CustomerKey {
    pub name: String,
    pub contact: String,
}

impl CustomerKey {
    pub fn new(name: impl Into<String>, contact: impl Into<String>) -> Self {
        CustomerKey {
            name: name.into(),
            contact: contact.into(),
        }
    }
}

impl fmt::Display for CustomerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.contact)
    }
}

// =============================================================================
// Configuration Types
// =============================================================================

/// Which cost price the profit/loss report charges against each sale.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum CostBasis {
    /// The item's current cost price, looked up by name (0 if gone).
    #[default]
    CurrentStock,
    /// The cost price frozen on the record at sale time.
    SaleSnapshot,
}

impl CostBasis {
    pub const fn as_str(&self) -> &'static str {
        match self {
            CostBasis::CurrentStock => "current_stock",
            CostBasis::SaleSnapshot => "sale_snapshot",
        }
    }
}

impl fmt::Display for CostBasis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CostBasis {
    type Err = UnknownCostBasis;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "current_stock" | "current" => Ok(CostBasis::CurrentStock),
            "sale_snapshot" | "snapshot" => Ok(CostBasis::SaleSnapshot),
            _ => Err(UnknownCostBasis(s.to_string())),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;

    fn shirt() -> Item {
        Item {
            id: 1,
            name: "Shirt".to_string(),
            quantity: 10,
            price: 200.0,
            barcode: None,
            cost_price: 120.0,
        }
    }

    fn request(quantity_sold: i64) -> SaleRequest {
        SaleRequest::for_item(&shirt(), quantity_sold, 10.0, "Asha Rao", "9876543210")
    }

    #[test]
    fn test_new_item_validate() {
        assert!(NewItem::new("Shirt", 10, 200.0, 120.0).validate().is_ok());
        assert!(NewItem::new("Free sample", 0, 0.0, 0.0).validate().is_ok());
        assert!(matches!(
            NewItem::new(" ", 1, 1.0, 0.0).validate(),
            Err(ValidationError::Required { .. })
        ));
        assert!(matches!(
            NewItem::new("Shirt", -1, 1.0, 0.0).validate(),
            Err(ValidationError::InvalidQuantity { .. })
        ));
        assert!(matches!(
            NewItem::new("Shirt", 1, 1.0, -5.0).validate(),
            Err(ValidationError::InvalidPrice { .. })
        ));
    }

    #[test]
    fn test_item_update_keeps_unspecified_fields() {
        let update = ItemUpdate {
            quantity: Some(4),
            ..Default::default()
        };
        let updated = update.apply_to(&shirt()).unwrap();

        assert_eq!(updated.quantity, 4);
        assert_eq!(updated.name, "Shirt");
        assert_eq!(updated.price, 200.0);
        assert_eq!(updated.cost_price, 120.0);
        assert!(ItemUpdate::default().is_empty());
    }

    #[test]
    fn test_item_update_rejects_bad_values() {
        let update = ItemUpdate {
            price: Some(-1.0),
            ..Default::default()
        };
        assert!(update.apply_to(&shirt()).is_err());
    }

    #[test]
    fn test_check_prices_scenario_sale() {
        let priced = request(3).check(&shirt()).unwrap();

        assert_eq!(priced.item_id, 1);
        assert_eq!(priced.totals.total_sale, 600.0);
        assert_eq!(priced.totals.discount_amount, 60.0);
        assert_eq!(priced.totals.final_total, 540.0);
    }

    #[test]
    fn test_check_rejects_oversell() {
        let err = request(11).check(&shirt()).unwrap_err();
        assert!(matches!(
            err,
            CoreError::InsufficientStock {
                available: 10,
                requested: 11,
                ..
            }
        ));
    }

    #[test]
    fn test_check_order_quantity_before_customer() {
        // Both quantity and contact are bad; quantity is reported.
        let mut req = request(0);
        req.customer_contact = "123".to_string();

        assert!(matches!(
            req.check(&shirt()),
            Err(CoreError::Validation(ValidationError::InvalidQuantity { .. }))
        ));
    }

    #[test]
    fn test_check_order_stock_before_price() {
        let mut req = request(50);
        req.unit_price = -1.0;

        assert!(matches!(
            req.check(&shirt()),
            Err(CoreError::InsufficientStock { .. })
        ));
    }

    #[test]
    fn test_check_error_kinds() {
        let mut req = request(1);
        req.discount_percent = 101.0;
        assert!(matches!(
            req.check(&shirt()),
            Err(CoreError::Validation(ValidationError::InvalidDiscount(_)))
        ));

        let mut req = request(1);
        req.customer_name = "R2 D2".to_string();
        assert!(matches!(
            req.check(&shirt()),
            Err(CoreError::Validation(ValidationError::InvalidCustomerName { .. }))
        ));

        let mut req = request(1);
        req.customer_contact = "98765 43210".to_string();
        assert!(matches!(
            req.check(&shirt()),
            Err(CoreError::Validation(ValidationError::InvalidContact(_)))
        ));
    }

    #[test]
    fn test_priced_sale_into_record() {
        let record = request(3)
            .check(&shirt())
            .unwrap()
            .into_new_record("Shirt".to_string(), 120.0, "2025-03-14 09:26:53".to_string())
            .into_record(42);

        assert_eq!(record.id, 42);
        assert_eq!(record.item_name, "Shirt");
        assert_eq!(record.cost_price_snapshot, 120.0);
        assert_eq!(record.customer_key(), CustomerKey::new("Asha Rao", "9876543210"));
        assert!(record.sold_at().is_some());
    }

    #[test]
    fn test_cost_basis_parse() {
        assert_eq!(CostBasis::default(), CostBasis::CurrentStock);
        assert_eq!("sale_snapshot".parse::<CostBasis>().unwrap(), CostBasis::SaleSnapshot);
        assert_eq!("Current-Stock".parse::<CostBasis>().unwrap(), CostBasis::CurrentStock);
        assert!("fifo".parse::<CostBasis>().is_err());
    }

    #[test]
    fn test_cost_basis_serde() {
        let json = serde_json::to_string(&CostBasis::SaleSnapshot).unwrap();
        assert_eq!(json, "\"sale_snapshot\"");
    }
}
