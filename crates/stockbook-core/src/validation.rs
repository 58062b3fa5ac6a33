//! # Validation Module
//!
//! Input validation and text parsing for Stockbook.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Presentation (console, UI)                                   │
//! │  ├── Collects text                                                     │
//! │  └── parse_quantity / parse_amount / parse_discount_percent            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Domain (THIS MODULE)                                         │
//! │  ├── Range checks on typed values                                      │
//! │  └── Customer identity format                                          │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  └── quantity >= amount guard on the decrement itself                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every rule fails with its own [`ValidationError`] variant, so the same
//! bad input always produces the same error kind whichever layer caught it.
//!
//! ## Usage
//! ```rust
//! use stockbook_core::validation::{parse_quantity, validate_contact_number};
//!
//! assert_eq!(parse_quantity("quantity_sold", " 3 ", 1).unwrap(), 3);
//! assert!(validate_contact_number("98765").is_err());
//! ```

use crate::error::{ValidationError, ValidationResult};
use crate::{CONTACT_NUMBER_LEN, MAX_DISCOUNT_PERCENT};

// =============================================================================
// Item Validators
// =============================================================================

/// Validates an item display name.
///
/// ## Rules
/// - Must not be empty or whitespace only
/// - Duplicates are allowed; items are told apart by id
pub fn validate_item_name(name: &str) -> ValidationResult<()> {
    if name.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    Ok(())
}

/// Validates an on-hand stock quantity (zero allowed).
pub fn validate_stock_quantity(quantity: i64) -> ValidationResult<()> {
    if quantity < 0 {
        return Err(ValidationError::InvalidQuantity {
            field: "quantity".to_string(),
            value: quantity.to_string(),
            min: 0,
        });
    }

    Ok(())
}

/// Validates a price-like amount (unit price, cost price).
///
/// ## Rules
/// - Must be finite
/// - Must be non-negative; zero is allowed (free items, unknown cost)
///
/// ## Example
/// ```rust
/// use stockbook_core::validation::validate_amount;
///
/// assert!(validate_amount("price", 0.0).is_ok());
/// assert!(validate_amount("price", -1.0).is_err());
/// assert!(validate_amount("price", f64::NAN).is_err());
/// ```
pub fn validate_amount(field: &str, value: f64) -> ValidationResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(ValidationError::InvalidPrice {
            field: field.to_string(),
            value: value.to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Sale Validators
// =============================================================================

/// Validates the quantity of a sale line.
///
/// ## Rules
/// - Must be positive (> 0)
/// - The upper bound is the item's stock, checked by the caller that holds the item
pub fn validate_sale_quantity(quantity: i64) -> ValidationResult<()> {
    if quantity <= 0 {
        return Err(ValidationError::InvalidQuantity {
            field: "quantity_sold".to_string(),
            value: quantity.to_string(),
            min: 1,
        });
    }

    Ok(())
}

/// Validates a discount percent in `[0, 100]`.
pub fn validate_discount_percent(percent: f64) -> ValidationResult<()> {
    if !percent.is_finite() || !(0.0..=MAX_DISCOUNT_PERCENT).contains(&percent) {
        return Err(ValidationError::InvalidDiscount(percent.to_string()));
    }

    Ok(())
}

/// Validates a customer name and returns it trimmed.
///
/// ## Rules
/// - Must not be blank
/// - ASCII letters and spaces only (`^[A-Za-z ]+$`)
pub fn validate_customer_name(name: &str) -> ValidationResult<String> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::InvalidCustomerName {
            reason: "is required".to_string(),
        });
    }

    if !name.chars().all(|c| c.is_ascii_alphabetic() || c == ' ') {
        return Err(ValidationError::InvalidCustomerName {
            reason: "must contain only letters and spaces".to_string(),
        });
    }

    Ok(name.to_string())
}

/// Validates a contact number and returns it trimmed.
///
/// ## Rules
/// - Exactly [`CONTACT_NUMBER_LEN`] ASCII digits (`^\d{10}$`)
pub fn validate_contact_number(contact: &str) -> ValidationResult<String> {
    let contact = contact.trim();

    if contact.len() != CONTACT_NUMBER_LEN || !contact.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidContact(contact.to_string()));
    }

    Ok(contact.to_string())
}

// =============================================================================
// Text Parsing
// =============================================================================

/// Parses a whole-number quantity and checks it against `min`.
///
/// Non-numeric text and fractional values fail with `InvalidQuantity`,
/// the same kind a typed out-of-range value produces.
pub fn parse_quantity(field: &str, text: &str, min: i64) -> ValidationResult<i64> {
    let invalid = || ValidationError::InvalidQuantity {
        field: field.to_string(),
        value: text.trim().to_string(),
        min,
    };

    let quantity: i64 = text.trim().parse().map_err(|_| invalid())?;
    if quantity < min {
        return Err(invalid());
    }

    Ok(quantity)
}

/// Parses a non-negative amount (price, cost price).
pub fn parse_amount(field: &str, text: &str) -> ValidationResult<f64> {
    let value: f64 = text
        .trim()
        .parse()
        .map_err(|_| ValidationError::InvalidPrice {
            field: field.to_string(),
            value: text.trim().to_string(),
        })?;

    validate_amount(field, value)?;
    Ok(value)
}

/// Parses a discount percent; blank input means no discount.
pub fn parse_discount_percent(text: &str) -> ValidationResult<f64> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(0.0);
    }

    let percent: f64 = text
        .parse()
        .map_err(|_| ValidationError::InvalidDiscount(text.to_string()))?;

    validate_discount_percent(percent)?;
    Ok(percent)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_item_name() {
        assert!(validate_item_name("Shirt").is_ok());
        assert!(validate_item_name("").is_err());
        assert!(validate_item_name("   ").is_err());
    }

    #[test]
    fn test_validate_stock_quantity() {
        assert!(validate_stock_quantity(0).is_ok());
        assert!(validate_stock_quantity(10).is_ok());
        assert!(matches!(
            validate_stock_quantity(-1),
            Err(ValidationError::InvalidQuantity { min: 0, .. })
        ));
    }

    #[test]
    fn test_validate_sale_quantity() {
        assert!(validate_sale_quantity(1).is_ok());
        assert!(validate_sale_quantity(0).is_err());
        assert!(validate_sale_quantity(-3).is_err());
    }

    #[test]
    fn test_validate_discount_percent() {
        assert!(validate_discount_percent(0.0).is_ok());
        assert!(validate_discount_percent(100.0).is_ok());
        assert!(validate_discount_percent(12.5).is_ok());
        assert!(validate_discount_percent(-0.01).is_err());
        assert!(validate_discount_percent(100.01).is_err());
        assert!(validate_discount_percent(f64::NAN).is_err());
    }

    #[test]
    fn test_validate_customer_name() {
        assert_eq!(validate_customer_name("  Asha Rao ").unwrap(), "Asha Rao");
        assert!(matches!(
            validate_customer_name("   "),
            Err(ValidationError::InvalidCustomerName { .. })
        ));
        assert!(validate_customer_name("R2D2").is_err());
        assert!(validate_customer_name("Anne-Marie").is_err());
        assert!(validate_customer_name("José").is_err());
    }

    #[test]
    fn test_validate_contact_number() {
        assert_eq!(validate_contact_number("9876543210").unwrap(), "9876543210");
        assert_eq!(validate_contact_number(" 9876543210 ").unwrap(), "9876543210");
        assert!(validate_contact_number("987654321").is_err());
        assert!(validate_contact_number("98765432101").is_err());
        assert!(validate_contact_number("98765-4321").is_err());
        assert!(validate_contact_number("").is_err());
    }

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity("quantity", "0", 0).unwrap(), 0);
        assert!(parse_quantity("quantity_sold", "0", 1).is_err());
        assert!(parse_quantity("quantity", "2.5", 0).is_err());
        assert!(matches!(
            parse_quantity("quantity", "ten", 0),
            Err(ValidationError::InvalidQuantity { .. })
        ));
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("price", "199.5").unwrap(), 199.5);
        assert!(matches!(
            parse_amount("cost_price", "abc"),
            Err(ValidationError::InvalidPrice { .. })
        ));
        assert!(parse_amount("price", "-4").is_err());
        assert!(parse_amount("price", "inf").is_err());
    }

    #[test]
    fn test_parse_discount_percent() {
        assert_eq!(parse_discount_percent("").unwrap(), 0.0);
        assert_eq!(parse_discount_percent("15").unwrap(), 15.0);
        assert!(matches!(
            parse_discount_percent("150"),
            Err(ValidationError::InvalidDiscount(_))
        ));
        assert!(parse_discount_percent("ten").is_err());
    }
}
