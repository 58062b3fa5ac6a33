//! # Error Types
//!
//! Domain-specific error types for stockbook-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  stockbook-core errors (this file)                                     │
//! │  ├── CoreError        - Sale / stock rule violations                   │
//! │  └── ValidationError  - Malformed user input                           │
//! │                                                                         │
//! │  stockbook-db errors (separate crate)                                  │
//! │  └── DbError          - Persistence failures, NotFound, wraps CoreError│
//! │                                                                         │
//! │  console errors (app)                                                  │
//! │  └── AppError         - Code + user-facing message                     │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → AppError → operator      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include the offending value in the variant
//! 3. Errors are enum variants, never String
//! 4. Every validation rule has its own variant so callers can branch on kind

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Business rule failures raised while turning a request into a sale.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The sale references an item id that is not in the stock store.
    #[error("Item not found: {0}")]
    ItemNotFound(i64),

    /// Requested quantity exceeds what is on hand.
    ///
    /// ## When This Occurs
    /// - The request asks for more than the item's current quantity
    /// - Another caller decremented the same item between lookup and decrement
    ///
    /// ```text
    /// Sell "Shirt" x 11
    ///      │
    ///      ▼
    /// Check stock: available=10
    ///      │
    ///      ▼
    /// InsufficientStock { item: "Shirt", available: 10, requested: 11 }
    /// ```
    #[error("Insufficient stock for {item}: available {available}, requested {requested}")]
    InsufficientStock {
        item: String,
        available: i64,
        requested: i64,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before any mutation happens; an operation that fails with one of
/// these leaves the stock store and the ledger untouched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A required text field is missing or blank.
    #[error("{field} is required")]
    Required { field: String },

    /// Quantity is not a whole number, or is below the allowed minimum.
    #[error("{field} must be a whole number of at least {min}, got '{value}'")]
    InvalidQuantity {
        field: String,
        value: String,
        min: i64,
    },

    /// Price-like amount is not a finite, non-negative number.
    #[error("{field} must be a non-negative amount, got '{value}'")]
    InvalidPrice { field: String, value: String },

    /// Discount percent is not a number in `[0, 100]`.
    #[error("discount percent must be between 0 and 100, got '{0}'")]
    InvalidDiscount(String),

    /// Customer name is blank or contains something other than letters and spaces.
    #[error("customer name {reason}")]
    InvalidCustomerName { reason: String },

    /// Contact number is not exactly ten ASCII digits.
    #[error("contact number must be exactly 10 digits, got '{0}'")]
    InvalidContact(String),
}

/// A cost basis name that is neither `current_stock` nor `sale_snapshot`.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("unknown cost basis '{0}' (expected current_stock or sale_snapshot)")]
pub struct UnknownCostBasis(pub String);

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            item: "Shirt".to_string(),
            available: 10,
            requested: 11,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for Shirt: available 10, requested 11"
        );
        assert_eq!(CoreError::ItemNotFound(7).to_string(), "Item not found: 7");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "name".to_string(),
        };
        assert_eq!(err.to_string(), "name is required");

        let err = ValidationError::InvalidContact("12345".to_string());
        assert_eq!(
            err.to_string(),
            "contact number must be exactly 10 digits, got '12345'"
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::InvalidDiscount("120".to_string());
        let core_err: CoreError = validation_err.into();
        assert!(matches!(
            core_err,
            CoreError::Validation(ValidationError::InvalidDiscount(_))
        ));
    }
}
