//! # Console Error Type
//!
//! Unified error type for console commands.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Error Flow: Core → Db → Console                     │
//! │                                                                         │
//! │  stockbook-core          stockbook-db             console               │
//! │  ──────────────          ────────────             ───────               │
//! │  ValidationError ──┐                                                    │
//! │                    ▼                                                    │
//! │  CoreError ──────────► DbError::Domain ──────────► AppError             │
//! │                        DbError::NotFound ────────►  { code, message }   │
//! │                        DbError::QueryFailed ─────►  (logged, generic)   │
//! │                                                                         │
//! │  clap / io / toml / csv / serde_json ──────────────► AppError           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `AppError` is the only place user-facing error text is produced. With
//! `--json` it is printed as `{"code": "...", "message": "..."}`.

use serde::Serialize;
use stockbook_core::{CoreError, UnknownCostBasis, ValidationError};
use stockbook_db::DbError;

/// Error returned from console commands.
///
/// ## Serialization
/// ```json
/// {
///   "code": "INSUFFICIENT_STOCK",
///   "message": "Insufficient stock for Shirt: 10 available, 11 requested"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct AppError {
    /// Machine-readable error code
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for console output and exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Item or sale does not exist
    NotFound,

    /// Input validation failed
    ValidationError,

    /// Sale asks for more than is on hand
    InsufficientStock,

    /// Database operation failed
    DatabaseError,

    /// Configuration could not be loaded or is invalid
    ConfigError,

    /// Reading or writing a file failed
    IoError,

    /// Bad command line
    Usage,
}

impl ErrorCode {
    /// Process exit status for this kind of failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            ErrorCode::Usage => 2,
            ErrorCode::ConfigError => 3,
            ErrorCode::DatabaseError | ErrorCode::IoError => 4,
            ErrorCode::NotFound | ErrorCode::ValidationError | ErrorCode::InsufficientStock => 1,
        }
    }
}

impl AppError {
    /// Creates a new console error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        AppError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        AppError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::new(ErrorCode::ValidationError, message)
    }

    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        AppError::new(ErrorCode::ConfigError, message)
    }

    /// Creates a usage error.
    pub fn usage(message: impl Into<String>) -> Self {
        AppError::new(ErrorCode::Usage, message)
    }
}

/// Converts database errors to console errors.
impl From<DbError> for AppError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => AppError::not_found(&entity, &id),
            DbError::Domain(e) => e.into(),
            DbError::ConnectionFailed(_) => {
                AppError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(e) => {
                tracing::error!("Database migration failed: {}", e);
                AppError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                // Log the actual error but return a generic message
                tracing::error!("Database query failed: {}", e);
                AppError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::PoolExhausted => {
                AppError::new(ErrorCode::DatabaseError, "Database is busy, try again")
            }
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                AppError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

/// Converts core errors to console errors.
impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ItemNotFound(id) => AppError::not_found("Item", &id.to_string()),
            CoreError::InsufficientStock {
                item,
                available,
                requested,
            } => AppError::new(
                ErrorCode::InsufficientStock,
                format!(
                    "Insufficient stock for {}: {} available, {} requested",
                    item, available, requested
                ),
            ),
            CoreError::Validation(e) => e.into(),
        }
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::validation(err.to_string())
    }
}

impl From<UnknownCostBasis> for AppError {
    fn from(err: UnknownCostBasis) -> Self {
        AppError::usage(err.to_string())
    }
}

/// Converts command line errors. A value rejected by a core parser keeps the
/// validation code; anything else is a usage error.
impl From<clap::Error> for AppError {
    fn from(err: clap::Error) -> Self {
        let code = match err.kind() {
            clap::error::ErrorKind::ValueValidation => ErrorCode::ValidationError,
            _ => ErrorCode::Usage,
        };
        let rendered = err.to_string();
        let message = rendered
            .lines()
            .next()
            .unwrap_or_default()
            .trim_start_matches("error: ")
            .to_string();
        AppError::new(code, message)
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::new(ErrorCode::IoError, err.to_string())
    }
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        AppError::config(format!("Invalid config file: {}", err))
    }
}

impl From<csv::Error> for AppError {
    fn from(err: csv::Error) -> Self {
        AppError::new(ErrorCode::IoError, format!("CSV export failed: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::new(ErrorCode::IoError, format!("JSON output failed: {}", err))
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {}

/// Result type for console commands.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_errors_keep_their_kind() {
        let err: AppError = DbError::Domain(CoreError::InsufficientStock {
            item: "Shirt".to_string(),
            available: 10,
            requested: 11,
        })
        .into();
        assert_eq!(err.code, ErrorCode::InsufficientStock);
        assert!(err.message.contains("10 available"));

        let err: AppError = DbError::Domain(CoreError::ItemNotFound(7)).into();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.message, "Item not found: 7");

        let err: AppError = ValidationError::InvalidContact("123".into()).into();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[test]
    fn test_not_found_from_db() {
        let err: AppError = DbError::not_found("Sale", 3).into();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.message, "Sale not found: 3");
    }

    #[test]
    fn test_serializes_code_in_screaming_snake_case() {
        let err = AppError::usage("unknown command 'foo'");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "USAGE");
        assert_eq!(json["message"], "unknown command 'foo'");

        let json = serde_json::to_value(AppError::new(ErrorCode::InsufficientStock, "x")).unwrap();
        assert_eq!(json["code"], "INSUFFICIENT_STOCK");
    }

    #[test]
    fn test_command_line_errors() {
        use clap::error::ErrorKind;

        let err: AppError = clap::Error::raw(ErrorKind::ValueValidation, "bad quantity\n").into();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.message, "bad quantity");

        let err: AppError = clap::Error::raw(ErrorKind::UnknownArgument, "unexpected --limit\n").into();
        assert_eq!(err.code, ErrorCode::Usage);
        assert_eq!(err.code.exit_code(), 2);
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(ErrorCode::Usage.exit_code(), 2);
        assert_eq!(ErrorCode::NotFound.exit_code(), 1);
        assert_eq!(ErrorCode::DatabaseError.exit_code(), 4);
    }
}
