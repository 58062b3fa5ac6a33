//! # Console Configuration
//!
//! Configuration for the `stockbook` binary.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`STOCKBOOK_*`)
//! 2. Config file (`--config`, else `STOCKBOOK_CONFIG`, else the platform
//!    config dir, e.g. `~/.config/stockbook/stockbook.toml`)
//! 3. Defaults (this file)
//!
//! ## Example
//! ```toml
//! [database]
//! path = "/var/lib/stockbook/stockbook.db"
//! max_connections = 4
//! busy_timeout_secs = 5
//!
//! [store]
//! name = "Corner Store"
//!
//! [receipts]
//! save_bills = true
//! bills_dir = "bills"
//! extension = "txt"
//!
//! [reports]
//! cost_basis = "current_stock"
//! export_dir = "exports"
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{AppError, AppResult};
use stockbook_core::CostBasis;
use stockbook_db::DbConfig;

/// Complete console configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub database: DatabaseSection,
    pub store: StoreSection,
    pub receipts: ReceiptSection,
    pub reports: ReportSection,
}

/// `[database]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSection {
    /// SQLite file holding `inventory` and `sell_history`
    pub path: PathBuf,

    /// Pool size
    pub max_connections: u32,

    /// How long a writer waits on a locked database
    pub busy_timeout_secs: u64,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        DatabaseSection {
            path: PathBuf::from("stockbook.db"),
            max_connections: 4,
            busy_timeout_secs: 5,
        }
    }
}

/// `[store]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSection {
    /// Printed at the top of every receipt
    pub name: String,
}

impl Default for StoreSection {
    fn default() -> Self {
        StoreSection {
            name: "Stockbook Store".to_string(),
        }
    }
}

/// `[receipts]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReceiptSection {
    /// Write a bill file for every sale
    pub save_bills: bool,

    /// Root of the `<Month>/<YYYY-MM-DD>/` bill tree
    pub bills_dir: PathBuf,

    /// Bill file extension
    pub extension: String,
}

impl Default for ReceiptSection {
    fn default() -> Self {
        ReceiptSection {
            save_bills: true,
            bills_dir: PathBuf::from("bills"),
            extension: "txt".to_string(),
        }
    }
}

/// `[reports]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportSection {
    /// Cost used by the profit/loss report unless `--basis` is given
    pub cost_basis: CostBasis,

    /// Where `export-history` writes its CSV files
    pub export_dir: PathBuf,
}

impl Default for ReportSection {
    fn default() -> Self {
        ReportSection {
            cost_basis: CostBasis::default(),
            export_dir: PathBuf::from("exports"),
        }
    }
}

impl AppConfig {
    /// Loads configuration from file and environment.
    ///
    /// ## Priority
    /// 1. Environment variables (highest)
    /// 2. Config file
    /// 3. Defaults (lowest)
    ///
    /// A missing config file is not an error; an unreadable or invalid one is.
    pub fn load(config_path: Option<PathBuf>) -> AppResult<Self> {
        let mut config = Self::default();

        let path = config_path
            .or_else(|| std::env::var_os("STOCKBOOK_CONFIG").map(PathBuf::from))
            .or_else(Self::default_config_path);

        if let Some(path) = path {
            if path.exists() {
                info!(?path, "Loading config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> AppResult<()> {
        if self.database.path.as_os_str().is_empty() {
            return Err(AppError::config("database.path must not be empty"));
        }

        if self.database.max_connections == 0 {
            return Err(AppError::config(
                "database.max_connections must be greater than 0",
            ));
        }

        if self.receipts.save_bills && self.receipts.extension.trim_start_matches('.').is_empty() {
            return Err(AppError::config("receipts.extension must not be empty"));
        }

        Ok(())
    }

    /// Applies `STOCKBOOK_*` environment variable overrides.
    fn apply_env_overrides(&mut self) -> AppResult<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> AppResult<()> {
        if let Some(path) = lookup("STOCKBOOK_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = PathBuf::from(path);
        }

        if let Some(name) = lookup("STOCKBOOK_STORE_NAME") {
            self.store.name = name;
        }

        if let Some(basis) = lookup("STOCKBOOK_COST_BASIS") {
            debug!(basis = %basis, "Overriding cost basis from environment");
            self.reports.cost_basis = basis.parse::<CostBasis>()?;
        }

        if let Some(dir) = lookup("STOCKBOOK_BILLS_DIR") {
            self.receipts.bills_dir = PathBuf::from(dir);
        }

        Ok(())
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "stockbook", "stockbook")
            .map(|dirs| dirs.config_dir().join("stockbook.toml"))
    }

    /// Database pool settings for this configuration.
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(self.database.path.clone())
            .max_connections(self.database.max_connections)
            .busy_timeout(Duration::from_secs(self.database.busy_timeout_secs))
    }
}
