//! Runtime settings: store file locations and table sizing.

use std::path::PathBuf;

use super::error::StockfolioError;
use super::ledger::DEFAULT_LEDGER_CAPACITY;
use super::symbol_table::DEFAULT_CAPACITY;
use crate::ports::config_port::ConfigPort;

/// Engine and store settings. `Default` keeps the stock file names in the
/// current directory.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub data_dir: PathBuf,
    pub catalog_file: String,
    pub holdings_file: String,
    pub ledger_file: String,
    /// Slot count for the catalog and the holdings book.
    pub table_capacity: usize,
    pub ledger_capacity: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            data_dir: PathBuf::from("."),
            catalog_file: "market_data.txt".to_string(),
            holdings_file: "user_portfolio.txt".to_string(),
            ledger_file: "transactions.txt".to_string(),
            table_capacity: DEFAULT_CAPACITY,
            ledger_capacity: DEFAULT_LEDGER_CAPACITY,
        }
    }
}

impl Settings {
    /// Settings from a config source. Absent keys keep their defaults;
    /// capacities must be at least 1.
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, StockfolioError> {
        let defaults = Settings::default();

        let table_capacity = read_capacity(config, "table_capacity", defaults.table_capacity)?;
        let ledger_capacity = read_capacity(config, "ledger_capacity", defaults.ledger_capacity)?;

        Ok(Settings {
            data_dir: config
                .get_string("store", "data_dir")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            catalog_file: config
                .get_string("store", "catalog_file")
                .unwrap_or(defaults.catalog_file),
            holdings_file: config
                .get_string("store", "holdings_file")
                .unwrap_or(defaults.holdings_file),
            ledger_file: config
                .get_string("store", "ledger_file")
                .unwrap_or(defaults.ledger_file),
            table_capacity,
            ledger_capacity,
        })
    }
}

fn read_capacity(
    config: &dyn ConfigPort,
    key: &str,
    default: usize,
) -> Result<usize, StockfolioError> {
    let value = config.get_int("limits", key, default as i64)?;
    if value < 1 {
        return Err(StockfolioError::ConfigInvalid {
            section: "limits".to_string(),
            key: key.to_string(),
            reason: format!("capacity must be at least 1, got {value}"),
        });
    }
    Ok(value as usize)
}
