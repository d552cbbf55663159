//! Flat-file store adapter: one whitespace-separated record per line.
//!
//! Each save rewrites the target file in full, in store traversal order,
//! with prices at ten decimal places. On load a missing file is an empty
//! store and malformed lines are skipped, so a hand-edited file degrades
//! to the records that still parse.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::domain::catalog::{Instrument, InstrumentCatalog};
use crate::domain::error::StockfolioError;
use crate::domain::holdings::{Holding, HoldingsBook};
use crate::domain::ledger::{TradeKind, TradeRecord, TransactionLedger};
use crate::domain::settings::Settings;
use crate::ports::store_port::StorePort;

pub struct FlatFileStore {
    catalog_path: PathBuf,
    holdings_path: PathBuf,
    ledger_path: PathBuf,
}

impl FlatFileStore {
    pub fn new(settings: &Settings) -> Self {
        FlatFileStore {
            catalog_path: settings.data_dir.join(&settings.catalog_file),
            holdings_path: settings.data_dir.join(&settings.holdings_file),
            ledger_path: settings.data_dir.join(&settings.ledger_file),
        }
    }

    fn read_file(path: &Path, target: &str) -> Result<Option<String>, StockfolioError> {
        match fs::read_to_string(path) {
            Ok(content) => Ok(Some(content)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(StockfolioError::Persistence {
                target: target.to_string(),
                reason: format!("failed to read {}: {err}", path.display()),
            }),
        }
    }

    fn write_file(path: &Path, content: &str, target: &str) -> Result<(), StockfolioError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|err| StockfolioError::Persistence {
                target: target.to_string(),
                reason: format!("failed to create {}: {err}", parent.display()),
            })?;
        }
        fs::write(path, content).map_err(|err| StockfolioError::Persistence {
            target: target.to_string(),
            reason: format!("failed to write {}: {err}", path.display()),
        })
    }
}

/// `SYMBOL SECTOR PRICE`
fn parse_catalog_line(line: &str) -> Option<Instrument> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() != 3 {
        return None;
    }
    let price: f64 = fields[2].parse().ok()?;
    Some(Instrument {
        symbol: fields[0].to_string(),
        sector: fields[1].to_string(),
        price,
    })
}

/// `SYMBOL SECTOR QUANTITY AVG_COST LAST_DATE`
fn parse_holding_line(line: &str) -> Option<Holding> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() != 5 {
        return None;
    }
    let quantity: u32 = fields[2].parse().ok()?;
    let average_cost: f64 = fields[3].parse().ok()?;
    Some(Holding {
        symbol: fields[0].to_string(),
        sector: fields[1].to_string(),
        quantity,
        average_cost,
        last_acquired: fields[4].to_string(),
    })
}

/// `SYMBOL QUANTITY PRICE DATE TYPE`
fn parse_ledger_line(line: &str) -> Option<TradeRecord> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() != 5 {
        return None;
    }
    let quantity: u32 = fields[1].parse().ok()?;
    let price: f64 = fields[2].parse().ok()?;
    let kind = TradeKind::from_code(fields[4].parse().ok()?)?;
    Some(TradeRecord {
        symbol: fields[0].to_string(),
        quantity,
        price,
        timestamp: fields[3].to_string(),
        kind,
    })
}

impl StorePort for FlatFileStore {
    fn load_catalog(&self) -> Result<Vec<Instrument>, StockfolioError> {
        match Self::read_file(&self.catalog_path, "catalog")? {
            Some(content) => Ok(content.lines().filter_map(parse_catalog_line).collect()),
            None => Ok(Vec::new()),
        }
    }

    fn load_holdings(&self) -> Result<Vec<Holding>, StockfolioError> {
        match Self::read_file(&self.holdings_path, "holdings")? {
            Some(content) => Ok(content.lines().filter_map(parse_holding_line).collect()),
            None => Ok(Vec::new()),
        }
    }

    fn load_ledger(&self) -> Result<Vec<TradeRecord>, StockfolioError> {
        match Self::read_file(&self.ledger_path, "ledger")? {
            Some(content) => Ok(content.lines().filter_map(parse_ledger_line).collect()),
            None => Ok(Vec::new()),
        }
    }

    fn save_catalog(&self, catalog: &InstrumentCatalog) -> Result<(), StockfolioError> {
        let mut out = String::new();
        for instrument in catalog.iter() {
            out.push_str(&format!(
                "{} {} {:.10}\n",
                instrument.symbol, instrument.sector, instrument.price
            ));
        }
        Self::write_file(&self.catalog_path, &out, "catalog")
    }

    fn save_holdings(&self, holdings: &HoldingsBook) -> Result<(), StockfolioError> {
        let mut out = String::new();
        for holding in holdings.iter() {
            out.push_str(&format!(
                "{} {} {} {:.10} {}\n",
                holding.symbol,
                holding.sector,
                holding.quantity,
                holding.average_cost,
                holding.last_acquired
            ));
        }
        Self::write_file(&self.holdings_path, &out, "holdings")
    }

    fn save_ledger(&self, ledger: &TransactionLedger) -> Result<(), StockfolioError> {
        let mut out = String::new();
        for record in ledger.iter() {
            out.push_str(&format!(
                "{} {} {:.10} {} {}\n",
                record.symbol,
                record.quantity,
                record.price,
                record.timestamp,
                record.kind.code()
            ));
        }
        Self::write_file(&self.ledger_path, &out, "ledger")
    }
}
