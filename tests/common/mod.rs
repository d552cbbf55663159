#![allow(dead_code)]

use std::cell::RefCell;
use std::path::Path;

use stockfolio::domain::catalog::{Instrument, InstrumentCatalog};
use stockfolio::domain::error::StockfolioError;
use stockfolio::domain::holdings::{Holding, HoldingsBook};
use stockfolio::domain::ledger::{TradeRecord, TransactionLedger};
use stockfolio::domain::settings::Settings;
use stockfolio::ports::store_port::StorePort;

/// In-memory store that records every snapshot for inspection. Saves can
/// be switched to fail, to exercise persistence-error paths.
pub struct MemoryStore {
    pub catalog: RefCell<Vec<Instrument>>,
    pub holdings: RefCell<Vec<Holding>>,
    pub ledger: RefCell<Vec<TradeRecord>>,
    pub catalog_saves: RefCell<usize>,
    pub holdings_saves: RefCell<usize>,
    pub ledger_saves: RefCell<usize>,
    pub fail_saves: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore {
            catalog: RefCell::new(Vec::new()),
            holdings: RefCell::new(Vec::new()),
            ledger: RefCell::new(Vec::new()),
            catalog_saves: RefCell::new(0),
            holdings_saves: RefCell::new(0),
            ledger_saves: RefCell::new(0),
            fail_saves: false,
        }
    }

    pub fn with_catalog(self, rows: Vec<Instrument>) -> Self {
        *self.catalog.borrow_mut() = rows;
        self
    }

    pub fn with_holdings(self, rows: Vec<Holding>) -> Self {
        *self.holdings.borrow_mut() = rows;
        self
    }

    pub fn with_ledger(self, rows: Vec<TradeRecord>) -> Self {
        *self.ledger.borrow_mut() = rows;
        self
    }

    pub fn failing_saves(mut self) -> Self {
        self.fail_saves = true;
        self
    }

    fn save_error(&self, target: &str) -> StockfolioError {
        StockfolioError::Persistence {
            target: target.to_string(),
            reason: "saves disabled for this test".to_string(),
        }
    }
}

impl StorePort for MemoryStore {
    fn load_catalog(&self) -> Result<Vec<Instrument>, StockfolioError> {
        Ok(self.catalog.borrow().clone())
    }

    fn load_holdings(&self) -> Result<Vec<Holding>, StockfolioError> {
        Ok(self.holdings.borrow().clone())
    }

    fn load_ledger(&self) -> Result<Vec<TradeRecord>, StockfolioError> {
        Ok(self.ledger.borrow().clone())
    }

    fn save_catalog(&self, catalog: &InstrumentCatalog) -> Result<(), StockfolioError> {
        if self.fail_saves {
            return Err(self.save_error("catalog"));
        }
        *self.catalog.borrow_mut() = catalog.iter().cloned().collect();
        *self.catalog_saves.borrow_mut() += 1;
        Ok(())
    }

    fn save_holdings(&self, holdings: &HoldingsBook) -> Result<(), StockfolioError> {
        if self.fail_saves {
            return Err(self.save_error("holdings"));
        }
        *self.holdings.borrow_mut() = holdings.iter().cloned().collect();
        *self.holdings_saves.borrow_mut() += 1;
        Ok(())
    }

    fn save_ledger(&self, ledger: &TransactionLedger) -> Result<(), StockfolioError> {
        if self.fail_saves {
            return Err(self.save_error("ledger"));
        }
        *self.ledger.borrow_mut() = ledger.iter().cloned().collect();
        *self.ledger_saves.borrow_mut() += 1;
        Ok(())
    }
}

pub fn instrument(symbol: &str, sector: &str, price: f64) -> Instrument {
    Instrument {
        symbol: symbol.to_string(),
        sector: sector.to_string(),
        price,
    }
}

pub fn holding(symbol: &str, sector: &str, quantity: u32, average_cost: f64) -> Holding {
    Holding {
        symbol: symbol.to_string(),
        sector: sector.to_string(),
        quantity,
        average_cost,
        last_acquired: "2024-01-10_09:00".to_string(),
    }
}

pub fn settings_in(dir: &Path) -> Settings {
    Settings {
        data_dir: dir.to_path_buf(),
        ..Settings::default()
    }
}

pub fn small_settings(table_capacity: usize, ledger_capacity: usize) -> Settings {
    Settings {
        table_capacity,
        ledger_capacity,
        ..Settings::default()
    }
}
