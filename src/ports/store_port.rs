//! Persistence port trait for the catalog, holdings and ledger stores.

use crate::domain::catalog::{Instrument, InstrumentCatalog};
use crate::domain::error::StockfolioError;
use crate::domain::holdings::{Holding, HoldingsBook};
use crate::domain::ledger::{TradeRecord, TransactionLedger};

/// Loads records at startup and writes full snapshots after mutations.
///
/// Loads yield plain record vectors: the engine re-inserts them through
/// the table path so canonicalization and capacity rules apply in one
/// place. A missing backing file is an empty store, not an error.
pub trait StorePort {
    fn load_catalog(&self) -> Result<Vec<Instrument>, StockfolioError>;
    fn load_holdings(&self) -> Result<Vec<Holding>, StockfolioError>;
    fn load_ledger(&self) -> Result<Vec<TradeRecord>, StockfolioError>;

    fn save_catalog(&self, catalog: &InstrumentCatalog) -> Result<(), StockfolioError>;
    fn save_holdings(&self, holdings: &HoldingsBook) -> Result<(), StockfolioError>;
    fn save_ledger(&self, ledger: &TransactionLedger) -> Result<(), StockfolioError>;
}
