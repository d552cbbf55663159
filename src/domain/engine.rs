//! Portfolio engine: buy/sell orchestration over the catalog, holdings
//! book and trade ledger, plus derived portfolio statistics.
//!
//! Every mutating operation writes a full snapshot of the stores it
//! touched through the given [`StorePort`] before returning. There is no
//! cross-store transaction: a failed snapshot surfaces as an error while
//! the in-memory state keeps the completed mutation.

use std::cmp::Ordering;
use std::collections::HashSet;

use chrono::Local;

use super::catalog::{
    Instrument, InstrumentCatalog, UpsertOutcome, canonical_sector, canonical_symbol,
};
use super::error::StockfolioError;
use super::holdings::{Holding, HoldingsBook};
use super::ledger::{TradeKind, TradeRecord, TransactionLedger};
use super::settings::Settings;
use super::symbol_table::TableFull;
use crate::ports::store_port::StorePort;

/// Layout for generated trade timestamps, e.g. `2024-06-01_09:30`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H:%M";

/// Result of a completed buy.
#[derive(Debug, Clone, PartialEq)]
pub struct BuyReceipt {
    pub symbol: String,
    pub quantity: u32,
    pub unit_price: f64,
    pub timestamp: String,
    /// True when this buy opened the position rather than extending it.
    pub opened: bool,
    pub total_quantity: u32,
    pub average_cost: f64,
}

/// Result of a completed sell.
#[derive(Debug, Clone, PartialEq)]
pub struct SellReceipt {
    pub symbol: String,
    pub quantity: u32,
    pub market_price: f64,
    pub average_cost: f64,
    /// (market price − average cost) × quantity; negative on a loss.
    pub profit: f64,
    /// Zero when the position was closed out entirely.
    pub remaining_quantity: u32,
    pub timestamp: String,
}

/// Holdings report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoldingSort {
    Table,
    Price,
    Sector,
    Profit,
}

/// One row of the position report: a holding paired with its current
/// catalog price. `market_price` is None when the symbol is no longer
/// listed; such rows carry zero profit and add nothing to current value.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionRow {
    pub symbol: String,
    pub sector: String,
    pub quantity: u32,
    pub average_cost: f64,
    pub last_acquired: String,
    pub market_price: Option<f64>,
    pub profit: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PositionReport {
    pub rows: Vec<PositionRow>,
    pub total_investment: f64,
    pub current_value: f64,
    pub net_profit: f64,
}

/// Best or worst performer by signed unrealized profit.
#[derive(Debug, Clone, PartialEq)]
pub struct Performer {
    pub symbol: String,
    pub profit: f64,
}

/// Portfolio aggregates from a single pass over the holdings.
#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioStats {
    pub holdings: usize,
    pub total_investment: f64,
    pub current_value: f64,
    pub net_profit: f64,
    /// Net profit over investment, as a fraction; None when nothing is
    /// invested.
    pub roi: Option<f64>,
    pub best: Option<Performer>,
    pub worst: Option<Performer>,
}

/// Result of a bulk catalog import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportOutcome {
    pub added: usize,
    pub updated: usize,
}

#[derive(Debug)]
pub struct PortfolioEngine {
    catalog: InstrumentCatalog,
    holdings: HoldingsBook,
    ledger: TransactionLedger,
}

impl PortfolioEngine {
    /// Fresh engine with empty stores sized per the settings.
    pub fn new(settings: &Settings) -> Self {
        PortfolioEngine {
            catalog: InstrumentCatalog::with_capacity(settings.table_capacity),
            holdings: HoldingsBook::with_capacity(settings.table_capacity),
            ledger: TransactionLedger::with_capacity(settings.ledger_capacity),
        }
    }

    /// Engine primed from the store. Records are re-inserted through the
    /// table path, so duplicate symbols resolve last-wins and records past
    /// capacity are dropped.
    pub fn open(settings: &Settings, store: &dyn StorePort) -> Result<Self, StockfolioError> {
        let mut engine = PortfolioEngine::new(settings);
        for record in store.load_catalog()? {
            let _ = engine.catalog.restore(record);
        }
        for record in store.load_holdings()? {
            let _ = engine.holdings.restore(record);
        }
        for record in store.load_ledger()? {
            engine.ledger.append(record);
        }
        Ok(engine)
    }

    pub fn catalog(&self) -> &InstrumentCatalog {
        &self.catalog
    }

    pub fn holdings(&self) -> &HoldingsBook {
        &self.holdings
    }

    pub fn ledger(&self) -> &TransactionLedger {
        &self.ledger
    }

    /// Insert or update a catalog instrument, then snapshot the catalog.
    pub fn upsert_instrument(
        &mut self,
        store: &dyn StorePort,
        symbol: &str,
        sector: &str,
        price: f64,
    ) -> Result<UpsertOutcome, StockfolioError> {
        let outcome = self.catalog.upsert(symbol, sector, price)?;
        store.save_catalog(&self.catalog)?;
        Ok(outcome)
    }

    /// Record a purchase.
    ///
    /// The symbol must be listed in the catalog. Slot and overflow checks
    /// run before the trade is recorded anywhere, so a rejected buy leaves
    /// no trace; an accepted one appends to the ledger, merges the holding
    /// under the weighted-average cost, then snapshots holdings and ledger.
    pub fn buy(
        &mut self,
        store: &dyn StorePort,
        symbol: &str,
        quantity: u32,
        unit_price: f64,
        timestamp: Option<&str>,
    ) -> Result<BuyReceipt, StockfolioError> {
        let symbol = canonical_symbol(symbol)?;
        if quantity == 0 {
            return Err(StockfolioError::InvalidInput {
                reason: "quantity must be positive".to_string(),
            });
        }
        if !unit_price.is_finite() || unit_price <= 0.0 {
            return Err(StockfolioError::InvalidInput {
                reason: format!("price must be positive, got {unit_price}"),
            });
        }
        let timestamp = match timestamp {
            Some(raw) => validated_timestamp(raw)?,
            None => current_timestamp(),
        };

        let sector = match self.catalog.lookup(&symbol) {
            Some(instrument) => instrument.sector.clone(),
            None => {
                return Err(StockfolioError::NotFound {
                    symbol,
                    store: "catalog".to_string(),
                });
            }
        };

        let existing = self.holdings.get(&symbol).map(|h| h.quantity);
        let total_quantity = match existing {
            Some(held) => held.checked_add(quantity).ok_or_else(|| {
                StockfolioError::InvalidInput {
                    reason: format!("position size overflows at {held} + {quantity}"),
                }
            })?,
            None => {
                if self.holdings.is_full() {
                    return Err(StockfolioError::Full(TableFull {
                        capacity: self.holdings.capacity(),
                    }));
                }
                quantity
            }
        };

        self.ledger.append(TradeRecord {
            symbol: symbol.clone(),
            quantity,
            price: unit_price,
            timestamp: timestamp.clone(),
            kind: TradeKind::Buy,
        });

        let average_cost = match self.holdings.get_mut(&symbol) {
            Some(holding) => {
                holding.average_cost = (holding.average_cost * f64::from(holding.quantity)
                    + unit_price * f64::from(quantity))
                    / f64::from(total_quantity);
                holding.quantity = total_quantity;
                holding.last_acquired = timestamp.clone();
                holding.average_cost
            }
            None => {
                self.holdings.insert(Holding {
                    symbol: symbol.clone(),
                    sector,
                    quantity,
                    average_cost: unit_price,
                    last_acquired: timestamp.clone(),
                })?;
                unit_price
            }
        };

        store.save_holdings(&self.holdings)?;
        store.save_ledger(&self.ledger)?;

        Ok(BuyReceipt {
            symbol,
            quantity,
            unit_price,
            timestamp,
            opened: existing.is_none(),
            total_quantity,
            average_cost,
        })
    }

    /// Sell from an existing holding at the current catalog price.
    ///
    /// Profit is (market price − average cost) × quantity; gain, loss and
    /// break-even are all valid outcomes. A sell that empties the position
    /// removes it from the book; a partial sell reduces the quantity and
    /// leaves the average cost untouched.
    pub fn sell(
        &mut self,
        store: &dyn StorePort,
        symbol: &str,
        quantity: u32,
    ) -> Result<SellReceipt, StockfolioError> {
        let symbol = canonical_symbol(symbol)?;
        if quantity == 0 {
            return Err(StockfolioError::InvalidInput {
                reason: "quantity must be positive".to_string(),
            });
        }

        let (held, average_cost) = match self.holdings.get(&symbol) {
            Some(holding) => (holding.quantity, holding.average_cost),
            None => {
                return Err(StockfolioError::NotFound {
                    symbol,
                    store: "holdings".to_string(),
                });
            }
        };
        if quantity > held {
            return Err(StockfolioError::InsufficientHoldings {
                symbol,
                requested: quantity,
                held,
            });
        }

        let market_price = match self.catalog.price(&symbol) {
            Some(price) => price,
            None => {
                return Err(StockfolioError::NotFound {
                    symbol,
                    store: "catalog".to_string(),
                });
            }
        };

        let timestamp = current_timestamp();
        let profit = (market_price - average_cost) * f64::from(quantity);

        // The ledger records the trade at the market price, not the basis.
        self.ledger.append(TradeRecord {
            symbol: symbol.clone(),
            quantity,
            price: market_price,
            timestamp: timestamp.clone(),
            kind: TradeKind::Sell,
        });

        let remaining_quantity = held - quantity;
        if remaining_quantity == 0 {
            let _ = self.holdings.remove(&symbol);
        } else if let Some(holding) = self.holdings.get_mut(&symbol) {
            holding.quantity = remaining_quantity;
        }

        store.save_holdings(&self.holdings)?;
        store.save_ledger(&self.ledger)?;

        Ok(SellReceipt {
            symbol,
            quantity,
            market_price,
            average_cost,
            profit,
            remaining_quantity,
            timestamp,
        })
    }

    /// Bulk catalog load. The whole batch is vetted before any row is
    /// applied: one bad row rejects the import, and a batch whose new
    /// symbols would overflow the table is refused up front.
    pub fn import_instruments(
        &mut self,
        store: &dyn StorePort,
        rows: &[Instrument],
    ) -> Result<ImportOutcome, StockfolioError> {
        let mut incoming: HashSet<String> = HashSet::new();
        for (index, row) in rows.iter().enumerate() {
            let symbol = canonical_symbol(&row.symbol).map_err(|err| row_error(index, err))?;
            canonical_sector(&row.sector).map_err(|err| row_error(index, err))?;
            if !row.price.is_finite() || row.price <= 0.0 {
                return Err(StockfolioError::InvalidInput {
                    reason: format!("row {}: price must be positive, got {}", index + 1, row.price),
                });
            }
            if self.catalog.lookup(&symbol).is_none() {
                incoming.insert(symbol);
            }
        }
        if self.catalog.len() + incoming.len() > self.catalog.capacity() {
            return Err(StockfolioError::Full(TableFull {
                capacity: self.catalog.capacity(),
            }));
        }

        let mut outcome = ImportOutcome {
            added: 0,
            updated: 0,
        };
        for row in rows {
            match self.catalog.upsert(&row.symbol, &row.sector, row.price)? {
                UpsertOutcome::Added => outcome.added += 1,
                UpsertOutcome::Updated => outcome.updated += 1,
            }
        }
        store.save_catalog(&self.catalog)?;
        Ok(outcome)
    }

    /// Snapshot all three stores.
    pub fn save_all(&self, store: &dyn StorePort) -> Result<(), StockfolioError> {
        store.save_catalog(&self.catalog)?;
        store.save_holdings(&self.holdings)?;
        store.save_ledger(&self.ledger)
    }

    /// Portfolio aggregates from one pass over the holdings, each paired
    /// with its current catalog price. Holdings with no listed price count
    /// toward the investment but not the current value, and are skipped
    /// for best/worst. Strict comparisons keep the first holding in table
    /// order on a tie.
    pub fn portfolio_statistics(&self) -> PortfolioStats {
        let mut holdings = 0usize;
        let mut total_investment = 0.0f64;
        let mut current_value = 0.0f64;
        let mut best: Option<Performer> = None;
        let mut worst: Option<Performer> = None;

        for holding in self.holdings.iter() {
            holdings += 1;
            total_investment += holding.cost_basis();

            if let Some(price) = self.catalog.price(&holding.symbol) {
                current_value += holding.market_value(price);
                let profit = holding.unrealized_profit(price);

                if best.as_ref().map_or(true, |p| profit > p.profit) {
                    best = Some(Performer {
                        symbol: holding.symbol.clone(),
                        profit,
                    });
                }
                if worst.as_ref().map_or(true, |p| profit < p.profit) {
                    worst = Some(Performer {
                        symbol: holding.symbol.clone(),
                        profit,
                    });
                }
            }
        }

        let net_profit = current_value - total_investment;
        let roi = if total_investment > 0.0 {
            Some(net_profit / total_investment)
        } else {
            None
        };

        PortfolioStats {
            holdings,
            total_investment,
            current_value,
            net_profit,
            roi,
            best,
            worst,
        }
    }

    /// Holdings paired with their current prices, plus report totals.
    pub fn position_report(&self, sort: HoldingSort) -> PositionReport {
        let mut rows: Vec<PositionRow> = self
            .holdings
            .iter()
            .map(|holding| {
                let market_price = self.catalog.price(&holding.symbol);
                let profit = market_price
                    .map(|price| holding.unrealized_profit(price))
                    .unwrap_or(0.0);
                PositionRow {
                    symbol: holding.symbol.clone(),
                    sector: holding.sector.clone(),
                    quantity: holding.quantity,
                    average_cost: holding.average_cost,
                    last_acquired: holding.last_acquired.clone(),
                    market_price,
                    profit,
                }
            })
            .collect();

        let total_investment: f64 = rows
            .iter()
            .map(|row| f64::from(row.quantity) * row.average_cost)
            .sum();
        let current_value: f64 = rows
            .iter()
            .filter_map(|row| row.market_price.map(|price| f64::from(row.quantity) * price))
            .sum();

        match sort {
            HoldingSort::Table => {}
            HoldingSort::Price => rows.sort_by(|a, b| {
                let left = a.market_price.unwrap_or(0.0);
                let right = b.market_price.unwrap_or(0.0);
                left.partial_cmp(&right)
                    .unwrap_or(Ordering::Equal)
                    .then_with(|| a.symbol.cmp(&b.symbol))
            }),
            HoldingSort::Sector => {
                rows.sort_by(|a, b| a.sector.cmp(&b.sector).then_with(|| a.symbol.cmp(&b.symbol)));
            }
            HoldingSort::Profit => rows.sort_by(|a, b| {
                a.profit
                    .partial_cmp(&b.profit)
                    .unwrap_or(Ordering::Equal)
                    .then_with(|| a.symbol.cmp(&b.symbol))
            }),
        }

        PositionReport {
            rows,
            total_investment,
            current_value,
            net_profit: current_value - total_investment,
        }
    }
}

/// Wall-clock timestamp in the ledger's layout.
pub fn current_timestamp() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}

fn validated_timestamp(raw: &str) -> Result<String, StockfolioError> {
    let timestamp = raw.trim();
    if timestamp.is_empty() || timestamp.chars().any(char::is_whitespace) {
        return Err(StockfolioError::InvalidInput {
            reason: format!("timestamp must be a single non-empty token, got {raw:?}"),
        });
    }
    Ok(timestamp.to_string())
}

fn row_error(index: usize, err: StockfolioError) -> StockfolioError {
    match err {
        StockfolioError::InvalidInput { reason } => StockfolioError::InvalidInput {
            reason: format!("row {}: {reason}", index + 1),
        },
        other => other,
    }
}
