//! Holdings book: per-symbol position state for the portfolio.

use super::symbol_table::{DEFAULT_CAPACITY, Keyed, SymbolTable, TableFull};

/// An open position. A symbol occupies the book iff its quantity is
/// positive; selling a position down to zero removes it entirely.
#[derive(Debug, Clone, PartialEq)]
pub struct Holding {
    pub symbol: String,
    /// Sector snapshot taken from the catalog when the position opened;
    /// later catalog edits do not touch it.
    pub sector: String,
    pub quantity: u32,
    pub average_cost: f64,
    pub last_acquired: String,
}

impl Keyed for Holding {
    fn key(&self) -> &str {
        &self.symbol
    }
}

impl Holding {
    /// Quantity times average cost: what the position cost to build.
    pub fn cost_basis(&self) -> f64 {
        f64::from(self.quantity) * self.average_cost
    }

    /// Quantity valued at the given market price.
    pub fn market_value(&self, price: f64) -> f64 {
        f64::from(self.quantity) * price
    }

    /// Signed gain of the whole position at the given market price.
    pub fn unrealized_profit(&self, price: f64) -> f64 {
        f64::from(self.quantity) * (price - self.average_cost)
    }
}

#[derive(Debug, Clone)]
pub struct HoldingsBook {
    table: SymbolTable<Holding>,
}

impl HoldingsBook {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        HoldingsBook {
            table: SymbolTable::with_capacity(capacity),
        }
    }

    pub fn get(&self, symbol: &str) -> Option<&Holding> {
        self.table.get(symbol)
    }

    pub fn holds(&self, symbol: &str) -> bool {
        self.table.contains(symbol)
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.table.is_full()
    }

    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Holdings in table slot order.
    pub fn iter(&self) -> impl Iterator<Item = &Holding> {
        self.table.iter()
    }

    pub(crate) fn get_mut(&mut self, symbol: &str) -> Option<&mut Holding> {
        self.table.get_mut(symbol)
    }

    pub(crate) fn insert(&mut self, holding: Holding) -> Result<Option<Holding>, TableFull> {
        self.table.insert(holding)
    }

    pub(crate) fn remove(&mut self, symbol: &str) -> Option<Holding> {
        self.table.remove(symbol)
    }

    /// Re-insert a persisted record, uppercasing whatever casing the file
    /// had. Zero-quantity records are dropped: an empty position has no
    /// business occupying a slot.
    pub(crate) fn restore(&mut self, record: Holding) -> Result<(), TableFull> {
        if record.quantity == 0 {
            return Ok(());
        }
        let holding = Holding {
            symbol: record.symbol.to_ascii_uppercase(),
            sector: record.sector.to_ascii_uppercase(),
            ..record
        };
        self.table.insert(holding).map(|_| ())
    }
}

impl Default for HoldingsBook {
    fn default() -> Self {
        Self::new()
    }
}
