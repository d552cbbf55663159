//! Instrument catalog: listed symbols with their sector and current price.

use std::cmp::Ordering;

use super::error::StockfolioError;
use super::symbol_table::{DEFAULT_CAPACITY, Keyed, SymbolTable, TableFull};

/// A listed instrument. Symbol and sector are held in canonical uppercase.
#[derive(Debug, Clone, PartialEq)]
pub struct Instrument {
    pub symbol: String,
    pub sector: String,
    pub price: f64,
}

impl Keyed for Instrument {
    fn key(&self) -> &str {
        &self.symbol
    }
}

/// Whether an upsert created the instrument or revised an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Added,
    Updated,
}

/// Catalog listing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogSort {
    /// Slot order, as the table stores them.
    Table,
    /// Ascending price, symbol as tie-break.
    Price,
    /// Sector name, symbol as tie-break.
    Sector,
}

/// Price filter direction for threshold queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceFilter {
    AtLeast,
    AtMost,
}

/// Catalog-wide aggregates. All figures are zero when the catalog is empty.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogStats {
    pub count: usize,
    pub mean_price: f64,
    pub min_price: f64,
    pub max_price: f64,
    /// Distinct sectors in first-appearance order.
    pub sectors: Vec<String>,
}

/// Canonicalize a symbol for storage and queries.
pub(crate) fn canonical_symbol(raw: &str) -> Result<String, StockfolioError> {
    canonical_token(raw, "symbol")
}

/// Canonicalize a sector name. Same rules as symbols: the flat-file store
/// is whitespace-separated, so embedded whitespace would corrupt records.
pub(crate) fn canonical_sector(raw: &str) -> Result<String, StockfolioError> {
    canonical_token(raw, "sector")
}

fn canonical_token(raw: &str, what: &str) -> Result<String, StockfolioError> {
    let token = raw.trim();
    if token.is_empty() || token.chars().any(char::is_whitespace) {
        return Err(StockfolioError::InvalidInput {
            reason: format!("{what} must be a single non-empty token, got {raw:?}"),
        });
    }
    Ok(token.to_ascii_uppercase())
}

#[derive(Debug, Clone)]
pub struct InstrumentCatalog {
    table: SymbolTable<Instrument>,
}

impl InstrumentCatalog {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        InstrumentCatalog {
            table: SymbolTable::with_capacity(capacity),
        }
    }

    /// Insert a new instrument or revise the price (and sector) of an
    /// existing one. Inputs are canonicalized; the price must be a finite
    /// positive number.
    pub(crate) fn upsert(
        &mut self,
        symbol: &str,
        sector: &str,
        price: f64,
    ) -> Result<UpsertOutcome, StockfolioError> {
        let symbol = canonical_symbol(symbol)?;
        let sector = canonical_sector(sector)?;
        if !price.is_finite() || price <= 0.0 {
            return Err(StockfolioError::InvalidInput {
                reason: format!("price must be positive, got {price}"),
            });
        }

        let instrument = Instrument {
            symbol,
            sector,
            price,
        };
        match self.table.insert(instrument)? {
            Some(_) => Ok(UpsertOutcome::Updated),
            None => Ok(UpsertOutcome::Added),
        }
    }

    /// Re-insert a persisted record, uppercasing whatever casing the file
    /// had. Validation is skipped: the record was legal when written.
    pub(crate) fn restore(&mut self, record: Instrument) -> Result<(), TableFull> {
        let instrument = Instrument {
            symbol: record.symbol.to_ascii_uppercase(),
            sector: record.sector.to_ascii_uppercase(),
            price: record.price,
        };
        self.table.insert(instrument).map(|_| ())
    }

    pub fn lookup(&self, symbol: &str) -> Option<&Instrument> {
        self.table.get(symbol.trim())
    }

    pub fn price(&self, symbol: &str) -> Option<f64> {
        self.lookup(symbol).map(|instrument| instrument.price)
    }

    /// All instruments whose symbol starts with the prefix, matched
    /// case-insensitively, in table order.
    pub fn prefix_search(&self, prefix: &str) -> Vec<&Instrument> {
        let prefix = prefix.trim().to_ascii_uppercase();
        self.table
            .iter()
            .filter(|instrument| instrument.symbol.starts_with(&prefix))
            .collect()
    }

    /// Instruments at or above (or at or below) a price threshold, in
    /// table order.
    pub fn in_price_range(&self, filter: PriceFilter, threshold: f64) -> Vec<&Instrument> {
        self.table
            .iter()
            .filter(|instrument| match filter {
                PriceFilter::AtLeast => instrument.price >= threshold,
                PriceFilter::AtMost => instrument.price <= threshold,
            })
            .collect()
    }

    /// Instruments in the given sector, compared case-insensitively.
    pub fn in_sector(&self, sector: &str) -> Vec<&Instrument> {
        let sector = sector.trim();
        self.table
            .iter()
            .filter(|instrument| instrument.sector.eq_ignore_ascii_case(sector))
            .collect()
    }

    pub fn listing(&self, sort: CatalogSort) -> Vec<&Instrument> {
        let mut rows: Vec<&Instrument> = self.table.iter().collect();
        match sort {
            CatalogSort::Table => {}
            CatalogSort::Price => rows.sort_by(|a, b| {
                a.price
                    .partial_cmp(&b.price)
                    .unwrap_or(Ordering::Equal)
                    .then_with(|| a.symbol.cmp(&b.symbol))
            }),
            CatalogSort::Sector => {
                rows.sort_by(|a, b| a.sector.cmp(&b.sector).then_with(|| a.symbol.cmp(&b.symbol)));
            }
        }
        rows
    }

    /// Price and sector aggregates from a single pass over the catalog.
    pub fn statistics(&self) -> CatalogStats {
        let mut count = 0usize;
        let mut total = 0.0f64;
        let mut min_price = f64::INFINITY;
        let mut max_price = f64::NEG_INFINITY;
        let mut sectors: Vec<String> = Vec::new();

        for instrument in self.table.iter() {
            count += 1;
            total += instrument.price;
            if instrument.price < min_price {
                min_price = instrument.price;
            }
            if instrument.price > max_price {
                max_price = instrument.price;
            }
            if !sectors.iter().any(|s| s.eq_ignore_ascii_case(&instrument.sector)) {
                sectors.push(instrument.sector.clone());
            }
        }

        if count == 0 {
            return CatalogStats {
                count: 0,
                mean_price: 0.0,
                min_price: 0.0,
                max_price: 0.0,
                sectors,
            };
        }

        CatalogStats {
            count,
            mean_price: total / count as f64,
            min_price,
            max_price,
            sectors,
        }
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Instrument> {
        self.table.iter()
    }
}

impl Default for InstrumentCatalog {
    fn default() -> Self {
        Self::new()
    }
}
