//! Bounded, insertion-ordered trade ledger with first-in-first-out eviction.

/// Record count retained by the ledger unless overridden.
pub const DEFAULT_LEDGER_CAPACITY: usize = 1000;

/// Trade direction. Persisted as code 0 for buys and 1 for sells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeKind {
    Buy,
    Sell,
}

impl TradeKind {
    pub fn code(self) -> u8 {
        match self {
            TradeKind::Buy => 0,
            TradeKind::Sell => 1,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(TradeKind::Buy),
            1 => Some(TradeKind::Sell),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TradeKind::Buy => "BUY",
            TradeKind::Sell => "SELL",
        }
    }
}

/// One executed trade. Immutable once appended.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeRecord {
    pub symbol: String,
    pub quantity: u32,
    /// Unit cost for buys; market price at sale time for sells.
    pub price: f64,
    pub timestamp: String,
    pub kind: TradeKind,
}

#[derive(Debug, Clone)]
pub struct TransactionLedger {
    records: Vec<TradeRecord>,
    capacity: usize,
}

impl TransactionLedger {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_LEDGER_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        TransactionLedger {
            records: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a record, evicting the oldest when the ledger is at capacity.
    /// Eviction shifts every surviving record down one index, O(n).
    pub(crate) fn append(&mut self, record: TradeRecord) {
        if self.records.len() == self.capacity {
            self.records.remove(0);
        }
        self.records.push(record);
    }

    /// Records oldest first.
    pub fn records(&self) -> &[TradeRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TradeRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for TransactionLedger {
    fn default() -> Self {
        Self::new()
    }
}
