//! Fixed-capacity open-addressing symbol table with tombstone deletion.
//!
//! Backing store for both the instrument catalog and the holdings book.
//! Keys are instrument symbols compared case-insensitively; a single linear
//! probe resolves lookups and insertion points alike.

/// Slot count used by the catalog and the holdings book unless overridden.
pub const DEFAULT_CAPACITY: usize = 101;

/// Returned when an insert finds neither a free nor a tombstoned slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("symbol table is full ({capacity} slots occupied)")]
pub struct TableFull {
    pub capacity: usize,
}

/// Entries carry their own key; the table stores nothing beside them.
///
/// `key()` must return the canonical uppercase symbol. Queries are matched
/// case-insensitively, so callers may pass any casing.
pub trait Keyed {
    fn key(&self) -> &str;
}

#[derive(Debug, Clone)]
enum Slot<T> {
    Empty,
    Occupied(T),
    /// Tombstone: probes walk through it, inserts may reclaim it.
    Deleted,
}

/// Outcome of a probe: one traversal answers both "where is this key" and
/// "where would it go".
enum Probe {
    /// Occupied slot holding the key.
    Found(usize),
    /// Key absent; index is the first tombstone seen on the probe path,
    /// or the empty slot that ended the scan.
    Vacant(usize),
    /// Key absent and no slot can take it.
    Full,
}

#[derive(Debug, Clone)]
pub struct SymbolTable<T: Keyed> {
    slots: Vec<Slot<T>>,
    len: usize,
}

impl<T: Keyed> SymbolTable<T> {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Table with a fixed slot count; it never resizes. Capacities below 1
    /// are clamped so probing always has at least one slot to visit.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        SymbolTable {
            slots: (0..capacity).map(|_| Slot::Empty).collect(),
            len: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// True when every slot holds an entry. New keys are rejected until a
    /// removal tombstones a slot; existing keys can still be updated.
    pub fn is_full(&self) -> bool {
        self.len == self.slots.len()
    }

    pub fn get(&self, key: &str) -> Option<&T> {
        match self.probe(key) {
            Probe::Found(index) => match &self.slots[index] {
                Slot::Occupied(entry) => Some(entry),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut T> {
        match self.probe(key) {
            Probe::Found(index) => match &mut self.slots[index] {
                Slot::Occupied(entry) => Some(entry),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Insert or overwrite. Returns the displaced entry when the key was
    /// already present.
    pub fn insert(&mut self, entry: T) -> Result<Option<T>, TableFull> {
        match self.probe(entry.key()) {
            Probe::Found(index) => {
                match std::mem::replace(&mut self.slots[index], Slot::Occupied(entry)) {
                    Slot::Occupied(previous) => Ok(Some(previous)),
                    _ => Ok(None),
                }
            }
            Probe::Vacant(index) => {
                self.slots[index] = Slot::Occupied(entry);
                self.len += 1;
                Ok(None)
            }
            Probe::Full => Err(TableFull {
                capacity: self.slots.len(),
            }),
        }
    }

    /// Remove an entry, leaving a tombstone so later probes for keys that
    /// collided past this slot still find them.
    pub fn remove(&mut self, key: &str) -> Option<T> {
        match self.probe(key) {
            Probe::Found(index) => {
                match std::mem::replace(&mut self.slots[index], Slot::Deleted) {
                    Slot::Occupied(entry) => {
                        self.len -= 1;
                        Some(entry)
                    }
                    _ => None,
                }
            }
            _ => None,
        }
    }

    /// Occupied entries in slot order, 0 to capacity − 1.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.slots.iter().filter_map(|slot| match slot {
            Slot::Occupied(entry) => Some(entry),
            _ => None,
        })
    }

    /// Linear probe from the key's hash bucket, visiting at most `capacity`
    /// slots. The scan continues through tombstones and stops at the first
    /// empty slot; a miss resolves to the first tombstone seen, else to that
    /// empty slot. A full cycle with no empty slot and no tombstone means
    /// the table cannot take the key.
    fn probe(&self, key: &str) -> Probe {
        let capacity = self.slots.len();
        let origin = self.bucket(key);
        let mut tombstone: Option<usize> = None;

        for step in 0..capacity {
            let index = (origin + step) % capacity;
            match &self.slots[index] {
                Slot::Empty => return Probe::Vacant(tombstone.unwrap_or(index)),
                Slot::Deleted => {
                    if tombstone.is_none() {
                        tombstone = Some(index);
                    }
                }
                Slot::Occupied(entry) if entry.key().eq_ignore_ascii_case(key) => {
                    return Probe::Found(index);
                }
                Slot::Occupied(_) => {}
            }
        }

        match tombstone {
            Some(index) => Probe::Vacant(index),
            None => Probe::Full,
        }
    }

    /// Polynomial hash, base 31, over the uppercased key bytes, reduced
    /// modulo capacity. Uppercasing here keeps mixed-case queries on the
    /// same probe path as the canonical stored form.
    fn bucket(&self, key: &str) -> usize {
        let mut hash: u64 = 0;
        for byte in key.bytes() {
            hash = hash
                .wrapping_mul(31)
                .wrapping_add(u64::from(byte.to_ascii_uppercase()));
        }
        (hash % self.slots.len() as u64) as usize
    }
}

impl<T: Keyed> Default for SymbolTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashMap;

    #[derive(Debug, Clone, PartialEq)]
    struct Entry {
        symbol: String,
        value: i32,
    }

    impl Keyed for Entry {
        fn key(&self) -> &str {
            &self.symbol
        }
    }

    fn entry(symbol: &str, value: i32) -> Entry {
        Entry {
            symbol: symbol.to_ascii_uppercase(),
            value,
        }
    }

    /// Generate `count` distinct keys that all hash to `bucket` in `table`.
    fn colliding_keys(table: &SymbolTable<Entry>, bucket: usize, count: usize) -> Vec<String> {
        let mut keys = Vec::new();
        let mut n = 0;
        while keys.len() < count {
            let candidate = format!("SYM{n}");
            if table.bucket(&candidate) == bucket {
                keys.push(candidate);
            }
            n += 1;
        }
        keys
    }

    #[test]
    fn insert_then_get() {
        let mut table = SymbolTable::new();
        table.insert(entry("AAPL", 1)).unwrap();
        assert_eq!(table.get("AAPL").map(|e| e.value), Some(1));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn get_is_case_insensitive() {
        let mut table = SymbolTable::new();
        table.insert(entry("AAPL", 1)).unwrap();
        assert!(table.contains("aapl"));
        assert!(table.contains("AaPl"));
        assert_eq!(table.get("aapl").map(|e| e.value), Some(1));
    }

    #[test]
    fn bucket_ignores_query_case() {
        let table: SymbolTable<Entry> = SymbolTable::new();
        assert_eq!(table.bucket("aapl"), table.bucket("AAPL"));
        assert_eq!(table.bucket("MsFt"), table.bucket("MSFT"));
    }

    #[test]
    fn insert_overwrites_existing_key() {
        let mut table = SymbolTable::new();
        table.insert(entry("AAPL", 1)).unwrap();
        let displaced = table.insert(entry("aapl", 2)).unwrap();
        assert_eq!(displaced.map(|e| e.value), Some(1));
        assert_eq!(table.get("AAPL").map(|e| e.value), Some(2));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn remove_then_get_misses() {
        let mut table = SymbolTable::new();
        table.insert(entry("AAPL", 1)).unwrap();
        let removed = table.remove("aapl");
        assert_eq!(removed.map(|e| e.value), Some(1));
        assert!(table.get("AAPL").is_none());
        assert_eq!(table.len(), 0);
    }

    #[test]
    fn remove_missing_returns_none() {
        let mut table: SymbolTable<Entry> = SymbolTable::new();
        assert!(table.remove("NOPE").is_none());
    }

    #[test]
    fn lookup_probes_through_tombstones() {
        let mut table = SymbolTable::with_capacity(7);
        let keys = colliding_keys(&table, 2, 3);
        for (i, key) in keys.iter().enumerate() {
            table.insert(entry(key, i as i32)).unwrap();
        }

        // The first key sits at the shared bucket; the others probed past it.
        table.remove(&keys[0]);
        assert_eq!(table.get(&keys[1]).map(|e| e.value), Some(1));
        assert_eq!(table.get(&keys[2]).map(|e| e.value), Some(2));
    }

    #[test]
    fn insert_past_tombstone_overwrites_existing_key() {
        let mut table = SymbolTable::with_capacity(7);
        let keys = colliding_keys(&table, 3, 3);
        for key in &keys {
            table.insert(entry(key, 0)).unwrap();
        }

        table.remove(&keys[0]);
        table.insert(entry(&keys[2], 9)).unwrap();

        // The re-insert must have overwritten the surviving entry, not
        // claimed the tombstone as a second copy.
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(&keys[2]).map(|e| e.value), Some(9));
    }

    #[test]
    fn miss_reclaims_first_tombstone_before_trailing_empty() {
        let mut table = SymbolTable::with_capacity(7);
        let keys = colliding_keys(&table, 3, 4);
        for key in &keys[..3] {
            table.insert(entry(key, 0)).unwrap();
        }

        // Slots 3..=5 hold the first three keys; slot 3 becomes a tombstone.
        table.remove(&keys[0]);
        table.insert(entry(&keys[3], 7)).unwrap();

        // The new key lands in the tombstone, not the empty slot past the run.
        assert!(matches!(
            &table.slots[3],
            Slot::Occupied(e) if e.symbol == keys[3]
        ));
        assert!(matches!(&table.slots[6], Slot::Empty));
    }

    #[test]
    fn saturated_table_reports_full() {
        let mut table = SymbolTable::with_capacity(3);
        for symbol in ["A", "B", "C"] {
            table.insert(entry(symbol, 0)).unwrap();
        }
        assert!(table.is_full());

        let err = table.insert(entry("D", 0)).unwrap_err();
        assert_eq!(err, TableFull { capacity: 3 });
    }

    #[test]
    fn full_table_still_updates_existing_keys() {
        let mut table = SymbolTable::with_capacity(3);
        for symbol in ["A", "B", "C"] {
            table.insert(entry(symbol, 0)).unwrap();
        }
        let displaced = table.insert(entry("B", 7)).unwrap();
        assert_eq!(displaced.map(|e| e.value), Some(0));
        assert_eq!(table.get("B").map(|e| e.value), Some(7));
    }

    #[test]
    fn insert_succeeds_after_delete_frees_a_slot() {
        let mut table = SymbolTable::with_capacity(3);
        for symbol in ["A", "B", "C"] {
            table.insert(entry(symbol, 0)).unwrap();
        }
        assert!(table.insert(entry("D", 0)).is_err());

        table.remove("A");
        table.insert(entry("D", 4)).unwrap();
        assert_eq!(table.get("D").map(|e| e.value), Some(4));
        assert!(table.get("A").is_none());
    }

    #[test]
    fn iter_yields_occupied_entries_only() {
        let mut table = SymbolTable::with_capacity(11);
        for symbol in ["A", "B", "C", "D"] {
            table.insert(entry(symbol, 0)).unwrap();
        }
        table.remove("B");

        let mut symbols: Vec<&str> = table.iter().map(|e| e.symbol.as_str()).collect();
        symbols.sort_unstable();
        assert_eq!(symbols, vec!["A", "C", "D"]);
    }

    #[test]
    fn default_capacity_is_101() {
        let table: SymbolTable<Entry> = SymbolTable::new();
        assert_eq!(table.capacity(), DEFAULT_CAPACITY);
        assert_eq!(table.capacity(), 101);
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let table: SymbolTable<Entry> = SymbolTable::with_capacity(0);
        assert_eq!(table.capacity(), 1);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Insert(String, i32),
        Remove(String),
        Get(String),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        // A tiny key alphabet forces heavy bucket collisions and, over a
        // long sequence, tombstone buildup and reuse. Mixed case keeps the
        // case-insensitive matching honest against the model.
        let key = "[A-Da-d]{1,2}";
        prop_oneof![
            (key, any::<i32>()).prop_map(|(k, v)| Op::Insert(k, v)),
            key.prop_map(Op::Remove),
            key.prop_map(Op::Get),
        ]
    }

    proptest! {
        #[test]
        fn behaves_like_a_map(ops in proptest::collection::vec(op_strategy(), 0..200)) {
            let mut table = SymbolTable::with_capacity(101);
            let mut model: HashMap<String, i32> = HashMap::new();

            for op in ops {
                match op {
                    Op::Insert(key, value) => {
                        // The model is case-blind the same way the table is:
                        // it keys on the canonical uppercase form.
                        let canonical = key.to_ascii_uppercase();
                        let displaced = table
                            .insert(Entry { symbol: key, value })
                            .unwrap()
                            .map(|e| e.value);
                        prop_assert_eq!(displaced, model.insert(canonical, value));
                    }
                    Op::Remove(key) => {
                        let removed = table.remove(&key).map(|e| e.value);
                        prop_assert_eq!(removed, model.remove(&key.to_ascii_uppercase()));
                    }
                    Op::Get(key) => {
                        let found = table.get(&key).map(|e| e.value);
                        prop_assert_eq!(found, model.get(&key.to_ascii_uppercase()).copied());
                    }
                }
            }

            prop_assert_eq!(table.len(), model.len());
        }
    }
}
