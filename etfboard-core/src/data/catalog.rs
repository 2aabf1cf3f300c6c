//! Ticker catalog: the ordered list of ETFs the dashboard knows about.
//!
//! Each entry maps a short internal key (`"spy"`) to the ticker symbol that is
//! both fetched from the provider and shown as the row name (`"SPY"`).
//! Insertion order is significant: it is the fetch order and the default row
//! order of the aggregated table.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

/// One catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub key: String,
    pub symbol: String,
}

impl CatalogEntry {
    pub fn new(key: &str, symbol: &str) -> Self {
        Self {
            key: key.to_string(),
            symbol: symbol.to_string(),
        }
    }
}

/// The complete catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TickerCatalog {
    entries: Vec<CatalogEntry>,
}

impl TickerCatalog {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    /// Build from `(key, symbol)` pairs.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self::new(
            pairs
                .into_iter()
                .map(|(key, symbol)| CatalogEntry::new(key, symbol))
                .collect(),
        )
    }

    /// The ten-ETF reference catalog.
    pub fn reference() -> Self {
        Self::from_pairs([
            ("vwo", "VWO"),
            ("iefa", "IEFA"),
            ("gld", "GLD"),
            ("vea", "VEA"),
            ("agg", "AGG"),
            ("qqq", "QQQ"),
            ("vti", "VTI"),
            ("voo", "VOO"),
            ("ivv", "IVV"),
            ("spy", "SPY"),
        ])
    }

    pub fn iter(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.iter()
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Symbols in catalog order.
    pub fn symbols(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.symbol.as_str()).collect()
    }

    /// Keys in catalog order.
    pub fn keys(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.key.as_str()).collect()
    }

    pub fn symbol_for(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.key == key)
            .map(|e| e.symbol.as_str())
    }

    pub fn contains_symbol(&self, symbol: &str) -> bool {
        self.entries.iter().any(|e| e.symbol == symbol)
    }

    /// Order-independent set of symbols.
    pub fn ticker_set(&self) -> BTreeSet<String> {
        self.entries.iter().map(|e| e.symbol.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check the catalog is usable as a row index.
    ///
    /// Returns a description of the first problem found.
    pub fn check(&self) -> Result<(), String> {
        if self.entries.is_empty() {
            return Err("ticker catalog is empty".into());
        }
        let mut keys = HashSet::new();
        let mut symbols = HashSet::new();
        for entry in &self.entries {
            if entry.key.trim().is_empty() {
                return Err(format!("catalog entry for '{}' has a blank key", entry.symbol));
            }
            if entry.symbol.trim().is_empty() {
                return Err(format!("catalog key '{}' has a blank symbol", entry.key));
            }
            if !keys.insert(entry.key.as_str()) {
                return Err(format!("duplicate catalog key '{}'", entry.key));
            }
            if !symbols.insert(entry.symbol.as_str()) {
                return Err(format!("duplicate catalog symbol '{}'", entry.symbol));
            }
        }
        Ok(())
    }
}

impl Default for TickerCatalog {
    fn default() -> Self {
        Self::reference()
    }
}
