//! Wide price table: one row per ticker, one column per date.
//!
//! Rows keep their own date coverage. A date present in one row and absent
//! from another is a missing cell, never a zero (no forward-fill of price
//! data).

use super::provider::PriceSeries;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Display format for date columns, e.g. `02 January 2020`.
pub const DATE_LABEL_FORMAT: &str = "%d %B %Y";

/// Render a date the way column headers and chart records show it.
pub fn date_label(date: NaiveDate) -> String {
    date.format(DATE_LABEL_FORMAT).to_string()
}

/// One named row of closing prices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRow {
    pub name: String,
    pub prices: BTreeMap<NaiveDate, f64>,
}

impl PriceRow {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            prices: BTreeMap::new(),
        }
    }

    /// Transpose a series into a row keyed by `name`.
    pub fn from_series(name: &str, series: &PriceSeries) -> Self {
        Self {
            name: name.to_string(),
            prices: series.points().iter().map(|p| (p.date, p.close)).collect(),
        }
    }

    pub fn with_price(mut self, date: NaiveDate, close: f64) -> Self {
        self.prices.insert(date, close);
        self
    }
}

/// Ordered rows with unique names and sparse date columns.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PriceTable {
    rows: Vec<PriceRow>,
}

impl PriceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from rows. A later row with an already-used name
    /// replaces the earlier one in place.
    pub fn from_rows(rows: impl IntoIterator<Item = PriceRow>) -> Self {
        let mut table = Self::new();
        for row in rows {
            table.push_row(row);
        }
        table
    }

    pub fn push_row(&mut self, row: PriceRow) {
        match self.rows.iter_mut().find(|r| r.name == row.name) {
            Some(existing) => *existing = row,
            None => self.rows.push(row),
        }
    }

    pub fn rows(&self) -> &[PriceRow] {
        &self.rows
    }

    pub fn row(&self, name: &str) -> Option<&PriceRow> {
        self.rows.iter().find(|r| r.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.row(name).is_some()
    }

    /// Row names in table order.
    pub fn names(&self) -> Vec<&str> {
        self.rows.iter().map(|r| r.name.as_str()).collect()
    }

    /// Union of all row dates, ascending.
    pub fn columns(&self) -> Vec<NaiveDate> {
        let dates: BTreeSet<NaiveDate> = self
            .rows
            .iter()
            .flat_map(|r| r.prices.keys().copied())
            .collect();
        dates.into_iter().collect()
    }

    /// Cell lookup; `None` is a missing cell.
    pub fn get(&self, name: &str, date: NaiveDate) -> Option<f64> {
        self.row(name).and_then(|r| r.prices.get(&date).copied())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of populated cells across all rows.
    pub fn cell_count(&self) -> usize {
        self.rows.iter().map(|r| r.prices.len()).sum()
    }

    /// Copy of the table with rows in alphabetical order, as the tabular view
    /// shows them.
    pub fn sorted_by_name(&self) -> Self {
        let mut rows = self.rows.clone();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Self { rows }
    }

    /// Copy of the table with rows in the order of `names`.
    ///
    /// Names not in the table are skipped; rows not named keep their relative
    /// order after the named ones.
    pub fn reordered<S: AsRef<str>>(&self, names: &[S]) -> Self {
        let mut rows = Vec::with_capacity(self.rows.len());
        for name in names {
            if let Some(row) = self.row(name.as_ref()) {
                if !rows.iter().any(|r: &PriceRow| r.name == row.name) {
                    rows.push(row.clone());
                }
            }
        }
        for row in &self.rows {
            if !rows.iter().any(|r| r.name == row.name) {
                rows.push(row.clone());
            }
        }
        Self { rows }
    }
}
