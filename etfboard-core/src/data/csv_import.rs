//! Offline provider backed by a directory of Yahoo-style CSV downloads.
//!
//! Layout: `{dir}/{SYMBOL}.csv` with a header row. Only `Date` and `Close`
//! are required; any other columns (`Open`, `Adj Close`, `Volume`, ...) are
//! ignored. Yahoo writes `null` for sessions without a print; those rows and
//! empty cells are gaps. Any other unparsable value fails the fetch.

use super::provider::{ClosePoint, FetchError, PriceProvider, PriceSeries, UnavailableCause};
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use tracing::debug;

pub struct CsvDirProvider {
    dir: PathBuf,
}

impl CsvDirProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn symbol_path(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{symbol}.csv"))
    }
}

fn io_error(symbol: &str, e: impl std::fmt::Display) -> FetchError {
    FetchError::unavailable(symbol, UnavailableCause::Io(e.to_string()))
}

impl PriceProvider for CsvDirProvider {
    fn name(&self) -> &str {
        "csv_import"
    }

    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries, FetchError> {
        let path = self.symbol_path(symbol);
        if !path.exists() {
            debug!(symbol, path = %path.display(), "no CSV for symbol");
            return Ok(PriceSeries::empty(symbol));
        }

        let mut reader = csv::Reader::from_path(&path).map_err(|e| io_error(symbol, e))?;
        let headers = reader.headers().map_err(|e| io_error(symbol, e))?.clone();
        let column = |name: &str| headers.iter().position(|h| h.trim().eq_ignore_ascii_case(name));

        let date_idx = column("Date")
            .ok_or_else(|| FetchError::malformed(symbol, "missing 'Date' column"))?;
        let close_idx = column("Close")
            .ok_or_else(|| FetchError::malformed(symbol, "missing 'Close' column"))?;

        let mut points = Vec::new();
        for (row, record) in reader.records().enumerate() {
            let record = record.map_err(|e| io_error(symbol, e))?;
            let raw_date = record.get(date_idx).unwrap_or("").trim();
            let raw_close = record.get(close_idx).unwrap_or("").trim();

            let date = NaiveDate::parse_from_str(raw_date, "%Y-%m-%d").map_err(|e| {
                FetchError::malformed(symbol, format!("row {}: bad date '{raw_date}': {e}", row + 1))
            })?;

            if raw_close.is_empty() || raw_close.eq_ignore_ascii_case("null") {
                continue;
            }
            let close = raw_close.parse::<f64>().map_err(|e| {
                FetchError::malformed(symbol, format!("row {}: bad close '{raw_close}': {e}", row + 1))
            })?;
            points.push(ClosePoint::new(date, close));
        }

        PriceSeries::from_points(symbol, start, end, points)
    }
}
