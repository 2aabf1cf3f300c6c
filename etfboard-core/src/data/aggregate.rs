//! Aggregation: fetch every catalog ticker and assemble the wide table.
//!
//! All-or-nothing: the first failing fetch fails the whole aggregation and no
//! partial table is returned or cached. Results are memoized per
//! `(start, end, ticker set)` in a [`TableCache`].

use super::cache::{CacheKey, TableCache};
use super::catalog::TickerCatalog;
use super::provider::{FetchError, PriceProvider, PriceSeries};
use super::table::{PriceRow, PriceTable};
use crate::range::DateRange;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

/// How catalog tickers are fetched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum FetchMode {
    /// One ticker at a time, in catalog order.
    #[default]
    Sequential,
    /// Fan out over a bounded worker pool.
    Parallel { max_workers: usize },
}

/// Fetches catalog tickers through a provider and memoizes the tables.
pub struct DataAggregator {
    provider: Box<dyn PriceProvider>,
    cache: TableCache,
    mode: FetchMode,
    /// Worker pool for `FetchMode::Parallel`, built once and reused.
    pool: Option<rayon::ThreadPool>,
}

impl DataAggregator {
    pub fn new(provider: Box<dyn PriceProvider>, cache: TableCache, mode: FetchMode) -> Self {
        let pool = match mode {
            FetchMode::Sequential => None,
            FetchMode::Parallel { max_workers } => match rayon::ThreadPoolBuilder::new()
                .num_threads(max_workers.max(1))
                .thread_name(|i| format!("etfboard-fetch-{i}"))
                .build()
            {
                Ok(pool) => Some(pool),
                Err(e) => {
                    warn!("fetch pool unavailable ({e}), fetching sequentially");
                    None
                }
            },
        };
        Self {
            provider,
            cache,
            mode,
            pool,
        }
    }

    /// Sequential fetches with a default-sized cache.
    pub fn with_provider(provider: Box<dyn PriceProvider>) -> Self {
        Self::new(provider, TableCache::default(), FetchMode::Sequential)
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn cache(&self) -> &TableCache {
        &self.cache
    }

    pub fn mode(&self) -> FetchMode {
        self.mode
    }

    /// Build the price table for every catalog entry over `range`.
    ///
    /// Rows are keyed by the catalog symbol and appear in catalog order. A
    /// cached table built from the same ticker set in a different order is
    /// reordered rather than refetched.
    pub fn aggregate(
        &self,
        catalog: &TickerCatalog,
        range: DateRange,
    ) -> Result<Arc<PriceTable>, FetchError> {
        debug_assert!(catalog.check().is_ok(), "unchecked catalog: {:?}", catalog.check());
        let key = CacheKey::new(range.start(), range.end(), catalog.ticker_set());
        let symbols = catalog.symbols();

        if let Some(table) = self.cache.get(&key) {
            if table.names() == symbols {
                return Ok(table);
            }
            return Ok(Arc::new(table.reordered(&symbols)));
        }

        let series = self.fetch_all(&symbols, range)?;
        let table = Arc::new(PriceTable::from_rows(
            series.iter().map(|s| PriceRow::from_series(&s.symbol, s)),
        ));

        info!(
            provider = self.provider.name(),
            rows = table.len(),
            cells = table.cell_count(),
            start = %range.start(),
            end = %range.end(),
            "aggregated price table"
        );
        self.cache.insert(key, Arc::clone(&table));
        Ok(table)
    }

    fn fetch_all(&self, symbols: &[&str], range: DateRange) -> Result<Vec<PriceSeries>, FetchError> {
        match &self.pool {
            // Indexed collect keeps catalog order; the first Err stops the
            // remaining work from being picked up.
            Some(pool) => pool.install(|| {
                symbols
                    .par_iter()
                    .map(|symbol| self.fetch_one(symbol, range))
                    .collect()
            }),
            None => self.fetch_sequential(symbols, range),
        }
    }

    /// Worker count of the parallel pool, if one is running.
    pub fn worker_count(&self) -> Option<usize> {
        self.pool.as_ref().map(|pool| pool.current_num_threads())
    }

    fn fetch_sequential(
        &self,
        symbols: &[&str],
        range: DateRange,
    ) -> Result<Vec<PriceSeries>, FetchError> {
        symbols
            .iter()
            .map(|symbol| self.fetch_one(symbol, range))
            .collect()
    }

    fn fetch_one(&self, symbol: &str, range: DateRange) -> Result<PriceSeries, FetchError> {
        let mut series = self
            .provider
            .fetch(symbol, range.start(), range.end())
            .map_err(|e| {
                warn!(symbol, "fetch failed: {e}");
                e
            })?;
        // Rows are keyed by the catalog symbol even if the provider echoes a
        // different spelling.
        series.symbol = symbol.to_string();
        Ok(series)
    }
}
