//! The request pipeline: validate → aggregate → filter → shape.
//!
//! Each interaction runs the whole chain once and stops at the first error.
//! Either a full view comes back or exactly one error does; nothing partial
//! is rendered. The aggregation cache is the only state shared between
//! requests.

use crate::chart::{to_long_form, LongRecord};
use crate::config::{ConfigError, DashboardConfig, ProviderKind};
use crate::data::aggregate::DataAggregator;
use crate::data::cache::TableCache;
use crate::data::catalog::TickerCatalog;
use crate::data::csv_import::CsvDirProvider;
use crate::data::provider::{FetchError, PriceProvider};
use crate::data::table::PriceTable;
use crate::data::yahoo::YahooProvider;
use crate::range::{DateRange, RangeError};
use crate::selection::{self, SelectionError};
use chrono::NaiveDate;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Any error that can end an interaction.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DashboardError {
    #[error(transparent)]
    Range(#[from] RangeError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Selection(#[from] SelectionError),
}

/// What the input layer hands over for one interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewRequest {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub selection: Vec<String>,
}

/// What the presentation layer gets back on success.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub range: DateRange,
    /// Selected rows in selection order.
    pub table: PriceTable,
    /// Long-form records for the chart.
    pub records: Vec<LongRecord>,
}

impl DashboardView {
    /// The selected rows in alphabetical order, for tabular display.
    pub fn display_table(&self) -> PriceTable {
        self.table.sorted_by_name()
    }
}

pub struct Dashboard {
    config: DashboardConfig,
    catalog: TickerCatalog,
    aggregator: DataAggregator,
}

impl Dashboard {
    /// Wire a dashboard around an explicit provider.
    ///
    /// The config is validated first, so a catalog with duplicate or blank
    /// symbols never reaches the aggregator.
    pub fn new(
        config: DashboardConfig,
        provider: Box<dyn PriceProvider>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let catalog = config.catalog();
        let aggregator = DataAggregator::new(
            provider,
            TableCache::new(config.fetch.cache_capacity),
            config.fetch.fetch_mode(),
        );
        Ok(Self {
            config,
            catalog,
            aggregator,
        })
    }

    /// Wire a dashboard around the provider the config names.
    pub fn from_config(config: DashboardConfig) -> Result<Self, ConfigError> {
        let provider: Box<dyn PriceProvider> = match config.provider.kind {
            ProviderKind::Yahoo => Box::new(YahooProvider::new(
                &config.provider.base_url,
                config.provider.timeout(),
                &config.provider.user_agent,
            )?),
            ProviderKind::Csv => {
                let dir = config.provider.csv_dir.clone().unwrap_or_default();
                Box::new(CsvDirProvider::new(dir))
            }
        };
        Self::new(config, provider)
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn catalog(&self) -> &TickerCatalog {
        &self.catalog
    }

    pub fn aggregator(&self) -> &DataAggregator {
        &self.aggregator
    }

    /// The request shown before the user touches anything: from the
    /// configured minimum date to today, with the default selection minus any
    /// names the catalog does not carry.
    pub fn default_request(&self, today: NaiveDate) -> ViewRequest {
        ViewRequest {
            start: self.config.min_date,
            end: today,
            selection: self
                .config
                .default_selection
                .iter()
                .filter(|name| self.catalog.contains_symbol(name))
                .cloned()
                .collect(),
        }
    }

    /// Validate the range and aggregate the full catalog over it.
    pub fn load_table(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        today: NaiveDate,
    ) -> Result<(DateRange, Arc<PriceTable>), DashboardError> {
        let range = DateRange::checked(start, end, today)?;
        let table = self.aggregator.aggregate(&self.catalog, range)?;
        Ok((range, table))
    }

    /// Names the user can pick from for a range.
    pub fn available_names(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        today: NaiveDate,
    ) -> Result<Vec<String>, DashboardError> {
        let (_, table) = self.load_table(start, end, today)?;
        Ok(table.names().into_iter().map(String::from).collect())
    }

    /// Run one interaction end to end.
    pub fn render(
        &self,
        request: &ViewRequest,
        today: NaiveDate,
    ) -> Result<DashboardView, DashboardError> {
        let (range, table) = self.load_table(request.start, request.end, today)?;
        let table = selection::filter(&table, &request.selection)?;
        let records = to_long_form(&table);
        debug!(
            rows = table.len(),
            records = records.len(),
            "rendered dashboard view"
        );
        Ok(DashboardView {
            range,
            table,
            records,
        })
    }
}
