//! Price data: providers, the wide table, and cached aggregation

pub mod aggregate;
pub mod cache;
pub mod catalog;
pub mod csv_import;
pub mod provider;
pub mod table;
pub mod yahoo;

pub use aggregate::{DataAggregator, FetchMode};
pub use cache::{CacheKey, TableCache};
pub use catalog::{CatalogEntry, TickerCatalog};
pub use csv_import::CsvDirProvider;
pub use provider::{ClosePoint, FetchError, PriceProvider, PriceSeries, UnavailableCause};
pub use table::{date_label, PriceRow, PriceTable};
pub use yahoo::YahooProvider;
