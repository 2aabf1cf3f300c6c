//! etfboard core: the data pipeline behind the ETF price dashboard.
//!
//! A request flows through four stages:
//! - [`range`]: reject future or inverted date ranges before anything is fetched
//! - [`data`]: fetch daily closes for every catalog ticker and assemble a wide
//!   table, memoized per (start, end, ticker set)
//! - [`selection`]: project the table onto the names the user picked
//! - [`chart`]: pivot the projected table into long-form records
//!
//! [`dashboard::Dashboard`] chains them; rendering belongs to the caller.

pub mod chart;
pub mod config;
pub mod dashboard;
pub mod data;
pub mod range;
pub mod selection;

pub use chart::{sort_records, to_long_form, LongRecord};
pub use config::{ConfigError, DashboardConfig};
pub use dashboard::{Dashboard, DashboardError, DashboardView, ViewRequest};
pub use range::{validate, DateRange, RangeError};
pub use selection::{filter, SelectionError};
