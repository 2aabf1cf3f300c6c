//! Price sources and their error type.
//!
//! Yahoo Finance and the CSV directory import both sit behind
//! `PriceProvider`; tests plug in in-memory doubles the same way.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One daily closing price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClosePoint {
    pub date: NaiveDate,
    pub close: f64,
}

impl ClosePoint {
    pub fn new(date: NaiveDate, close: f64) -> Self {
        Self { date, close }
    }
}

/// Why a provider could not deliver a series.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnavailableCause {
    #[error("network unreachable: {0}")]
    Unreachable(String),

    #[error("request timed out")]
    Timeout,

    #[error("HTTP {0}")]
    HttpStatus(u16),

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("I/O error: {0}")]
    Io(String),
}

/// Structured error type for price fetches.
///
/// Every failure of the external source collapses into `ProviderUnavailable`;
/// the cause is kept for logs and for the message shown to the user.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    #[error("price data provider unavailable for {symbol}: {cause}")]
    ProviderUnavailable {
        symbol: String,
        cause: UnavailableCause,
    },
}

impl FetchError {
    pub fn unavailable(symbol: &str, cause: UnavailableCause) -> Self {
        FetchError::ProviderUnavailable {
            symbol: symbol.to_string(),
            cause,
        }
    }

    pub fn malformed(symbol: &str, reason: impl Into<String>) -> Self {
        Self::unavailable(symbol, UnavailableCause::Malformed(reason.into()))
    }

    /// Symbol whose fetch failed.
    pub fn symbol(&self) -> &str {
        match self {
            FetchError::ProviderUnavailable { symbol, .. } => symbol,
        }
    }

    pub fn cause(&self) -> &UnavailableCause {
        match self {
            FetchError::ProviderUnavailable { cause, .. } => cause,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self.cause(), UnavailableCause::Timeout)
    }
}

/// Date-ordered closing prices for one symbol.
///
/// Dates are strictly increasing. A date with no trading data is simply
/// absent; an empty series is a valid result.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PriceSeries {
    pub symbol: String,
    points: Vec<ClosePoint>,
}

impl PriceSeries {
    /// An empty series (delisted symbol, non-trading period, empty range).
    pub fn empty(symbol: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            points: Vec::new(),
        }
    }

    /// Normalize raw provider points into a series covering `[start, end]`.
    ///
    /// Non-finite closes are dropped, points are sorted by date, the last
    /// observation wins on duplicate dates, and dates outside the range are
    /// trimmed. A negative close means the source handed us garbage.
    pub fn from_points(
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
        points: impl IntoIterator<Item = ClosePoint>,
    ) -> Result<Self, FetchError> {
        let mut kept: Vec<ClosePoint> = Vec::new();
        for point in points {
            if !point.close.is_finite() {
                continue;
            }
            if point.close < 0.0 {
                return Err(FetchError::malformed(
                    symbol,
                    format!("negative close {} on {}", point.close, point.date),
                ));
            }
            if point.date < start || point.date > end {
                continue;
            }
            kept.push(point);
        }

        // Stable sort keeps provider order among equal dates, so the later
        // observation is the one that survives the dedup below.
        kept.sort_by_key(|p| p.date);
        let mut points: Vec<ClosePoint> = Vec::with_capacity(kept.len());
        for point in kept {
            match points.last_mut() {
                Some(last) if last.date == point.date => *last = point,
                _ => points.push(point),
            }
        }

        Ok(Self {
            symbol: symbol.to_string(),
            points,
        })
    }

    pub fn points(&self) -> &[ClosePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }
}

/// Trait for price providers (Yahoo Finance, CSV import, test doubles).
///
/// Implementations block until the source answers or fails. They never
/// retry; retry policy belongs to the caller. The aggregation cache sits above
/// this trait, providers don't know about it.
pub trait PriceProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch daily closing prices for a symbol over an inclusive date range.
    fn fetch(&self, symbol: &str, start: NaiveDate, end: NaiveDate)
        -> Result<PriceSeries, FetchError>;
}
