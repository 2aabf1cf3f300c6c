//! Yahoo Finance price provider.
//!
//! Fetches daily closes from Yahoo's v8 chart API. Only the `close` field is
//! read; the other OHLCV arrays in the payload are ignored.
//! The endpoint is unofficial and its payload shape can change without
//! notice; `CsvDirProvider` covers offline use.

use super::provider::{ClosePoint, FetchError, PriceProvider, PriceSeries, UnavailableCause};
use crate::config::ConfigError;
use chrono::NaiveDate;
use reqwest::Url;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

pub const DEFAULT_BASE_URL: &str = "https://query2.finance.yahoo.com";
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Yahoo Finance v8 chart API response.
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    #[serde(default)]
    meta: ChartMeta,
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    /// Exchange offset from UTC in seconds (e.g. -18000 for New York in winter).
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

/// Yahoo Finance price provider.
pub struct YahooProvider {
    client: reqwest::blocking::Client,
    base_url: Url,
}

impl YahooProvider {
    /// Build a provider with a per-request timeout.
    ///
    /// A request that exceeds `timeout` fails with
    /// [`UnavailableCause::Timeout`].
    pub fn new(base_url: &str, timeout: Duration, user_agent: &str) -> Result<Self, ConfigError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(ConfigError::HttpClient)?;
        Self::with_client(client, base_url)
    }

    /// Use a preconfigured client (proxy, TLS, timeout settings are the caller's).
    pub fn with_client(client: reqwest::blocking::Client, base_url: &str) -> Result<Self, ConfigError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ConfigError::Invalid(format!("provider.base_url '{base_url}': {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ConfigError::Invalid(format!(
                "provider.base_url '{base_url}' cannot carry a path"
            )));
        }
        Ok(Self { client, base_url })
    }

    /// Build the chart API URL for a symbol and date range. The symbol is a
    /// single path segment, so `/`, `?` and `#` in it are percent-encoded.
    fn chart_url(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Url {
        let start_ts = start.and_time(chrono::NaiveTime::MIN).and_utc().timestamp();
        // period2 is exclusive, so ask for the whole of the end day.
        let end_ts = end
            .succ_opt()
            .unwrap_or(end)
            .and_time(chrono::NaiveTime::MIN)
            .and_utc()
            .timestamp();

        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["v8", "finance", "chart", symbol]);
        }
        url.query_pairs_mut()
            .append_pair("period1", &start_ts.to_string())
            .append_pair("period2", &end_ts.to_string())
            .append_pair("interval", "1d");
        url
    }
}

/// Parse a chart API body into a normalized series.
///
/// `Not Found` and empty result sets are an empty series, not an error.
fn parse_response(
    symbol: &str,
    start: NaiveDate,
    end: NaiveDate,
    resp: ChartResponse,
) -> Result<PriceSeries, FetchError> {
    let result = match resp.chart.result {
        Some(result) => result,
        None => {
            return match resp.chart.error {
                Some(err) if err.code == "Not Found" => {
                    debug!(symbol, "provider reports symbol not found");
                    Ok(PriceSeries::empty(symbol))
                }
                Some(err) => Err(FetchError::malformed(
                    symbol,
                    format!("{}: {}", err.code, err.description),
                )),
                None => Err(FetchError::malformed(symbol, "empty result with no error")),
            };
        }
    };

    let data = match result.into_iter().next() {
        Some(data) => data,
        None => return Ok(PriceSeries::empty(symbol)),
    };

    // No timestamps means no trading days in the window.
    let timestamps = match data.timestamp {
        Some(ts) => ts,
        None => return Ok(PriceSeries::empty(symbol)),
    };

    let closes = data
        .indicators
        .quote
        .into_iter()
        .next()
        .map(|q| q.close)
        .ok_or_else(|| FetchError::malformed(symbol, "no quote data"))?;

    if closes.len() != timestamps.len() {
        return Err(FetchError::malformed(
            symbol,
            format!(
                "{} timestamps but {} closes",
                timestamps.len(),
                closes.len()
            ),
        ));
    }

    let offset = data.meta.gmtoffset;
    let mut points = Vec::with_capacity(timestamps.len());
    for (ts, close) in timestamps.into_iter().zip(closes) {
        // Holidays and halted sessions come back as null closes.
        let Some(close) = close else { continue };
        let date = chrono::DateTime::from_timestamp(ts + offset, 0)
            .map(|dt| dt.date_naive())
            .ok_or_else(|| FetchError::malformed(symbol, format!("invalid timestamp: {ts}")))?;
        points.push(ClosePoint::new(date, close));
    }

    PriceSeries::from_points(symbol, start, end, points)
}

fn transport_error(symbol: &str, e: &reqwest::Error) -> FetchError {
    let cause = if e.is_timeout() {
        UnavailableCause::Timeout
    } else {
        UnavailableCause::Unreachable(e.to_string())
    };
    FetchError::unavailable(symbol, cause)
}

impl PriceProvider for YahooProvider {
    fn name(&self) -> &str {
        "yahoo_finance"
    }

    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries, FetchError> {
        let url = self.chart_url(symbol, start, end);
        info!(symbol, %start, %end, "fetching daily closes");

        let resp = self
            .client
            .get(url)
            .send()
            .map_err(|e| transport_error(symbol, &e))?;

        let status = resp.status();
        // Yahoo answers unknown symbols with 404 and a JSON error body.
        if !status.is_success() && status != reqwest::StatusCode::NOT_FOUND {
            return Err(FetchError::unavailable(
                symbol,
                UnavailableCause::HttpStatus(status.as_u16()),
            ));
        }

        let body = resp.text().map_err(|e| transport_error(symbol, &e))?;

        let chart: ChartResponse = serde_json::from_str(&body).map_err(|e| {
            FetchError::malformed(symbol, format!("failed to parse response: {e}"))
        })?;

        let series = parse_response(symbol, start, end, chart)?;
        debug!(symbol, points = series.len(), "parsed chart response");
        Ok(series)
    }
}
