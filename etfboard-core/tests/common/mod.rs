//! Shared test doubles for the pipeline integration tests.

#![allow(dead_code)]

use chrono::NaiveDate;
use etfboard_core::data::{
    ClosePoint, FetchError, PriceProvider, PriceSeries, UnavailableCause,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

/// In-memory provider that records every call it receives.
#[derive(Clone, Default)]
pub struct RecordingProvider {
    data: Arc<HashMap<String, Vec<ClosePoint>>>,
    failing: Arc<Vec<String>>,
    calls: Arc<Mutex<Vec<(String, NaiveDate, NaiveDate)>>>,
}

impl RecordingProvider {
    pub fn new(data: Vec<(&str, Vec<(&str, f64)>)>) -> Self {
        let data = data
            .into_iter()
            .map(|(symbol, points)| {
                (
                    symbol.to_string(),
                    points
                        .into_iter()
                        .map(|(date, close)| ClosePoint::new(d(date), close))
                        .collect(),
                )
            })
            .collect();
        Self {
            data: Arc::new(data),
            ..Self::default()
        }
    }

    /// Make fetches for `symbols` fail as if the source were down.
    pub fn failing(mut self, symbols: &[&str]) -> Self {
        self.failing = Arc::new(symbols.iter().map(|s| s.to_string()).collect());
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn called_symbols(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(s, _, _)| s.clone())
            .collect()
    }
}

impl PriceProvider for RecordingProvider {
    fn name(&self) -> &str {
        "recording"
    }

    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries, FetchError> {
        self.calls
            .lock()
            .unwrap()
            .push((symbol.to_string(), start, end));
        if self.failing.iter().any(|s| s == symbol) {
            return Err(FetchError::unavailable(
                symbol,
                UnavailableCause::Unreachable("connection refused".into()),
            ));
        }
        let points = self.data.get(symbol).cloned().unwrap_or_default();
        PriceSeries::from_points(symbol, start, end, points)
    }
}

/// SPY has one close, QQQ has two.
pub fn spy_qqq_provider() -> RecordingProvider {
    RecordingProvider::new(vec![
        ("SPY", vec![("2020-01-01", 300.0)]),
        ("QQQ", vec![("2020-01-01", 200.0), ("2020-01-02", 205.0)]),
    ])
}
