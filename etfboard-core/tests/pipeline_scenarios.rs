//! End-to-end scenarios for validate → aggregate → filter → shape.

mod common;

use common::{d, spy_qqq_provider, RecordingProvider};
use etfboard_core::data::{CatalogEntry, DataAggregator, TickerCatalog};
use etfboard_core::{
    sort_records, to_long_form, Dashboard, DashboardConfig, DashboardError, DateRange,
    LongRecord, RangeError, SelectionError, ViewRequest,
};

const TODAY: &str = "2024-06-03";

fn spy_qqq_config() -> DashboardConfig {
    DashboardConfig {
        tickers: vec![CatalogEntry::new("spy", "SPY"), CatalogEntry::new("qqq", "QQQ")],
        ..DashboardConfig::default()
    }
}

fn request(start: &str, end: &str, selection: &[&str]) -> ViewRequest {
    ViewRequest {
        start: d(start),
        end: d(end),
        selection: selection.iter().map(|s| s.to_string()).collect(),
    }
}

#[test]
fn selection_order_drives_rows_and_records() {
    let provider = spy_qqq_provider();
    let dash = Dashboard::new(spy_qqq_config(), Box::new(provider.clone())).unwrap();

    let view = dash
        .render(&request("2020-01-01", "2020-01-03", &["QQQ", "SPY"]), d(TODAY))
        .unwrap();

    assert_eq!(view.table.names(), vec!["QQQ", "SPY"]);
    assert_eq!(view.records.len(), 3);
    assert_eq!(view.display_table().names(), vec!["QQQ", "SPY"]);

    let mut records = view.records.clone();
    sort_records(&mut records);
    assert_eq!(
        records,
        vec![
            LongRecord::new(d("2020-01-01"), "QQQ", 200.0),
            LongRecord::new(d("2020-01-02"), "QQQ", 205.0),
            LongRecord::new(d("2020-01-01"), "SPY", 300.0),
        ]
    );
    assert_eq!(provider.called_symbols(), vec!["SPY", "QQQ"]);
}

#[test]
fn future_start_stops_before_any_fetch() {
    let provider = spy_qqq_provider();
    let dash = Dashboard::new(spy_qqq_config(), Box::new(provider.clone())).unwrap();

    let tomorrow = d(TODAY).succ_opt().unwrap();
    let req = ViewRequest {
        start: tomorrow,
        end: d(TODAY),
        selection: vec!["SPY".into()],
    };
    let err = dash.render(&req, d(TODAY)).unwrap_err();

    assert_eq!(
        err,
        DashboardError::Range(RangeError::FutureStart {
            start: tomorrow,
            today: d(TODAY)
        })
    );
    assert_eq!(provider.call_count(), 0);
}

#[test]
fn range_errors_never_fetch() {
    let provider = spy_qqq_provider();
    let dash = Dashboard::new(spy_qqq_config(), Box::new(provider.clone())).unwrap();

    for req in [
        request("2024-06-01", "2024-06-09", &["SPY"]),
        request("2024-05-02", "2024-05-01", &["SPY"]),
    ] {
        assert!(matches!(
            dash.render(&req, d(TODAY)),
            Err(DashboardError::Range(_))
        ));
    }
    assert_eq!(provider.call_count(), 0);
}

#[test]
fn repeated_render_reuses_cached_table() {
    let provider = spy_qqq_provider();
    let dash = Dashboard::new(spy_qqq_config(), Box::new(provider.clone())).unwrap();

    let first = dash
        .render(&request("2020-01-01", "2020-01-03", &["SPY", "QQQ"]), d(TODAY))
        .unwrap();
    // A selection change reuses the same aggregation.
    let second = dash
        .render(&request("2020-01-01", "2020-01-03", &["QQQ"]), d(TODAY))
        .unwrap();

    assert_eq!(provider.call_count(), 2);
    assert_eq!(first.table.row("QQQ"), second.table.row("QQQ"));
    assert_eq!(dash.aggregator().cache().hits(), 1);

    // A new range is a new key.
    dash.render(&request("2020-01-01", "2020-01-02", &["QQQ"]), d(TODAY))
        .unwrap();
    assert_eq!(provider.call_count(), 4);
}

#[test]
fn aggregate_is_idempotent_cell_for_cell() {
    let provider = spy_qqq_provider();
    let agg = DataAggregator::with_provider(Box::new(provider.clone()));
    let catalog = TickerCatalog::from_pairs([("spy", "SPY"), ("qqq", "QQQ")]);
    let range = DateRange::checked(d("2020-01-01"), d("2020-01-03"), d(TODAY)).unwrap();

    let a = agg.aggregate(&catalog, range).unwrap();
    let b = agg.aggregate(&catalog, range).unwrap();

    assert_eq!(a.names(), b.names());
    assert_eq!(a.columns(), b.columns());
    for name in a.names() {
        for date in a.columns() {
            assert_eq!(a.get(name, date), b.get(name, date));
        }
    }
    assert_eq!(provider.call_count(), 2);
}

#[test]
fn one_provider_failure_fails_the_interaction() {
    let provider = spy_qqq_provider().failing(&["QQQ"]);
    let dash = Dashboard::new(spy_qqq_config(), Box::new(provider.clone())).unwrap();

    let err = dash
        .render(&request("2020-01-01", "2020-01-03", &["SPY"]), d(TODAY))
        .unwrap_err();

    match err {
        DashboardError::Fetch(fetch) => assert_eq!(fetch.symbol(), "QQQ"),
        other => panic!("expected fetch error, got {other:?}"),
    }
    assert_eq!(dash.aggregator().cache().len(), 0);
}

#[test]
fn failure_is_not_cached_and_next_attempt_refetches() {
    let failing = spy_qqq_provider().failing(&["SPY"]);
    let dash = Dashboard::new(spy_qqq_config(), Box::new(failing.clone())).unwrap();
    let req = request("2020-01-01", "2020-01-03", &["SPY"]);

    assert!(dash.render(&req, d(TODAY)).is_err());
    assert!(dash.render(&req, d(TODAY)).is_err());
    assert_eq!(failing.call_count(), 2);
}

#[test]
fn parallel_fetch_keeps_catalog_order_and_all_or_nothing() {
    let mut config = DashboardConfig::default();
    config.fetch.mode = etfboard_core::config::FetchModeName::Parallel;
    config.fetch.max_workers = 3;

    let data = || {
        vec![
            ("VWO", vec![("2020-01-02", 44.0)]),
            ("SPY", vec![("2020-01-02", 324.87)]),
            ("GLD", vec![("2020-01-02", 143.9)]),
        ]
    };
    let provider = RecordingProvider::new(data());
    let dash = Dashboard::new(config.clone(), Box::new(provider.clone())).unwrap();

    let names = dash
        .available_names(d("2020-01-01"), d("2020-01-03"), d(TODAY))
        .unwrap();
    assert_eq!(names, TickerCatalog::reference().symbols());
    assert_eq!(provider.call_count(), 10);

    let broken = RecordingProvider::new(data()).failing(&["IVV"]);
    let dash = Dashboard::new(config, Box::new(broken)).unwrap();
    assert!(matches!(
        dash.available_names(d("2020-01-01"), d("2020-01-03"), d(TODAY)),
        Err(DashboardError::Fetch(_))
    ));
}

#[test]
fn selection_errors_stop_before_shaping() {
    let dash = Dashboard::new(spy_qqq_config(), Box::new(spy_qqq_provider())).unwrap();

    let empty = dash
        .render(&request("2020-01-01", "2020-01-03", &[]), d(TODAY))
        .unwrap_err();
    assert_eq!(empty, DashboardError::Selection(SelectionError::EmptySelection));

    let unknown = dash
        .render(&request("2020-01-01", "2020-01-03", &["SPY", "VOO"]), d(TODAY))
        .unwrap_err();
    assert_eq!(
        unknown,
        DashboardError::Selection(SelectionError::UnknownName {
            name: "VOO".into()
        })
    );
}

#[test]
fn delisted_symbol_is_an_empty_row_not_an_error() {
    // QQQ has no data at all in this provider.
    let provider = RecordingProvider::new(vec![("SPY", vec![("2020-01-01", 300.0)])]);
    let dash = Dashboard::new(spy_qqq_config(), Box::new(provider)).unwrap();

    let view = dash
        .render(&request("2020-01-01", "2020-01-03", &["SPY", "QQQ"]), d(TODAY))
        .unwrap();
    assert_eq!(view.table.len(), 2);
    assert!(view.table.row("QQQ").unwrap().prices.is_empty());
    assert_eq!(
        to_long_form(&view.table),
        vec![LongRecord::new(d("2020-01-01"), "SPY", 300.0)]
    );
}
