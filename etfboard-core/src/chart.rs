//! Wide-to-long reshaping for the chart layer.
//!
//! The chart draws one line per name with date on x and price on y, so it
//! wants one record per observation rather than one column per date.

use crate::data::table::{date_label, PriceTable};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One (date, name, price) observation.
///
/// Serialized field names match the chart encoding: `Date`, `Name`,
/// `Stock Price(USD)`. `Date` is written as the display label, e.g.
/// `01 January 2020`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LongRecord {
    #[serde(rename = "Date", with = "label_format")]
    pub date: NaiveDate,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Stock Price(USD)")]
    pub price: f64,
}

impl LongRecord {
    pub fn new(date: NaiveDate, name: &str, price: f64) -> Self {
        Self {
            date,
            name: name.to_string(),
            price,
        }
    }

    pub fn date_label(&self) -> String {
        date_label(self.date)
    }
}

mod label_format {
    use crate::data::table::{date_label, DATE_LABEL_FORMAT};
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&date_label(*date))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDate::parse_from_str(&raw, DATE_LABEL_FORMAT).map_err(serde::de::Error::custom)
    }
}

/// Emit one record per populated cell, row by row in table order and date
/// ascending within a row. Missing cells produce nothing.
pub fn to_long_form(table: &PriceTable) -> Vec<LongRecord> {
    table
        .rows()
        .iter()
        .flat_map(|row| {
            row.prices
                .iter()
                .map(|(date, price)| LongRecord::new(*date, &row.name, *price))
        })
        .collect()
}

/// Sort records by (name, date) for order-independent comparison.
pub fn sort_records(records: &mut [LongRecord]) {
    records.sort_by(|a, b| a.name.cmp(&b.name).then(a.date.cmp(&b.date)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::table::PriceRow;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn empty_row_emits_nothing() {
        let table = PriceTable::from_rows([
            PriceRow::new("SPY").with_price(d("2020-01-01"), 300.0),
            PriceRow::new("QQQ"),
        ]);

        let records = to_long_form(&table);
        assert_eq!(records, vec![LongRecord::new(d("2020-01-01"), "SPY", 300.0)]);
    }

    #[test]
    fn emits_rows_in_table_order_dates_ascending() {
        let table = PriceTable::from_rows([
            PriceRow::new("QQQ")
                .with_price(d("2020-01-02"), 205.0)
                .with_price(d("2020-01-01"), 200.0),
            PriceRow::new("SPY").with_price(d("2020-01-01"), 300.0),
        ]);

        let records = to_long_form(&table);
        let keys: Vec<_> = records.iter().map(|r| (r.name.as_str(), r.date)).collect();
        assert_eq!(
            keys,
            vec![
                ("QQQ", d("2020-01-01")),
                ("QQQ", d("2020-01-02")),
                ("SPY", d("2020-01-01")),
            ]
        );
    }

    #[test]
    fn empty_table_is_empty_output() {
        assert!(to_long_form(&PriceTable::new()).is_empty());
    }

    #[test]
    fn sort_records_orders_by_name_then_date() {
        let mut records = vec![
            LongRecord::new(d("2020-01-02"), "SPY", 301.0),
            LongRecord::new(d("2020-01-02"), "AGG", 112.0),
            LongRecord::new(d("2020-01-01"), "SPY", 300.0),
        ];
        sort_records(&mut records);
        assert_eq!(records[0].name, "AGG");
        assert_eq!(records[1].date, d("2020-01-01"));
        assert_eq!(records[2].price, 301.0);
    }

    #[test]
    fn serializes_with_chart_column_names() {
        let json = serde_json::to_string(&LongRecord::new(d("2020-01-01"), "SPY", 300.0)).unwrap();
        assert_eq!(
            json,
            r#"{"Date":"01 January 2020","Name":"SPY","Stock Price(USD)":300.0}"#
        );
    }

    #[test]
    fn long_form_date_matches_table_label() {
        let table = PriceTable::from_rows([
            PriceRow::new("SPY").with_price(d("2020-01-01"), 300.0),
            PriceRow::new("QQQ"),
        ]);
        let records = to_long_form(&table);
        let json = serde_json::to_string(&records[0]).unwrap();
        assert!(json.contains(r#""Date":"01 January 2020""#));
        assert_eq!(records[0].date_label(), date_label(d("2020-01-01")));

        let back: LongRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, records[0]);
    }
}
