//! Output formatting for `show` and `export`.

use anyhow::{Context, Result};
use etfboard_core::data::{date_label, PriceTable};
use etfboard_core::{DashboardView, LongRecord};
use std::path::Path;

/// Render the wide table transposed for a terminal: one line per date, one
/// column per ticker. Missing cells print as `-`.
pub fn render_table(table: &PriceTable) -> String {
    let names = table.names();
    let mut out = String::new();

    out.push_str(&format!("{:<18}", "Date"));
    for name in &names {
        out.push_str(&format!(" {name:>10}"));
    }
    out.push('\n');
    out.push_str(&"-".repeat(18 + names.len() * 11));
    out.push('\n');

    for date in table.columns() {
        out.push_str(&format!("{:<18}", date_label(date)));
        for name in &names {
            match table.get(name, date) {
                Some(price) => out.push_str(&format!(" {price:>10.2}")),
                None => out.push_str(&format!(" {:>10}", "-")),
            }
        }
        out.push('\n');
    }
    out
}

/// Long-form records as CSV with the chart column names.
pub fn records_to_csv(records: &[LongRecord]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["Date", "Name", "Stock Price(USD)"])?;
    for r in records {
        wtr.write_record([r.date_label(), r.name.clone(), r.price.to_string()])?;
    }
    let bytes = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(bytes).context("CSV output is not UTF-8")
}

pub fn view_to_json(view: &DashboardView) -> Result<String> {
    serde_json::to_string_pretty(view).context("failed to serialize dashboard view")
}

/// Write the long-form CSV to `path`.
pub fn export_records(records: &[LongRecord], path: &Path) -> Result<()> {
    let csv = records_to_csv(records)?;
    std::fs::write(path, csv).with_context(|| format!("failed to write {}", path.display()))
}
