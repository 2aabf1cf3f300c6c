//! Row selection: project the aggregated table onto the names the user chose.

use crate::data::table::PriceTable;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("no tickers selected")]
    EmptySelection,

    #[error("unknown ticker '{name}'")]
    UnknownName { name: String },
}

/// Restrict `table` to the `selected` rows, in the caller's order.
///
/// A name repeated in the selection only yields one row, at its first
/// position.
pub fn filter<S: AsRef<str>>(table: &PriceTable, selected: &[S]) -> Result<PriceTable, SelectionError> {
    if selected.is_empty() {
        return Err(SelectionError::EmptySelection);
    }

    let mut out = PriceTable::new();
    for name in selected {
        let name = name.as_ref();
        let row = table.row(name).ok_or_else(|| SelectionError::UnknownName {
            name: name.to_string(),
        })?;
        if !out.contains(name) {
            out.push_row(row.clone());
        }
    }
    Ok(out)
}
