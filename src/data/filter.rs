use std::collections::{BTreeMap, BTreeSet};

use super::model::{CellValue, Dataset};

// ---------------------------------------------------------------------------
// Filter predicate: which unique values are selected per column
// ---------------------------------------------------------------------------

/// Per-column selection state: maps column_name → set of selected values.
/// If a column is absent it means "no filter" (show all).
pub type FilterState = BTreeMap<String, BTreeSet<CellValue>>;

/// Columns small enough to get a filter widget: at most `max_values`
/// unique values. Source order is kept.
pub fn filterable_columns(dataset: &Dataset, max_values: usize) -> Vec<String> {
    dataset
        .column_names
        .iter()
        .filter(|col| {
            dataset
                .unique_values
                .get(*col)
                .is_some_and(|vals| !vals.is_empty() && vals.len() <= max_values)
        })
        .cloned()
        .collect()
}

/// Initialise a [`FilterState`] with all values selected (i.e., show everything).
pub fn init_filter_state(dataset: &Dataset, max_values: usize) -> FilterState {
    filterable_columns(dataset, max_values)
        .into_iter()
        .filter_map(|col| {
            let vals = dataset.unique_values.get(&col)?.clone();
            Some((col, vals))
        })
        .collect()
}

/// Return indices of rows that pass all active filters.
///
/// A row passes a column filter when:
/// * The column is not present in `filters` → passes (no constraint)
/// * The filter set for that column is empty → nothing selected → fails
/// * The row's value for that column is in the selected set → passes
pub fn filtered_indices(dataset: &Dataset, filters: &FilterState) -> Vec<usize> {
    // Fully-selected columns impose no constraint; drop them up front.
    let active: Vec<(&String, &BTreeSet<CellValue>)> = filters
        .iter()
        .filter(|(col, selected)| {
            dataset
                .unique_values
                .get(*col)
                .map_or(true, |all_vals| !selected.is_superset(all_vals))
        })
        .collect();

    dataset
        .rows
        .iter()
        .enumerate()
        .filter(|(_, row)| {
            active
                .iter()
                .all(|(col, selected)| !selected.is_empty() && selected.contains(row.get(col)))
        })
        .map(|(i, _)| i)
        .collect()
}
