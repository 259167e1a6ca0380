use std::collections::{BTreeMap, BTreeSet};

use super::model::{CellValue, Dimension, SalesTable};
use crate::error::{DashboardError, Result};

// ---------------------------------------------------------------------------
// Filter predicate: which values are selected per dimension
// ---------------------------------------------------------------------------

/// Per-dimension selection state: dimension → set of allowed values.
///
/// * A dimension absent from the map imposes no constraint.
/// * A dimension present with an empty set excludes every row.
pub type FilterSelection = BTreeMap<Dimension, BTreeSet<CellValue>>;

/// A selection with every sidebar dimension fully selected (shows everything).
pub fn full_selection(table: &SalesTable) -> FilterSelection {
    Dimension::SIDEBAR
        .iter()
        .map(|dim| (*dim, table.unique_values(*dim).clone()))
        .collect()
}

/// Reject selections naming values the table has never seen.
pub fn validate(table: &SalesTable, selection: &FilterSelection) -> Result<()> {
    for (dim, selected) in selection {
        let known = table.unique_values(*dim);
        if let Some(unknown) = selected.iter().find(|v| !known.contains(*v)) {
            return Err(DashboardError::InvalidSelection {
                dimension: dim.column_name().to_string(),
                value: unknown.to_string(),
            });
        }
    }
    Ok(())
}

/// Return indices of rows that pass all active filters, in table order.
///
/// A row passes a dimension filter when:
/// * The dimension is not present in `selection` → passes (no constraint)
/// * The selected set for that dimension is empty → nothing selected → fails
/// * The row's value for that dimension is in the selected set → passes
pub fn filtered_indices(table: &SalesTable, selection: &FilterSelection) -> Vec<usize> {
    if selection.values().any(BTreeSet::is_empty) {
        return Vec::new();
    }
    // Fully-selected dimensions cannot reject anything; skip them.
    let active: Vec<(Dimension, &BTreeSet<CellValue>)> = selection
        .iter()
        .filter(|(dim, selected)| {
            let all = table.unique_values(**dim);
            !all.iter().all(|v| selected.contains(v))
        })
        .map(|(dim, selected)| (*dim, selected))
        .collect();

    table
        .rows()
        .iter()
        .enumerate()
        .filter(|(_, row)| {
            active
                .iter()
                .all(|(dim, selected)| selected.contains(&row.value(*dim)))
        })
        .map(|(i, _)| i)
        .collect()
}

/// The sub-table of rows matching `selection`, original order preserved.
pub fn filter(table: &SalesTable, selection: &FilterSelection) -> SalesTable {
    let rows = filtered_indices(table, selection)
        .into_iter()
        .map(|i| table.rows()[i].clone())
        .collect();
    SalesTable::from_rows(rows, table.extra_columns().to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::txn;
    use crate::data::model::Gender;

    fn sample() -> SalesTable {
        let mut rows = vec![
            txn("Yangon", "Food and beverages", 10.0, 7.0, 10),
            txn("Mandalay", "Sports and travel", 20.0, 8.0, 13),
            txn("Yangon", "Sports and travel", 30.0, 9.0, 15),
            txn("Naypyitaw", "Health and beauty", 40.0, 6.0, 10),
        ];
        rows[1].gender = Gender::Male;
        SalesTable::from_rows(rows, Vec::new())
    }

    fn set(values: &[&str]) -> BTreeSet<CellValue> {
        values.iter().map(|v| CellValue::from(*v)).collect()
    }

    #[test]
    fn full_selection_is_identity() {
        let table = sample();
        assert_eq!(filter(&table, &full_selection(&table)), table);
        assert_eq!(filter(&table, &FilterSelection::new()), table);
    }

    #[test]
    fn empty_set_excludes_everything() {
        let table = sample();
        for dim in Dimension::SIDEBAR {
            let mut selection = full_selection(&table);
            selection.insert(dim, BTreeSet::new());
            assert!(filter(&table, &selection).is_empty(), "{dim}");
        }
    }

    #[test]
    fn and_across_dimensions_or_within() {
        let table = sample();
        let mut selection = FilterSelection::new();
        selection.insert(Dimension::City, set(&["Yangon", "Mandalay"]));
        selection.insert(Dimension::ProductLine, set(&["Sports and travel"]));

        let result = filter(&table, &selection);
        let totals: Vec<f64> = result.rows().iter().map(|r| r.total).collect();
        assert_eq!(totals, [20.0, 30.0]);

        selection.insert(Dimension::Gender, set(&["Female"]));
        let result = filter(&table, &selection);
        assert_eq!(result.len(), 1);
        assert_eq!(result.rows()[0].total, 30.0);
    }

    #[test]
    fn filtered_never_grows() {
        let table = sample();
        for city in table.unique_values(Dimension::City) {
            let mut selection = full_selection(&table);
            selection.insert(Dimension::City, BTreeSet::from([city.clone()]));
            let result = filter(&table, &selection);
            assert!(result.len() <= table.len());
            assert!(result.rows().iter().all(|r| CellValue::Text(r.city.clone()) == *city));
        }
    }

    #[test]
    fn hour_dimension_filters_on_derived_column() {
        let table = sample();
        let mut selection = FilterSelection::new();
        selection.insert(Dimension::Hour, BTreeSet::from([CellValue::Integer(10)]));
        assert_eq!(filtered_indices(&table, &selection), [0, 3]);
    }

    #[test]
    fn validate_rejects_unknown_values() {
        let table = sample();
        assert!(validate(&table, &full_selection(&table)).is_ok());

        let mut selection = full_selection(&table);
        selection.insert(Dimension::City, set(&["Yangon", "Atlantis"]));
        assert_eq!(
            validate(&table, &selection),
            Err(DashboardError::InvalidSelection {
                dimension: "City".to_string(),
                value: "Atlantis".to_string(),
            })
        );
    }
}
