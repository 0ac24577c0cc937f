use std::collections::BTreeMap;

use super::model::{ColumnSet, Dataset};

/// Count of (row, column) pairs over `columns` whose value is absent or empty.
/// Lower is better.
pub fn score(dataset: &Dataset, columns: &ColumnSet) -> usize {
    dataset
        .iter()
        .map(|row| columns.iter().filter(|col| row.is_missing(col)).count())
        .sum()
}

/// Missing-value count for every column of `columns`, zeros included.
pub fn missing_counts(dataset: &Dataset, columns: &ColumnSet) -> BTreeMap<String, usize> {
    let mut counts: BTreeMap<String, usize> =
        columns.iter().map(|col| (col.to_string(), 0)).collect();
    for row in dataset {
        for (col, count) in counts.iter_mut() {
            if row.is_missing(col) {
                *count += 1;
            }
        }
    }
    counts
}

/// The column with the highest nonzero missing count.
///
/// Ties go to the lexicographically smallest column name. `None` when no
/// column has a missing value.
pub fn select_candidate(dataset: &Dataset, columns: &ColumnSet) -> Option<String> {
    // `counts` iterates in name order, so a strict `>` keeps the first of equals.
    let mut best: Option<(String, usize)> = None;
    for (col, count) in missing_counts(dataset, columns) {
        if count == 0 {
            continue;
        }
        if best.as_ref().map_or(true, |(_, top)| count > *top) {
            best = Some((col, count));
        }
    }
    best.map(|(col, _)| col)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Row;

    fn row(pairs: &[(&str, &str)]) -> Row {
        pairs.iter().copied().collect()
    }

    #[test]
    fn counts_absent_and_empty_cells() {
        let ds = Dataset::from_rows(vec![
            row(&[("A", "1"), ("B", "")]),
            row(&[("A", "")]),
        ]);
        let cols: ColumnSet = ["A", "B"].into_iter().collect();
        assert_eq!(score(&ds, &cols), 3);
    }

    #[test]
    fn empty_column_set_scores_zero() {
        let ds = Dataset::from_rows(vec![row(&[("A", "")])]);
        assert_eq!(score(&ds, &ColumnSet::default()), 0);
        assert_eq!(select_candidate(&ds, &ColumnSet::default()), None);
    }

    #[test]
    fn missing_counts_include_complete_columns() {
        let ds = Dataset::from_rows(vec![row(&[("A", "1"), ("B", "")])]);
        let cols: ColumnSet = ["A", "B"].into_iter().collect();
        let counts = missing_counts(&ds, &cols);
        assert_eq!(counts.get("A"), Some(&0));
        assert_eq!(counts.get("B"), Some(&1));
    }

    #[test]
    fn candidate_is_most_missing_column() {
        let ds = Dataset::from_rows(vec![
            row(&[("A", ""), ("B", ""), ("C", "1")]),
            row(&[("A", "2"), ("B", ""), ("C", "")]),
        ]);
        let cols: ColumnSet = ["A", "B", "C"].into_iter().collect();
        assert_eq!(select_candidate(&ds, &cols).as_deref(), Some("B"));
    }

    #[test]
    fn candidate_ties_break_on_name() {
        let ds = Dataset::from_rows(vec![row(&[("Zeta", ""), ("Alpha", ""), ("Mid", "x")])]);
        let cols: ColumnSet = ["Zeta", "Alpha", "Mid"].into_iter().collect();
        assert_eq!(select_candidate(&ds, &cols).as_deref(), Some("Alpha"));
    }

    #[test]
    fn no_candidate_when_complete() {
        let ds = Dataset::from_rows(vec![row(&[("A", "1")])]);
        let cols: ColumnSet = ["A"].into_iter().collect();
        assert_eq!(select_candidate(&ds, &cols), None);
    }
}
