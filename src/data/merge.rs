use std::collections::{HashMap, HashSet};

use log::debug;

use super::model::{ColumnSet, Dataset, JoinKey, JoinSpec, Row};
use crate::error::{MergeError, Result, Side};

// ---------------------------------------------------------------------------
// Input validation
// ---------------------------------------------------------------------------

/// Join key of every row of `ds`, in order.
///
/// Fails on an empty dataset or on the first row lacking a join field, so
/// this is the only place inputs are checked.
fn keys_of(ds: &Dataset, side: Side, join: &JoinSpec) -> Result<Vec<JoinKey>> {
    if ds.is_empty() {
        return Err(MergeError::EmptyDataset { side });
    }
    ds.iter()
        .enumerate()
        .map(|(row, r)| {
            join.key(r).ok_or_else(|| MergeError::MissingJoinField {
                side,
                row,
                field: join.missing_field(r).unwrap_or_default().to_string(),
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Full outer join on the composite key
// ---------------------------------------------------------------------------

/// Full outer join of `a` and `b` on `join`'s composite key.
///
/// * Every row of `a` is emitted in order. Columns of `columns` it lacks are
///   filled from the matching `b` row, or with `""` when there is none.
/// * Each key of `b` that matches no row of `a` is emitted once, after the
///   rows of `a`, padded with `""`.
/// * Values already present in a row are never overwritten.
///
/// When `b` repeats a key, its last row for that key is the one used.
pub fn outer_join(a: &Dataset, b: &Dataset, columns: &ColumnSet, join: &JoinSpec) -> Result<Dataset> {
    let a_keys_in_order = keys_of(a, Side::Left, join)?;
    let b_keys_in_order = keys_of(b, Side::Right, join)?;

    // Index b by key; remember first-seen order so output stays deterministic.
    let mut b_index: HashMap<JoinKey, &Row> = HashMap::with_capacity(b.len());
    let mut b_order: Vec<JoinKey> = Vec::with_capacity(b.len());
    for (key, row) in b_keys_in_order.into_iter().zip(b.iter()) {
        if b_index.insert(key.clone(), row).is_none() {
            b_order.push(key);
        }
    }

    let mut merged = Dataset::new();
    let mut a_keys: HashSet<JoinKey> = HashSet::with_capacity(a.len());
    let mut matched = 0usize;

    for (key, row) in a_keys_in_order.into_iter().zip(a.iter()) {
        let mut out = row.clone();
        match b_index.get(&key) {
            Some(other) => {
                matched += 1;
                for col in columns.iter() {
                    out.insert_if_absent(col, other.get(col).unwrap_or(""));
                }
            }
            None => pad(&mut out, columns),
        }
        merged.push(out);
        a_keys.insert(key);
    }

    let mut right_only = 0usize;
    for key in b_order {
        if a_keys.contains(&key) {
            continue;
        }
        if let Some(row) = b_index.get(&key) {
            let mut out = (*row).clone();
            pad(&mut out, columns);
            merged.push(out);
            right_only += 1;
        }
    }

    debug!(
        "outer join: {} left rows ({matched} matched), {right_only} right-only rows, {} columns",
        a.len(),
        columns.len()
    );
    Ok(merged)
}

fn pad(row: &mut Row, columns: &ColumnSet) {
    for col in columns.iter() {
        row.insert_if_absent(col, "");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> Row {
        pairs.iter().copied().collect()
    }

    fn ds(rows: Vec<Row>) -> Dataset {
        Dataset::from_rows(rows)
    }

    fn join_default(a: &Dataset, b: &Dataset) -> Result<Dataset> {
        let cols = ColumnSet::from_headers(a, b);
        outer_join(a, b, &cols, &JoinSpec::default())
    }

    #[test]
    fn matching_rows_combine_fields() {
        let a = ds(vec![row(&[("Country", "X"), ("Year", "2000"), ("Pop", "10")])]);
        let b = ds(vec![row(&[("Country", "X"), ("Year", "2000"), ("GDP", "5")])]);
        let merged = join_default(&a, &b).unwrap();
        assert_eq!(merged.len(), 1);
        assert_eq!(
            merged.rows()[0],
            row(&[("Country", "X"), ("Year", "2000"), ("Pop", "10"), ("GDP", "5")])
        );
    }

    #[test]
    fn left_value_is_never_overwritten() {
        let a = ds(vec![row(&[("Country", "X"), ("Year", "2000"), ("Pop", "")])]);
        let b = ds(vec![row(&[("Country", "X"), ("Year", "2000"), ("Pop", "99")])]);
        let merged = join_default(&a, &b).unwrap();
        assert_eq!(merged.rows()[0].get("Pop"), Some(""));
    }

    #[test]
    fn unmatched_rows_from_both_sides_are_padded() {
        let a = ds(vec![row(&[("Country", "X"), ("Year", "2000"), ("Pop", "10")])]);
        let b = ds(vec![row(&[("Country", "Y"), ("Year", "2001"), ("GDP", "5")])]);
        let merged = join_default(&a, &b).unwrap();
        assert_eq!(merged.len(), 2);
        assert_eq!(merged.rows()[0].get("GDP"), Some(""));
        assert_eq!(merged.rows()[1].get("Country"), Some("Y"));
        assert_eq!(merged.rows()[1].get("Pop"), Some(""));
    }

    #[test]
    fn duplicate_right_keys_emit_last_row_once() {
        let a = ds(vec![row(&[("Country", "X"), ("Year", "2000")])]);
        let b = ds(vec![
            row(&[("Country", "Y"), ("Year", "2001"), ("GDP", "1")]),
            row(&[("Country", "Y"), ("Year", "2001"), ("GDP", "2")]),
        ]);
        let merged = join_default(&a, &b).unwrap();
        assert_eq!(merged.len(), 2);
        assert_eq!(merged.rows()[1].get("GDP"), Some("2"));
    }

    #[test]
    fn duplicate_left_keys_share_right_fill() {
        let a = ds(vec![
            row(&[("Country", "X"), ("Year", "2000"), ("Pop", "10")]),
            row(&[("Country", "X"), ("Year", "2000"), ("Pop", "11")]),
        ]);
        let b = ds(vec![row(&[("Country", "X"), ("Year", "2000"), ("GDP", "5")])]);
        let merged = join_default(&a, &b).unwrap();
        assert_eq!(merged.len(), 2);
        assert_eq!(merged.rows()[0].get("Pop"), Some("10"));
        assert_eq!(merged.rows()[1].get("Pop"), Some("11"));
        assert!(merged.iter().all(|r| r.get("GDP") == Some("5")));
    }

    #[test]
    fn left_errors_are_reported_before_right_errors() {
        let a = ds(vec![row(&[("Country", "X")])]);
        let err = join_default(&a, &Dataset::new()).unwrap_err();
        assert_eq!(
            err,
            MergeError::MissingJoinField {
                side: Side::Left,
                row: 0,
                field: "Year".into()
            }
        );
    }

    #[test]
    fn inputs_are_not_mutated() {
        let a = ds(vec![row(&[("Country", "X"), ("Year", "2000")])]);
        let b = ds(vec![row(&[("Country", "X"), ("Year", "2000"), ("GDP", "5")])]);
        let (a0, b0) = (a.clone(), b.clone());
        join_default(&a, &b).unwrap();
        assert_eq!(a, a0);
        assert_eq!(b, b0);
    }

    #[test]
    fn empty_side_is_rejected() {
        let a = ds(vec![row(&[("Country", "X"), ("Year", "2000"), ("Pop", "")])]);
        let err = join_default(&a, &Dataset::new()).unwrap_err();
        assert_eq!(err, MergeError::EmptyDataset { side: Side::Right });
    }

    #[test]
    fn missing_join_field_is_rejected() {
        let a = ds(vec![
            row(&[("Country", "X"), ("Year", "2000")]),
            row(&[("Country", "Z")]),
        ]);
        let b = ds(vec![row(&[("Country", "X"), ("Year", "2000")])]);
        let err = join_default(&a, &b).unwrap_err();
        assert_eq!(
            err,
            MergeError::MissingJoinField {
                side: Side::Left,
                row: 1,
                field: "Year".into()
            }
        );
    }
}
