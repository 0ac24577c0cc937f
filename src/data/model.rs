use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;

// ---------------------------------------------------------------------------
// Row – one record of a tabular dataset
// ---------------------------------------------------------------------------

/// A single record: column name → value.
///
/// Values are opaque strings. An absent column and an empty string are both
/// treated as missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Row {
    fields: BTreeMap<String, String>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields.get(column).map(String::as_str)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.fields.contains_key(column)
    }

    /// Insert or replace a value, returning the previous one.
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.fields.insert(column.into(), value.into())
    }

    /// Insert only when the column is not present yet (first write wins).
    pub fn insert_if_absent(&mut self, column: &str, value: &str) {
        if !self.fields.contains_key(column) {
            self.fields.insert(column.to_string(), value.to_string());
        }
    }

    pub fn remove(&mut self, column: &str) -> Option<String> {
        self.fields.remove(column)
    }

    /// Whether the column is absent or holds the empty string.
    pub fn is_missing(&self, column: &str) -> bool {
        self.fields.get(column).map_or(true, |v| v.is_empty())
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Row {
            fields: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Dataset – ordered rows
// ---------------------------------------------------------------------------

/// An ordered sequence of rows. Order only matters for output determinism.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Dataset {
    rows: Vec<Row>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rows(rows: Vec<Row>) -> Self {
        Dataset { rows }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Row> {
        self.rows.iter()
    }

    pub fn push(&mut self, row: Row) {
        self.rows.push(row);
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the dataset has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Union of column names over every row, sorted.
    pub fn column_names(&self) -> Vec<String> {
        let names: BTreeSet<&str> = self.rows.iter().flat_map(Row::columns).collect();
        names.into_iter().map(str::to_string).collect()
    }

    /// Working copy with `column` stripped from every row. `self` is untouched.
    pub fn without_column(&self, column: &str) -> Dataset {
        let rows = self
            .rows
            .iter()
            .map(|row| {
                let mut row = row.clone();
                row.remove(column);
                row
            })
            .collect();
        Dataset { rows }
    }
}

impl FromIterator<Row> for Dataset {
    fn from_iter<I: IntoIterator<Item = Row>>(iter: I) -> Self {
        Dataset {
            rows: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a Row;
    type IntoIter = std::slice::Iter<'a, Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

// ---------------------------------------------------------------------------
// ColumnSet – the fixed scoring denominator
// ---------------------------------------------------------------------------

/// Immutable set of column names captured once per merge.
///
/// Dropping a column's values from rows never shrinks this set; the column
/// keeps counting towards the missing-data score.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnSet {
    names: BTreeSet<String>,
}

impl ColumnSet {
    /// Union of the first-row headers of both inputs.
    pub fn from_headers(a: &Dataset, b: &Dataset) -> Self {
        let names = a
            .rows()
            .first()
            .into_iter()
            .chain(b.rows().first())
            .flat_map(Row::columns)
            .map(str::to_string)
            .collect();
        ColumnSet { names }
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.names.contains(column)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for ColumnSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        ColumnSet {
            names: iter.into_iter().map(Into::into).collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// JoinKey / JoinSpec – composite identifier
// ---------------------------------------------------------------------------

/// Concatenated join fields. Equality is exact string equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JoinKey(String);

impl JoinKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JoinKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The two designated key fields and the separator placed between them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinSpec {
    pub fields: [String; 2],
    pub separator: String,
}

fn default_separator() -> String {
    "-".into()
}

impl Default for JoinSpec {
    fn default() -> Self {
        JoinSpec {
            fields: ["Country".into(), "Year".into()],
            separator: default_separator(),
        }
    }
}

impl JoinSpec {
    pub fn new(first: impl Into<String>, second: impl Into<String>) -> Self {
        JoinSpec {
            fields: [first.into(), second.into()],
            separator: default_separator(),
        }
    }

    /// The first join field a row lacks, if any.
    pub fn missing_field(&self, row: &Row) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| !row.contains(f))
            .map(String::as_str)
    }

    /// Build the key for a row. Returns `None` when a join field is absent;
    /// an empty value is an ordinary key segment.
    pub fn key(&self, row: &Row) -> Option<JoinKey> {
        let first = row.get(&self.fields[0])?;
        let second = row.get(&self.fields[1])?;
        Some(JoinKey(format!("{first}{}{second}", self.separator)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> Row {
        pairs.iter().copied().collect()
    }

    #[test]
    fn missing_means_absent_or_empty() {
        let r = row(&[("Pop", ""), ("GDP", "5")]);
        assert!(r.is_missing("Pop"));
        assert!(r.is_missing("Area"));
        assert!(!r.is_missing("GDP"));
    }

    #[test]
    fn insert_if_absent_keeps_first_value() {
        let mut r = row(&[("Pop", "")]);
        r.insert_if_absent("Pop", "10");
        r.insert_if_absent("GDP", "5");
        assert_eq!(r.get("Pop"), Some(""));
        assert_eq!(r.get("GDP"), Some("5"));
    }

    #[test]
    fn without_column_leaves_source_untouched() {
        let ds = Dataset::from_rows(vec![row(&[("A", "1"), ("B", "2")])]);
        let copy = ds.without_column("A");
        assert_eq!(copy.rows()[0].get("A"), None);
        assert_eq!(ds.rows()[0].get("A"), Some("1"));
    }

    #[test]
    fn column_set_uses_first_rows_only() {
        let a = Dataset::from_rows(vec![row(&[("A", "1")]), row(&[("Late", "x")])]);
        let b = Dataset::from_rows(vec![row(&[("B", "2"), ("A", "3")])]);
        let cols = ColumnSet::from_headers(&a, &b);
        assert_eq!(cols.iter().collect::<Vec<_>>(), vec!["A", "B"]);
        assert!(!cols.contains("Late"));
    }

    #[test]
    fn join_key_concatenates_with_separator() {
        let join = JoinSpec::default();
        let r = row(&[("Country", "X"), ("Year", "2000")]);
        assert_eq!(join.key(&r).map(|k| k.to_string()), Some("X-2000".into()));

        let empty = row(&[("Country", ""), ("Year", "")]);
        assert_eq!(join.key(&empty).map(|k| k.to_string()), Some("-".into()));

        let partial = row(&[("Country", "X")]);
        assert_eq!(join.key(&partial), None);
        assert_eq!(join.missing_field(&partial), Some("Year"));
    }
}
