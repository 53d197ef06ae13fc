//! Order-independent comparison of row collections.
//!
//! Rows are reduced to canonical keys (their values' `Display` text joined by
//! [`KEY_SEPARATOR`]) and compared as sets. Set comparison collapses
//! duplicate rows, so a missing or extra duplicate goes unnoticed; use
//! [`compare_multiset`] when duplicates matter.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Display;

use crate::error::RowSetMismatch;
use crate::value::Row;

/// Separator between column values in a canonical key (ASCII unit separator).
pub const KEY_SEPARATOR: char = '\u{1f}';

/// Something that can be reduced to a canonical row key.
pub trait CanonicalRow {
    fn canonical_key(&self) -> String;
}

fn join_key<I>(values: I) -> String
where
    I: IntoIterator,
    I::Item: Display,
{
    let mut key = String::new();
    for (i, value) in values.into_iter().enumerate() {
        if i > 0 {
            key.push(KEY_SEPARATOR);
        }
        key.push_str(&value.to_string());
    }
    key
}

impl CanonicalRow for Row {
    fn canonical_key(&self) -> String {
        join_key(self.iter())
    }
}

impl<T: Display> CanonicalRow for [T] {
    fn canonical_key(&self) -> String {
        join_key(self.iter())
    }
}

impl<T: Display> CanonicalRow for Vec<T> {
    fn canonical_key(&self) -> String {
        join_key(self.iter())
    }
}

/// A single-column row, or a pre-joined key.
impl CanonicalRow for str {
    fn canonical_key(&self) -> String {
        self.to_string()
    }
}

impl CanonicalRow for String {
    fn canonical_key(&self) -> String {
        self.clone()
    }
}

impl<T: CanonicalRow + ?Sized> CanonicalRow for &T {
    fn canonical_key(&self) -> String {
        (**self).canonical_key()
    }
}

/// Human-readable form of a key for failure messages.
fn display_key(key: &str) -> String {
    key.replace(KEY_SEPARATOR, " | ")
}

/// The set of canonical keys of `rows`.
pub fn canonical_set<R: CanonicalRow>(rows: impl IntoIterator<Item = R>) -> BTreeSet<String> {
    rows.into_iter().map(|r| r.canonical_key()).collect()
}

fn canonical_counts<R: CanonicalRow>(rows: impl IntoIterator<Item = R>) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for row in rows {
        *counts.entry(row.canonical_key()).or_insert(0) += 1;
    }
    counts
}

/// Compare two row collections as sets, ignoring order and duplicates.
pub fn compare_ignore_order<E, A>(
    expected: impl IntoIterator<Item = E>,
    actual: impl IntoIterator<Item = A>,
) -> Result<(), RowSetMismatch>
where
    E: CanonicalRow,
    A: CanonicalRow,
{
    let expected = canonical_set(expected);
    let actual = canonical_set(actual);
    if expected == actual {
        return Ok(());
    }
    Err(RowSetMismatch {
        missing: expected.difference(&actual).map(|k| display_key(k)).collect(),
        unexpected: actual.difference(&expected).map(|k| display_key(k)).collect(),
    })
}

/// Check that every row of `subset` appears in `superset`.
pub fn compare_subset<S, T>(
    subset: impl IntoIterator<Item = S>,
    superset: impl IntoIterator<Item = T>,
) -> Result<(), RowSetMismatch>
where
    S: CanonicalRow,
    T: CanonicalRow,
{
    let subset = canonical_set(subset);
    let superset = canonical_set(superset);
    if subset.is_subset(&superset) {
        return Ok(());
    }
    Err(RowSetMismatch {
        missing: Vec::new(),
        unexpected: subset.difference(&superset).map(|k| display_key(k)).collect(),
    })
}

/// Compare two row collections ignoring order but counting duplicates.
pub fn compare_multiset<E, A>(
    expected: impl IntoIterator<Item = E>,
    actual: impl IntoIterator<Item = A>,
) -> Result<(), RowSetMismatch>
where
    E: CanonicalRow,
    A: CanonicalRow,
{
    let expected = canonical_counts(expected);
    let actual = canonical_counts(actual);
    if expected == actual {
        return Ok(());
    }

    let surplus = |from: &BTreeMap<String, usize>, other: &BTreeMap<String, usize>| {
        from.iter()
            .flat_map(|(key, &n)| {
                let extra = n.saturating_sub(other.get(key).copied().unwrap_or(0));
                std::iter::repeat(display_key(key)).take(extra)
            })
            .collect::<Vec<_>>()
    };
    Err(RowSetMismatch {
        missing: surplus(&expected, &actual),
        unexpected: surplus(&actual, &expected),
    })
}

/// Panic unless both collections hold the same set of rows.
#[track_caller]
pub fn assert_equal_ignore_order<E, A>(
    expected: impl IntoIterator<Item = E>,
    actual: impl IntoIterator<Item = A>,
) where
    E: CanonicalRow,
    A: CanonicalRow,
{
    if let Err(mismatch) = compare_ignore_order(expected, actual) {
        panic!("{}", mismatch);
    }
}

/// Panic unless every row of `subset` appears in `superset`.
#[track_caller]
pub fn assert_subset<S, T>(subset: impl IntoIterator<Item = S>, superset: impl IntoIterator<Item = T>)
where
    S: CanonicalRow,
    T: CanonicalRow,
{
    if let Err(mismatch) = compare_subset(subset, superset) {
        panic!("{}", mismatch);
    }
}

/// Panic unless both collections hold the same rows with the same multiplicity.
#[track_caller]
pub fn assert_same_rows<E, A>(
    expected: impl IntoIterator<Item = E>,
    actual: impl IntoIterator<Item = A>,
) where
    E: CanonicalRow,
    A: CanonicalRow,
{
    if let Err(mismatch) = compare_multiset(expected, actual) {
        panic!("{}", mismatch);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row;
    use crate::value::Value;

    #[test]
    fn test_equal_ignore_order() {
        assert_equal_ignore_order(&["1__a", "2__b"], &["2__b", "1__a"]);
    }

    #[test]
    fn test_subset() {
        assert_subset(&["1__a"], &["1__a", "2__b"]);
        assert!(compare_subset(&["3__c"], &["1__a", "2__b"]).is_err());
    }

    #[test]
    #[should_panic(expected = "row sets differ")]
    fn test_subset_failure_panics() {
        assert_subset(&["3__c"], &["1__a", "2__b"]);
    }

    #[test]
    fn test_mismatch_reports_both_sides() {
        let err = compare_ignore_order(&[row![1, "a"], row![2, "b"]], &[row![2, "b"], row![3, "c"]])
            .unwrap_err();
        assert_eq!(err.missing, vec!["1 | a"]);
        assert_eq!(err.unexpected, vec!["3 | c"]);
    }

    #[test]
    fn test_literal_and_typed_rows_share_keys() {
        let fixture = vec![Row::new(vec![
            Value::Literal("1".into()),
            Value::Literal("'x'".into()),
        ])];
        let fetched = vec![Row::new(vec![Value::Int(1), Value::Text("'x'".into())])];
        assert_equal_ignore_order(&fixture, &fetched);
    }

    #[test]
    fn test_separator_prevents_ambiguous_joins() {
        assert!(compare_ignore_order(&[vec!["a_", "_b"]], &[vec!["a", "__b"]]).is_err());
    }

    #[test]
    fn test_set_comparison_collapses_duplicates() {
        let once = vec![row![1, "x"]];
        let thrice = vec![row![1, "x"], row![1, "x"], row![1, "x"]];
        assert_equal_ignore_order(&once, &thrice);
        let err = compare_multiset(&once, &thrice).unwrap_err();
        assert!(err.missing.is_empty());
        assert_eq!(err.unexpected.len(), 2);
    }

    #[test]
    fn test_multiset_equal() {
        assert_same_rows(
            &[row![1, "x"], row![1, "x"], row![2, "y"]],
            &[row![2, "y"], row![1, "x"], row![1, "x"]],
        );
    }
}
