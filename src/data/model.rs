use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// CellValue – a single cell of a tabular dataset
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring what CSV / JSON / Parquet carry.
/// Using `BTreeMap` / `BTreeSet` downstream so `CellValue` must be `Ord`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Integer(i64),
    Float(f64),
    Bool(bool),
    String(String),
    /// ISO-8601 date string kept as text for simplicity.
    Date(String),
    Null,
}

// -- Manual Eq/Ord so we can put CellValue in BTreeSet --

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use CellValue::*;
        fn discriminant(v: &CellValue) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                String(_) => 4,
                Date(_) => 5,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (String(a), String(b)) | (Date(a), Date(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl std::hash::Hash for CellValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            CellValue::String(s) | CellValue::Date(s) => s.hash(state),
            CellValue::Integer(i) => i.hash(state),
            CellValue::Float(f) => f.to_bits().hash(state),
            CellValue::Bool(b) => b.hash(state),
            CellValue::Null => {}
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Date(d) => write!(f, "{d}"),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

impl CellValue {
    /// Numeric coercion used by every statistic.
    ///
    /// Integers and floats coerce when finite, strings when their trimmed
    /// text parses as a finite `f64`. Booleans, dates and nulls never do.
    pub fn as_f64(&self) -> Option<f64> {
        let v = match self {
            CellValue::Float(v) => *v,
            CellValue::Integer(i) => *i as f64,
            CellValue::String(s) => s.trim().parse::<f64>().ok()?,
            CellValue::Bool(_) | CellValue::Date(_) | CellValue::Null => return None,
        };
        v.is_finite().then_some(v)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Guess the type of a raw text cell (CSV and friends).
    pub fn parse_guess(s: &str) -> CellValue {
        if s.is_empty() {
            return CellValue::Null;
        }
        if let Ok(i) = s.parse::<i64>() {
            return CellValue::Integer(i);
        }
        if let Ok(f) = s.parse::<f64>() {
            return CellValue::Float(f);
        }
        if s == "true" || s == "false" {
            return CellValue::Bool(s == "true");
        }
        CellValue::String(s.to_string())
    }
}

impl From<i64> for CellValue {
    fn from(v: i64) -> Self {
        CellValue::Integer(v)
    }
}

impl From<f64> for CellValue {
    fn from(v: f64) -> Self {
        CellValue::Float(v)
    }
}

impl From<&str> for CellValue {
    fn from(v: &str) -> Self {
        CellValue::String(v.to_string())
    }
}

impl From<bool> for CellValue {
    fn from(v: bool) -> Self {
        CellValue::Bool(v)
    }
}

// ---------------------------------------------------------------------------
// Row – one record of the dataset
// ---------------------------------------------------------------------------

/// One record: column name → value. A missing key reads as `Null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row {
    pub cells: BTreeMap<String, CellValue>,
}

static NULL_CELL: CellValue = CellValue::Null;

impl Row {
    /// Cell for `column`, `Null` when the row has no such key.
    pub fn get(&self, column: &str) -> &CellValue {
        self.cells.get(column).unwrap_or(&NULL_CELL)
    }

    /// Coerced numeric value of `column`, if any.
    pub fn number(&self, column: &str) -> Option<f64> {
        self.get(column).as_f64()
    }

    pub fn insert(&mut self, column: impl Into<String>, value: CellValue) {
        self.cells.insert(column.into(), value);
    }
}

impl<K: Into<String>, V: Into<CellValue>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Row {
            cells: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full parsed dataset with pre-computed column indices.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    /// Human-readable name, usually the source file name.
    pub name: String,
    /// All rows, in source order.
    pub rows: Vec<Row>,
    /// Column names in source order.
    pub column_names: Vec<String>,
    /// For each column the sorted set of unique values.
    pub unique_values: BTreeMap<String, BTreeSet<CellValue>>,
}

impl Dataset {
    /// Build the column index from rows and an explicit column order.
    /// Columns that appear in rows but not in `column_names` are appended
    /// in first-seen order. A row without a key for a known column reads as
    /// `Null` there, so `Null` joins that column's unique values.
    pub fn new(name: impl Into<String>, column_names: Vec<String>, rows: Vec<Row>) -> Self {
        let mut column_names = column_names;
        let mut known: BTreeSet<String> = column_names.iter().cloned().collect();
        let mut unique_values: BTreeMap<String, BTreeSet<CellValue>> = BTreeMap::new();

        for row in &rows {
            for (col, val) in &row.cells {
                if known.insert(col.clone()) {
                    column_names.push(col.clone());
                }
                unique_values
                    .entry(col.clone())
                    .or_default()
                    .insert(val.clone());
            }
        }

        for col in &column_names {
            if rows.iter().any(|row| !row.cells.contains_key(col)) {
                unique_values
                    .entry(col.clone())
                    .or_default()
                    .insert(CellValue::Null);
            }
        }

        Dataset {
            name: name.into(),
            rows,
            column_names,
            unique_values,
        }
    }

    /// Build a dataset whose column order is discovered from the rows.
    pub fn from_rows(name: impl Into<String>, rows: Vec<Row>) -> Self {
        Self::new(name, Vec::new(), rows)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Columns usable for numeric analysis: at least one coercible cell and
    /// no non-null cell that fails coercion. Source order is kept.
    pub fn numeric_columns(&self) -> Vec<String> {
        self.column_names
            .iter()
            .filter(|col| {
                let mut seen_number = false;
                for row in &self.rows {
                    let cell = row.get(col);
                    if cell.is_null() {
                        continue;
                    }
                    if cell.as_f64().is_none() {
                        return false;
                    }
                    seen_number = true;
                }
                seen_number
            })
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coercion_accepts_finite_numbers_only() {
        assert_eq!(CellValue::Integer(3).as_f64(), Some(3.0));
        assert_eq!(CellValue::Float(2.5).as_f64(), Some(2.5));
        assert_eq!(CellValue::from(" 4.25 ").as_f64(), Some(4.25));
        assert_eq!(CellValue::Float(f64::NAN).as_f64(), None);
        assert_eq!(CellValue::Float(f64::INFINITY).as_f64(), None);
        assert_eq!(CellValue::from("inf").as_f64(), None);
        assert_eq!(CellValue::from("x").as_f64(), None);
        assert_eq!(CellValue::from("").as_f64(), None);
        assert_eq!(CellValue::Bool(true).as_f64(), None);
        assert_eq!(CellValue::Date("2024-01-01".into()).as_f64(), None);
        assert_eq!(CellValue::Null.as_f64(), None);
    }

    #[test]
    fn missing_key_reads_as_null() {
        let row: Row = [("a", 1i64)].into_iter().collect();
        assert_eq!(row.get("b"), &CellValue::Null);
        assert_eq!(row.number("a"), Some(1.0));
        assert_eq!(row.number("b"), None);
    }

    #[test]
    fn parse_guess_types() {
        assert_eq!(CellValue::parse_guess(""), CellValue::Null);
        assert_eq!(CellValue::parse_guess("12"), CellValue::Integer(12));
        assert_eq!(CellValue::parse_guess("1.5"), CellValue::Float(1.5));
        assert_eq!(CellValue::parse_guess("true"), CellValue::Bool(true));
        assert_eq!(CellValue::parse_guess("abc"), CellValue::from("abc"));
    }

    #[test]
    fn column_order_is_explicit_then_first_seen() {
        let rows = vec![
            [("b", 1i64), ("z", 2)].into_iter().collect::<Row>(),
            [("a", 3i64)].into_iter().collect::<Row>(),
        ];
        let ds = Dataset::new("t", vec!["b".into()], rows);
        // BTreeMap iteration inside a row is sorted, so "z" precedes "a"
        // only because it was seen in an earlier row.
        assert_eq!(ds.column_names, vec!["b", "z", "a"]);
    }

    #[test]
    fn missing_keys_are_indexed_as_null() {
        let rows = vec![
            [("b", 1i64), ("z", 2)].into_iter().collect::<Row>(),
            [("a", 3i64)].into_iter().collect::<Row>(),
        ];
        let ds = Dataset::from_rows("t", rows);
        assert_eq!(
            ds.unique_values["b"],
            BTreeSet::from([CellValue::Null, CellValue::Integer(1)])
        );
        assert_eq!(
            ds.unique_values["a"],
            BTreeSet::from([CellValue::Null, CellValue::Integer(3)])
        );

        // Explicit columns that no row carries are all-null.
        let ds = Dataset::new("t", vec!["x".into()], vec![Row::default()]);
        assert_eq!(ds.unique_values["x"], BTreeSet::from([CellValue::Null]));
    }

    #[test]
    fn numeric_columns_skip_text_and_empty() {
        let rows = vec![
            Row::from_iter([
                ("n", CellValue::Integer(1)),
                ("s", CellValue::from("x")),
                ("e", CellValue::Null),
            ]),
            Row::from_iter([
                ("n", CellValue::Null),
                ("s", CellValue::from("2")),
                ("e", CellValue::Null),
            ]),
        ];
        let ds = Dataset::new("t", vec!["n".into(), "s".into(), "e".into()], rows);
        assert_eq!(ds.numeric_columns(), vec!["n".to_string()]);
    }
}
