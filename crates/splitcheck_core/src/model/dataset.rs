//! Decoded experiment-log rows
//!
//! Rows arrive already parsed from the upstream collaborator (CSV decoding is
//! not done here). Each cell keeps the scalar as it was encoded; conversion to
//! a group label or a metric value happens lazily at the point of use.

use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};
use std::hash::{Hash, Hasher};

use rustc_hash::FxHasher;
use serde::{Deserialize, Serialize};

/// A single scalar cell as decoded from the source file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl CellValue {
    /// Text used for exact group-label matching.
    ///
    /// Null and blank text are treated as absent.
    #[must_use]
    pub fn as_label(&self) -> Option<Cow<'_, str>> {
        match self {
            CellValue::Null => None,
            CellValue::Bool(b) => Some(Cow::Owned(b.to_string())),
            CellValue::Number(n) => Some(Cow::Owned(n.to_string())),
            CellValue::Text(s) if s.trim().is_empty() => None,
            CellValue::Text(s) => Some(Cow::Borrowed(s.as_str())),
        }
    }

    /// Finite numeric value of the cell, if it has one.
    ///
    /// Unparseable text, NaN and infinities yield `None`; they are never
    /// coerced to zero.
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        let value = match self {
            CellValue::Null => return None,
            CellValue::Bool(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            CellValue::Number(n) => *n,
            CellValue::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return None;
                }
                trimmed.parse::<f64>().ok()?
            }
        };
        value.is_finite().then_some(value)
    }

    /// Whether the cell holds anything at all (not null, not blank text)
    #[must_use]
    pub fn is_present(&self) -> bool {
        match self {
            CellValue::Null => false,
            CellValue::Text(s) => !s.trim().is_empty(),
            _ => true,
        }
    }

    fn hash_into(&self, state: &mut FxHasher) {
        match self {
            CellValue::Null => 0u8.hash(state),
            CellValue::Bool(b) => {
                1u8.hash(state);
                b.hash(state);
            }
            CellValue::Number(n) => {
                2u8.hash(state);
                n.to_bits().hash(state);
            }
            CellValue::Text(s) => {
                3u8.hash(state);
                s.hash(state);
            }
        }
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

/// One decoded row: column name -> cell
pub type Row = BTreeMap<String, CellValue>;

/// The full set of rows for one experiment
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dataset {
    rows: Vec<Row>,
}

impl Dataset {
    #[must_use]
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Union of all column names seen in any row
    #[must_use]
    pub fn columns(&self) -> BTreeSet<&str> {
        self.rows
            .iter()
            .flat_map(|row| row.keys().map(String::as_str))
            .collect()
    }

    /// Columns usable as metrics: every present value converts to a finite
    /// number and at least one value is present.
    #[must_use]
    pub fn numeric_columns(&self) -> Vec<String> {
        self.columns()
            .into_iter()
            .filter(|column| {
                let mut seen = false;
                for cell in self.rows.iter().filter_map(|row| row.get(*column)) {
                    if !cell.is_present() {
                        continue;
                    }
                    if cell.as_number().is_none() {
                        return false;
                    }
                    seen = true;
                }
                seen
            })
            .map(str::to_string)
            .collect()
    }

    /// Stable content hash, used as the dataset part of cache keys.
    ///
    /// Rows are hashed in order; columns within a row in sorted order.
    #[must_use]
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = FxHasher::default();
        self.rows.len().hash(&mut hasher);
        for row in &self.rows {
            row.len().hash(&mut hasher);
            for (column, cell) in row {
                column.hash(&mut hasher);
                cell.hash_into(&mut hasher);
            }
        }
        hasher.finish()
    }
}

impl From<Vec<Row>> for Dataset {
    fn from(rows: Vec<Row>) -> Self {
        Self::new(rows)
    }
}

impl FromIterator<Row> for Dataset {
    fn from_iter<I: IntoIterator<Item = Row>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
