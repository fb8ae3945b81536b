//! Integration tests for the comparison engine
//!
//! Tests are organized by topic:
//! - `properties` - Order independence, label-swap symmetry, tie handling
//! - `assembly` - Report assembly, metric selection and error propagation
//! - `serialization` - JSON round-trips of the report
//! - `caching` - Analyzer cache reuse

mod serialization;

use crate::model::{CellValue, Dataset, Row};

pub(crate) const ASSIGNMENT: &str = "variant";

/// Build a row with an assignment label and numeric metric values
pub(crate) fn row(label: &str, metrics: &[(&str, f64)]) -> Row {
    let mut row = Row::new();
    row.insert(ASSIGNMENT.to_string(), CellValue::from(label));
    for (name, value) in metrics {
        row.insert((*name).to_string(), CellValue::Number(*value));
    }
    row
}

/// 100 control rows with `score` cycling 0..=9 and 100 "Treatment" rows
/// with the same values shifted by one. `visits` is identical in both arms.
pub(crate) fn shifted_dataset() -> Dataset {
    let control = (0..100).map(|i| {
        let v = f64::from(i % 10);
        row("Control", &[("score", v), ("visits", v)])
    });
    let variant = (0..100).map(|i| {
        let v = f64::from(i % 10);
        row("Treatment", &[("score", v + 1.0), ("visits", v)])
    });
    control.chain(variant).collect()
}
