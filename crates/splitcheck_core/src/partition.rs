//! Binary control/variant partition of rows
//!
//! A single label split is used both to build per-metric value groups and to
//! count group sizes for the SRM check. Every non-control label falls into
//! one variant group.

use crate::model::Row;

/// Rows split into control and variant buckets by their assignment label
#[derive(Debug, Clone, PartialEq)]
pub struct LabelSplit<T> {
    pub control: Vec<T>,
    pub variant: Vec<T>,
    /// Rows with no assignment value
    pub unassigned: usize,
    /// Assigned rows the extractor rejected
    pub rejected: usize,
    /// Distinct non-control labels in first-seen order
    pub variant_labels: Vec<String>,
}

impl<T> LabelSplit<T> {
    fn empty() -> Self {
        Self {
            control: Vec::new(),
            variant: Vec::new(),
            unassigned: 0,
            rejected: 0,
            variant_labels: Vec::new(),
        }
    }

    /// First non-control label observed, if any
    #[must_use]
    pub fn first_variant_label(&self) -> Option<&str> {
        self.variant_labels.first().map(String::as_str)
    }
}

/// Split `rows` on the value of `assignment_column`.
///
/// Rows whose label equals `control_label` exactly go to control, any other
/// present label goes to variant. `extract` maps an assigned row to the item
/// stored in its bucket; rows it returns `None` for are counted as rejected.
pub fn split_by_label<T, F>(
    rows: &[Row],
    assignment_column: &str,
    control_label: &str,
    mut extract: F,
) -> LabelSplit<T>
where
    F: FnMut(&Row) -> Option<T>,
{
    let mut split = LabelSplit::empty();

    for row in rows {
        let Some(label) = row.get(assignment_column).and_then(|cell| cell.as_label()) else {
            split.unassigned += 1;
            continue;
        };
        let is_control = label == control_label;
        if !is_control && !split.variant_labels.iter().any(|l| *l == label) {
            split.variant_labels.push(label.into_owned());
        }

        match extract(row) {
            Some(item) if is_control => split.control.push(item),
            Some(item) => split.variant.push(item),
            None => split.rejected += 1,
        }
    }

    split
}

/// One metric's values, grouped
#[derive(Debug, Clone, PartialEq)]
pub struct GroupPartition {
    pub control: Vec<f64>,
    pub variant: Vec<f64>,
    /// Assigned rows dropped because the metric value was missing or not numeric
    pub excluded_rows: usize,
}

/// Build the control and variant value groups for one metric.
///
/// A row contributes only when both its assignment label and its metric value
/// are present; values that do not convert to a finite number are dropped.
#[must_use]
pub fn partition(
    rows: &[Row],
    assignment_column: &str,
    metric_column: &str,
    control_label: &str,
) -> GroupPartition {
    let split = split_by_label(rows, assignment_column, control_label, |row| {
        row.get(metric_column).and_then(|cell| cell.as_number())
    });
    GroupPartition {
        control: split.control,
        variant: split.variant,
        excluded_rows: split.rejected,
    }
}

/// Group sizes over the assignment column alone
#[derive(Debug, Clone, PartialEq)]
pub struct GroupCounts {
    pub control: usize,
    pub variant: usize,
    pub unassigned: usize,
    pub variant_labels: Vec<String>,
}

impl GroupCounts {
    #[must_use]
    pub fn total(&self) -> usize {
        self.control + self.variant
    }
}

/// Count assigned rows per side, independent of any metric
#[must_use]
pub fn count_groups(rows: &[Row], assignment_column: &str, control_label: &str) -> GroupCounts {
    let split = split_by_label(rows, assignment_column, control_label, |_| Some(()));
    GroupCounts {
        control: split.control.len(),
        variant: split.variant.len(),
        unassigned: split.unassigned,
        variant_labels: split.variant_labels,
    }
}
