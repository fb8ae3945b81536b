//! JSON round-trips of the analysis report

use crate::config::AnalysisConfig;
use crate::model::{AnalysisReport, Dataset, MetricOutcome, PercentLift};
use crate::report::{AnalysisRequest, assemble};
use crate::tests::{ASSIGNMENT, row, shifted_dataset};

#[test]
fn test_report_round_trip() {
    let dataset = shifted_dataset();
    let request = AnalysisRequest::new(ASSIGNMENT, "score")
        .with_secondary(["visits", "absent"])
        .with_test_name("round-trip");
    let report = assemble(&dataset, &request, &AnalysisConfig::default()).unwrap();

    let json = serde_json::to_string_pretty(&report).unwrap();
    let back: AnalysisReport = serde_json::from_str(&json).unwrap();

    assert_eq!(back, report);
}

#[test]
fn test_infinite_lift_round_trip() {
    let dataset: Dataset = vec![
        row("Control", &[("score", 0.0)]),
        row("Control", &[("score", 0.0)]),
        row("B", &[("score", 2.0)]),
    ]
    .into_iter()
    .collect();
    let report = assemble(
        &dataset,
        &AnalysisRequest::new(ASSIGNMENT, "score"),
        &AnalysisConfig::default(),
    )
    .unwrap();

    let value = serde_json::to_value(&report).unwrap();
    assert_eq!(value["primary"]["outcome"]["percent_lift"], "Infinity");
    assert_eq!(value["primary"]["outcome"]["status"], "computed");

    let back: AnalysisReport = serde_json::from_value(value).unwrap();
    let result = back.primary.outcome.result().unwrap();
    assert_eq!(result.percent_lift, PercentLift(f64::INFINITY));
    assert_eq!(back, report);
}

#[test]
fn test_values_are_rounded_at_the_boundary() {
    let dataset: Dataset = vec![
        row("Control", &[("score", 1.0)]),
        row("Control", &[("score", 1.0)]),
        row("Control", &[("score", 2.0)]),
        row("B", &[("score", 2.0)]),
        row("B", &[("score", 2.0)]),
        row("B", &[("score", 3.0)]),
    ]
    .into_iter()
    .collect();
    let report = assemble(
        &dataset,
        &AnalysisRequest::new(ASSIGNMENT, "score"),
        &AnalysisConfig::default(),
    )
    .unwrap();

    let MetricOutcome::Computed(result) = &report.primary.outcome else {
        panic!("expected a computed result");
    };
    // 4/3 and 7/3
    assert_eq!(result.control_mean, 1.33);
    assert_eq!(result.variant_mean, 2.33);
    assert_eq!(result.percent_lift, PercentLift(75.0));
    assert_eq!(result.p_value, 0.1266);
}

#[test]
fn test_huge_values_round_trip() {
    let dataset: Dataset = vec![
        row("Control", &[("score", 1e307)]),
        row("Control", &[("score", 1e307)]),
        row("B", &[("score", 1.0)]),
    ]
    .into_iter()
    .collect();
    let report = assemble(
        &dataset,
        &AnalysisRequest::new(ASSIGNMENT, "score"),
        &AnalysisConfig::default(),
    )
    .unwrap();

    let result = report.primary.outcome.result().unwrap();
    assert_eq!(result.control_mean, 1e307);
    assert!(result.control_std.is_finite());
    assert_eq!(result.percent_lift, PercentLift(-100.0));

    let json = serde_json::to_string(&report).unwrap();
    assert!(!json.contains("null"));
    let back: AnalysisReport = serde_json::from_str(&json).unwrap();
    assert_eq!(back, report);
}
