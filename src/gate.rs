//! Threshold policy applied to a finished quality report.
//!
//! Rules are evaluated in slice order and each breach contributes one
//! human-readable failure line, so callers get a stable, itemized verdict
//! rather than a first-failure abort.

use crate::quality::{QualityReport, format_percent};

/// Report metric a gate threshold applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Metric {
    CancelledRate,
    MissingRate(String),
}

impl Metric {
    fn label(&self) -> String {
        match self {
            Metric::CancelledRate => "Cancelled rate".to_string(),
            Metric::MissingRate(column) => format!("Missing {column}"),
        }
    }

    /// Current value in the report. `None` when the report does not track
    /// the metric, in which case the rule is skipped rather than failed.
    fn value(&self, report: &QualityReport) -> Option<f64> {
        match self {
            Metric::CancelledRate => Some(report.cancelled_rate),
            Metric::MissingRate(column) => report.missing_rate(column),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GateRule {
    pub metric: Metric,
    pub threshold: f64,
}

impl GateRule {
    pub fn new(metric: Metric, threshold: f64) -> Self {
        Self { metric, threshold }
    }
}

/// Runs every rule against the report. A metric strictly above its
/// threshold fails; equal-to passes. Non-empty output means the gate failed.
pub fn evaluate(report: &QualityReport, rules: &[GateRule]) -> Vec<String> {
    let mut failures = Vec::new();
    for rule in rules {
        let Some(value) = rule.metric.value(report) else {
            continue;
        };
        if value > rule.threshold {
            failures.push(format!(
                "{} {} > threshold {}",
                rule.metric.label(),
                format_percent(value),
                format_percent(rule.threshold)
            ));
        }
    }
    failures
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quality::ColumnRate;

    fn report(cancelled_rate: f64, missing_actual_dep: Option<f64>) -> QualityReport {
        QualityReport {
            rows: 10,
            cancelled_rate,
            missing_rates: missing_actual_dep
                .map(|rate| {
                    vec![ColumnRate {
                        column: "actual_dep".to_string(),
                        rate,
                    }]
                })
                .unwrap_or_default(),
            top_airlines: Vec::new(),
            top_routes: Vec::new(),
        }
    }

    #[test]
    fn cancelled_rate_above_threshold_fails_with_one_message() {
        let rules = [GateRule::new(Metric::CancelledRate, 0.3)];
        let failures = evaluate(&report(0.5, None), &rules);
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0], "Cancelled rate 50.00% > threshold 30.00%");
    }

    #[test]
    fn cancelled_rate_below_threshold_passes() {
        let rules = [GateRule::new(Metric::CancelledRate, 0.6)];
        assert!(evaluate(&report(0.5, None), &rules).is_empty());
    }

    #[test]
    fn equal_to_threshold_passes() {
        let rules = [GateRule::new(Metric::CancelledRate, 0.5)];
        assert!(evaluate(&report(0.5, None), &rules).is_empty());
    }

    #[test]
    fn failures_follow_rule_declaration_order() {
        let rules = [
            GateRule::new(Metric::CancelledRate, 0.3),
            GateRule::new(Metric::MissingRate("actual_dep".to_string()), 0.1),
        ];
        let failures = evaluate(&report(0.5, Some(0.2)), &rules);
        assert_eq!(failures.len(), 2);
        assert!(failures[0].starts_with("Cancelled rate"));
        assert!(failures[1].starts_with("Missing actual_dep"));
    }

    #[test]
    fn untracked_metric_is_skipped() {
        let rules = [GateRule::new(Metric::MissingRate("actual_dep".to_string()), 0.0)];
        assert!(evaluate(&report(1.0, None), &rules).is_empty());
    }
}
