use crate::format::format_kpi_value;
use crate::formula::safe_divide;
use crate::kpi::{KpiKey, KpiUnit, Polarity};
use serde::Serialize;

const ZERO_CHANGE_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ComparisonResult {
    pub diff: f64,
    /// `+Infinity` when there is no usable baseline.
    pub percentage_change: f64,
    pub is_better: bool,
    pub is_zero: bool,
    pub is_new: bool,
    pub unit: KpiUnit,
}

fn is_missing(value: f64) -> bool {
    value == 0.0 || value.is_nan()
}

/// Compares a KPI's current value against its previous value.
///
/// Non-finite numbers stand in for absent values. A zero or absent baseline
/// makes the change infinite; whether that counts as better depends only on
/// the KPI's polarity.
pub fn compare(key: KpiKey, current: f64, previous: f64) -> ComparisonResult {
    let definition = key.definition();
    let higher_is_better = definition.polarity == Polarity::HigherIsBetter;

    if is_missing(previous) || !previous.is_finite() {
        let is_new = is_missing(previous) && !is_missing(current) && previous != current;
        return ComparisonResult {
            diff: current,
            percentage_change: f64::INFINITY,
            is_better: higher_is_better,
            is_zero: current == 0.0,
            is_new,
            unit: definition.unit,
        };
    }

    let diff = current - previous;
    let is_better = (diff > 0.0 && higher_is_better) || (diff < 0.0 && !higher_is_better);

    ComparisonResult {
        diff,
        percentage_change: safe_divide(diff, previous.abs()) * 100.0,
        is_better,
        is_zero: diff.abs() < ZERO_CHANGE_TOLERANCE,
        is_new: false,
        unit: definition.unit,
    }
}

fn signed(value: f64) -> &'static str {
    if value > 0.0 {
        "+"
    } else {
        ""
    }
}

/// Short change text for cards and reports, e.g. `+1.2p.p.(+3.4%)`.
pub fn describe_change(result: &ComparisonResult) -> String {
    if result.is_zero {
        return "无变化".to_string();
    }
    if result.is_new {
        return "新增".to_string();
    }

    let pct = if result.percentage_change.is_finite() {
        format!("{}{:.1}%", signed(result.percentage_change), result.percentage_change)
    } else {
        "∞".to_string()
    };

    if result.unit.is_percentage() {
        format!("{}{:.1}p.p.({})", signed(result.diff), result.diff, pct)
    } else {
        format!(
            "{}{}({})",
            signed(result.diff),
            format_kpi_value(result.diff, result.unit, false),
            pct
        )
    }
}
