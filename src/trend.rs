use crate::aggregator::aggregate;
use crate::formula::{compute_kpis, safe_divide};
use crate::kpi::{KpiKey, KpiSet};
use crate::period_diff::diff;
use crate::schema::{AnalysisMode, RawBusinessRecord, TrendWindowEntry};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub period_id: String,
    pub period_label: String,
    pub ytd_kpis: KpiSet,
    pub pop_kpis: KpiSet,
}

impl TrendPoint {
    pub fn kpis_for(&self, mode: AnalysisMode) -> &KpiSet {
        match mode {
            AnalysisMode::Pop => &self.pop_kpis,
            AnalysisMode::Ytd | AnalysisMode::Comparison => &self.ytd_kpis,
        }
    }
}

/// Derives one trend point per window entry, keeping the window's order
/// (oldest first).
///
/// Entries where none of the selected lines has current-period rows are
/// dropped; selected rows that sum to zero are kept.
pub fn build_trend(window: &[TrendWindowEntry], selected_business_types: &[String]) -> Vec<TrendPoint> {
    let selection: BTreeSet<&str> = selected_business_types.iter().map(String::as_str).collect();
    let select = |records: &[RawBusinessRecord]| -> Vec<RawBusinessRecord> {
        records
            .iter()
            .filter(|r| selection.contains(r.business_type.as_str()))
            .cloned()
            .collect()
    };

    let points: Vec<TrendPoint> = window
        .iter()
        .filter_map(|entry| {
            let current = select(&entry.current);
            if current.is_empty() {
                return None;
            }
            let previous = select(&entry.previous);

            Some(TrendPoint {
                period_id: entry.period_id.clone(),
                period_label: entry.period_label.clone(),
                ytd_kpis: compute_kpis(&aggregate(&current)),
                pop_kpis: compute_kpis(&aggregate(&diff(&current, &previous))),
            })
        })
        .collect();

    debug!(
        "Built {} trend points from a window of {} periods",
        points.len(),
        window.len()
    );

    points
}

/// Cuts a trailing window ending at `end_period_id` out of a period-ordered
/// book.
///
/// `periods_desc` lists period ids newest first. Every emitted entry has a
/// predecessor for its PoP calculation, so up to `count + 1` periods are
/// consulted. Periods with no rows are skipped. The result is oldest first.
pub fn trend_window(
    periods_desc: &[String],
    rows_by_period: &BTreeMap<String, Vec<RawBusinessRecord>>,
    end_period_id: &str,
    count: usize,
) -> Vec<TrendWindowEntry> {
    let Some(start) = periods_desc.iter().position(|p| p == end_period_id) else {
        return Vec::new();
    };

    let span = &periods_desc[start..periods_desc.len().min(start + count + 1)];
    let mut entries: Vec<TrendWindowEntry> = span
        .windows(2)
        .filter_map(|pair| {
            let current = rows_by_period.get(&pair[0]).filter(|rows| !rows.is_empty())?;
            let previous = rows_by_period.get(&pair[1]).cloned().unwrap_or_default();
            Some(TrendWindowEntry {
                period_id: pair[0].clone(),
                period_label: current[0].period_label.clone(),
                current: current.clone(),
                previous,
            })
        })
        .collect();

    entries.reverse();
    entries
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContributionPoint {
    pub period_label: String,
    pub first_share: f64,
    pub second_share: f64,
}

/// Share (%) of each period's PoP movement in its cumulative value, for two
/// KPIs side by side.
pub fn contribution_series(trend: &[TrendPoint], first: KpiKey, second: KpiKey) -> Vec<ContributionPoint> {
    trend
        .iter()
        .map(|point| ContributionPoint {
            period_label: point.period_label.clone(),
            first_share: safe_divide(point.pop_kpis.get(first), point.ytd_kpis.get(first)) * 100.0,
            second_share: safe_divide(point.pop_kpis.get(second), point.ytd_kpis.get(second)) * 100.0,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(period: &str, business_type: &str, premium: f64) -> RawBusinessRecord {
        RawBusinessRecord {
            period_id: period.to_string(),
            period_label: format!("{} label", period),
            business_type: business_type.to_string(),
            premium_written: premium,
            premium_earned: premium * 0.9,
            total_loss_amount: premium * 0.6,
            expense_amount_raw: premium * 0.1,
            claim_count: premium / 20.0,
            avg_premium_per_policy: 1500.0,
            avg_commercial_index: 0.9,
        }
    }

    fn book(weeks: u32) -> (Vec<String>, BTreeMap<String, Vec<RawBusinessRecord>>) {
        let mut rows = BTreeMap::new();
        for week in 1..=weeks {
            let id = format!("2024-W{:02}", week);
            let scale = week as f64;
            rows.insert(
                id.clone(),
                vec![line(&id, "A", 100.0 * scale), line(&id, "B", 50.0 * scale)],
            );
        }
        let mut periods: Vec<String> = rows.keys().cloned().collect();
        periods.reverse();
        (periods, rows)
    }

    fn selection() -> Vec<String> {
        vec!["A".to_string(), "B".to_string()]
    }

    #[test]
    fn test_window_is_oldest_first_with_predecessors() {
        let (periods, rows) = book(20);
        let window = trend_window(&periods, &rows, "2024-W20", 15);

        assert_eq!(window.len(), 15);
        assert_eq!(window.first().unwrap().period_id, "2024-W06");
        assert_eq!(window.last().unwrap().period_id, "2024-W20");
        assert_eq!(window[0].previous[0].period_id, "2024-W05");
        assert_eq!(window[0].period_label, "2024-W06 label");
    }

    #[test]
    fn test_short_history_yields_fewer_points() {
        let (periods, rows) = book(10);
        let window = trend_window(&periods, &rows, "2024-W10", 15);
        // the oldest period has no predecessor
        assert_eq!(window.len(), 9);

        let trend = build_trend(&window, &selection());
        assert_eq!(trend.len(), 9);
        assert!(trend.len() < 15);
    }

    #[test]
    fn test_unknown_end_period_is_empty() {
        let (periods, rows) = book(5);
        assert!(trend_window(&periods, &rows, "2023-W52", 15).is_empty());
    }

    #[test]
    fn test_periods_without_rows_are_skipped() {
        let (mut periods, mut rows) = book(6);
        rows.insert("2024-W04".to_string(), Vec::new());
        periods.sort();
        periods.reverse();

        let window = trend_window(&periods, &rows, "2024-W06", 5);
        let ids: Vec<&str> = window.iter().map(|e| e.period_id.as_str()).collect();
        assert_eq!(ids, vec!["2024-W02", "2024-W03", "2024-W05", "2024-W06"]);
        // W05 still diffs against the (empty) W04
        assert!(window[2].previous.is_empty());
    }

    #[test]
    fn test_ytd_and_pop_kpis() {
        let (periods, rows) = book(3);
        let window = trend_window(&periods, &rows, "2024-W03", 2);
        let trend = build_trend(&window, &selection());

        assert_eq!(trend.len(), 2);
        let latest = &trend[1];
        assert_eq!(latest.period_id, "2024-W03");
        assert!((latest.ytd_kpis.premium_written - 450.0).abs() < 1e-9);
        assert!((latest.pop_kpis.premium_written - 150.0).abs() < 1e-9);
        assert!((latest.kpis_for(AnalysisMode::Pop).premium_written - 150.0).abs() < 1e-9);
        assert!((latest.kpis_for(AnalysisMode::Ytd).loss_ratio - 66.666_666_666).abs() < 1e-6);
    }

    #[test]
    fn test_zero_valued_points_are_kept() {
        let entry = TrendWindowEntry {
            period_id: "2024-W02".to_string(),
            period_label: "2024-W02".to_string(),
            current: vec![line("2024-W02", "A", 0.0)],
            previous: vec![],
        };
        let empty = TrendWindowEntry {
            period_id: "2024-W03".to_string(),
            period_label: "2024-W03".to_string(),
            current: vec![],
            previous: vec![line("2024-W02", "A", 0.0)],
        };

        let trend = build_trend(&[entry, empty], &selection());
        assert_eq!(trend.len(), 1);
        assert_eq!(trend[0].ytd_kpis.premium_written, 0.0);
    }

    #[test]
    fn test_periods_without_selected_lines_are_dropped() {
        let launch = TrendWindowEntry {
            period_id: "2024-W02".to_string(),
            period_label: "2024-W02".to_string(),
            current: vec![line("2024-W02", "A", 100.0)],
            previous: vec![line("2024-W01", "A", 50.0)],
        };
        let later = TrendWindowEntry {
            period_id: "2024-W03".to_string(),
            period_label: "2024-W03".to_string(),
            current: vec![line("2024-W03", "A", 150.0), line("2024-W03", "B", 40.0)],
            previous: vec![line("2024-W02", "A", 100.0)],
        };

        let trend = build_trend(&[launch, later], &["B".to_string()]);
        let ids: Vec<&str> = trend.iter().map(|p| p.period_id.as_str()).collect();
        assert_eq!(ids, vec!["2024-W03"]);
        assert!((trend[0].ytd_kpis.premium_written - 40.0).abs() < 1e-9);
        // B is new in W03, so its movement is the whole amount
        assert!((trend[0].pop_kpis.premium_written - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_selection_filters_trend() {
        let (periods, rows) = book(3);
        let window = trend_window(&periods, &rows, "2024-W03", 2);
        let trend = build_trend(&window, &["B".to_string()]);
        assert!((trend[1].ytd_kpis.premium_written - 150.0).abs() < 1e-9);
        // single line keeps its coefficient through aggregation
        assert_eq!(trend[1].ytd_kpis.avg_commercial_index, 0.9);
    }

    #[test]
    fn test_contribution_series() {
        let (periods, rows) = book(4);
        let window = trend_window(&periods, &rows, "2024-W04", 3);
        let trend = build_trend(&window, &selection());
        let series = contribution_series(&trend, KpiKey::PremiumWritten, KpiKey::LossRatio);

        assert_eq!(series.len(), 3);
        // W04: pop 150 of ytd 600
        assert!((series[2].first_share - 25.0).abs() < 1e-9);
        // loss ratio is the same in both views
        assert!((series[2].second_share - 100.0).abs() < 1e-9);
    }
}
