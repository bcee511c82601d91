use crate::engine::ProcessedBusinessLine;
use crate::kpi::KpiKey;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "column", content = "key")]
pub enum SortColumn {
    BusinessType,
    Kpi(KpiKey),
}

fn compare_f64(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

/// Sorts table rows in place. Ties keep their original order.
pub fn sort_lines(lines: &mut [ProcessedBusinessLine], column: SortColumn, direction: SortDirection) {
    lines.sort_by(|a, b| {
        let ordering = match column {
            SortColumn::BusinessType => a.record.business_type.cmp(&b.record.business_type),
            SortColumn::Kpi(key) => compare_f64(a.kpis.get(key), b.kpis.get(key)),
        };
        match direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    });
}

/// Lines ordered from the highest to the lowest value of `key`.
pub fn rank_by(lines: &[ProcessedBusinessLine], key: KpiKey) -> Vec<&ProcessedBusinessLine> {
    let mut ranked: Vec<&ProcessedBusinessLine> = lines.iter().collect();
    ranked.sort_by(|a, b| compare_f64(b.kpis.get(key), a.kpis.get(key)));
    ranked
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParetoEntry {
    pub business_type: String,
    pub value: f64,
    /// Running share of the total, in percent.
    pub cumulative_percentage: f64,
    pub variable_cost_ratio: f64,
}

pub fn pareto(lines: &[ProcessedBusinessLine], key: KpiKey) -> Vec<ParetoEntry> {
    let ranked = rank_by(lines, key);
    let total: f64 = ranked.iter().map(|l| l.kpis.get(key)).sum();

    let mut cumulative = 0.0;
    ranked
        .into_iter()
        .map(|line| {
            let value = line.kpis.get(key);
            cumulative += value;
            ParetoEntry {
                business_type: line.record.business_type.clone(),
                value,
                cumulative_percentage: if total > 0.0 { cumulative / total * 100.0 } else { 0.0 },
                variable_cost_ratio: line.kpis.variable_cost_ratio,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formula::compute_kpis;
    use crate::schema::RawBusinessRecord;

    fn processed(business_type: &str, premium: f64, loss: f64) -> ProcessedBusinessLine {
        let record = RawBusinessRecord {
            premium_written: premium,
            premium_earned: premium,
            total_loss_amount: loss,
            ..RawBusinessRecord::zeroed("W1", "W1", business_type)
        };
        let kpis = compute_kpis(&record);
        ProcessedBusinessLine { record, kpis }
    }

    fn lines() -> Vec<ProcessedBusinessLine> {
        vec![
            processed("B", 200.0, 180.0),
            processed("A", 500.0, 250.0),
            processed("C", 300.0, 60.0),
        ]
    }

    #[test]
    fn test_rank_by_descending() {
        let lines = lines();
        let ranked: Vec<&str> = rank_by(&lines, KpiKey::PremiumWritten)
            .iter()
            .map(|l| l.record.business_type.as_str())
            .collect();
        assert_eq!(ranked, vec!["A", "C", "B"]);
    }

    #[test]
    fn test_pareto_cumulative() {
        let entries = pareto(&lines(), KpiKey::PremiumWritten);
        assert_eq!(entries.len(), 3);
        assert!((entries[0].cumulative_percentage - 50.0).abs() < 1e-9);
        assert!((entries[1].cumulative_percentage - 80.0).abs() < 1e-9);
        assert!((entries[2].cumulative_percentage - 100.0).abs() < 1e-9);
        assert!((entries[2].variable_cost_ratio - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_pareto_zero_total() {
        let lines = vec![processed("A", 0.0, 0.0), processed("B", 0.0, 0.0)];
        let entries = pareto(&lines, KpiKey::PremiumWritten);
        assert!(entries.iter().all(|e| e.cumulative_percentage == 0.0));
    }

    #[test]
    fn test_sort_lines() {
        let mut lines = lines();
        sort_lines(&mut lines, SortColumn::BusinessType, SortDirection::Ascending);
        let names: Vec<&str> = lines.iter().map(|l| l.record.business_type.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);

        sort_lines(&mut lines, SortColumn::Kpi(KpiKey::LossRatio), SortDirection::Descending);
        let names: Vec<&str> = lines.iter().map(|l| l.record.business_type.as_str()).collect();
        assert_eq!(names, vec!["B", "A", "C"]);
    }
}
