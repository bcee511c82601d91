//! # Insurance KPI Dashboard
//!
//! A library for turning raw per-period auto-insurance business line records
//! into the KPIs, period comparisons and trends behind an operations dashboard.
//!
//! ## Core Concepts
//!
//! - **Raw records**: one row per business line per reporting period, with
//!   cumulative (year-to-date) premium, loss, expense and claim figures
//! - **KPIs**: seventeen ratios and amounts derived from a record, the same
//!   formulas whatever the analysis mode
//! - **Analysis modes**: `ytd` compares cumulative figures with the previous
//!   period, `pop` compares the movement of two consecutive periods, and
//!   `comparison` compares cumulative figures with a chosen period
//! - **Trend**: the trailing periods ending at the current one, each with its
//!   cumulative and period-on-period KPIs
//!
//! ## Example
//!
//! ```rust,ignore
//! use insurance_kpi_dashboard::*;
//! use chrono::NaiveDate;
//!
//! let rows = generate_sample_book(&SampleBookConfig::new(
//!     NaiveDate::from_ymd_opt(2024, 6, 26).unwrap(),
//!     20,
//! ))?;
//! let service = DashboardService::new(InMemoryStore::from_records(rows)?);
//!
//! let view = service.load(&DashboardRequest {
//!     mode: AnalysisMode::Pop,
//!     ..DashboardRequest::default()
//! })?;
//!
//! for comparison in KpiDashboard::summary_comparisons(&view.snapshot) {
//!     println!("{}: {}", comparison.key, describe_change(&comparison.result));
//! }
//! ```

pub mod aggregator;
pub mod comparison;
pub mod engine;
pub mod error;
pub mod format;
pub mod formula;
pub mod ingestion;
pub mod kpi;
pub mod period_diff;
pub mod ranking;
pub mod report;
pub mod risk;
pub mod sample;
pub mod schema;
pub mod service;
pub mod store;
pub mod trend;
pub mod utils;

pub use aggregator::{aggregate, total_premium_written};
pub use comparison::{compare, describe_change, ComparisonResult};
pub use engine::{
    process_dashboard, DashboardInput, DashboardProcessor, DashboardSnapshot, DashboardSummary,
    ProcessedBusinessLine,
};
pub use error::{DashboardError, Result};
pub use format::{format_kpi_value, group_number, FormatStrategy, ShortScale};
pub use formula::{compute_kpis, safe_divide};
pub use ingestion::{group_by_period, rows_from_csv, rows_from_json, PeriodBook};
pub use kpi::*;
pub use period_diff::diff;
pub use ranking::{pareto, rank_by, sort_lines, ParetoEntry, SortColumn, SortDirection};
pub use report::{business_line_table, generate_analysis_brief, kpi_summary_table, ReportContext};
pub use risk::{vcr_color, RiskBand};
pub use sample::{generate_sample_book, sample_business_lines, SampleBookConfig};
pub use schema::*;
pub use service::{DashboardService, DashboardView};
pub use store::{BusinessDataSource, InMemoryStore};
pub use trend::{build_trend, contribution_series, trend_window, ContributionPoint, TrendPoint};
pub use utils::*;

use log::{debug, info};
use serde::Serialize;
use std::collections::HashSet;

/// One KPI card: the summary value on both sides and how it moved.
#[derive(Debug, Clone, Serialize)]
pub struct KpiComparison {
    pub key: KpiKey,
    pub current: f64,
    pub previous: f64,
    pub result: ComparisonResult,
}

pub struct KpiDashboard;

impl KpiDashboard {
    /// Derives the snapshot for already fetched period data.
    pub fn process(input: &DashboardInput) -> DashboardSnapshot {
        info!(
            "Processing dashboard in {} mode for {} business lines",
            input.mode,
            input.selected_business_types.len()
        );
        debug!(
            "Input holds {} current, {} compare, {} previous and {} earlier rows",
            input.current_period.len(),
            input.compare_period.len(),
            input.previous_period.len(),
            input.period_before_previous.len()
        );

        process_dashboard(input)
    }

    /// Like [`KpiDashboard::process`], but rejects input periods that carry
    /// the same business line twice.
    pub fn process_checked(input: &DashboardInput) -> Result<DashboardSnapshot> {
        for rows in [
            &input.current_period,
            &input.compare_period,
            &input.previous_period,
            &input.period_before_previous,
        ] {
            validate_unique_lines(rows)?;
        }
        Ok(Self::process(input))
    }

    /// Summary comparisons in KPI grid order.
    pub fn summary_comparisons(snapshot: &DashboardSnapshot) -> Vec<KpiComparison> {
        let current = &snapshot.summary.current.kpis;
        let previous = &snapshot.summary.compare.kpis;

        KPI_GRID_LAYOUT
            .iter()
            .map(|&key| KpiComparison {
                key,
                current: current.get(key),
                previous: previous.get(key),
                result: compare(key, current.get(key), previous.get(key)),
            })
            .collect()
    }
}

pub fn process(input: &DashboardInput) -> DashboardSnapshot {
    KpiDashboard::process(input)
}

fn validate_unique_lines(rows: &[RawBusinessRecord]) -> Result<()> {
    let mut seen = HashSet::new();
    for row in rows {
        if !seen.insert(row.business_type.as_str()) {
            return Err(DashboardError::DuplicateBusinessLine {
                period_id: row.period_id.clone(),
                business_type: row.business_type.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(period: &str, business_type: &str, premium: f64, loss: f64) -> RawBusinessRecord {
        RawBusinessRecord {
            premium_written: premium,
            premium_earned: premium,
            total_loss_amount: loss,
            expense_amount_raw: premium * 0.1,
            claim_count: 10.0,
            avg_premium_per_policy: 1000.0,
            ..RawBusinessRecord::zeroed(period, period, business_type)
        }
    }

    fn input() -> DashboardInput {
        DashboardInput {
            current_period: vec![record("W2", "A", 200.0, 120.0), record("W2", "B", 200.0, 100.0)],
            previous_period: vec![record("W1", "A", 100.0, 50.0), record("W1", "B", 100.0, 50.0)],
            selected_business_types: vec!["A".to_string(), "B".to_string()],
            ..DashboardInput::default()
        }
    }

    #[test]
    fn test_end_to_end_processing() {
        let snapshot = process(&input());
        assert_eq!(snapshot.by_business_type.len(), 2);
        assert!((snapshot.summary.current.kpis.premium_written - 400.0).abs() < 1e-9);
        assert!((snapshot.summary.current.kpis.loss_ratio - 55.0).abs() < 1e-9);
        assert!((snapshot.summary.compare.kpis.loss_ratio - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_summary_comparisons_follow_grid() {
        let snapshot = process(&input());
        let comparisons = KpiDashboard::summary_comparisons(&snapshot);
        assert_eq!(comparisons.len(), KPI_GRID_LAYOUT.len());
        assert_eq!(comparisons[0].key, KPI_GRID_LAYOUT[0]);

        let loss_ratio = comparisons
            .iter()
            .find(|c| c.key == KpiKey::LossRatio)
            .unwrap();
        assert!((loss_ratio.result.diff - 5.0).abs() < 1e-9);
        assert!(!loss_ratio.result.is_better);

        let premium = comparisons
            .iter()
            .find(|c| c.key == KpiKey::PremiumWritten)
            .unwrap();
        assert!((premium.result.percentage_change - 100.0).abs() < 1e-9);
        assert!(premium.result.is_better);
    }

    #[test]
    fn test_process_checked_rejects_duplicates() {
        assert!(KpiDashboard::process_checked(&input()).is_ok());

        let mut duplicated = input();
        duplicated.previous_period.push(record("W1", "A", 1.0, 1.0));
        match KpiDashboard::process_checked(&duplicated) {
            Err(DashboardError::DuplicateBusinessLine { period_id, business_type }) => {
                assert_eq!(period_id, "W1");
                assert_eq!(business_type, "A");
            }
            other => panic!("expected duplicate error, got {:?}", other),
        }
    }
}
