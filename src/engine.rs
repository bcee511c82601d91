use crate::aggregator::{aggregate, total_premium_written};
use crate::formula::{compute_kpis, safe_divide};
use crate::kpi::KpiSet;
use crate::period_diff::diff;
use crate::schema::{AnalysisMode, RawBusinessRecord};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A raw record together with its derived KPIs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedBusinessLine {
    #[serde(flatten)]
    pub record: RawBusinessRecord,
    pub kpis: KpiSet,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub current: ProcessedBusinessLine,
    pub compare: ProcessedBusinessLine,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    pub by_business_type: Vec<ProcessedBusinessLine>,
    pub summary: DashboardSummary,
}

/// Everything the processor needs, already fetched.
///
/// `previous_period` is the period immediately before `current_period` in
/// period order and `period_before_previous` the one before that; they are
/// unrelated to the user's `compare_period`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardInput {
    pub current_period: Vec<RawBusinessRecord>,
    pub compare_period: Vec<RawBusinessRecord>,
    pub previous_period: Vec<RawBusinessRecord>,
    pub period_before_previous: Vec<RawBusinessRecord>,
    pub selected_business_types: Vec<String>,
    pub mode: AnalysisMode,
}

pub struct DashboardProcessor<'a> {
    input: &'a DashboardInput,
    selection: BTreeSet<&'a str>,
}

impl<'a> DashboardProcessor<'a> {
    pub fn new(input: &'a DashboardInput) -> Self {
        let selection = input
            .selected_business_types
            .iter()
            .map(String::as_str)
            .collect();
        Self { input, selection }
    }

    pub fn process(&self) -> DashboardSnapshot {
        let mode = self.input.mode;

        let current = self.filter(&self.input.current_period);
        let previous = self.filter(&self.input.previous_period);

        let (main_data, compare_data) = match mode {
            AnalysisMode::Ytd => (current.clone(), previous.clone()),
            AnalysisMode::Pop => {
                let before_previous = self.filter(&self.input.period_before_previous);
                (diff(&current, &previous), diff(&previous, &before_previous))
            }
            AnalysisMode::Comparison => (current.clone(), self.filter(&self.input.compare_period)),
        };

        // Share is measured against the whole book, except in PoP mode where
        // the selected lines' own (undiffed) premium is the base.
        let share_base = match mode {
            AnalysisMode::Ytd | AnalysisMode::Comparison => {
                total_premium_written(&self.input.current_period)
            }
            AnalysisMode::Pop => total_premium_written(&current),
        };

        debug!(
            "Processing {} mode: {} selected lines, {} main rows, {} compare rows",
            mode,
            self.selection.len(),
            main_data.len(),
            compare_data.len()
        );

        let by_business_type = main_data
            .iter()
            .map(|line| {
                let mut processed = self.process_line(line.clone());
                processed.kpis.premium_share =
                    safe_divide(processed.kpis.premium_written, share_base) * 100.0;
                processed
            })
            .collect();

        // summary cards carry no premium share
        let summary = DashboardSummary {
            current: self.process_line(aggregate(&main_data)),
            compare: self.process_line(aggregate(&compare_data)),
        };

        DashboardSnapshot {
            by_business_type,
            summary,
        }
    }

    fn filter(&self, records: &[RawBusinessRecord]) -> Vec<RawBusinessRecord> {
        records
            .iter()
            .filter(|r| self.selection.contains(r.business_type.as_str()))
            .cloned()
            .collect()
    }

    /// The commercial index only means something for one business line
    /// outside PoP mode.
    fn shows_commercial_index(&self) -> bool {
        self.selection.len() == 1 && self.input.mode != AnalysisMode::Pop
    }

    fn process_line(&self, record: RawBusinessRecord) -> ProcessedBusinessLine {
        let mut kpis = compute_kpis(&record);
        if !self.shows_commercial_index() {
            kpis.avg_commercial_index = 0.0;
        }
        ProcessedBusinessLine { record, kpis }
    }
}

pub fn process_dashboard(input: &DashboardInput) -> DashboardSnapshot {
    DashboardProcessor::new(input).process()
}
