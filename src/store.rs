use crate::error::Result;
use crate::ingestion::{group_by_period, rows_from_csv, rows_from_json, PeriodBook};
use crate::schema::{FilterOptions, PeriodOption, RawBusinessRecord, TrendWindowEntry};
use crate::trend::trend_window;
use crate::utils::sort_periods_desc;
use std::collections::BTreeSet;
use std::io::Read;

/// Read side of the business data store.
///
/// Implementations may fail (network, malformed rows); callers in this crate
/// turn failures into empty data before anything reaches the KPI core.
pub trait BusinessDataSource {
    /// Periods newest first, business types sorted lexically.
    fn fetch_filter_options(&self) -> Result<FilterOptions>;

    /// All business lines of one period; empty for unknown periods.
    fn fetch_period_records(&self, period_id: &str) -> Result<Vec<RawBusinessRecord>>;

    /// Up to `count` trend entries ending at `end_period_id`, oldest first.
    fn fetch_trend_window(&self, end_period_id: &str, count: usize) -> Result<Vec<TrendWindowEntry>>;
}

/// A fully loaded store held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    book: PeriodBook,
}

impl InMemoryStore {
    pub fn from_records(rows: Vec<RawBusinessRecord>) -> Result<Self> {
        Ok(Self {
            book: group_by_period(rows)?,
        })
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Self::from_records(rows_from_json(json)?)
    }

    pub fn from_csv<R: Read>(reader: R) -> Result<Self> {
        Self::from_records(rows_from_csv(reader)?)
    }

    pub fn period_count(&self) -> usize {
        self.book.len()
    }

    fn periods_desc(&self) -> Vec<String> {
        self.book.keys().rev().cloned().collect()
    }
}

impl BusinessDataSource for InMemoryStore {
    fn fetch_filter_options(&self) -> Result<FilterOptions> {
        let mut periods: Vec<PeriodOption> = self
            .book
            .iter()
            .filter_map(|(id, rows)| {
                rows.first().map(|row| PeriodOption {
                    id: id.clone(),
                    label: row.period_label.clone(),
                })
            })
            .collect();
        sort_periods_desc(&mut periods);

        let business_types: BTreeSet<&str> = self
            .book
            .values()
            .flatten()
            .map(|row| row.business_type.as_str())
            .collect();

        Ok(FilterOptions {
            periods,
            business_types: business_types.into_iter().map(str::to_string).collect(),
        })
    }

    fn fetch_period_records(&self, period_id: &str) -> Result<Vec<RawBusinessRecord>> {
        Ok(self.book.get(period_id).cloned().unwrap_or_default())
    }

    fn fetch_trend_window(&self, end_period_id: &str, count: usize) -> Result<Vec<TrendWindowEntry>> {
        Ok(trend_window(&self.periods_desc(), &self.book, end_period_id, count))
    }
}
