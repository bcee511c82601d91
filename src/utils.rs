use crate::schema::PeriodOption;
use chrono::{Datelike, NaiveDate, Weekday};

/// Weekly period id, e.g. `2024-W07`. Zero padding keeps ids sortable.
pub fn iso_week_period_id(date: NaiveDate) -> String {
    let week = date.iso_week();
    format!("{}-W{:02}", week.year(), week.week())
}

pub fn iso_week_label(date: NaiveDate) -> String {
    let week = date.iso_week();
    format!("{}年第{}周", week.year(), week.week())
}

pub fn iso_week_period(date: NaiveDate) -> PeriodOption {
    PeriodOption {
        id: iso_week_period_id(date),
        label: iso_week_label(date),
    }
}

/// Monday of the ISO week identified by a `YYYY-Www` id.
pub fn parse_iso_week_period_id(period_id: &str) -> Option<NaiveDate> {
    let (year, week) = period_id.trim().split_once("-W")?;
    NaiveDate::from_isoywd_opt(year.parse().ok()?, week.parse().ok()?, Weekday::Mon)
}

/// The `count` consecutive weekly periods ending with the week of `end`,
/// oldest first.
pub fn trailing_weeks(end: NaiveDate, count: usize) -> Vec<PeriodOption> {
    (0..count)
        .rev()
        .filter_map(|back| end.checked_sub_days(chrono::Days::new(7 * back as u64)))
        .map(iso_week_period)
        .collect()
}

/// Sorts period ids newest first and removes duplicates.
pub fn sort_periods_desc(periods: &mut Vec<PeriodOption>) {
    periods.sort_by(|a, b| b.id.cmp(&a.id));
    periods.dedup_by(|a, b| a.id == b.id);
}
