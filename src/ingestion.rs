use crate::error::{DashboardError, Result};
use crate::schema::RawBusinessRecord;
use log::debug;
use std::collections::{BTreeMap, HashSet};
use std::io::Read;

/// Rows of the `business_data` table grouped by period id.
pub type PeriodBook = BTreeMap<String, Vec<RawBusinessRecord>>;

/// Groups store rows by period, rejecting a second row for the same business
/// line within one period.
pub fn group_by_period(rows: Vec<RawBusinessRecord>) -> Result<PeriodBook> {
    let mut book: PeriodBook = BTreeMap::new();
    let mut seen: HashSet<(String, String)> = HashSet::new();

    for row in rows {
        if !seen.insert((row.period_id.clone(), row.business_type.clone())) {
            return Err(DashboardError::DuplicateBusinessLine {
                period_id: row.period_id,
                business_type: row.business_type,
            });
        }
        book.entry(row.period_id.clone()).or_default().push(row);
    }

    debug!("Grouped rows into {} periods", book.len());
    Ok(book)
}

/// Reads rows from a JSON array.
pub fn rows_from_json(json: &str) -> Result<Vec<RawBusinessRecord>> {
    Ok(serde_json::from_str(json)?)
}

/// Reads rows from CSV with a header line named after the store columns.
pub fn rows_from_csv<R: Read>(reader: R) -> Result<Vec<RawBusinessRecord>> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut rows = Vec::new();
    for row in csv_reader.deserialize() {
        rows.push(row?);
    }
    Ok(rows)
}
