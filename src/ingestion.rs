use crate::error::Result;
use crate::period::DateRange;
use crate::schema::DailyRecord;
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};

/// Keeps the records dated inside `range` (inclusive), sorted by date.
///
/// Input order is not assumed.
pub fn filter_records(records: &[DailyRecord], range: DateRange) -> Vec<DailyRecord> {
    let mut selected: Vec<DailyRecord> = records
        .iter()
        .filter(|r| range.contains(r.date))
        .cloned()
        .collect();
    selected.sort_by_key(|r| r.date);
    selected
}

/// Groups a flat list of records by market code.
pub fn group_by_market(records: Vec<DailyRecord>) -> BTreeMap<String, Vec<DailyRecord>> {
    let mut grouped: BTreeMap<String, Vec<DailyRecord>> = BTreeMap::new();
    for record in records {
        grouped.entry(record.market.clone()).or_default().push(record);
    }
    for series in grouped.values_mut() {
        series.sort_by_key(|r| r.date);
    }
    grouped
}

/// Parses a JSON array of daily records with ISO `YYYY-MM-DD` dates.
pub fn parse_records_json(json: &str) -> Result<Vec<DailyRecord>> {
    Ok(serde_json::from_str(json)?)
}

/// Dates inside `range` with no record at all.
pub fn missing_dates(records: &[DailyRecord], range: DateRange) -> Vec<NaiveDate> {
    let present: BTreeSet<NaiveDate> = records
        .iter()
        .map(|r| r.date)
        .filter(|d| range.contains(*d))
        .collect();

    range
        .start
        .iter_days()
        .take_while(|d| *d <= range.end)
        .filter(|d| !present.contains(d))
        .collect()
}
