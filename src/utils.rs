use crate::error::{MetricsError, Result};
use chrono::{Datelike, Days, Months, NaiveDate};

/// Parses an ISO `YYYY-MM-DD` date string.
pub fn parse_iso_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| MetricsError::InvalidDate(value.to_string()))
}

pub fn format_iso_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn validate_month(month: u32) -> Result<()> {
    if !(1..=12).contains(&month) {
        return Err(MetricsError::InvalidMonth(month));
    }
    Ok(())
}

pub fn days_before(date: NaiveDate, days: u64) -> NaiveDate {
    date.checked_sub_days(Days::new(days))
        .unwrap_or(NaiveDate::MIN)
}

pub fn days_after(date: NaiveDate, days: u64) -> NaiveDate {
    date.checked_add_days(Days::new(days))
        .unwrap_or(NaiveDate::MAX)
}

pub fn months_before(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_sub_months(Months::new(months))
        .unwrap_or(NaiveDate::MIN)
}

/// Same calendar date one year earlier. Feb 29 maps to Feb 28.
pub fn one_year_earlier(date: NaiveDate) -> NaiveDate {
    months_before(date, 12)
}

/// Days since Monday, with Sunday as the last day of the week (6).
pub fn weekday_index(date: NaiveDate) -> u32 {
    date.weekday().num_days_from_monday()
}

pub fn monday_of(date: NaiveDate) -> NaiveDate {
    days_before(date, weekday_index(date) as u64)
}

pub fn first_day_of_month(date: NaiveDate) -> NaiveDate {
    days_before(date, date.day0() as u64)
}

/// Last calendar day of the month containing `date`: day 0 of the following month.
pub fn last_day_of_month(date: NaiveDate) -> NaiveDate {
    let first = first_day_of_month(date);
    // Any month is at most 31 days long, so this always lands in the next month.
    let next_month_start = first_day_of_month(days_after(first, 31));
    days_before(next_month_start, 1)
}

pub fn month_start(year: i32, month: u32) -> Result<NaiveDate> {
    validate_month(month)?;
    NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| {
        MetricsError::DateError(format!("Year {} is out of the supported range", year))
    })
}

/// Monday of ISO week 1 of the year containing `date`: the week holding January 4th.
pub fn week_one_monday(date: NaiveDate) -> NaiveDate {
    let jan_first = days_before(date, date.ordinal0() as u64);
    monday_of(days_after(jan_first, 3))
}

/// ISO-8601 week number as `(iso_year, week)`.
///
/// Shifts to the Thursday of the same ISO week; the Thursday decides the ISO year,
/// and the week number counts weeks since that year's January-4th week.
pub fn iso_week_number(date: NaiveDate) -> (i32, u32) {
    let thursday = days_after(monday_of(date), 3);
    let week_one = week_one_monday(thursday);
    let week = (thursday - week_one).num_days() / 7 + 1;
    (thursday.year(), week as u32)
}

/// Monday of the given ISO week in the ISO year containing `date_in_year`.
pub fn iso_week_monday(date_in_year: NaiveDate, week: u32) -> NaiveDate {
    let week_one = week_one_monday(date_in_year);
    days_after(week_one, (week.saturating_sub(1) as u64) * 7)
}

pub fn weekday_abbrev(date: NaiveDate) -> String {
    date.format("%a").to_string()
}

pub fn month_abbrev(date: NaiveDate) -> String {
    date.format("%b").to_string()
}
