//! Reporting period resolution.
//!
//! Every function here is pure and total over valid calendar dates: it maps an
//! anchor date (usually "today" in the caller's local calendar) to an inclusive
//! `[start, end]` range plus the matching year-over-year range.
//!
//! Year-over-year ranges are not a fixed 365-day shift. Weeks resolve the same ISO
//! week number in the prior ISO year, and partial periods keep the same offset from
//! their own anchor (Monday or the 1st of the month).

use crate::error::{MetricsError, Result};
use crate::utils::{
    days_after, days_before, first_day_of_month, iso_week_monday, iso_week_number,
    last_day_of_month, month_abbrev, month_start, monday_of, months_before, one_year_earlier,
    weekday_abbrev, weekday_index,
};
use chrono::{Datelike, Local, NaiveDate};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum PeriodKind {
    #[schemars(description = "A single calendar day (by default yesterday)")]
    Day,

    #[schemars(description = "A full ISO week, Monday through Sunday")]
    Week,

    #[schemars(description = "A full calendar month")]
    Month,

    #[schemars(description = "Monday of the current ISO week through a given date")]
    WeekToDate,

    #[schemars(description = "The 1st of the month through a given date")]
    MonthToDate,
}

impl PeriodKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PeriodKind::Day => "day",
            PeriodKind::Week => "week",
            PeriodKind::Month => "month",
            PeriodKind::WeekToDate => "wtd",
            PeriodKind::MonthToDate => "mtd",
        }
    }
}

impl fmt::Display for PeriodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PeriodKind {
    type Err = MetricsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "day" | "daily" | "yesterday" => Ok(PeriodKind::Day),
            "week" | "weekly" => Ok(PeriodKind::Week),
            "month" | "monthly" => Ok(PeriodKind::Month),
            "wtd" | "week_to_date" => Ok(PeriodKind::WeekToDate),
            "mtd" | "month_to_date" => Ok(PeriodKind::MonthToDate),
            other => Err(MetricsError::InvalidPeriodKind(other.to_string())),
        }
    }
}

/// An inclusive calendar range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Number of calendar days covered, counting both ends.
    pub fn num_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Period {
    pub kind: PeriodKind,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub label: String,
    pub yoy_start: NaiveDate,
    pub yoy_end: NaiveDate,
    /// ISO week number for week-anchored periods.
    pub iso_week: Option<u32>,
}

impl Period {
    pub fn range(&self) -> DateRange {
        DateRange::new(self.start, self.end)
    }

    pub fn yoy_range(&self) -> DateRange {
        DateRange::new(self.yoy_start, self.yoy_end)
    }

    /// The range covering both the current and the year-over-year window.
    pub fn required_range(&self) -> DateRange {
        DateRange::new(self.yoy_start.min(self.start), self.end.max(self.yoy_end))
    }
}

/// Today in the caller's local calendar.
pub fn today_local() -> NaiveDate {
    Local::now().date_naive()
}

/// Resolves a period of `kind` relative to `anchor`.
///
/// `offset` counts back from the anchor: days for `Day`, `WeekToDate` and
/// `MonthToDate` (which use `anchor - offset` as their through-date), weeks for
/// `Week` and months for `Month`. A `Day` offset of 0 means yesterday.
pub fn resolve_period(kind: PeriodKind, anchor: NaiveDate, offset: u32) -> Period {
    match kind {
        PeriodKind::Day => day(days_before(anchor, offset.max(1) as u64)),
        PeriodKind::Week => iso_week(anchor, offset),
        PeriodKind::Month => month_containing(months_before(first_day_of_month(anchor), offset)),
        PeriodKind::WeekToDate => week_to_date(days_before(anchor, offset as u64)),
        PeriodKind::MonthToDate => month_to_date(days_before(anchor, offset as u64)),
    }
}

pub fn resolve_period_now(kind: PeriodKind, offset: u32) -> Period {
    resolve_period(kind, today_local(), offset)
}

pub fn yesterday(anchor: NaiveDate) -> Period {
    day(days_before(anchor, 1))
}

pub fn day(date: NaiveDate) -> Period {
    let yoy = one_year_earlier(date);
    Period {
        kind: PeriodKind::Day,
        start: date,
        end: date,
        label: date.format("%a %-d %b %Y").to_string(),
        yoy_start: yoy,
        yoy_end: yoy,
        iso_week: None,
    }
}

/// The ISO week `weeks_ago` weeks before the week containing `anchor`.
pub fn iso_week(anchor: NaiveDate, weeks_ago: u32) -> Period {
    let monday = days_before(monday_of(anchor), weeks_ago as u64 * 7);
    let sunday = days_after(monday, 6);
    let (_, week) = iso_week_number(monday);
    let yoy_monday = yoy_week_monday(monday, week);

    Period {
        kind: PeriodKind::Week,
        start: monday,
        end: sunday,
        label: format!("Week {}", week),
        yoy_start: yoy_monday,
        yoy_end: days_after(yoy_monday, 6),
        iso_week: Some(week),
    }
}

/// The calendar month `month` (1-indexed) of `year`.
pub fn calendar_month(year: i32, month: u32) -> Result<Period> {
    let start = month_start(year, month)?;
    Ok(month_containing(start))
}

pub fn previous_month(anchor: NaiveDate) -> Period {
    resolve_period(PeriodKind::Month, anchor, 1)
}

fn month_containing(date: NaiveDate) -> Period {
    let start = first_day_of_month(date);
    let yoy_start = one_year_earlier(start);

    Period {
        kind: PeriodKind::Month,
        start,
        end: last_day_of_month(start),
        label: start.format("%B %Y").to_string(),
        yoy_start,
        yoy_end: last_day_of_month(yoy_start),
        iso_week: None,
    }
}

/// Monday of `through`'s week up to and including `through`.
pub fn week_to_date(through: NaiveDate) -> Period {
    let monday = monday_of(through);
    let offset = weekday_index(through) as u64;
    let (_, week) = iso_week_number(monday);
    let yoy_monday = yoy_week_monday(monday, week);

    let label = if offset == 0 {
        weekday_abbrev(through)
    } else {
        format!("{}–{}", weekday_abbrev(monday), weekday_abbrev(through))
    };

    Period {
        kind: PeriodKind::WeekToDate,
        start: monday,
        end: through,
        label,
        yoy_start: yoy_monday,
        yoy_end: days_after(yoy_monday, offset),
        iso_week: Some(week),
    }
}

/// The 1st of `through`'s month up to and including `through`.
///
/// The year-over-year range keeps the same day numbers, with its end clamped to the
/// last day of the prior year's month (Feb 29 compares against Feb 1–28).
pub fn month_to_date(through: NaiveDate) -> Period {
    let start = first_day_of_month(through);
    let yoy_start = one_year_earlier(start);
    let yoy_end = days_after(yoy_start, through.day0() as u64).min(last_day_of_month(yoy_start));

    Period {
        kind: PeriodKind::MonthToDate,
        start,
        end: through,
        label: format!("{} {}–{}", month_abbrev(start), start.day(), through.day()),
        yoy_start,
        yoy_end,
        iso_week: None,
    }
}

/// Monday of ISO week `week` in the ISO year before the one `monday` belongs to.
fn yoy_week_monday(monday: NaiveDate, week: u32) -> NaiveDate {
    // The week's Thursday carries its ISO year.
    let thursday = days_after(monday, 3);
    iso_week_monday(one_year_earlier(thursday), week)
}
