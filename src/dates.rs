use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;

const ISO_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

const MONTH_FIRST_FORMATS: &[&str] = &["%m/%d/%Y %H:%M:%S", "%m/%d/%Y %H:%M", "%m/%d/%Y"];
const DAY_FIRST_FORMATS: &[&str] = &["%d/%m/%Y %H:%M:%S", "%d/%m/%Y %H:%M", "%d/%m/%Y"];

/// Parse a spreadsheet timestamp cell.
///
/// Accepts RFC 3339, ISO dates with optional time, and the slash style that
/// form exports use (`1/10/2024 14:03:22`). Slash dates are month-first unless
/// `day_first` is set. Date-only values land on midnight.
pub fn parse_timestamp(raw: &str, day_first: bool) -> Option<NaiveDateTime> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.naive_local());
    }
    for format in ISO_DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, format) {
            return Some(parsed);
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(date.and_time(NaiveTime::MIN));
    }

    let slash_formats = if day_first {
        DAY_FIRST_FORMATS
    } else {
        MONTH_FIRST_FORMATS
    };
    for format in slash_formats {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, format) {
            return Some(parsed);
        }
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return Some(date.and_time(NaiveTime::MIN));
        }
    }

    None
}

/// Inclusive calendar-date window. A window whose start is after its end is
/// valid and simply matches nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
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

    pub fn contains_timestamp(&self, timestamp: NaiveDateTime) -> bool {
        self.contains(timestamp.date())
    }

    /// Start date, or `None` when the window is open at the start.
    pub fn start_bound(&self) -> Option<NaiveDate> {
        (self.start != NaiveDate::MIN).then_some(self.start)
    }

    /// End date, or `None` when the window is open at the end.
    pub fn end_bound(&self) -> Option<NaiveDate> {
        (self.end != NaiveDate::MAX).then_some(self.end)
    }

    /// Fill the missing ends of a caller-supplied window from the data bounds.
    /// Returns `None` only when nothing was supplied and there are no bounds.
    pub fn resolve(
        bounds: Option<DateRange>,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Option<DateRange> {
        if start.is_none() && end.is_none() {
            return bounds;
        }
        let start = start
            .or(bounds.map(|b| b.start))
            .unwrap_or(NaiveDate::MIN);
        let end = end.or(bounds.map(|b| b.end)).unwrap_or(NaiveDate::MAX);
        Some(DateRange { start, end })
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.start_bound(), self.end_bound()) {
            (Some(start), Some(end)) => write!(f, "{start} to {end}"),
            (Some(start), None) => write!(f, "{start} onwards"),
            (None, Some(end)) => write!(f, "up to {end}"),
            (None, None) => write!(f, "all dates"),
        }
    }
}
