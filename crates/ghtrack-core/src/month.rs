//! Month token resolution and the reporting date range.
//!
//! A month is given on the command line as a word. Four spellings are
//! accepted for each month: `March`, `march`, `MARCH` and `mar`. Mixed
//! case (`mArch`) and capitalized abbreviations (`Mar`) are rejected.
//!
//! There is no year option: the range always falls in the current
//! calendar year, which callers pass in explicitly.

use chrono::{Datelike, Local, NaiveDate};

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Resolve a month token to its 1-based number (January = 1).
///
/// Returns `None` when the token is not one of the accepted spellings.
pub fn resolve_month(token: &str) -> Option<u32> {
    MONTH_NAMES
        .iter()
        .position(|name| matches_month(name, token))
        .and_then(|index| u32::try_from(index + 1).ok())
}

fn matches_month(name: &str, token: &str) -> bool {
    let lower = name.to_lowercase();
    token == name || token == lower || token == name.to_uppercase() || token == &lower[..3]
}

/// The year of the local clock.
pub fn current_year() -> i32 {
    Local::now().year()
}

/// Inclusive first-day/last-day range of one calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    /// Day 1 of the month.
    pub start: NaiveDate,
    /// Last calendar day of the month.
    pub end: NaiveDate,
}

impl DateRange {
    /// Build the range for `month` (1..=12) of `year`.
    ///
    /// Returns `None` for an out-of-range month or year.
    pub fn for_month(year: i32, month: u32) -> Option<Self> {
        let start = NaiveDate::from_ymd_opt(year, month, 1)?;
        let next = if month == 12 {
            NaiveDate::from_ymd_opt(year.checked_add(1)?, 1, 1)?
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)?
        };
        let end = next.pred_opt()?;
        Some(Self { start, end })
    }

    /// GitHub search qualifier form, e.g. `2024-03-01..2024-03-31`.
    pub fn search_span(&self) -> String {
        format!("{}..{}", self.start.format("%Y-%m-%d"), self.end.format("%Y-%m-%d"))
    }

    /// Start of the range as an ISO 8601 UTC timestamp.
    pub fn since_timestamp(&self) -> String {
        format!("{}T00:00:00Z", self.start.format("%Y-%m-%d"))
    }

    /// End of the range as an ISO 8601 UTC timestamp (last second of the day).
    pub fn until_timestamp(&self) -> String {
        format!("{}T23:59:59Z", self.end.format("%Y-%m-%d"))
    }
}
