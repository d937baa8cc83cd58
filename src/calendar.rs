use crate::error::{ScheduleError, ScheduleResult};
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Wire format for dates: `YYYY/M/D` is accepted, `YYYY/MM/DD` is emitted.
pub const DATE_FORMAT: &str = "%Y/%m/%d";

const WEEKDAY_NAMES: [(Weekday, &str); 7] = [
    (Weekday::Mon, "Monday"),
    (Weekday::Tue, "Tuesday"),
    (Weekday::Wed, "Wednesday"),
    (Weekday::Thu, "Thursday"),
    (Weekday::Fri, "Friday"),
    (Weekday::Sat, "Saturday"),
    (Weekday::Sun, "Sunday"),
];

/// Largest business-day count a single step may cover, about a thousand years.
pub const MAX_BUSINESS_DAYS: i64 = 365_250;

/// Horizontal time granularity of a chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scale {
    #[default]
    Daily,
    Weekly,
}

impl Scale {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scale::Daily => "daily",
            Scale::Weekly => "weekly",
        }
    }
}

impl fmt::Display for Scale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(Scale::Daily),
            "weekly" => Ok(Scale::Weekly),
            other => Err(format!("unknown scale '{other}'")),
        }
    }
}

/// Project window plus the set of closed (non-business) dates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkCalendar {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub today: NaiveDate,
    closed: BTreeSet<NaiveDate>,
    pub scale: Scale,
}

impl WorkCalendar {
    pub fn new(start: NaiveDate, end: NaiveDate, today: NaiveDate, scale: Scale) -> Self {
        Self {
            start,
            end,
            today,
            closed: BTreeSet::new(),
            scale,
        }
    }

    /// Add a single closed date
    pub fn add_closed_date(&mut self, date: NaiveDate) {
        self.closed.insert(date);
    }

    /// Add multiple closed dates at once
    pub fn add_closed_dates<I>(&mut self, dates: I)
    where
        I: IntoIterator<Item = NaiveDate>,
    {
        self.closed.extend(dates);
    }

    /// Close every date in the project window that falls on the named weekday
    pub fn close_weekday(&mut self, name: &str) {
        let dates = weekday_to_dates(name, self.start, self.end);
        self.closed.extend(dates);
    }

    pub fn closed_dates(&self) -> &BTreeSet<NaiveDate> {
        &self.closed
    }

    pub fn is_closed(&self, date: NaiveDate) -> bool {
        self.closed.contains(&date)
    }

    /// Check if a date is a business day
    pub fn is_available(&self, date: NaiveDate) -> bool {
        !self.is_closed(date)
    }

    pub fn add_business_days(&self, from: NaiveDate, days: f64) -> ScheduleResult<NaiveDate> {
        add_business_days(from, days, &self.closed)
    }

    /// Count business days in `[start, end)`.
    pub fn count_business_days_until(&self, start: NaiveDate, end: NaiveDate) -> i64 {
        if end <= start {
            return 0;
        }
        let closed = self.closed.range(start..end).count() as i64;
        (end - start).num_days() - closed
    }

    /// Number of calendar days shown, both bounds included.
    pub fn day_count(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Whole days between the calendar start and `date`.
    pub fn offset_days(&self, date: NaiveDate) -> i64 {
        (date - self.start).num_days()
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.start.iter_days().take_while(|date| *date <= self.end)
    }
}

/// Step `days` business days away from `from`, skipping closed dates.
///
/// The start date counts as the first business day when it is open, so a
/// count of -1, 0 or 1 leaves `from` untouched. Fractional counts are rounded
/// away from zero before stepping. Counts beyond [`MAX_BUSINESS_DAYS`], or
/// steps that leave chrono's date range, are rejected as unsupported periods.
pub fn add_business_days(
    from: NaiveDate,
    days: f64,
    closed: &BTreeSet<NaiveDate>,
) -> ScheduleResult<NaiveDate> {
    let unsupported = || ScheduleError::UnsupportedPeriod(days.to_string());
    if !days.is_finite() || days.abs() > MAX_BUSINESS_DAYS as f64 {
        return Err(unsupported());
    }
    let sign: i64 = if days < 0.0 { -1 } else { 1 };
    let rounded = sign * days.abs().ceil() as i64;
    if (-1..=1).contains(&rounded) {
        return Ok(from);
    }

    let step = rounded.signum();
    let mut remaining = rounded;
    let mut current = from;
    loop {
        if !closed.contains(&current) {
            remaining -= step;
        }
        if remaining == 0 {
            break;
        }
        current = current
            .checked_add_signed(Duration::days(step))
            .ok_or_else(unsupported)?;
    }
    Ok(current)
}

/// Every date in `[start, end]` whose weekday matches the first two letters of `name`.
pub fn weekday_to_dates(name: &str, start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let Some(weekday) = weekday_from_prefix(name) else {
        return Vec::new();
    };
    start
        .iter_days()
        .take_while(|date| *date <= end)
        .filter(|date| date.weekday() == weekday)
        .collect()
}

/// Case-insensitive two-letter prefix match against the English weekday names.
pub fn weekday_from_prefix(name: &str) -> Option<Weekday> {
    let prefix: String = name.trim().chars().take(2).collect::<String>().to_lowercase();
    if prefix.chars().count() != 2 {
        return None;
    }
    WEEKDAY_NAMES
        .iter()
        .find(|(_, full)| full[..2].to_lowercase() == prefix)
        .map(|(weekday, _)| *weekday)
}

pub fn weekday_full_name(weekday: Weekday) -> &'static str {
    WEEKDAY_NAMES
        .iter()
        .find(|(wd, _)| *wd == weekday)
        .map(|(_, name)| *name)
        .unwrap_or("Monday")
}

/// Two-letter weekday label used in chart headers.
pub fn weekday_short_label(weekday: Weekday) -> &'static str {
    &weekday_full_name(weekday)[..2]
}

pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).ok()
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Days left in the month of `date`, `date` itself included.
pub fn days_remaining_in_month(date: NaiveDate) -> i64 {
    let first_of_next = if date.month() == 12 {
        NaiveDate::from_ymd_opt(date.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(date.year(), date.month() + 1, 1)
    };
    match first_of_next {
        Some(next) => (next - date).num_days(),
        None => 1,
    }
}
