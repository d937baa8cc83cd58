use super::plan_dates::period_days;
use crate::calendar::{WorkCalendar, parse_date};
use crate::document::{ActualRange, Scalar};
use crate::error::{ScheduleError, ScheduleResult};
use chrono::NaiveDate;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ActualDates {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub completed: Option<NaiveDate>,
    pub progress: Option<f64>,
}

/// Fill in the actual end of a task from its period or its progress so far.
///
/// With a progress fraction `p`, the business days elapsed in
/// `[start, today)` are taken as `p` of the total; the task is then projected
/// to end `ceil(elapsed / p)` business days after its start and is marked as
/// observed up to today. A fraction of zero or less projects nothing.
pub fn project_actual(
    name: &str,
    actual: &ActualRange,
    calendar: &WorkCalendar,
) -> ScheduleResult<ActualDates> {
    let mut dates = ActualDates {
        start: optional_date(name, "start", actual.start.as_deref())?,
        end: optional_date(name, "end", actual.end.as_deref())?,
        completed: optional_date(name, "completed", actual.completed.as_deref())?,
        progress: actual.progress.as_ref().map(progress_fraction).transpose()?,
    };
    let Some(start) = dates.start else {
        return Ok(dates);
    };

    if let Some(period) = &actual.period {
        dates.end = Some(calendar.add_business_days(start, period_days(period)?)?);
    }

    if let Some(progress) = dates.progress.filter(|p| *p > 0.0) {
        let elapsed = calendar.count_business_days_until(start, calendar.today);
        let total = (elapsed as f64 / progress).ceil();
        let end = calendar
            .add_business_days(start, total)
            .map_err(|_| ScheduleError::UnsupportedProgress(progress.to_string()))?;
        dates.completed = Some(calendar.today);
        dates.end = Some(end);
    }

    Ok(dates)
}

fn optional_date(name: &str, field: &str, raw: Option<&str>) -> ScheduleResult<Option<NaiveDate>> {
    raw.map(|value| {
        parse_date(value).ok_or_else(|| ScheduleError::InvalidDate {
            context: format!("{name}.actual.{field}"),
            value: value.to_string(),
        })
    })
    .transpose()
}

fn progress_fraction(progress: &Scalar) -> ScheduleResult<f64> {
    match progress {
        Scalar::Number(fraction) if fraction.is_finite() => Ok(*fraction),
        Scalar::Number(fraction) => Err(ScheduleError::UnsupportedProgress(fraction.to_string())),
        Scalar::Text(raw) => Err(ScheduleError::UnsupportedProgress(raw.clone())),
    }
}
