use crate::calendar::WorkCalendar;
use crate::document::{DateExpr, PlanRange, Scalar};
use crate::error::{ScheduleError, ScheduleResult};
use crate::model::DependencyPath;
use chrono::NaiveDate;
use std::collections::HashMap;
use tracing::debug;

/// Concrete plan dates of one item, with the relative expressions they came from.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPlan {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub start_origin: Option<DateExpr>,
    pub end_origin: Option<DateExpr>,
}

/// Resolves plan date expressions item by item. Callers feed items in
/// dependency order; an item referring to one not yet resolved fails.
pub struct PlanPass<'a> {
    calendar: &'a WorkCalendar,
    gap_days: i64,
    resolved: HashMap<String, ResolvedPlan>,
}

impl<'a> PlanPass<'a> {
    pub fn new(calendar: &'a WorkCalendar, gap_days: i64) -> Self {
        Self {
            calendar,
            gap_days,
            resolved: HashMap::new(),
        }
    }

    pub fn is_resolved(&self, name: &str) -> bool {
        self.resolved.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&ResolvedPlan> {
        self.resolved.get(name)
    }

    /// Resolve `plan` for `name`. Resolving the same name twice keeps the first result.
    pub fn resolve(&mut self, name: &str, plan: &PlanRange) -> ScheduleResult<&ResolvedPlan> {
        if !self.resolved.contains_key(name) {
            let resolved = self.resolve_range(name, plan)?;
            debug!(
                name,
                start = %resolved.start,
                end = %resolved.end,
                "resolved plan dates"
            );
            self.resolved.insert(name.to_string(), resolved);
        }
        self.resolved
            .get(name)
            .ok_or_else(|| ScheduleError::MissingField(format!("{name}.plan")))
    }

    fn resolve_range(&self, name: &str, plan: &PlanRange) -> ScheduleResult<ResolvedPlan> {
        let raw_start = plan
            .start
            .as_deref()
            .ok_or_else(|| ScheduleError::MissingField(format!("{name}.plan.start")))?;
        let (start, start_origin) = self.resolve_expr(name, raw_start)?;

        // A period always wins over an explicit end.
        if let Some(period) = &plan.period {
            let days = period_days(period)?;
            return Ok(ResolvedPlan {
                start,
                end: self.calendar.add_business_days(start, days)?,
                start_origin,
                end_origin: None,
            });
        }

        let raw_end = plan
            .end
            .as_deref()
            .ok_or_else(|| ScheduleError::MissingField(format!("{name}.plan.end")))?;
        let (end, end_origin) = self.resolve_expr(name, raw_end)?;
        Ok(ResolvedPlan {
            start,
            end,
            start_origin,
            end_origin,
        })
    }

    fn resolve_expr(&self, name: &str, raw: &str) -> ScheduleResult<(NaiveDate, Option<DateExpr>)> {
        let expr = DateExpr::parse(raw).ok_or_else(|| ScheduleError::InvalidDate {
            context: format!("{name}.plan"),
            value: raw.to_string(),
        })?;
        let date = match &expr {
            DateExpr::Literal(date) => return Ok((*date, None)),
            DateExpr::ProjectStart => return Ok((self.calendar.start, None)),
            DateExpr::ProjectEnd => return Ok((self.calendar.end, None)),
            DateExpr::StartOf(dep) => {
                let anchor = self.dependency(name, dep)?.start;
                self.calendar
                    .add_business_days(anchor, -(self.gap_days as f64))?
            }
            DateExpr::EndOf(dep) => {
                let anchor = self.dependency(name, dep)?.end;
                self.calendar.add_business_days(anchor, self.gap_days as f64)?
            }
        };
        Ok((date, Some(expr)))
    }

    fn dependency(&self, name: &str, dep: &str) -> ScheduleResult<&ResolvedPlan> {
        self.resolved
            .get(dep)
            .ok_or_else(|| ScheduleError::UnknownReference {
                item: name.to_string(),
                reference: dep.to_string(),
            })
    }

    /// Connectors for every relative expression `name`'s plan was resolved from.
    pub fn dependency_paths(&self, name: &str, color: &str) -> Vec<DependencyPath> {
        let Some(plan) = self.resolved.get(name) else {
            return Vec::new();
        };
        [
            (&plan.start_origin, plan.start),
            (&plan.end_origin, plan.end),
        ]
        .into_iter()
        .filter_map(|(origin, date)| {
            let origin = origin.as_ref()?;
            let dep_name = origin.reference()?;
            let dep = self.resolved.get(dep_name)?;
            let anchor = match origin {
                DateExpr::StartOf(_) => dep.start,
                _ => dep.end,
            };
            Some(DependencyPath {
                start_name: dep_name.to_string(),
                start_date: anchor,
                end_name: name.to_string(),
                end_date: date,
                color: color.to_string(),
            })
        })
        .collect()
    }
}

pub(crate) fn period_days(period: &Scalar) -> ScheduleResult<f64> {
    match period {
        Scalar::Number(days) if days.is_finite() => Ok(*days),
        Scalar::Number(days) => Err(ScheduleError::UnsupportedPeriod(days.to_string())),
        Scalar::Text(raw) => Err(ScheduleError::UnsupportedPeriod(raw.clone())),
    }
}
