//! Coercion of loosely-typed leaf values in a structured document.
//!
//! The document is walked generically: maps recurse by key, sequences recurse
//! with the path segment `elem`. Each leaf's dotted path is looked up in a
//! fixed coercion table; leaves without an entry are left untouched.

use crate::calendar::{weekday_from_prefix, weekday_full_name};
use crate::config::ChartConfig;
use crate::error::{ScheduleError, ScheduleResult};
use serde_json::{Number, Value};

const ELEM: &str = "elem";

type Coercion = fn(&Normalizer, &Value) -> ScheduleResult<Value>;

const COERCIONS: [(&str, Coercion); 7] = [
    ("project.closed.elem", Normalizer::closed_day),
    ("task.elem.plan.period", Normalizer::period),
    ("task.elem.actual.period", Normalizer::period),
    ("task.elem.actual.progress", Normalizer::progress),
    ("milestone.elem.plan.period", Normalizer::period),
    ("milestone.elem.actual.period", Normalizer::period),
    ("milestone.elem.actual.progress", Normalizer::progress),
];

#[derive(Debug, Clone)]
pub struct Normalizer {
    hours_per_day: f64,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(&ChartConfig::default())
    }
}

impl Normalizer {
    pub fn new(config: &ChartConfig) -> Self {
        Self {
            hours_per_day: config.hours_per_day,
        }
    }

    /// Rewrite every coercible leaf of `document` in place.
    pub fn normalize(&self, document: &mut Value) -> ScheduleResult<()> {
        let mut path = Vec::new();
        self.walk(document, &mut path)
    }

    fn walk(&self, value: &mut Value, path: &mut Vec<String>) -> ScheduleResult<()> {
        match value {
            Value::Object(map) => {
                for (key, child) in map.iter_mut() {
                    path.push(key.clone());
                    let result = self.walk(child, path);
                    path.pop();
                    result?;
                }
            }
            Value::Array(items) => {
                for child in items.iter_mut() {
                    path.push(ELEM.to_string());
                    let result = self.walk(child, path);
                    path.pop();
                    result?;
                }
            }
            leaf => {
                let key = path.join(".");
                if let Some((_, coerce)) = COERCIONS.iter().find(|(rule, _)| *rule == key) {
                    *leaf = coerce(self, leaf)?;
                }
            }
        }
        Ok(())
    }

    /// Expand a weekday abbreviation to its full English name.
    fn closed_day(&self, value: &Value) -> ScheduleResult<Value> {
        if let Value::String(raw) = value {
            if let Some(weekday) = weekday_from_prefix(raw) {
                return Ok(Value::String(weekday_full_name(weekday).to_string()));
            }
        }
        Ok(value.clone())
    }

    fn period(&self, value: &Value) -> ScheduleResult<Value> {
        let days = match value {
            Value::Number(number) => number.as_f64(),
            Value::String(raw) => self.parse_period(raw),
            _ => None,
        };
        days.and_then(finite_number)
            .ok_or_else(|| ScheduleError::UnsupportedPeriod(describe(value)))
    }

    fn parse_period(&self, raw: &str) -> Option<f64> {
        let raw = raw.trim();
        if let Some(hours) = strip_unit(raw, "hours", "hour") {
            return hours.parse::<f64>().ok().map(|h| h / self.hours_per_day);
        }
        if let Some(days) = strip_unit(raw, "days", "day") {
            return days.parse::<f64>().ok();
        }
        raw.parse::<f64>().ok()
    }

    fn progress(&self, value: &Value) -> ScheduleResult<Value> {
        let fraction = match value {
            Value::Number(number) => number.as_f64(),
            Value::String(raw) => parse_progress(raw),
            _ => None,
        };
        fraction
            .and_then(finite_number)
            .ok_or_else(|| ScheduleError::UnsupportedProgress(describe(value)))
    }
}

fn strip_unit<'a>(raw: &'a str, plural: &str, singular: &str) -> Option<&'a str> {
    raw.strip_suffix(plural)
        .or_else(|| raw.strip_suffix(singular))
        .map(str::trim)
}

fn parse_progress(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if let Some(percent) = raw.strip_suffix('%') {
        return percent.trim().parse::<f64>().ok().map(|p| p / 100.0);
    }
    if let Some((numerator, denominator)) = raw.split_once('/') {
        let numerator = numerator.trim().parse::<f64>().ok()?;
        let denominator = denominator.trim().parse::<f64>().ok()?;
        return Some(numerator / denominator);
    }
    raw.parse::<f64>().ok()
}

fn finite_number(value: f64) -> Option<Value> {
    Number::from_f64(value).map(Value::Number)
}

fn describe(value: &Value) -> String {
    match value {
        Value::String(raw) => raw.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_suffixes_are_stripped() {
        assert_eq!(strip_unit("8 hours", "hours", "hour"), Some("8"));
        assert_eq!(strip_unit("1 hour", "hours", "hour"), Some("1"));
        assert_eq!(strip_unit("2 days", "hours", "hour"), None);
    }

    #[test]
    fn progress_literals() {
        assert_eq!(parse_progress("10 %"), Some(0.1));
        assert_eq!(parse_progress("1 / 5"), Some(0.2));
        assert_eq!(parse_progress("0.5"), Some(0.5));
        assert_eq!(parse_progress("half"), None);
        assert_eq!(parse_progress("1/2/3"), None);
    }
}
