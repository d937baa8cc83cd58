//! The structured schedule document: what the notation parser produces and
//! what JSON callers may hand in directly.
//!
//! Leaf values stay loosely typed (`Scalar`, raw date strings) until the
//! normalizer and resolver have run over them.

use crate::calendar::{Scale, parse_date};
use crate::error::ScheduleResult;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

const START_SUFFIX: &str = "'s start";
const END_SUFFIX: &str = "'s end";
pub const PROJECT_PSEUDO_NAME: &str = "project";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub project: ProjectSection,
    #[serde(default)]
    pub style: StyleSection,
    #[serde(default)]
    pub task: Vec<TaskRecord>,
    #[serde(default)]
    pub milestone: Vec<MilestoneRecord>,
    #[serde(default)]
    pub group: Vec<GroupRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub today: Option<String>,
    #[serde(default)]
    pub closed: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<Scale>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StyleSection {
    #[serde(default)]
    pub color: ColorStyle,
}

/// Raw color overrides, e.g. `task: "green/blue"`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColorStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub milestone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// A number, or a string still waiting for coercion (`"3 days"`, `"20%"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Number(f64),
    Text(String),
}

impl Scalar {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Scalar::Number(value) => Some(*value),
            Scalar::Text(_) => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<Scalar>,
}

/// A plan is either a single point (milestones) or a start/end/period block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PlanSpec {
    Point(String),
    Range(PlanRange),
}

impl PlanSpec {
    /// Mutable access to the range form, replacing a point plan if needed.
    pub fn range_mut(&mut self) -> &mut PlanRange {
        if let PlanSpec::Point(_) = self {
            *self = PlanSpec::Range(PlanRange::default());
        }
        match self {
            PlanSpec::Range(range) => range,
            PlanSpec::Point(_) => unreachable!("point plan replaced above"),
        }
    }

    /// The uniform start/end view; a point plan becomes `{start: v, end: v}`.
    pub fn to_range(&self) -> PlanRange {
        match self {
            PlanSpec::Point(value) => PlanRange {
                start: Some(value.clone()),
                end: Some(value.clone()),
                period: None,
            },
            PlanSpec::Range(range) => range.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActualRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<Scalar>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ActualSpec {
    Point(String),
    Range(ActualRange),
}

impl ActualSpec {
    pub fn range_mut(&mut self) -> &mut ActualRange {
        if let ActualSpec::Point(_) = self {
            *self = ActualSpec::Range(ActualRange::default());
        }
        match self {
            ActualSpec::Range(range) => range,
            ActualSpec::Point(_) => unreachable!("point actual replaced above"),
        }
    }

    /// The single actual date of a milestone, or the start of a range.
    pub fn point(&self) -> Option<&str> {
        match self {
            ActualSpec::Point(value) => Some(value),
            ActualSpec::Range(range) => range.start.as_deref(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan: Option<PlanSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual: Option<ActualSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
}

impl TaskRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MilestoneRecord {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan: Option<PlanSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual: Option<ActualSpec>,
}

impl MilestoneRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupRecord {
    pub text: String,
    #[serde(default)]
    pub member: Vec<String>,
}

impl Document {
    pub fn from_value(value: Value) -> ScheduleResult<Self> {
        Ok(serde_json::from_value(value)?)
    }

    pub fn to_value(&self) -> ScheduleResult<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

/// A plan date: literal, a project bound, or a bound of another item.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DateExpr {
    Literal(NaiveDate),
    ProjectStart,
    ProjectEnd,
    StartOf(String),
    EndOf(String),
}

impl DateExpr {
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if let Some(name) = raw.strip_suffix(START_SUFFIX) {
            return Some(if name == PROJECT_PSEUDO_NAME {
                DateExpr::ProjectStart
            } else {
                DateExpr::StartOf(name.to_string())
            });
        }
        if let Some(name) = raw.strip_suffix(END_SUFFIX) {
            return Some(if name == PROJECT_PSEUDO_NAME {
                DateExpr::ProjectEnd
            } else {
                DateExpr::EndOf(name.to_string())
            });
        }
        parse_date(raw).map(DateExpr::Literal)
    }

    /// Whether `raw` is a literal date or ends with a `'s start`/`'s end` reference.
    pub fn is_acceptable(raw: &str) -> bool {
        let raw = raw.trim();
        parse_date(raw).is_some() || raw.ends_with(START_SUFFIX) || raw.ends_with(END_SUFFIX)
    }

    /// Name of the schedule item this expression depends on, if any.
    pub fn reference(&self) -> Option<&str> {
        match self {
            DateExpr::StartOf(name) | DateExpr::EndOf(name) => Some(name),
            _ => None,
        }
    }
}
