use crate::calendar::WorkCalendar;
use crate::config::ColorSet;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub name: String,
    pub text: String,
    pub plan_start: NaiveDate,
    pub plan_end: NaiveDate,
    pub colors: ColorSet,
    pub actual_start: Option<NaiveDate>,
    pub actual_completed: Option<NaiveDate>,
    /// Fraction of work done; 1.0 means complete, larger values are kept as given.
    pub actual_progress: Option<f64>,
    pub actual_end: Option<NaiveDate>,
    pub assignee: Option<String>,
}

impl Task {
    pub fn new(
        name: impl Into<String>,
        plan_start: NaiveDate,
        plan_end: NaiveDate,
        colors: ColorSet,
    ) -> Self {
        let name = name.into();
        Self {
            text: name.clone(),
            name,
            plan_start,
            plan_end,
            colors,
            actual_start: None,
            actual_completed: None,
            actual_progress: None,
            actual_end: None,
            assignee: None,
        }
    }

    /// Label drawn on the plan bar.
    pub fn label(&self) -> String {
        match &self.assignee {
            Some(assignee) => format!("{}@{}", self.text, assignee),
            None => self.text.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    pub name: String,
    pub text: String,
    pub plan_happen: NaiveDate,
    pub colors: ColorSet,
    pub actual_happen: Option<NaiveDate>,
}

impl Milestone {
    pub fn new(name: impl Into<String>, plan_happen: NaiveDate, colors: ColorSet) -> Self {
        let name = name.into();
        Self {
            text: name.clone(),
            name,
            plan_happen,
            colors,
            actual_happen: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ScheduleItem {
    Task(Task),
    Milestone(Milestone),
}

impl ScheduleItem {
    pub fn name(&self) -> &str {
        match self {
            ScheduleItem::Task(task) => &task.name,
            ScheduleItem::Milestone(ms) => &ms.name,
        }
    }

    pub fn plan_start(&self) -> NaiveDate {
        match self {
            ScheduleItem::Task(task) => task.plan_start,
            ScheduleItem::Milestone(ms) => ms.plan_happen,
        }
    }

    pub fn plan_end(&self) -> NaiveDate {
        match self {
            ScheduleItem::Task(task) => task.plan_end,
            ScheduleItem::Milestone(ms) => ms.plan_happen,
        }
    }

    pub fn as_task(&self) -> Option<&Task> {
        match self {
            ScheduleItem::Task(task) => Some(task),
            ScheduleItem::Milestone(_) => None,
        }
    }

    pub fn as_milestone(&self) -> Option<&Milestone> {
        match self {
            ScheduleItem::Milestone(ms) => Some(ms),
            ScheduleItem::Task(_) => None,
        }
    }
}

/// Connector from the item a date was derived from to the derived item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DependencyPath {
    pub start_name: String,
    pub start_date: NaiveDate,
    pub end_name: String,
    pub end_date: NaiveDate,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub text: String,
    pub member: Vec<String>,
}

impl Group {
    pub fn new(text: impl Into<String>, member: Vec<String>) -> Self {
        Self {
            text: text.into(),
            member,
        }
    }

    /// The implicit group has no label and no header row.
    pub fn is_labeled(&self) -> bool {
        !self.text.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedSchedule {
    pub calendar: WorkCalendar,
    pub schedules: Vec<ScheduleItem>,
    pub dependency_paths: Vec<DependencyPath>,
    /// The implicit unlabeled group always comes first.
    pub groups: Vec<Group>,
}

impl ResolvedSchedule {
    pub fn find(&self, name: &str) -> Option<&ScheduleItem> {
        self.schedules.iter().find(|item| item.name() == name)
    }

    pub fn task(&self, name: &str) -> Option<&Task> {
        self.find(name).and_then(ScheduleItem::as_task)
    }

    pub fn milestone(&self, name: &str) -> Option<&Milestone> {
        self.find(name).and_then(ScheduleItem::as_milestone)
    }

    /// Header-less groups do not take a row.
    pub fn labeled_group_count(&self) -> usize {
        self.groups.iter().filter(|group| group.is_labeled()).count()
    }
}
