//! Turns a normalized document into concrete, drawable schedule values.

use crate::calculations::{PlanPass, project_actual};
use crate::calendar::{WorkCalendar, parse_date, weekday_from_prefix};
use crate::config::{ChartConfig, ColorSet};
use crate::document::{
    ActualRange, ActualSpec, DateExpr, Document, PlanRange, ProjectSection, StyleSection,
};
use crate::error::{ScheduleError, ScheduleResult};
use crate::graph::DependencyGraph;
use crate::model::{DependencyPath, Group, Milestone, ResolvedSchedule, ScheduleItem, Task};
use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq)]
struct Palette {
    task: ColorSet,
    milestone: ColorSet,
    path: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ItemKind {
    Task(usize),
    Milestone(usize),
}

/// A task or milestone with its plan in the uniform start/end form.
struct Entry {
    name: String,
    kind: ItemKind,
    plan: Option<PlanRange>,
}

pub struct Resolver<'a> {
    config: &'a ChartConfig,
}

impl<'a> Resolver<'a> {
    pub fn new(config: &'a ChartConfig) -> Self {
        Self { config }
    }

    pub fn resolve(&self, document: &Document) -> ScheduleResult<ResolvedSchedule> {
        let calendar = build_calendar(&document.project)?;
        let palette = self.palette(&document.style);
        let entries = collect_entries(document)?;

        let graph = build_graph(&entries);
        if graph.is_cyclic() {
            return Err(ScheduleError::DependencyLoop(graph.cycle_members()));
        }

        let by_name: HashMap<&str, &Entry> = entries
            .iter()
            .map(|entry| (entry.name.as_str(), entry))
            .collect();
        let mut plans = PlanPass::new(&calendar, self.config.dependency_gap_days);
        let order = graph
            .independents()
            .into_iter()
            .chain(graph.resolution_chains().into_iter().flatten());
        for name in order {
            if plans.is_resolved(&name) {
                continue;
            }
            let Some(entry) = by_name.get(name.as_str()) else {
                continue;
            };
            let plan = entry
                .plan
                .as_ref()
                .ok_or_else(|| ScheduleError::MissingField(format!("{name}.plan")))?;
            plans.resolve(&name, plan)?;
        }

        let mut seen = HashSet::new();
        let dependency_paths: Vec<DependencyPath> = entries
            .iter()
            .flat_map(|entry| plans.dependency_paths(&entry.name, &palette.path))
            .filter(|path| seen.insert(path.clone()))
            .collect();

        let mut schedules = Vec::with_capacity(entries.len());
        for entry in &entries {
            let plan = plans
                .get(&entry.name)
                .ok_or_else(|| ScheduleError::MissingField(format!("{}.plan", entry.name)))?;
            let item = match entry.kind {
                ItemKind::Task(idx) => {
                    let record = &document.task[idx];
                    let mut task =
                        Task::new(&record.name, plan.start, plan.end, palette.task.clone());
                    task.text = record.text.clone().unwrap_or_else(|| record.name.clone());
                    task.assignee = record.assignee.clone();
                    if let Some(actual) = &record.actual {
                        let range = match actual {
                            ActualSpec::Range(range) => range.clone(),
                            ActualSpec::Point(start) => ActualRange {
                                start: Some(start.clone()),
                                ..Default::default()
                            },
                        };
                        let dates = project_actual(&record.name, &range, &calendar)?;
                        task.actual_start = dates.start;
                        task.actual_end = dates.end;
                        task.actual_completed = dates.completed;
                        task.actual_progress = dates.progress;
                    }
                    ScheduleItem::Task(task)
                }
                ItemKind::Milestone(idx) => {
                    let record = &document.milestone[idx];
                    let mut ms = Milestone::new(&record.name, plan.start, palette.milestone.clone());
                    ms.text = record.text.clone().unwrap_or_else(|| record.name.clone());
                    ms.actual_happen = record
                        .actual
                        .as_ref()
                        .and_then(ActualSpec::point)
                        .map(|raw| {
                            parse_date(raw).ok_or_else(|| ScheduleError::InvalidDate {
                                context: format!("{}.actual", record.name),
                                value: raw.to_string(),
                            })
                        })
                        .transpose()?;
                    ScheduleItem::Milestone(ms)
                }
            };
            schedules.push(item);
        }

        let groups = build_groups(document, &schedules);
        debug!(
            items = schedules.len(),
            paths = dependency_paths.len(),
            groups = groups.len(),
            "resolved schedule"
        );

        Ok(ResolvedSchedule {
            calendar,
            schedules,
            dependency_paths,
            groups,
        })
    }

    fn palette(&self, style: &StyleSection) -> Palette {
        let defaults = &self.config.default_colors;
        let overrides = |raw: &Option<String>| match raw.as_deref() {
            Some(raw) if !raw.trim().is_empty() => defaults.with_overrides(raw),
            _ => defaults.clone(),
        };
        Palette {
            task: overrides(&style.color.task),
            milestone: overrides(&style.color.milestone),
            path: style
                .color
                .path
                .as_deref()
                .map(str::trim)
                .filter(|path| !path.is_empty())
                .map(|path| path.split('/').next().unwrap_or(path).to_string())
                .unwrap_or_else(|| self.config.default_path_color.clone()),
        }
    }
}

/// Resolve with the default chart configuration.
pub fn resolve(document: &Document) -> ScheduleResult<ResolvedSchedule> {
    Resolver::new(&ChartConfig::default()).resolve(document)
}

fn required_date(field: &str, value: Option<&str>) -> ScheduleResult<NaiveDate> {
    let raw = value.ok_or_else(|| ScheduleError::MissingField(format!("project.{field}")))?;
    parse_date(raw).ok_or_else(|| ScheduleError::InvalidDate {
        context: format!("project.{field}"),
        value: raw.to_string(),
    })
}

fn build_calendar(project: &ProjectSection) -> ScheduleResult<WorkCalendar> {
    let start = required_date("start", project.start.as_deref())?;
    let end = required_date("end", project.end.as_deref())?;
    let today = required_date("today", project.today.as_deref())?;
    if end < start {
        return Err(ScheduleError::InvalidDate {
            context: "project.end (before project.start)".to_string(),
            value: project.end.clone().unwrap_or_default(),
        });
    }

    let mut calendar = WorkCalendar::new(start, end, today, project.scale.unwrap_or_default());
    for entry in &project.closed {
        match parse_date(entry) {
            Some(date) => calendar.add_closed_date(date),
            None if weekday_from_prefix(entry).is_some() => calendar.close_weekday(entry),
            None => debug!(entry = %entry, "closed entry is neither a date nor a weekday"),
        }
    }
    Ok(calendar)
}

fn collect_entries(document: &Document) -> ScheduleResult<Vec<Entry>> {
    let mut names = HashSet::new();
    let mut entries = Vec::with_capacity(document.task.len() + document.milestone.len());

    for (idx, task) in document.task.iter().enumerate() {
        if !names.insert(task.name.clone()) {
            return Err(ScheduleError::DuplicateName(task.name.clone()));
        }
        entries.push(Entry {
            name: task.name.clone(),
            kind: ItemKind::Task(idx),
            plan: task.plan.as_ref().map(|plan| plan.to_range()),
        });
    }
    for (idx, ms) in document.milestone.iter().enumerate() {
        if !names.insert(ms.name.clone()) {
            return Err(ScheduleError::DuplicateName(ms.name.clone()));
        }
        entries.push(Entry {
            name: ms.name.clone(),
            kind: ItemKind::Milestone(idx),
            plan: ms.plan.as_ref().map(|plan| milestone_range(plan.to_range())),
        });
    }
    Ok(entries)
}

/// A milestone happens on one day: a lone start or end stands for both.
fn milestone_range(mut range: PlanRange) -> PlanRange {
    match (&range.start, &range.end) {
        (Some(start), None) if range.period.is_none() => range.end = Some(start.clone()),
        (None, Some(end)) => range.start = Some(end.clone()),
        _ => {}
    }
    range
}

fn build_graph(entries: &[Entry]) -> DependencyGraph {
    let mut graph = DependencyGraph::new(entries.iter().map(|entry| entry.name.clone()));
    for entry in entries {
        let Some(plan) = &entry.plan else {
            continue;
        };
        let references = [plan.start.as_deref(), plan.end.as_deref()]
            .into_iter()
            .flatten()
            .filter_map(DateExpr::parse);
        for expr in references {
            let Some(dep) = expr.reference() else {
                continue;
            };
            if !graph.add_dependency(dep, &entry.name) {
                warn!(item = %entry.name, reference = dep, "dependency does not exist");
            }
        }
    }
    graph
}

fn build_groups(document: &Document, schedules: &[ScheduleItem]) -> Vec<Group> {
    let known: HashSet<&str> = schedules.iter().map(ScheduleItem::name).collect();
    let mut belongs: HashSet<&str> = HashSet::new();
    let mut groups = vec![];

    for record in &document.group {
        let mut member = Vec::with_capacity(record.member.len());
        for name in &record.member {
            if !known.contains(name.as_str()) {
                warn!(group = %record.text, member = %name, "group member does not exist");
                continue;
            }
            belongs.insert(name.as_str());
            member.push(name.clone());
        }
        groups.push(Group::new(record.text.clone(), member));
    }

    let unassigned = schedules
        .iter()
        .map(ScheduleItem::name)
        .filter(|name| !belongs.contains(name))
        .map(str::to_string)
        .collect();
    groups.insert(0, Group::new("", unassigned));
    groups
}
