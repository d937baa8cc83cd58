//! Line-oriented schedule notation.
//!
//! Every line is matched against a fixed, ordered rule table; the first rule
//! whose pattern matches handles the line, even when the handler then
//! discards it. Items are registered into the output the first time their
//! attribute lines make them complete enough to draw.

use crate::calendar::{Scale, format_date, parse_date, weekday_from_prefix, weekday_full_name};
use crate::colors::is_valid_color;
use crate::document::{
    ActualRange, ActualSpec, DateExpr, Document, GroupRecord, MilestoneRecord, PlanRange,
    PlanSpec, Scalar, TaskRecord,
};
use chrono::Weekday;
use regex::{Captures, Regex};
use std::str::FromStr;
use std::sync::LazyLock;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineKind {
    Comment,
    ProjectPeriod,
    Closed,
    Today,
    Scale,
    Color,
    Group,
    Task,
    Milestone,
    Attribute,
}

static RULES: LazyLock<Vec<(LineKind, Regex)>> = LazyLock::new(|| {
    [
        (LineKind::Comment, r"^#.*$"),
        (LineKind::ProjectPeriod, r"^[pP]roject lasts (.*) to (.*)$"),
        (LineKind::Closed, r"^(.*) (?:are|is) closed$"),
        (LineKind::Today, r"^today is (.*)$"),
        (LineKind::Scale, r"^scale is (.*)$"),
        (
            LineKind::Color,
            r"^(tasks?|milestones?|paths?) (?:are|is) colored (.*)$",
        ),
        (LineKind::Group, r"^(?:--|==).*$"),
        (LineKind::Task, r"^([^!\s:]+)(\s*:\s*)?(.*)$"),
        (LineKind::Milestone, r"^!([^\s:]+)(:\s*)?(.*)$"),
        (LineKind::Attribute, r"^  \S.*$"),
    ]
    .into_iter()
    .map(|(kind, pattern)| {
        let regex = Regex::new(pattern).expect("notation rule patterns are valid");
        (kind, regex)
    })
    .collect()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Marker {
    Start,
    End,
    Period,
    Point,
}

impl Marker {
    fn from_char(c: char) -> Option<Self> {
        match c {
            '>' => Some(Marker::Start),
            '<' => Some(Marker::End),
            '=' => Some(Marker::Period),
            '!' => Some(Marker::Point),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Attribute {
    Plan(Marker, String),
    Actual(Marker, String),
    Progress(String),
    Assignee(String),
}

/// The item currently receiving attribute lines.
#[derive(Debug, Clone)]
enum ActiveItem {
    PendingTask(TaskRecord),
    PendingMilestone(MilestoneRecord),
    Task(usize),
    Milestone(usize),
}

/// Mutable state threaded through every line handler.
#[derive(Debug, Clone, Default)]
pub struct ParserContext {
    active_group: Option<usize>,
    active_item: Option<ActiveItem>,
}

trait ScheduleRecord {
    fn name(&self) -> &str;
    fn plan_mut(&mut self) -> &mut Option<PlanSpec>;
    fn actual_mut(&mut self) -> &mut Option<ActualSpec>;
    fn set_assignee(&mut self, assignee: String);
    fn is_ready(&self) -> bool;
}

impl ScheduleRecord for TaskRecord {
    fn name(&self) -> &str {
        &self.name
    }

    fn plan_mut(&mut self) -> &mut Option<PlanSpec> {
        &mut self.plan
    }

    fn actual_mut(&mut self) -> &mut Option<ActualSpec> {
        &mut self.actual
    }

    fn set_assignee(&mut self, assignee: String) {
        self.assignee = Some(assignee);
    }

    /// A task needs a start and either an end or a period.
    fn is_ready(&self) -> bool {
        match &self.plan {
            Some(PlanSpec::Range(range)) => {
                range.start.is_some() && (range.end.is_some() || range.period.is_some())
            }
            _ => false,
        }
    }
}

impl ScheduleRecord for MilestoneRecord {
    fn name(&self) -> &str {
        &self.name
    }

    fn plan_mut(&mut self) -> &mut Option<PlanSpec> {
        &mut self.plan
    }

    fn actual_mut(&mut self) -> &mut Option<ActualSpec> {
        &mut self.actual
    }

    fn set_assignee(&mut self, _assignee: String) {}

    /// Any plan value is enough for a milestone.
    fn is_ready(&self) -> bool {
        match &self.plan {
            Some(PlanSpec::Point(_)) => true,
            Some(PlanSpec::Range(range)) => {
                range.start.is_some() || range.end.is_some() || range.period.is_some()
            }
            None => false,
        }
    }
}

pub struct Parser {
    output: Document,
    context: ParserContext,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    pub fn new() -> Self {
        Self {
            output: Document::default(),
            context: ParserContext::default(),
        }
    }

    pub fn parse(mut self, input: &str) -> Document {
        for line in input.lines() {
            self.feed_line(line);
        }
        self.finish()
    }

    pub fn finish(mut self) -> Document {
        self.replace_active(None, "at end of input");
        self.output
    }

    pub fn document(&self) -> &Document {
        &self.output
    }

    pub fn feed_line(&mut self, line: &str) {
        let matched = RULES
            .iter()
            .find_map(|(kind, regex)| regex.captures(line).map(|caps| (*kind, caps)));
        let Some((kind, caps)) = matched else {
            return;
        };

        match kind {
            LineKind::Comment => {}
            LineKind::ProjectPeriod => self.project_period(&caps),
            LineKind::Closed => self.closed(&caps),
            LineKind::Today => self.today(&caps),
            LineKind::Scale => self.scale(&caps),
            LineKind::Color => self.color(&caps),
            LineKind::Group => self.group(line),
            LineKind::Task => self.task(&caps),
            LineKind::Milestone => self.milestone(&caps),
            LineKind::Attribute => self.attribute(line),
        }
    }

    fn project_period(&mut self, caps: &Captures<'_>) {
        let (start, end) = (&caps[1], &caps[2]);
        if parse_date(start).is_some() && parse_date(end).is_some() {
            self.output.project.start = Some(start.trim().to_string());
            self.output.project.end = Some(end.trim().to_string());
        }
    }

    fn closed(&mut self, caps: &Captures<'_>) {
        let entry = caps[1].trim();
        let Some((from, to)) = entry.split_once(" to ") else {
            self.output.project.closed.push(entry.to_string());
            return;
        };

        if let (Some(first), Some(last)) = (parse_date(from), parse_date(to)) {
            let dates = first
                .iter_days()
                .take_while(|date| *date <= last)
                .map(format_date);
            self.output.project.closed.extend(dates);
            return;
        }
        if let (Some(first), Some(last)) = (weekday_from_prefix(from), weekday_from_prefix(to)) {
            self.output.project.closed.extend(
                weekday_span(first, last)
                    .into_iter()
                    .map(|wd| weekday_full_name(wd).to_string()),
            );
            return;
        }
        debug!(entry, "ignoring closed range with mismatched bounds");
    }

    fn today(&mut self, caps: &Captures<'_>) {
        let value = caps[1].trim();
        if parse_date(value).is_some() {
            self.output.project.today = Some(value.to_string());
        }
    }

    fn scale(&mut self, caps: &Captures<'_>) {
        if let Ok(scale) = Scale::from_str(&caps[1]) {
            self.output.project.scale = Some(scale);
        }
    }

    fn color(&mut self, caps: &Captures<'_>) {
        let colors = caps[2].trim();
        if !colors.split('/').all(is_valid_color) {
            return;
        }
        let kind = caps[1].trim_end_matches('s');
        let style = &mut self.output.style.color;
        let slot = match kind {
            "task" => &mut style.task,
            "milestone" => &mut style.milestone,
            _ => &mut style.path,
        };
        *slot = Some(colors.to_string());
    }

    fn group(&mut self, line: &str) {
        let text = line.trim_matches(|c: char| c == '-' || c == '=' || c == ' ');
        self.output.group.push(GroupRecord {
            text: text.to_string(),
            member: Vec::new(),
        });
        self.context.active_group = Some(self.output.group.len() - 1);
    }

    fn task(&mut self, caps: &Captures<'_>) {
        let mut task = TaskRecord::new(&caps[1]);
        task.text = item_text(caps);
        self.replace_active(Some(ActiveItem::PendingTask(task)), "replaced by a new item");
    }

    fn milestone(&mut self, caps: &Captures<'_>) {
        let mut ms = MilestoneRecord::new(&caps[1]);
        ms.text = item_text(caps);
        self.replace_active(Some(ActiveItem::PendingMilestone(ms)), "replaced by a new item");
    }

    /// Swap in the next active item, logging an unfinished one that is dropped.
    fn replace_active(&mut self, next: Option<ActiveItem>, reason: &str) {
        match std::mem::replace(&mut self.context.active_item, next) {
            Some(ActiveItem::PendingTask(task)) => {
                debug!(name = %task.name, reason, "dropping incomplete task");
            }
            Some(ActiveItem::PendingMilestone(ms)) => {
                debug!(name = %ms.name, reason, "dropping incomplete milestone");
            }
            _ => {}
        }
    }

    fn attribute(&mut self, line: &str) {
        let Some(attribute) = parse_attribute(line) else {
            return;
        };
        let Some(active) = self.context.active_item.as_mut() else {
            warn!(line, "attribute line without a preceding task or milestone");
            return;
        };

        match active {
            ActiveItem::PendingTask(task) => apply_attribute(task, attribute),
            ActiveItem::PendingMilestone(ms) => apply_attribute(ms, attribute),
            ActiveItem::Task(idx) => apply_attribute(&mut self.output.task[*idx], attribute),
            ActiveItem::Milestone(idx) => {
                apply_attribute(&mut self.output.milestone[*idx], attribute)
            }
        }

        self.register_if_ready();
    }

    /// Move the active item into the output the first time it is complete.
    fn register_if_ready(&mut self) {
        let name = match self.context.active_item.take() {
            Some(ActiveItem::PendingTask(task)) if task.is_ready() => {
                let name = task.name.clone();
                self.output.task.push(task);
                self.context.active_item = Some(ActiveItem::Task(self.output.task.len() - 1));
                name
            }
            Some(ActiveItem::PendingMilestone(ms)) if ms.is_ready() => {
                let name = ms.name.clone();
                self.output.milestone.push(ms);
                self.context.active_item =
                    Some(ActiveItem::Milestone(self.output.milestone.len() - 1));
                name
            }
            other => {
                self.context.active_item = other;
                return;
            }
        };

        debug!(name = %name, "registered schedule item");
        if let Some(group) = self
            .context
            .active_group
            .and_then(|idx| self.output.group.get_mut(idx))
        {
            if !group.member.contains(&name) {
                group.member.push(name);
            }
        }
    }
}

/// Parse a schedule notation into a structured document.
pub fn parse_notation(input: &str) -> Document {
    Parser::new().parse(input)
}

fn item_text(caps: &Captures<'_>) -> Option<String> {
    let text = caps
        .get(3)
        .map(|m| m.as_str().trim().trim_matches(|c: char| c == '\'' || c == '"'))
        .unwrap_or_default();
    (!text.is_empty()).then(|| text.to_string())
}

fn weekday_span(first: Weekday, last: Weekday) -> Vec<Weekday> {
    let mut days = vec![first];
    let mut current = first;
    while current != last {
        current = current.succ();
        days.push(current);
    }
    days
}

fn parse_attribute(line: &str) -> Option<Attribute> {
    let body = line.strip_prefix("  ")?;

    if let Some(rest) = body.strip_prefix('@') {
        return Some(Attribute::Assignee(rest.trim().to_string()));
    }
    if let Some(rest) = body.strip_prefix(".-") {
        let value = rest.trim();
        return is_progress_literal(value).then(|| Attribute::Progress(value.to_string()));
    }
    if let Some(rest) = body.strip_prefix('.') {
        let (marker, value) = split_marker(rest)?;
        return is_marker_value(marker, &value).then_some(Attribute::Actual(marker, value));
    }

    // `  >>v` spells the plan block explicitly; `  >v` is the short form.
    let rest = match body.strip_prefix('>') {
        Some(tail) if tail.starts_with(['>', '<', '=', '!']) => tail,
        _ => body,
    };
    let (marker, value) = split_marker(rest)?;
    is_marker_value(marker, &value).then_some(Attribute::Plan(marker, value))
}

fn split_marker(rest: &str) -> Option<(Marker, String)> {
    let mut chars = rest.chars();
    let marker = Marker::from_char(chars.next()?)?;
    Some((marker, chars.as_str().trim().to_string()))
}

fn is_marker_value(marker: Marker, value: &str) -> bool {
    match marker {
        Marker::Period => value.ends_with("days"),
        Marker::Start | Marker::End | Marker::Point => DateExpr::is_acceptable(value),
    }
}

fn is_progress_literal(value: &str) -> bool {
    value.ends_with('%') || value.split('/').count() == 2 || value.parse::<f64>().is_ok()
}

fn apply_attribute<R: ScheduleRecord>(record: &mut R, attribute: Attribute) {
    match attribute {
        Attribute::Plan(Marker::Point, value) => *record.plan_mut() = Some(PlanSpec::Point(value)),
        Attribute::Plan(marker, value) => {
            let plan = record
                .plan_mut()
                .get_or_insert_with(|| PlanSpec::Range(PlanRange::default()))
                .range_mut();
            match marker {
                Marker::Start => plan.start = Some(value),
                Marker::End => plan.end = Some(value),
                Marker::Period => plan.period = Some(Scalar::Text(value)),
                Marker::Point => {}
            }
        }
        Attribute::Actual(Marker::Point, value) => {
            *record.actual_mut() = Some(ActualSpec::Point(value))
        }
        Attribute::Actual(marker, value) => {
            let actual = actual_range(record);
            match marker {
                Marker::Start => actual.start = Some(value),
                Marker::End => actual.end = Some(value),
                Marker::Period => actual.period = Some(Scalar::Text(value)),
                Marker::Point => {}
            }
        }
        Attribute::Progress(value) => actual_range(record).progress = Some(Scalar::Text(value)),
        Attribute::Assignee(value) => record.set_assignee(value),
    }
    debug!(name = record.name(), "applied attribute");
}

fn actual_range<R: ScheduleRecord>(record: &mut R) -> &mut ActualRange {
    record
        .actual_mut()
        .get_or_insert_with(|| ActualSpec::Range(ActualRange::default()))
        .range_mut()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_markers_accept_short_and_prefixed_forms() {
        assert_eq!(
            parse_attribute("  >2020/4/1"),
            Some(Attribute::Plan(Marker::Start, "2020/4/1".to_string()))
        );
        assert_eq!(
            parse_attribute("  >>2020/4/1"),
            Some(Attribute::Plan(Marker::Start, "2020/4/1".to_string()))
        );
        assert_eq!(
            parse_attribute("  ><A's end"),
            Some(Attribute::Plan(Marker::End, "A's end".to_string()))
        );
        assert_eq!(
            parse_attribute("  =3 days"),
            Some(Attribute::Plan(Marker::Period, "3 days".to_string()))
        );
    }

    #[test]
    fn actual_and_extra_markers() {
        assert_eq!(
            parse_attribute("  .>2020/4/2"),
            Some(Attribute::Actual(Marker::Start, "2020/4/2".to_string()))
        );
        assert_eq!(
            parse_attribute("  .-20%"),
            Some(Attribute::Progress("20%".to_string()))
        );
        assert_eq!(
            parse_attribute("  @alice"),
            Some(Attribute::Assignee("alice".to_string()))
        );
    }

    #[test]
    fn rejects_invalid_values() {
        assert_eq!(parse_attribute("  >tomorrow"), None);
        assert_eq!(parse_attribute("  =3 hours"), None);
        assert_eq!(parse_attribute("  .-lots"), None);
        assert_eq!(parse_attribute("  ?what"), None);
    }

    #[derive(Clone, Default)]
    struct Captured(std::sync::Arc<parking_lot::Mutex<Vec<u8>>>);

    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn replaced_pending_items_are_logged() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            parse_notation("draft\n  >2020/4/1\n!gate\nlast\n");
        });

        let logs = String::from_utf8(captured.0.lock().clone()).unwrap();
        assert!(logs.contains("dropping incomplete task"), "{logs}");
        assert!(logs.contains("name=draft reason=\"replaced by a new item\""), "{logs}");
        assert!(logs.contains("dropping incomplete milestone"), "{logs}");
        assert!(logs.contains("name=gate"), "{logs}");
        assert!(logs.contains("name=last reason=\"at end of input\""), "{logs}");
    }

    #[test]
    fn weekday_span_wraps_the_week() {
        assert_eq!(
            weekday_span(Weekday::Sat, Weekday::Mon),
            vec![Weekday::Sat, Weekday::Sun, Weekday::Mon]
        );
    }
}
