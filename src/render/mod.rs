//! Layout of a resolved schedule into positioned vector primitives.
//!
//! Every primitive is pushed with its draw layer and the finished document
//! is stably sorted by layer, so construction order only matters within a
//! layer.

pub mod error_text;
pub mod layout;
pub mod svg;
pub mod vector;

pub use error_text::{append_error, render_error};
pub use layout::Layout;
pub use vector::{
    Anchor, Baseline, Element, Point, Primitive, Stroke, TextStyle, Transform, VectorDocument, z,
};

use crate::calendar::{Scale, WorkCalendar, days_remaining_in_month, weekday_short_label};
use crate::config::ChartConfig;
use crate::model::{DependencyPath, Group, Milestone, ResolvedSchedule, ScheduleItem, Task};
use chrono::{Datelike, Weekday};
use std::collections::HashMap;
use tracing::debug;

pub const ARROWHEAD_ID: &str = "arrowhead";
const ARROWHEAD_WIDTH: f64 = 5.0;
const ARROWHEAD_HEIGHT: f64 = 10.0;

/// Month labels shorter than this many visible days shrink to the bare month number.
const MIN_DAYS_FOR_FULL_MONTH_LABEL: i64 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Heading {
    Right,
    Down,
    Left,
    Up,
}

impl Heading {
    fn degrees(self) -> f64 {
        match self {
            Heading::Right => 0.0,
            Heading::Down => 90.0,
            Heading::Left => 180.0,
            Heading::Up => 270.0,
        }
    }
}

pub struct Renderer<'a> {
    config: &'a ChartConfig,
}

impl<'a> Renderer<'a> {
    pub fn new(config: &'a ChartConfig) -> Self {
        Self { config }
    }

    pub fn render(&self, schedule: &ResolvedSchedule) -> VectorDocument {
        let layout = Layout::new(self.config, schedule);
        let mut doc = VectorDocument::new(layout.width, layout.height);
        doc.defs.push(arrowhead_symbol());

        self.draw_calendar(&mut doc, &layout, &schedule.calendar);
        let rows = self.draw_rows(&mut doc, &layout, schedule);
        for path in &schedule.dependency_paths {
            match self.dependency_arrow(&layout, &rows, path) {
                Some(arrow) => doc.push(z::PATH, arrow),
                None => debug!(
                    from = %path.start_name,
                    to = %path.end_name,
                    "skipping dependency path to an item without a row"
                ),
            }
        }

        doc.sort_by_layer();
        doc
    }

    fn grid_stroke(&self) -> Stroke {
        Stroke::new(&self.config.grid_color, 1.0)
    }

    fn text_style(&self, font_size: f64) -> TextStyle {
        TextStyle::new(&self.config.font_family, font_size)
    }

    fn draw_calendar(&self, doc: &mut VectorDocument, layout: &Layout, calendar: &WorkCalendar) {
        let (w, h) = (layout.column_width, layout.row_height);
        let header = layout.header_height();
        let (width, height) = (layout.width, layout.height);

        let mut prev_month = None;
        for date in calendar.days() {
            let x = layout.x(date);
            if prev_month != Some(date.month()) {
                prev_month = Some(date.month());
                let visible = days_remaining_in_month(date).min((calendar.end - date).num_days() + 1);
                let label = if visible < MIN_DAYS_FOR_FULL_MONTH_LABEL {
                    date.month().to_string()
                } else {
                    format!("{}/{}", date.year(), date.month())
                };
                doc.push(
                    z::GRID,
                    Primitive::text(Point::new(x + 1.0, 1.0), label, self.text_style(13.0).bold()),
                );
                doc.push(
                    z::FRAME,
                    Primitive::line(Point::new(x, 0.0), Point::new(x, height), self.grid_stroke()),
                );
            }

            match calendar.scale {
                Scale::Daily => {
                    let day_style = self.text_style(11.0).centered();
                    doc.push(
                        z::GRID,
                        Primitive::text(
                            Point::new(x + w / 2.0, h + 1.0),
                            weekday_short_label(date.weekday()),
                            day_style.clone(),
                        ),
                    );
                    doc.push(
                        z::GRID,
                        Primitive::text(
                            Point::new(x + w / 2.0, h * 2.0 + 1.0),
                            date.day().to_string(),
                            day_style,
                        ),
                    );
                    doc.push(
                        z::GRID,
                        Primitive::line(Point::new(x, header), Point::new(x, height), self.grid_stroke()),
                    );
                }
                Scale::Weekly if date.weekday() == Weekday::Mon => {
                    doc.push(
                        z::GRID,
                        Primitive::text(
                            Point::new(x + 1.0, h + 1.0),
                            date.day().to_string(),
                            self.text_style(11.0),
                        ),
                    );
                    doc.push(
                        z::GRID,
                        Primitive::line(Point::new(x, header), Point::new(x, height), self.grid_stroke()),
                    );
                }
                Scale::Weekly => {}
            }
        }

        let window = calendar.start..=calendar.end;
        for &closed in calendar.closed_dates().iter().filter(|date| window.contains(*date)) {
            doc.push(
                z::CLOSED,
                Primitive::Rect {
                    origin: Point::new(layout.x(closed), header),
                    width: w,
                    height: height - header,
                    radius: 0.0,
                    fill: self.config.closed_fill.clone(),
                    stroke: None,
                },
            );
        }

        let frame = [
            (Point::new(width, 0.0), Point::new(width, height)),
            (Point::new(0.0, 0.0), Point::new(width, 0.0)),
            (Point::new(0.0, header), Point::new(width, header)),
        ];
        for (from, to) in frame {
            doc.push(z::FRAME, Primitive::line(from, to, self.grid_stroke()));
        }

        let today = layout.x(calendar.today);
        doc.push(
            z::TODAY,
            Primitive::line(
                Point::new(today, 0.0),
                Point::new(today, height),
                Stroke::new(&self.config.today_color, 3.0),
            ),
        );
    }

    /// Lay out group headers and items top to bottom; returns each item's row top.
    fn draw_rows<'s>(
        &self,
        doc: &mut VectorDocument,
        layout: &Layout,
        schedule: &'s ResolvedSchedule,
    ) -> HashMap<&'s str, f64> {
        let mut rows = HashMap::new();
        let mut index = 0;
        for group in &schedule.groups {
            if group.is_labeled() {
                self.draw_group_header(doc, layout, group, layout.row_y(index));
                index += 1;
            }
            for name in &group.member {
                let Some(item) = schedule.find(name) else {
                    continue;
                };
                let y = layout.row_y(index);
                match item {
                    ScheduleItem::Task(task) => self.draw_task(doc, layout, task, y),
                    ScheduleItem::Milestone(ms) => self.draw_milestone(doc, layout, ms, y),
                }
                rows.insert(item.name(), y);
                index += 1;
            }
        }
        rows
    }

    fn draw_group_header(&self, doc: &mut VectorDocument, layout: &Layout, group: &Group, y: f64) {
        let h = layout.row_height;
        let center = layout.width / 2.0;
        let half_label = (display_width(&group.text) as f64 * 8.0 + 10.0) / 2.0;
        let stroke = Stroke::new("black", 1.0);

        for offset in [h / 3.0, h * 2.0 / 3.0] {
            doc.push(
                z::BODY,
                Primitive::line(
                    Point::new(0.0, y + offset),
                    Point::new(center - half_label, y + offset),
                    stroke.clone(),
                ),
            );
            doc.push(
                z::BODY,
                Primitive::line(
                    Point::new(center + half_label, y + offset),
                    Point::new(layout.width, y + offset),
                    stroke.clone(),
                ),
            );
        }
        doc.push(
            z::BODY,
            Primitive::text(
                Point::new(center, y + h / 2.0),
                group.text.clone(),
                self.text_style(13.0).centered().middle_baseline(),
            ),
        );
    }

    fn draw_task(&self, doc: &mut VectorDocument, layout: &Layout, task: &Task, y: f64) {
        let (w, h) = (layout.column_width, layout.row_height);
        let colors = &task.colors;

        let plan_x = layout.x(task.plan_start);
        let plan_right = layout.x(task.plan_end) + w;
        doc.push(
            z::BODY,
            Primitive::Rect {
                origin: Point::new(plan_x, y),
                width: plan_right - plan_x,
                height: h,
                radius: 6.0,
                fill: colors.plan_fill.clone(),
                stroke: Some(Stroke::new(&colors.plan_outline, 1.0)),
            },
        );
        doc.push(
            z::OVERLAY,
            Primitive::text(
                Point::new(plan_x + 2.0, y + 2.0),
                task.label(),
                self.text_style(13.0).fill(&colors.text),
            ),
        );

        let (Some(actual_start), Some(actual_end)) = (task.actual_start, task.actual_end) else {
            return;
        };
        let bar_x = layout.x(actual_start);
        let bar_right = layout.x(actual_end) + w;
        let bar_y = y + h + 2.0;
        let outline = Stroke::new(&colors.actual_outline, 1.0);

        // The projected range stays outline-only while only part of it is observed.
        let (fill, stroke) = match task.actual_completed {
            Some(_) => ("#FFFFFF".to_string(), outline.clone().dashed("4 3")),
            None => (colors.actual_fill.clone(), outline.clone()),
        };
        doc.push(
            z::BODY,
            Primitive::Rect {
                origin: Point::new(bar_x, bar_y),
                width: bar_right - bar_x,
                height: 4.0,
                radius: 2.0,
                fill,
                stroke: Some(stroke),
            },
        );

        if let Some(progress) = task.actual_progress {
            doc.push(
                z::OVERLAY,
                Primitive::text(
                    Point::new(bar_right + 2.0, y + h + 5.0),
                    format!("{:.0}%", progress * 100.0),
                    self.text_style(10.0).bold().middle_baseline(),
                ),
            );
        }

        if let Some(completed) = task.actual_completed {
            let observed = layout.x(completed) - bar_x;
            if observed > 0.0 {
                doc.push(
                    z::OVERLAY,
                    Primitive::Rect {
                        origin: Point::new(bar_x, bar_y),
                        width: observed,
                        height: 4.0,
                        radius: 2.0,
                        fill: colors.actual_fill.clone(),
                        stroke: Some(outline),
                    },
                );
            }
        }
    }

    fn draw_milestone(&self, doc: &mut VectorDocument, layout: &Layout, ms: &Milestone, y: f64) {
        let h = layout.row_height;
        let center_x = |date| layout.x(date) + layout.column_width / 2.0;

        let cx = center_x(ms.plan_happen);
        doc.push(
            z::BODY,
            Primitive::Polyline {
                points: diamond(cx, y + h / 2.0, h / 2.0),
                fill: Some(ms.colors.plan_fill.clone()),
                stroke: Some(Stroke::new(&ms.colors.plan_outline, 1.0)),
            },
        );
        doc.push(
            z::OVERLAY,
            Primitive::text(
                Point::new(cx + h / 2.0 + 2.0, y + 2.0),
                ms.text.clone(),
                self.text_style(13.0).fill(&ms.colors.text),
            ),
        );

        if let Some(actual) = ms.actual_happen {
            doc.push(
                z::OVERLAY,
                Primitive::Polyline {
                    points: diamond(center_x(actual), y + h / 2.0, h / 4.0),
                    fill: Some(ms.colors.actual_fill.clone()),
                    stroke: Some(Stroke::new(&ms.colors.actual_outline, 1.0)),
                },
            );
        }
    }

    /// Right-angle connector from the source item's date cell to the target's.
    ///
    /// Going down the chart the path leaves the source vertically and enters
    /// the target horizontally; otherwise it leaves horizontally and enters
    /// the target from below.
    fn dependency_arrow(
        &self,
        layout: &Layout,
        rows: &HashMap<&str, f64>,
        path: &DependencyPath,
    ) -> Option<Primitive> {
        let (w, h) = (layout.column_width, layout.row_height);
        let source_y = *rows.get(path.start_name.as_str())?;
        let target_y = *rows.get(path.end_name.as_str())?;
        let forward = path.start_date < path.end_date;

        let (first, last) = match (source_y < target_y, forward) {
            (true, true) => (Heading::Down, Heading::Right),
            (true, false) => (Heading::Down, Heading::Left),
            (false, true) => (Heading::Right, Heading::Up),
            (false, false) => (Heading::Left, Heading::Up),
        };

        let source_x = layout.x(path.start_date);
        let target_x = layout.x(path.end_date);
        let start = match first {
            Heading::Down => Point::new(source_x + w / 2.0, source_y + h),
            Heading::Right => Point::new(source_x + w, source_y + h / 2.0),
            _ => Point::new(source_x, source_y + h / 2.0),
        };
        let end = match (first, last) {
            (Heading::Down, Heading::Right) => Point::new(target_x, target_y + h / 2.0),
            (Heading::Down, _) => Point::new(target_x + w, target_y + h / 2.0),
            _ => Point::new(target_x + w / 2.0, target_y + h),
        };
        let corner = match first {
            Heading::Down => Point::new(start.x, end.y),
            _ => Point::new(end.x, start.y),
        };

        let stroke = Stroke::new(&path.color, 2.0);
        Some(Primitive::Group {
            id: Some(format!("path-{}-to-{}", path.start_name, path.end_name)),
            transform: None,
            children: vec![
                Primitive::line(start, corner, stroke.clone()),
                Primitive::line(corner, end, stroke),
                Primitive::Group {
                    id: None,
                    transform: Some(Transform {
                        translate: end,
                        rotate: last.degrees(),
                    }),
                    children: vec![Primitive::Use {
                        href: format!("#{ARROWHEAD_ID}"),
                        fill: Some(path.color.clone()),
                    }],
                },
            ],
        })
    }
}

/// Render with the default chart configuration.
pub fn render(schedule: &ResolvedSchedule) -> VectorDocument {
    Renderer::new(&ChartConfig::default()).render(schedule)
}

/// A rightward arrowhead whose tip sits on the origin.
fn arrowhead_symbol() -> Primitive {
    Primitive::Group {
        id: Some(ARROWHEAD_ID.to_string()),
        transform: Some(Transform {
            translate: Point::new(-ARROWHEAD_WIDTH, -ARROWHEAD_HEIGHT / 2.0),
            rotate: 0.0,
        }),
        children: vec![Primitive::Polyline {
            points: vec![
                Point::new(0.0, 0.0),
                Point::new(0.0, ARROWHEAD_HEIGHT),
                Point::new(ARROWHEAD_WIDTH, ARROWHEAD_HEIGHT / 2.0),
                Point::new(0.0, 0.0),
            ],
            fill: None,
            stroke: None,
        }],
    }
}

fn diamond(cx: f64, cy: f64, radius: f64) -> Vec<Point> {
    vec![
        Point::new(cx, cy - radius),
        Point::new(cx - radius, cy),
        Point::new(cx, cy + radius),
        Point::new(cx + radius, cy),
        Point::new(cx, cy - radius),
    ]
}

/// Label width in half-width cells: wide characters count twice.
fn display_width(text: &str) -> usize {
    text.chars()
        .map(|c| if c.len_utf8() > 1 { 2 } else { 1 })
        .sum()
}

