use crate::calendar::Scale;
use crate::config::ChartConfig;
use crate::model::ResolvedSchedule;
use chrono::NaiveDate;

/// Coordinates of a chart: day columns left to right, one row pair per
/// group header or schedule item below the calendar header.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layout {
    pub start: NaiveDate,
    pub column_width: f64,
    pub row_height: f64,
    pub header_rows: usize,
    pub width: f64,
    pub height: f64,
}

impl Layout {
    pub fn new(config: &ChartConfig, schedule: &ResolvedSchedule) -> Self {
        let calendar = &schedule.calendar;
        let (column_width, header_rows) = match calendar.scale {
            Scale::Daily => (config.daily_column_width, 3),
            Scale::Weekly => (config.weekly_column_width, 2),
        };
        let rows = schedule.labeled_group_count()
            + schedule
                .groups
                .iter()
                .map(|group| group.member.len())
                .sum::<usize>();
        let row_height = config.row_height;
        Self {
            start: calendar.start,
            column_width,
            row_height,
            header_rows,
            width: column_width * calendar.day_count() as f64,
            // One spare row pair below the last item.
            height: row_height * header_rows as f64 + 2.0 * row_height * (rows + 1) as f64,
        }
    }

    pub fn header_height(&self) -> f64 {
        self.row_height * self.header_rows as f64
    }

    /// Left edge of the column for `date`.
    pub fn x(&self, date: NaiveDate) -> f64 {
        self.column_width * (date - self.start).num_days() as f64
    }

    /// Top of the item body in row pair `index`.
    pub fn row_y(&self, index: usize) -> f64 {
        self.header_height() + self.row_height + 2.0 * self.row_height * index as f64
    }
}
