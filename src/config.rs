use crate::error::ScheduleResult;
use serde::{Deserialize, Serialize};

/// The five color slots of a schedule item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorSet {
    pub plan_fill: String,
    pub plan_outline: String,
    pub actual_fill: String,
    pub actual_outline: String,
    pub text: String,
}

impl Default for ColorSet {
    fn default() -> Self {
        Self {
            plan_fill: "yellowgreen".to_string(),
            plan_outline: "green".to_string(),
            actual_fill: "blueviolet".to_string(),
            actual_outline: "darkviolet".to_string(),
            text: "black".to_string(),
        }
    }
}

impl ColorSet {
    /// Apply a `/`-delimited override list positionally to
    /// plan_fill, plan_outline, text, actual_fill, actual_outline.
    /// Slots past the end of the list keep their current color.
    pub fn with_overrides(&self, overrides: &str) -> Self {
        let mut colors = self.clone();
        let slots: [&mut String; 5] = [
            &mut colors.plan_fill,
            &mut colors.plan_outline,
            &mut colors.text,
            &mut colors.actual_fill,
            &mut colors.actual_outline,
        ];
        for (slot, value) in slots.into_iter().zip(overrides.split('/')) {
            let value = value.trim();
            if !value.is_empty() {
                *slot = value.to_string();
            }
        }
        colors
    }
}

/// Immutable chart settings shared by the resolver and the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub row_height: f64,
    pub daily_column_width: f64,
    pub weekly_column_width: f64,
    pub hours_per_day: f64,
    /// Business days kept between an item and the item it is derived from.
    pub dependency_gap_days: i64,
    pub default_colors: ColorSet,
    pub default_path_color: String,
    pub font_family: String,
    pub grid_color: String,
    pub closed_fill: String,
    pub today_color: String,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            row_height: 16.0,
            daily_column_width: 16.0,
            weekly_column_width: 8.0,
            hours_per_day: 8.0,
            dependency_gap_days: 2,
            default_colors: ColorSet::default(),
            default_path_color: "blue".to_string(),
            font_family: "Serif".to_string(),
            grid_color: "#C0C0C0".to_string(),
            closed_fill: "#D0D0D0".to_string(),
            today_color: "#FF0000".to_string(),
        }
    }
}

impl ChartConfig {
    pub fn from_json_str(raw: &str) -> ScheduleResult<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}
