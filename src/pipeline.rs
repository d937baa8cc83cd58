//! parse → normalize → resolve → render, end to end.

use crate::calendar::Scale;
use crate::config::ChartConfig;
use crate::document::Document;
use crate::error::ScheduleResult;
use crate::model::ResolvedSchedule;
use crate::normalize::Normalizer;
use crate::parser::parse_notation;
use crate::render::{Renderer, VectorDocument};
use crate::resolve::Resolver;
use serde_json::Value;

pub struct Pipeline<'a> {
    config: &'a ChartConfig,
    scale: Option<Scale>,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: &'a ChartConfig) -> Self {
        Self {
            config,
            scale: None,
        }
    }

    /// Draw at `scale` whatever the document asks for.
    pub fn with_scale(mut self, scale: Option<Scale>) -> Self {
        self.scale = scale;
        self
    }

    pub fn resolve_value(&self, mut value: Value) -> ScheduleResult<ResolvedSchedule> {
        Normalizer::new(self.config).normalize(&mut value)?;
        let document = Document::from_value(value)?;
        let mut schedule = Resolver::new(self.config).resolve(&document)?;
        if let Some(scale) = self.scale {
            schedule.calendar.scale = scale;
        }
        Ok(schedule)
    }

    pub fn resolve_notation(&self, input: &str) -> ScheduleResult<ResolvedSchedule> {
        let value = parse_notation(input).to_value()?;
        self.resolve_value(value)
    }

    pub fn resolve_json(&self, input: &str) -> ScheduleResult<ResolvedSchedule> {
        let value: Value = serde_json::from_str(input)?;
        self.resolve_value(value)
    }

    /// YAML documents share the JSON document shape and go through the same normalizer.
    pub fn resolve_yaml(&self, input: &str) -> ScheduleResult<ResolvedSchedule> {
        let value: Value = serde_yaml::from_str(input)?;
        self.resolve_value(value)
    }

    pub fn render_notation(&self, input: &str) -> ScheduleResult<VectorDocument> {
        let schedule = self.resolve_notation(input)?;
        Ok(Renderer::new(self.config).render(&schedule))
    }

    pub fn render_json(&self, input: &str) -> ScheduleResult<VectorDocument> {
        let schedule = self.resolve_json(input)?;
        Ok(Renderer::new(self.config).render(&schedule))
    }

    pub fn render_yaml(&self, input: &str) -> ScheduleResult<VectorDocument> {
        let schedule = self.resolve_yaml(input)?;
        Ok(Renderer::new(self.config).render(&schedule))
    }
}

/// Render schedule notation with the default configuration.
pub fn render_notation(input: &str) -> ScheduleResult<VectorDocument> {
    Pipeline::new(&ChartConfig::default()).render_notation(input)
}

/// Render a JSON schedule document with the default configuration.
pub fn render_json(input: &str) -> ScheduleResult<VectorDocument> {
    Pipeline::new(&ChartConfig::default()).render_json(input)
}

/// Render a YAML schedule document with the default configuration.
pub fn render_yaml(input: &str) -> ScheduleResult<VectorDocument> {
    Pipeline::new(&ChartConfig::default()).render_yaml(input)
}
