pub mod cache;
pub mod calculations;
pub mod calendar;
pub mod colors;
pub mod config;
pub mod document;
pub mod error;
pub mod graph;
#[cfg(feature = "http_api")]
pub mod http_api;
pub mod logging;
pub mod model;
pub mod normalize;
pub mod parser;
pub mod pipeline;
pub mod render;
pub mod resolve;

pub use cache::ResponseCache;
pub use calendar::{Scale, WorkCalendar};
pub use config::{ChartConfig, ColorSet};
pub use document::Document;
pub use error::{ScheduleError, ScheduleResult};
pub use model::{DependencyPath, Group, Milestone, ResolvedSchedule, ScheduleItem, Task};
pub use normalize::Normalizer;
pub use parser::{Parser, parse_notation};
pub use pipeline::{Pipeline, render_json, render_notation, render_yaml};
pub use render::{Renderer, VectorDocument, render, render_error};
pub use resolve::{Resolver, resolve};
