use serde::{Deserialize, Serialize};

/// Draw-order layers; lower values are emitted first.
pub mod z {
    pub const CLOSED: i32 = 0;
    pub const GRID: i32 = 5;
    pub const FRAME: i32 = 10;
    pub const BODY: i32 = 20;
    pub const OVERLAY: i32 = 21;
    pub const PATH: i32 = 30;
    pub const TODAY: i32 = 99;
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub color: String,
    pub width: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dash: Option<String>,
}

impl Stroke {
    pub fn new(color: impl Into<String>, width: f64) -> Self {
        Self {
            color: color.into(),
            width,
            dash: None,
        }
    }

    pub fn dashed(mut self, pattern: impl Into<String>) -> Self {
        self.dash = Some(pattern.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Anchor {
    #[default]
    Start,
    Middle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Baseline {
    #[default]
    Hanging,
    Middle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    pub font_family: String,
    pub font_size: f64,
    pub bold: bool,
    pub fill: String,
    pub anchor: Anchor,
    pub baseline: Baseline,
}

impl TextStyle {
    pub fn new(font_family: impl Into<String>, font_size: f64) -> Self {
        Self {
            font_family: font_family.into(),
            font_size,
            bold: false,
            fill: "black".to_string(),
            anchor: Anchor::Start,
            baseline: Baseline::Hanging,
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn fill(mut self, color: impl Into<String>) -> Self {
        self.fill = color.into();
        self
    }

    pub fn centered(mut self) -> Self {
        self.anchor = Anchor::Middle;
        self
    }

    pub fn middle_baseline(mut self) -> Self {
        self.baseline = Baseline::Middle;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Transform {
    pub translate: Point,
    pub rotate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Primitive {
    Line {
        from: Point,
        to: Point,
        stroke: Stroke,
    },
    Rect {
        origin: Point,
        width: f64,
        height: f64,
        radius: f64,
        fill: String,
        stroke: Option<Stroke>,
    },
    Polyline {
        points: Vec<Point>,
        fill: Option<String>,
        stroke: Option<Stroke>,
    },
    Text {
        origin: Point,
        content: String,
        style: TextStyle,
    },
    Group {
        id: Option<String>,
        transform: Option<Transform>,
        children: Vec<Primitive>,
    },
    Use {
        href: String,
        fill: Option<String>,
    },
}

impl Primitive {
    pub fn line(from: Point, to: Point, stroke: Stroke) -> Self {
        Primitive::Line { from, to, stroke }
    }

    pub fn text(origin: Point, content: impl Into<String>, style: TextStyle) -> Self {
        Primitive::Text {
            origin,
            content: content.into(),
            style,
        }
    }
}

/// A primitive tagged with its draw layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub z: i32,
    pub primitive: Primitive,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VectorDocument {
    pub width: f64,
    pub height: f64,
    /// Reusable symbols referenced by `Primitive::Use`.
    pub defs: Vec<Primitive>,
    pub elements: Vec<Element>,
}

impl VectorDocument {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    pub fn push(&mut self, z: i32, primitive: Primitive) {
        self.elements.push(Element { z, primitive });
    }

    /// Stable sort by layer; primitives within a layer keep construction order.
    pub fn sort_by_layer(&mut self) {
        self.elements.sort_by_key(|element| element.z);
    }

    pub fn primitives(&self) -> impl Iterator<Item = &Primitive> {
        self.elements.iter().map(|element| &element.primitive)
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.primitives().filter_map(|primitive| match primitive {
            Primitive::Text { content, .. } => Some(content.as_str()),
            _ => None,
        })
    }
}
