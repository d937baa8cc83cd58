use super::vector::{Point, Primitive, TextStyle, VectorDocument};
use crate::config::ChartConfig;

const ERROR_LAYER: i32 = 100;
const MIN_WIDTH: f64 = 640.0;
const LINE_HEIGHT: f64 = 16.0;
const TOP_MARGIN: f64 = 4.0;
const INDENT_PER_SPACE: f64 = 8.0;

/// A document holding nothing but the error text.
pub fn render_error(message: &str) -> VectorDocument {
    let mut doc = VectorDocument::new(MIN_WIDTH, 0.0);
    append_error(&mut doc, message);
    doc
}

/// Write `message` below everything in `doc`, growing it to fit.
pub fn append_error(doc: &mut VectorDocument, message: &str) {
    let style = TextStyle::new(ChartConfig::default().font_family, 14.0)
        .bold()
        .fill("red");
    let top = doc.height + TOP_MARGIN;

    let mut lines: Vec<&str> = message.lines().collect();
    if lines.is_empty() {
        lines.push(message);
    }
    for (idx, line) in lines.iter().enumerate() {
        let indent = line.chars().take_while(|c| *c == ' ').count() as f64 * INDENT_PER_SPACE;
        doc.push(
            ERROR_LAYER,
            Primitive::text(
                Point::new(indent, top + LINE_HEIGHT * idx as f64),
                line.trim_start(),
                style.clone(),
            ),
        );
    }

    doc.height = top + LINE_HEIGHT * lines.len() as f64;
    doc.width = doc.width.max(MIN_WIDTH);
}
