use super::vector::{Anchor, Baseline, Point, Primitive, Stroke, Transform, VectorDocument};

impl VectorDocument {
    /// Serialize as a standalone SVG document.
    pub fn to_svg(&self) -> String {
        let mut svg = String::new();
        svg.push_str("<?xml version=\"1.0\" encoding=\"utf-8\" ?>\n");
        svg.push_str(&format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" xmlns:xlink=\"http://www.w3.org/1999/xlink\" version=\"1.1\" width=\"{}px\" height=\"{}px\">",
            self.width, self.height
        ));

        svg.push_str("<defs>");
        for primitive in &self.defs {
            write_primitive(&mut svg, primitive);
        }
        svg.push_str("</defs>");

        for primitive in self.primitives() {
            write_primitive(&mut svg, primitive);
        }
        svg.push_str("</svg>");
        svg
    }
}

fn write_primitive(svg: &mut String, primitive: &Primitive) {
    match primitive {
        Primitive::Line { from, to, stroke } => {
            svg.push_str(&format!(
                "<line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\"{} />",
                from.x,
                from.y,
                to.x,
                to.y,
                stroke_attrs(Some(stroke))
            ));
        }
        Primitive::Rect {
            origin,
            width,
            height,
            radius,
            fill,
            stroke,
        } => {
            let corners = if *radius > 0.0 {
                format!(" rx=\"{radius}\" ry=\"{radius}\"")
            } else {
                String::new()
            };
            svg.push_str(&format!(
                "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\"{} fill=\"{}\"{} />",
                origin.x,
                origin.y,
                width,
                height,
                corners,
                escape_xml(fill),
                stroke_attrs(stroke.as_ref())
            ));
        }
        Primitive::Polyline {
            points,
            fill,
            stroke,
        } => {
            svg.push_str(&format!(
                "<polyline points=\"{}\"{}{} />",
                points_attr(points),
                fill_attr(fill.as_deref()),
                stroke_attrs(stroke.as_ref())
            ));
        }
        Primitive::Text {
            origin,
            content,
            style,
        } => {
            let anchor = match style.anchor {
                Anchor::Start => "",
                Anchor::Middle => " text-anchor=\"middle\"",
            };
            let baseline = match style.baseline {
                Baseline::Hanging => "hanging",
                Baseline::Middle => "middle",
            };
            let weight = if style.bold { " font-weight=\"bold\"" } else { "" };
            svg.push_str(&format!(
                "<text x=\"{}\" y=\"{}\" font-family=\"{}\" font-size=\"{}\"{} fill=\"{}\" dominant-baseline=\"{}\"{}>{}</text>",
                origin.x,
                origin.y,
                escape_xml(&style.font_family),
                style.font_size,
                weight,
                escape_xml(&style.fill),
                baseline,
                anchor,
                escape_xml(content)
            ));
        }
        Primitive::Group {
            id,
            transform,
            children,
        } => {
            svg.push_str("<g");
            if let Some(id) = id {
                svg.push_str(&format!(" id=\"{}\"", escape_xml(id)));
            }
            if let Some(transform) = transform {
                svg.push_str(&format!(" transform=\"{}\"", transform_attr(transform)));
            }
            svg.push('>');
            for child in children {
                write_primitive(svg, child);
            }
            svg.push_str("</g>");
        }
        Primitive::Use { href, fill } => {
            svg.push_str(&format!(
                "<use xlink:href=\"{}\"{} />",
                escape_xml(href),
                fill_attr(fill.as_deref())
            ));
        }
    }
}

fn stroke_attrs(stroke: Option<&Stroke>) -> String {
    let Some(stroke) = stroke else {
        return String::new();
    };
    let mut attrs = format!(
        " stroke=\"{}\" stroke-width=\"{}\"",
        escape_xml(&stroke.color),
        stroke.width
    );
    if let Some(dash) = &stroke.dash {
        attrs.push_str(&format!(" stroke-dasharray=\"{}\"", escape_xml(dash)));
    }
    attrs
}

fn fill_attr(fill: Option<&str>) -> String {
    fill.map(|fill| format!(" fill=\"{}\"", escape_xml(fill)))
        .unwrap_or_default()
}

fn points_attr(points: &[Point]) -> String {
    points
        .iter()
        .map(|point| format!("{},{}", point.x, point.y))
        .collect::<Vec<_>>()
        .join(" ")
}

fn transform_attr(transform: &Transform) -> String {
    let translate = format!(
        "translate({}, {})",
        transform.translate.x, transform.translate.y
    );
    if transform.rotate == 0.0 {
        translate
    } else {
        format!("{translate} rotate({})", transform.rotate)
    }
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup_characters() {
        assert_eq!(escape_xml("a<b & 'c'"), "a&lt;b &amp; &apos;c&apos;");
    }

    #[test]
    fn rotation_is_omitted_when_zero() {
        let transform = Transform {
            translate: Point::new(-5.0, -5.0),
            rotate: 0.0,
        };
        assert_eq!(transform_attr(&transform), "translate(-5, -5)");
        let rotated = Transform {
            translate: Point::new(8.0, 24.5),
            rotate: 90.0,
        };
        assert_eq!(transform_attr(&rotated), "translate(8, 24.5) rotate(90)");
    }
}
