use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::core::path::fmt_coord;
use crate::error::ChartResult;

use super::{
    CirclePrimitive, Color, LinePrimitive, PathPrimitive, RectPrimitive, Scene, Stroke,
    TextPrimitive,
};

pub const SVG_MIME: &str = "image/svg+xml";
const FONT_FAMILY: &str = "Arial, Helvetica, sans-serif";

/// Self-contained SVG serialization of a scene plus its reported size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorDocument {
    pub svg: String,
    pub width: f64,
    pub height: f64,
}

impl VectorDocument {
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.svg.as_bytes()
    }
}

impl Scene {
    /// Validates and serializes the scene into a standalone SVG document.
    pub fn to_vector_document(&self) -> ChartResult<VectorDocument> {
        self.validate()?;

        let width = fmt_coord(self.size.width);
        let height = fmt_coord(self.size.height);
        let mut svg = String::with_capacity(4096);
        push(
            &mut svg,
            format_args!(
                "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" \
                 viewBox=\"0 0 {width} {height}\" font-family=\"{FONT_FAMILY}\">"
            ),
        );
        if let Some(background) = self.background {
            push(
                &mut svg,
                format_args!(
                    "<rect x=\"0\" y=\"0\" width=\"{width}\" height=\"{height}\"{}/>",
                    fill_attrs(background)
                ),
            );
        }

        for layer in &self.layers {
            if layer.is_empty() {
                continue;
            }
            push(&mut svg, format_args!("<g data-layer=\"{:?}\">", layer.kind));
            for rect in &layer.rects {
                write_rect(&mut svg, rect);
            }
            for path in &layer.paths {
                write_path(&mut svg, path);
            }
            for line in &layer.lines {
                write_line(&mut svg, line);
            }
            for circle in &layer.circles {
                write_circle(&mut svg, circle);
            }
            for text in &layer.texts {
                write_text(&mut svg, text);
            }
            svg.push_str("</g>");
        }
        svg.push_str("</svg>");

        Ok(VectorDocument {
            svg,
            width: self.size.width,
            height: self.size.height,
        })
    }
}

fn push(svg: &mut String, args: std::fmt::Arguments<'_>) {
    // Writing into a String cannot fail.
    let _ = svg.write_fmt(args);
}

fn fill_attrs(color: Color) -> String {
    if color.alpha < 1.0 {
        format!(
            " fill=\"{}\" fill-opacity=\"{}\"",
            color.to_hex_rgb(),
            fmt_coord(color.alpha)
        )
    } else {
        format!(" fill=\"{}\"", color.to_hex_rgb())
    }
}

fn stroke_attrs(stroke: Stroke) -> String {
    let mut attrs = format!(
        " stroke=\"{}\" stroke-width=\"{}\"",
        stroke.color.to_hex_rgb(),
        fmt_coord(stroke.width)
    );
    if stroke.color.alpha < 1.0 {
        let _ = write!(attrs, " stroke-opacity=\"{}\"", fmt_coord(stroke.color.alpha));
    }
    if let Some(dash) = stroke.style.dash_array() {
        let _ = write!(attrs, " stroke-dasharray=\"{dash}\"");
    }
    attrs
}

fn write_rect(svg: &mut String, rect: &RectPrimitive) {
    let mut attrs = fill_attrs(rect.fill_color);
    if rect.border_width > 0.0 {
        attrs.push_str(&stroke_attrs(Stroke::solid(rect.border_color, rect.border_width)));
    }
    if rect.corner_radius > 0.0 {
        let radius = rect
            .corner_radius
            .min(rect.width * 0.5)
            .min(rect.height * 0.5);
        let _ = write!(attrs, " rx=\"{0}\" ry=\"{0}\"", fmt_coord(radius));
    }
    push(
        svg,
        format_args!(
            "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\"{attrs}/>",
            fmt_coord(rect.x),
            fmt_coord(rect.y),
            fmt_coord(rect.width),
            fmt_coord(rect.height)
        ),
    );
}

fn write_path(svg: &mut String, path: &PathPrimitive) {
    let mut attrs = match path.fill {
        Some(fill) => fill_attrs(fill),
        None => " fill=\"none\"".to_owned(),
    };
    if let Some(stroke) = path.stroke {
        attrs.push_str(&stroke_attrs(stroke));
        attrs.push_str(" stroke-linejoin=\"round\" stroke-linecap=\"round\"");
    }
    push(
        svg,
        format_args!("<path d=\"{}\"{attrs}/>", path.data.to_svg_d()),
    );
}

fn write_line(svg: &mut String, line: &LinePrimitive) {
    let stroke = Stroke {
        color: line.color,
        width: line.stroke_width,
        style: line.stroke_style,
    };
    push(
        svg,
        format_args!(
            "<line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\"{}/>",
            fmt_coord(line.x1),
            fmt_coord(line.y1),
            fmt_coord(line.x2),
            fmt_coord(line.y2),
            stroke_attrs(stroke)
        ),
    );
}

fn write_circle(svg: &mut String, circle: &CirclePrimitive) {
    let mut attrs = fill_attrs(circle.fill);
    if let Some(stroke) = circle.stroke {
        attrs.push_str(&stroke_attrs(stroke));
    }
    push(
        svg,
        format_args!(
            "<circle cx=\"{}\" cy=\"{}\" r=\"{}\"{attrs}/>",
            fmt_coord(circle.cx),
            fmt_coord(circle.cy),
            fmt_coord(circle.radius)
        ),
    );
}

fn write_text(svg: &mut String, text: &TextPrimitive) {
    let weight = if text.bold { " font-weight=\"bold\"" } else { "" };
    push(
        svg,
        format_args!(
            "<text x=\"{}\" y=\"{}\" font-size=\"{}\" text-anchor=\"{}\"{}{weight}>{}</text>",
            fmt_coord(text.x),
            fmt_coord(text.y),
            fmt_coord(text.font_size_px),
            text.h_align.svg_anchor(),
            fill_attrs(text.color),
            escape_xml(&text.text)
        ),
    );
}

#[must_use]
pub fn escape_xml(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::escape_xml;
    use crate::core::SceneSize;
    use crate::render::{Color, Scene, SceneLayerKind, TextHAlign, TextPrimitive};

    #[test]
    fn labels_are_escaped() {
        assert_eq!(escape_xml("R&D <2024>"), "R&amp;D &lt;2024&gt;");
    }

    #[test]
    fn document_reports_scene_size_and_skips_empty_layers() {
        let mut scene = Scene::new(SceneSize::new(200.0, 100.0));
        scene.push_text(
            SceneLayerKind::Labels,
            TextPrimitive::new("Jan", 10.0, 20.0, 12.0, Color::BLACK, TextHAlign::Center),
        );
        let document = scene.to_vector_document().expect("document");
        assert_eq!(document.width, 200.0);
        assert!(document.svg.starts_with("<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"200\""));
        assert!(document.svg.contains("data-layer=\"Labels\""));
        assert!(!document.svg.contains("data-layer=\"Grid\""));
        assert!(document.svg.ends_with("</svg>"));
    }
}
