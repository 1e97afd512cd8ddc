use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::core::Point2;

/// Curve-fitting strategy for line and area series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Interpolation {
    Linear,
    Step,
    Curve,
    #[default]
    Monotone,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PathCommand {
    MoveTo(Point2),
    LineTo(Point2),
    CubicTo {
        control1: Point2,
        control2: Point2,
        to: Point2,
    },
    Close,
}

/// Ordered path description, convertible to an SVG `d` attribute.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PathData {
    pub commands: Vec<PathCommand>,
}

impl PathData {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn move_to(&mut self, point: Point2) {
        self.commands.push(PathCommand::MoveTo(point));
    }

    pub fn line_to(&mut self, point: Point2) {
        self.commands.push(PathCommand::LineTo(point));
    }

    pub fn cubic_to(&mut self, control1: Point2, control2: Point2, to: Point2) {
        self.commands.push(PathCommand::CubicTo {
            control1,
            control2,
            to,
        });
    }

    pub fn close(&mut self) {
        self.commands.push(PathCommand::Close);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    #[must_use]
    pub fn cubic_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|command| matches!(command, PathCommand::CubicTo { .. }))
            .count()
    }

    #[must_use]
    pub fn line_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|command| matches!(command, PathCommand::LineTo(_)))
            .count()
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        matches!(self.commands.last(), Some(PathCommand::Close))
    }

    /// Iterates every coordinate referenced by the path, control points included.
    pub fn points(&self) -> impl Iterator<Item = Point2> + '_ {
        self.commands.iter().flat_map(|command| {
            let points: smallvec::SmallVec<[Point2; 3]> = match *command {
                PathCommand::MoveTo(point) | PathCommand::LineTo(point) => {
                    smallvec::smallvec![point]
                }
                PathCommand::CubicTo {
                    control1,
                    control2,
                    to,
                } => smallvec::smallvec![control1, control2, to],
                PathCommand::Close => smallvec::SmallVec::new(),
            };
            points
        })
    }

    #[must_use]
    pub fn to_svg_d(&self) -> String {
        let mut d = String::new();
        for command in &self.commands {
            if !d.is_empty() {
                d.push(' ');
            }
            // Writing into a String cannot fail.
            let _ = match *command {
                PathCommand::MoveTo(p) => write!(d, "M{} {}", fmt_coord(p.x), fmt_coord(p.y)),
                PathCommand::LineTo(p) => write!(d, "L{} {}", fmt_coord(p.x), fmt_coord(p.y)),
                PathCommand::CubicTo {
                    control1,
                    control2,
                    to,
                } => write!(
                    d,
                    "C{} {} {} {} {} {}",
                    fmt_coord(control1.x),
                    fmt_coord(control1.y),
                    fmt_coord(control2.x),
                    fmt_coord(control2.y),
                    fmt_coord(to.x),
                    fmt_coord(to.y)
                ),
                PathCommand::Close => write!(d, "Z"),
            };
        }
        d
    }
}

/// Fixed-precision coordinate text so serialized documents stay deterministic.
#[must_use]
pub fn fmt_coord(value: f64) -> String {
    let text = format!("{value:.3}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" {
        "0".to_owned()
    } else {
        text.to_owned()
    }
}

/// Builds a path through `points` using `mode`.
///
/// Cubic modes need at least three points; shorter inputs always use linear
/// segments.
#[must_use]
pub fn generate_path(points: &[Point2], mode: Interpolation) -> PathData {
    let mut path = PathData::new();
    let Some(first) = points.first() else {
        return path;
    };
    path.move_to(*first);

    let mode = if points.len() < 3 {
        Interpolation::Linear
    } else {
        mode
    };

    match mode {
        Interpolation::Linear => {
            for point in &points[1..] {
                path.line_to(*point);
            }
        }
        Interpolation::Step => {
            for pair in points.windows(2) {
                path.line_to(Point2::new(pair[1].x, pair[0].y));
                path.line_to(pair[1]);
            }
        }
        // Controls sit at a third of the span, pinned to each endpoint's height.
        Interpolation::Curve | Interpolation::Monotone => {
            for pair in points.windows(2) {
                let (from, to) = (pair[0], pair[1]);
                let third = (to.x - from.x) / 3.0;
                path.cubic_to(
                    Point2::new(from.x + third, from.y),
                    Point2::new(to.x - third, to.y),
                    to,
                );
            }
        }
    }
    path
}

/// Same outline as [`generate_path`], closed down to `baseline_y`.
#[must_use]
pub fn generate_area_path(points: &[Point2], mode: Interpolation, baseline_y: f64) -> PathData {
    let mut path = generate_path(points, mode);
    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        return path;
    };
    path.line_to(Point2::new(last.x, baseline_y));
    path.line_to(Point2::new(first.x, baseline_y));
    path.close();
    path
}

#[cfg(test)]
mod tests {
    use super::{Interpolation, Point2, fmt_coord, generate_area_path, generate_path};

    #[test]
    fn step_emits_two_segments_per_pair() {
        let points = [
            Point2::new(0.0, 0.0),
            Point2::new(10.0, 5.0),
            Point2::new(20.0, 2.0),
        ];
        let path = generate_path(&points, Interpolation::Step);
        assert_eq!(path.line_count(), 4);
        assert_eq!(path.to_svg_d(), "M0 0 L10 0 L10 5 L20 5 L20 2");
    }

    #[test]
    fn empty_input_yields_empty_path() {
        assert!(generate_path(&[], Interpolation::Curve).is_empty());
        assert!(generate_area_path(&[], Interpolation::Curve, 100.0).is_empty());
    }

    #[test]
    fn coordinates_are_trimmed() {
        assert_eq!(fmt_coord(12.5), "12.5");
        assert_eq!(fmt_coord(-0.0001), "0");
        assert_eq!(fmt_coord(3.0), "3");
    }
}
