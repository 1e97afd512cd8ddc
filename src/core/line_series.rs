use serde::{Deserialize, Serialize};

use crate::core::{BandScale, Interpolation, LinearScale, PathData, Point2, SeriesPoint, SeriesSlot};
use crate::core::path::generate_path;

/// One series sample mapped into pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectedPoint {
    pub index: usize,
    pub x: f64,
    pub y: f64,
    pub value: f64,
}

impl ProjectedPoint {
    #[must_use]
    pub fn position(self) -> Point2 {
        Point2::new(self.x, self.y)
    }
}

/// Projects one series slot at band centers.
///
/// Points that do not carry the slot are skipped, so secondary series with
/// holes connect their remaining samples.
#[must_use]
pub fn project_series_points(
    points: &[SeriesPoint],
    slot: SeriesSlot,
    bands: BandScale,
    values: LinearScale,
) -> Vec<ProjectedPoint> {
    points
        .iter()
        .enumerate()
        .filter_map(|(index, point)| {
            let value = point.slot_value(slot)?;
            Some(ProjectedPoint {
                index,
                x: bands.center(index),
                y: values.to_pixel(value),
                value,
            })
        })
        .collect()
}

/// Stroke path for a line series.
#[must_use]
pub fn project_line_path(projected: &[ProjectedPoint], mode: Interpolation) -> PathData {
    let vertices: Vec<Point2> = projected.iter().map(|point| point.position()).collect();
    generate_path(&vertices, mode)
}
