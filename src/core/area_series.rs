use serde::{Deserialize, Serialize};

use crate::core::line_series::ProjectedPoint;
use crate::core::path::{generate_area_path, generate_path};
use crate::core::{Interpolation, PathData, Point2};

/// Deterministic geometry for an area series.
///
/// `line` follows the mapped data points; `fill` is the same outline closed
/// against the baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaGeometry {
    pub line: PathData,
    pub fill: PathData,
}

impl AreaGeometry {
    #[must_use]
    pub fn empty() -> Self {
        Self {
            line: PathData::new(),
            fill: PathData::new(),
        }
    }
}

/// Builds area geometry anchored at `baseline_y` (the plot bottom).
#[must_use]
pub fn project_area_geometry(
    projected: &[ProjectedPoint],
    mode: Interpolation,
    baseline_y: f64,
) -> AreaGeometry {
    if projected.is_empty() {
        return AreaGeometry::empty();
    }
    let vertices: Vec<Point2> = projected.iter().map(|point| point.position()).collect();
    AreaGeometry {
        line: generate_path(&vertices, mode),
        fill: generate_area_path(&vertices, mode, baseline_y),
    }
}
