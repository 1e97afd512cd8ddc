use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};

use crate::core::Point2;
use crate::error::{ChartError, ChartResult};

/// Slices below this share of the total are drawn without a label.
pub const PIE_LABEL_MIN_SHARE: f64 = 0.05;

/// Angular extent of one pie slice in radians, measured clockwise in screen
/// space from the positive x axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PieSlice {
    pub start_angle: f64,
    pub end_angle: f64,
    pub share: f64,
    pub show_label: bool,
}

impl PieSlice {
    #[must_use]
    pub fn sweep(self) -> f64 {
        self.end_angle - self.start_angle
    }

    #[must_use]
    pub fn mid_angle(self) -> f64 {
        (self.start_angle + self.end_angle) * 0.5
    }

    #[must_use]
    pub fn is_full_circle(self) -> bool {
        self.sweep() >= TAU - 1e-9
    }
}

/// Allocates proportional sweeps in input order, starting at angle 0.
///
/// Negative values contribute an empty slice.
pub fn allocate_pie_angles(values: &[f64]) -> ChartResult<Vec<PieSlice>> {
    if values.iter().any(|value| !value.is_finite()) {
        return Err(ChartError::InvalidData(
            "pie values must be finite".to_owned(),
        ));
    }

    let sum: f64 = values.iter().map(|value| value.max(0.0)).sum();
    if sum <= 0.0 {
        return Err(ChartError::InvalidData(
            "pie values must have a positive sum".to_owned(),
        ));
    }

    let mut start_angle = 0.0;
    let mut slices = Vec::with_capacity(values.len());
    for value in values {
        let share = value.max(0.0) / sum;
        let end_angle = start_angle + share * TAU;
        slices.push(PieSlice {
            start_angle,
            end_angle,
            share,
            show_label: share >= PIE_LABEL_MIN_SHARE,
        });
        start_angle = end_angle;
    }
    Ok(slices)
}

/// Point on a circle at `angle` (screen space, y grows downward).
#[must_use]
pub fn polar_point(center: Point2, radius: f64, angle: f64) -> Point2 {
    Point2::new(
        center.x + radius * angle.cos(),
        center.y + radius * angle.sin(),
    )
}

#[cfg(test)]
mod tests {
    use std::f64::consts::TAU;

    use approx::assert_relative_eq;

    use super::allocate_pie_angles;

    #[test]
    fn small_slices_hide_labels() {
        let slices = allocate_pie_angles(&[96.0, 4.0]).expect("slices");
        assert!(slices[0].show_label);
        assert!(!slices[1].show_label);
        assert_relative_eq!(slices[1].end_angle, TAU);
    }

    #[test]
    fn zero_sum_is_rejected() {
        assert!(allocate_pie_angles(&[0.0, -2.0]).is_err());
        assert!(allocate_pie_angles(&[]).is_err());
    }
}
