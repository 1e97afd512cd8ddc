use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};

/// Number of horizontal grid values produced for every value axis.
pub const DEFAULT_GRID_LINE_COUNT: usize = 5;

/// Headroom factor applied on top of the largest observed value.
const AXIS_HEADROOM: f64 = 1.1;

/// Value-axis extent and the evenly spaced grid values spanning it.
///
/// `grid_lines` is always populated, grid visibility only controls whether the
/// scene draws the lines; tick labels read the same values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisScale {
    pub max: f64,
    pub grid_lines: Vec<f64>,
}

pub fn compute_axis_scale(values: &[f64]) -> ChartResult<AxisScale> {
    compute_axis_scale_with(values, DEFAULT_GRID_LINE_COUNT)
}

/// Computes the axis max as `ceil(observed_max * 1.1)`.
///
/// A series whose max is `<= 0` gets a unit axis so projections never divide
/// by zero.
pub fn compute_axis_scale_with(values: &[f64], grid_count: usize) -> ChartResult<AxisScale> {
    if grid_count < 2 {
        return Err(ChartError::InvalidData(
            "axis needs at least two grid values".to_owned(),
        ));
    }
    if values.iter().any(|value| !value.is_finite()) {
        return Err(ChartError::InvalidData(
            "axis values must be finite".to_owned(),
        ));
    }

    let observed_max = values
        .iter()
        .copied()
        .map(OrderedFloat)
        .max()
        .ok_or_else(|| ChartError::InvalidData("axis needs at least one value".to_owned()))?
        .into_inner();

    let max = if observed_max > 0.0 {
        (observed_max * AXIS_HEADROOM).ceil()
    } else {
        1.0
    };

    let step = max / (grid_count - 1) as f64;
    let grid_lines = (0..grid_count).map(|index| step * index as f64).collect();

    Ok(AxisScale { max, grid_lines })
}

/// Formats an axis or value label without trailing noise.
#[must_use]
pub fn format_axis_value(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        return format!("{value:.0}");
    }
    let text = format!("{value:.2}");
    text.trim_end_matches('0').trim_end_matches('.').to_owned()
}

#[cfg(test)]
mod tests {
    use super::{compute_axis_scale, format_axis_value};

    #[test]
    fn headroom_rounds_up() {
        let scale = compute_axis_scale(&[400.0, 300.0, 600.0]).expect("scale");
        assert_eq!(scale.max, 660.0);
        assert_eq!(scale.grid_lines, vec![0.0, 165.0, 330.0, 495.0, 660.0]);
    }

    #[test]
    fn non_positive_series_gets_unit_axis() {
        let scale = compute_axis_scale(&[0.0, -3.0]).expect("scale");
        assert_eq!(scale.max, 1.0);
    }

    #[test]
    fn empty_series_is_rejected() {
        assert!(compute_axis_scale(&[]).is_err());
    }

    #[test]
    fn labels_drop_trailing_zeros() {
        assert_eq!(format_axis_value(165.0), "165");
        assert_eq!(format_axis_value(12.5), "12.5");
        assert_eq!(format_axis_value(0.126), "0.13");
    }
}
