use serde::{Deserialize, Serialize};

use crate::core::{BandScale, LinearScale, SeriesPoint, SeriesSlot};
use crate::error::{ChartError, ChartResult};

/// Deterministic bar geometry in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BarGeometry {
    pub index: usize,
    pub slot: SeriesSlot,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub value: f64,
}

impl BarGeometry {
    #[must_use]
    pub fn center_x(self) -> f64 {
        self.x + self.width * 0.5
    }
}

/// Projects grouped bars: each category band holds one bar per active slot.
///
/// `group_ratio` is the share of the band occupied by the bar group. Values
/// below zero clip to the baseline.
pub fn project_bars(
    points: &[SeriesPoint],
    slots: &[SeriesSlot],
    bands: BandScale,
    values: LinearScale,
    baseline_y: f64,
    group_ratio: f64,
) -> ChartResult<Vec<BarGeometry>> {
    if !group_ratio.is_finite() || group_ratio <= 0.0 || group_ratio > 1.0 {
        return Err(ChartError::InvalidData(
            "bar group ratio must be in (0, 1]".to_owned(),
        ));
    }
    if slots.is_empty() {
        return Ok(Vec::new());
    }

    let group_width = bands.band_width() * group_ratio;
    let bar_width = group_width / slots.len() as f64;
    let mut projected = Vec::with_capacity(points.len() * slots.len());
    for (index, point) in points.iter().enumerate() {
        let group_x = bands.center(index) - group_width * 0.5;
        for (slot_index, slot) in slots.iter().enumerate() {
            let Some(value) = point.slot_value(*slot) else {
                continue;
            };
            let top = values.to_pixel(value).min(baseline_y);
            projected.push(BarGeometry {
                index,
                slot: *slot,
                x: group_x + bar_width * slot_index as f64,
                y: top,
                width: bar_width,
                height: baseline_y - top,
                value,
            });
        }
    }
    Ok(projected)
}
