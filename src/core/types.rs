use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::primitives::{decimal_to_f64, deserialize_numeric, deserialize_optional_numeric};
use crate::error::{ChartError, ChartResult};

/// Millimeters to CSS pixels at 96 dpi.
pub const ZOOM: f64 = 3.779_527_559_1;

/// Integer pixel dimensions of a raster surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub fn is_valid(self) -> bool {
        self.width > 0 && self.height > 0
    }
}

/// Scene dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SceneSize {
    pub width: f64,
    pub height: f64,
}

impl SceneSize {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Converts an element footprint declared in millimeters into scene pixels.
    #[must_use]
    pub fn from_millimeters(width_mm: f64, height_mm: f64) -> Self {
        Self {
            width: width_mm * ZOOM,
            height: height_mm * ZOOM,
        }
    }

    pub fn validate(self) -> ChartResult<()> {
        if !self.width.is_finite()
            || !self.height.is_finite()
            || self.width <= 0.0
            || self.height <= 0.0
        {
            return Err(ChartError::InvalidData(format!(
                "scene size must be finite and > 0, got {}x{}",
                self.width, self.height
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Identifies one of the (at most three) numeric series carried by a point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SeriesSlot {
    A,
    B,
    C,
}

impl SeriesSlot {
    pub const ALL: [SeriesSlot; 3] = [SeriesSlot::A, SeriesSlot::B, SeriesSlot::C];
}

/// One x-axis category with its series values.
///
/// `value` feeds series A; `secondary_a` and `secondary_b` feed series B and C.
/// Values deserialize from JSON numbers or decimal strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesPoint {
    pub name: String,
    #[serde(deserialize_with = "deserialize_numeric")]
    pub value: f64,
    #[serde(
        default,
        deserialize_with = "deserialize_optional_numeric",
        skip_serializing_if = "Option::is_none"
    )]
    pub secondary_a: Option<f64>,
    #[serde(
        default,
        deserialize_with = "deserialize_optional_numeric",
        skip_serializing_if = "Option::is_none"
    )]
    pub secondary_b: Option<f64>,
}

impl SeriesPoint {
    #[must_use]
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
            secondary_a: None,
            secondary_b: None,
        }
    }

    #[must_use]
    pub fn with_secondary_a(mut self, value: f64) -> Self {
        self.secondary_a = Some(value);
        self
    }

    #[must_use]
    pub fn with_secondary_b(mut self, value: f64) -> Self {
        self.secondary_b = Some(value);
        self
    }

    pub fn from_decimal(name: impl Into<String>, value: Decimal) -> ChartResult<Self> {
        Ok(Self::new(name, decimal_to_f64(value, "value")?))
    }

    #[must_use]
    pub fn slot_value(&self, slot: SeriesSlot) -> Option<f64> {
        match slot {
            SeriesSlot::A => Some(self.value),
            SeriesSlot::B => self.secondary_a,
            SeriesSlot::C => self.secondary_b,
        }
    }

    pub fn validate(&self) -> ChartResult<()> {
        for slot in SeriesSlot::ALL {
            let Some(value) = self.slot_value(slot) else {
                continue;
            };
            if !value.is_finite() {
                return Err(ChartError::InvalidData(format!(
                    "series {slot:?} value for `{}` must be finite",
                    self.name
                )));
            }
        }
        Ok(())
    }
}

/// Returns the series slots carried by at least one point, in slot order.
#[must_use]
pub fn active_series(points: &[SeriesPoint]) -> SmallVec<[SeriesSlot; 3]> {
    SeriesSlot::ALL
        .into_iter()
        .filter(|slot| points.iter().any(|point| point.slot_value(*slot).is_some()))
        .collect()
}

/// Every finite value across all series, used for axis scaling.
#[must_use]
pub fn all_series_values(points: &[SeriesPoint]) -> Vec<f64> {
    points
        .iter()
        .flat_map(|point| SeriesSlot::ALL.into_iter().filter_map(|slot| point.slot_value(slot)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{SeriesPoint, SeriesSlot, active_series};

    #[test]
    fn active_series_skips_slots_no_point_carries() {
        let points = vec![
            SeriesPoint::new("a", 1.0),
            SeriesPoint::new("b", 2.0).with_secondary_b(3.0),
        ];
        assert_eq!(active_series(&points).as_slice(), &[SeriesSlot::A, SeriesSlot::C]);
    }

    #[test]
    fn validate_rejects_non_finite_secondary() {
        let point = SeriesPoint::new("x", 1.0).with_secondary_a(f64::NAN);
        assert!(point.validate().is_err());
    }
}
