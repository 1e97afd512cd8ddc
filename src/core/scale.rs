use crate::error::{ChartError, ChartResult};

/// Maps a numeric domain onto a pixel range.
///
/// The range may be inverted (`range_start > range_end`), which is how value
/// axes grow upward in screen space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain_start: f64,
    domain_end: f64,
    range_start: f64,
    range_end: f64,
}

impl LinearScale {
    pub fn new(
        domain_start: f64,
        domain_end: f64,
        range_start: f64,
        range_end: f64,
    ) -> ChartResult<Self> {
        if !domain_start.is_finite() || !domain_end.is_finite() || domain_start == domain_end {
            return Err(ChartError::InvalidData(
                "scale domain must be finite and non-zero".to_owned(),
            ));
        }
        if !range_start.is_finite() || !range_end.is_finite() {
            return Err(ChartError::InvalidData(
                "scale range must be finite".to_owned(),
            ));
        }

        Ok(Self {
            domain_start,
            domain_end,
            range_start,
            range_end,
        })
    }

    #[must_use]
    pub fn domain(self) -> (f64, f64) {
        (self.domain_start, self.domain_end)
    }

    #[must_use]
    pub fn range(self) -> (f64, f64) {
        (self.range_start, self.range_end)
    }

    #[must_use]
    pub fn to_pixel(self, value: f64) -> f64 {
        let normalized = (value - self.domain_start) / (self.domain_end - self.domain_start);
        self.range_start + normalized * (self.range_end - self.range_start)
    }

    #[must_use]
    pub fn to_domain(self, pixel: f64) -> f64 {
        let normalized = (pixel - self.range_start) / (self.range_end - self.range_start);
        self.domain_start + normalized * (self.domain_end - self.domain_start)
    }
}

/// Splits a pixel span into equal category bands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandScale {
    start: f64,
    band_width: f64,
    count: usize,
}

impl BandScale {
    pub fn new(start: f64, span: f64, count: usize) -> ChartResult<Self> {
        if count == 0 {
            return Err(ChartError::InvalidData(
                "band scale needs at least one category".to_owned(),
            ));
        }
        if !start.is_finite() || !span.is_finite() || span <= 0.0 {
            return Err(ChartError::InvalidData(
                "band scale span must be finite and > 0".to_owned(),
            ));
        }
        Ok(Self {
            start,
            band_width: span / count as f64,
            count,
        })
    }

    #[must_use]
    pub fn band_width(self) -> f64 {
        self.band_width
    }

    #[must_use]
    pub fn count(self) -> usize {
        self.count
    }

    #[must_use]
    pub fn band_start(self, index: usize) -> f64 {
        self.start + self.band_width * index as f64
    }

    #[must_use]
    pub fn center(self, index: usize) -> f64 {
        self.band_start(index) + self.band_width * 0.5
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::{BandScale, LinearScale};

    #[test]
    fn inverted_range_maps_max_to_top() {
        let scale = LinearScale::new(0.0, 100.0, 300.0, 20.0).expect("scale");
        assert_relative_eq!(scale.to_pixel(0.0), 300.0);
        assert_relative_eq!(scale.to_pixel(100.0), 20.0);
        assert_relative_eq!(scale.to_domain(160.0), 50.0);
    }

    #[test]
    fn band_centers_are_evenly_spaced() {
        let bands = BandScale::new(50.0, 300.0, 3).expect("bands");
        assert_relative_eq!(bands.center(0), 100.0);
        assert_relative_eq!(bands.center(2), 300.0);
    }

    #[test]
    fn zero_span_domain_is_rejected() {
        assert!(LinearScale::new(5.0, 5.0, 0.0, 1.0).is_err());
        assert!(BandScale::new(0.0, 100.0, 0).is_err());
    }
}
