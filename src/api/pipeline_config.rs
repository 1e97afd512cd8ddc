use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};
use crate::render::{RasterEncoding, RasterOptions};

use super::TrackerPolicy;

pub const DEFAULT_SETTLE_DELAY_MS: u64 = 100;

/// Plugin-wide configuration for raster conversion and instance tracking.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub raster: RasterOptions,
    /// Pause between mounting the live scene and rasterizing it.
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
    #[serde(default)]
    pub tracker: TrackerPolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            raster: RasterOptions::default(),
            settle_delay_ms: DEFAULT_SETTLE_DELAY_MS,
            tracker: TrackerPolicy::default(),
        }
    }
}

impl PipelineConfig {
    #[must_use]
    pub fn with_raster_options(mut self, raster: RasterOptions) -> Self {
        self.raster = raster;
        self
    }

    #[must_use]
    pub fn with_encoding(mut self, encoding: RasterEncoding) -> Self {
        self.raster = self.raster.with_encoding(encoding);
        self
    }

    #[must_use]
    pub fn with_conversion_timeout(mut self, timeout: Duration) -> Self {
        self.raster = self.raster.with_timeout(timeout);
        self
    }

    #[must_use]
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self
    }

    #[must_use]
    pub fn with_staged_config_changes(mut self, enabled: bool) -> Self {
        self.tracker.stage_config_changes = enabled;
        self
    }

    #[must_use]
    pub fn settle_delay(self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn validate(self) -> ChartResult<()> {
        if self.raster.timeout_ms == 0 {
            return Err(ChartError::InvalidData(
                "conversion timeout must be > 0".to_owned(),
            ));
        }
        if self.raster.max_dimension_px == 0 {
            return Err(ChartError::InvalidData(
                "max raster dimension must be > 0".to_owned(),
            ));
        }
        if !self.raster.oversample.is_finite() || self.raster.oversample <= 0.0 {
            return Err(ChartError::InvalidData(
                "oversample factor must be finite and > 0".to_owned(),
            ));
        }
        if let RasterEncoding::Jpeg { quality } = self.raster.encoding {
            if !(1..=100).contains(&quality) {
                return Err(ChartError::InvalidData(
                    "jpeg quality must be in [1, 100]".to_owned(),
                ));
            }
        }
        self.raster.background.validate()
    }

    /// Serializes config to pretty JSON for debug/config files.
    pub fn to_json_pretty(self) -> ChartResult<String> {
        serde_json::to_string_pretty(&self)
            .map_err(|e| ChartError::InvalidData(format!("failed to serialize config: {e}")))
    }

    /// Deserializes config from JSON; missing sections take their defaults.
    pub fn from_json_str(input: &str) -> ChartResult<Self> {
        let config: Self = serde_json::from_str(input)
            .map_err(|e| ChartError::InvalidData(format!("failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }
}

fn default_settle_delay_ms() -> u64 {
    DEFAULT_SETTLE_DELAY_MS
}

#[cfg(test)]
mod tests {
    use super::PipelineConfig;
    use crate::render::RasterEncoding;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = PipelineConfig::from_json_str(r#"{"settle_delay_ms": 0}"#).expect("config");
        assert_eq!(config.settle_delay_ms, 0);
        assert_eq!(config.raster.max_dimension_px, 1200);
        assert!(config.tracker.stage_config_changes);
    }

    #[test]
    fn out_of_range_jpeg_quality_is_rejected() {
        let config = PipelineConfig::default().with_encoding(RasterEncoding::Jpeg { quality: 0 });
        assert!(config.validate().is_err());
    }
}
