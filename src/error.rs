use std::time::Duration;

use thiserror::Error;

pub type ChartResult<T> = Result<T, ChartError>;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("invalid viewport size: width={width}, height={height}")]
    InvalidViewport { width: u32, height: u32 },

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("raster conversion failed: {0}")]
    Conversion(#[from] ConversionError),

    /// Embed-time render ran before any interactive render produced a payload.
    #[error("no raster payload attached to element `{element}`")]
    MissingPayload { element: String },
}

/// Failures of the vector-to-raster conversion.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    #[error("conversion exceeded the {budget:?} budget")]
    Timeout { budget: Duration },

    #[error("could not allocate a {width}x{height} raster surface")]
    NoRasterContext { width: u32, height: u32 },

    #[error("vector document failed to rasterize: {0}")]
    DecodeFailure(String),

    #[error("raster payload could not be encoded: {0}")]
    EncodeFailure(String),

    #[error("conversion was cancelled by a newer render")]
    Cancelled,
}
