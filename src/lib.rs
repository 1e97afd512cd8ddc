//! chart-embed: chart and mind-map elements for document templates.
//!
//! Series or tree data is laid out into a layered vector [`render::Scene`],
//! serialized to SVG and rasterized into a `data:` URL that a document
//! composer embeds as a plain image. [`api::ChartPlugin`] wires the pipeline
//! to an interactive designer and suppresses re-rendering while an element
//! is being dragged.

pub mod api;
pub mod core;
pub mod error;
pub mod extensions;
pub mod interaction;
pub mod render;
pub mod telemetry;

pub use api::{ChartPlugin, ChartSchema, PipelineConfig};
pub use error::{ChartError, ChartResult, ConversionError};
