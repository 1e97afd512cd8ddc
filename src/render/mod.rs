mod layer_stack;
mod null_rasterizer;
mod primitives;
pub mod raster;
mod resvg_backend;
mod scene;
pub mod svg;

pub use layer_stack::{SceneLayerKind, SceneLayerStack};
pub use null_rasterizer::NullRasterizer;
pub use primitives::{
    CirclePrimitive, Color, LinePrimitive, LineStrokeStyle, PathPrimitive, RectPrimitive, Stroke,
    TextHAlign, TextPrimitive,
};
pub use raster::{
    CancellationToken, RasterBitmap, RasterEncoding, RasterOptions, RasterPayload,
    RasterPipeline, Rasterizer, clamp_raster_size, encode_bitmap,
};
pub use resvg_backend::ResvgRasterizer;
pub use scene::{LayerPrimitives, Scene, SceneStats};
pub use svg::VectorDocument;

#[cfg(feature = "cairo-backend")]
mod cairo_backend;
#[cfg(feature = "cairo-backend")]
pub use cairo_backend::{CairoRenderStats, CairoSceneRenderer};
