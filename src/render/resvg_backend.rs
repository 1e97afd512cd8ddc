use std::sync::{Arc, OnceLock};

use resvg::tiny_skia::{self, Pixmap, Transform};
use resvg::usvg::{self, fontdb};
use tracing::debug;

use crate::core::Viewport;
use crate::error::ConversionError;

use super::raster::color_to_rgba8;
use super::{Color, RasterBitmap, Rasterizer, VectorDocument};

/// Software rasterizer backed by usvg + tiny-skia.
#[derive(Debug, Clone)]
pub struct ResvgRasterizer {
    fontdb: Arc<fontdb::Database>,
}

impl Default for ResvgRasterizer {
    fn default() -> Self {
        Self::new()
    }
}

impl ResvgRasterizer {
    /// Uses the process-wide system font database, loaded on first use.
    #[must_use]
    pub fn new() -> Self {
        Self {
            fontdb: system_fonts(),
        }
    }

    #[must_use]
    pub fn with_font_database(fontdb: Arc<fontdb::Database>) -> Self {
        Self { fontdb }
    }
}

fn system_fonts() -> Arc<fontdb::Database> {
    static FONTS: OnceLock<Arc<fontdb::Database>> = OnceLock::new();
    Arc::clone(FONTS.get_or_init(|| {
        let mut database = fontdb::Database::new();
        database.load_system_fonts();
        debug!(faces = database.len(), "loaded system fonts for rasterization");
        Arc::new(database)
    }))
}

impl Rasterizer for ResvgRasterizer {
    fn backend_name(&self) -> &'static str {
        "resvg+tiny-skia"
    }

    fn rasterize(
        &self,
        document: &VectorDocument,
        target: Viewport,
        background: Color,
    ) -> Result<RasterBitmap, ConversionError> {
        let mut options = usvg::Options::default();
        options.fontdb = Arc::clone(&self.fontdb);
        let tree = usvg::Tree::from_data(document.as_bytes(), &options)
            .map_err(|err| ConversionError::DecodeFailure(err.to_string()))?;

        let mut pixmap =
            Pixmap::new(target.width, target.height).ok_or(ConversionError::NoRasterContext {
                width: target.width,
                height: target.height,
            })?;
        let [red, green, blue, _] = color_to_rgba8(background);
        pixmap.fill(tiny_skia::Color::from_rgba8(red, green, blue, 255));

        let source = tree.size();
        let transform = Transform::from_scale(
            target.width as f32 / source.width(),
            target.height as f32 / source.height(),
        );
        resvg::render(&tree, transform, &mut pixmap.as_mut());

        let pixels = pixmap
            .pixels()
            .iter()
            .flat_map(|pixel| {
                let color = pixel.demultiply();
                [color.red(), color.green(), color.blue(), color.alpha()]
            })
            .collect();

        Ok(RasterBitmap {
            width: target.width,
            height: target.height,
            pixels,
        })
    }
}
