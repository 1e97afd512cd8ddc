use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::core::Viewport;
use crate::error::ConversionError;

use super::{Color, RasterBitmap, Rasterizer, VectorDocument};

/// Rasterizer used by tests and headless hosts.
///
/// It paints only the background, so output is deterministic, and it counts
/// how many documents it was asked to convert.
#[derive(Debug, Default)]
pub struct NullRasterizer {
    invocations: AtomicUsize,
    last_target: Mutex<Option<Viewport>>,
}

impl NullRasterizer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn invocations(&self) -> usize {
        self.invocations.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn last_target(&self) -> Option<Viewport> {
        self.last_target.lock().ok().and_then(|target| *target)
    }
}

impl Rasterizer for NullRasterizer {
    fn backend_name(&self) -> &'static str {
        "null"
    }

    fn rasterize(
        &self,
        document: &VectorDocument,
        target: Viewport,
        background: Color,
    ) -> Result<RasterBitmap, ConversionError> {
        if document.svg.is_empty() {
            return Err(ConversionError::DecodeFailure(
                "empty vector document".to_owned(),
            ));
        }
        self.invocations.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_target.lock() {
            *last = Some(target);
        }
        Ok(RasterBitmap::filled(target, background))
    }
}
