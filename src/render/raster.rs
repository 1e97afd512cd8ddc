use std::io::Cursor;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ExtendedColorType, ImageEncoder, ImageReader};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::core::Viewport;
use crate::error::ConversionError;

use super::{Color, Scene, VectorDocument};

pub const DEFAULT_CONVERSION_TIMEOUT_MS: u64 = 5_000;
pub const MAX_RASTER_DIMENSION_PX: u32 = 1_200;
pub const DEFAULT_OVERSAMPLE: f64 = 2.0;
pub const DEFAULT_JPEG_QUALITY: u8 = 92;

const PNG_SIGNATURE: &[u8] = &[0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];
const JPEG_SIGNATURE: &[u8] = &[0xff, 0xd8, 0xff];

/// Output encoding of the raster payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase", tag = "format")]
pub enum RasterEncoding {
    #[default]
    Png,
    Jpeg {
        quality: u8,
    },
}

impl RasterEncoding {
    #[must_use]
    pub fn jpeg() -> Self {
        Self::Jpeg {
            quality: DEFAULT_JPEG_QUALITY,
        }
    }

    #[must_use]
    pub fn mime(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg { .. } => "image/jpeg",
        }
    }

    #[must_use]
    pub fn data_url_prefix(self) -> String {
        format!("data:{};base64,", self.mime())
    }

    fn magic(self) -> &'static [u8] {
        match self {
            Self::Png => PNG_SIGNATURE,
            Self::Jpeg { .. } => JPEG_SIGNATURE,
        }
    }
}

/// Size, timing and encoding constraints for one conversion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RasterOptions {
    pub timeout_ms: u64,
    pub max_dimension_px: u32,
    pub oversample: f64,
    pub encoding: RasterEncoding,
    pub background: Color,
}

impl Default for RasterOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_CONVERSION_TIMEOUT_MS,
            max_dimension_px: MAX_RASTER_DIMENSION_PX,
            oversample: DEFAULT_OVERSAMPLE,
            encoding: RasterEncoding::Png,
            background: Color::WHITE,
        }
    }
}

impl RasterOptions {
    #[must_use]
    pub fn timeout(self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    #[must_use]
    pub fn with_encoding(mut self, encoding: RasterEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    #[must_use]
    pub fn with_max_dimension(mut self, max_dimension_px: u32) -> Self {
        self.max_dimension_px = max_dimension_px;
        self
    }

    #[must_use]
    pub fn with_oversample(mut self, oversample: f64) -> Self {
        self.oversample = oversample;
        self
    }
}

/// Straight-alpha RGBA8 bitmap produced by a rasterizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterBitmap {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl RasterBitmap {
    /// Solid bitmap of `viewport` size.
    #[must_use]
    pub fn filled(viewport: Viewport, color: Color) -> Self {
        let rgba = color_to_rgba8(color);
        let pixel_count = viewport.width as usize * viewport.height as usize;
        Self {
            width: viewport.width,
            height: viewport.height,
            pixels: rgba.repeat(pixel_count),
        }
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.width, self.height)
    }

    fn expected_len(&self) -> usize {
        self.width as usize * self.height as usize * 4
    }
}

#[must_use]
pub fn color_to_rgba8(color: Color) -> [u8; 4] {
    let to_u8 = |value: f64| (value.clamp(0.0, 1.0) * 255.0).round() as u8;
    [
        to_u8(color.red),
        to_u8(color.green),
        to_u8(color.blue),
        to_u8(color.alpha),
    ]
}

/// Backend that turns a vector document into pixels.
///
/// Implementations must paint `background` under the document so transparent
/// regions never leak through.
pub trait Rasterizer: Send + Sync {
    fn backend_name(&self) -> &'static str;

    fn rasterize(
        &self,
        document: &VectorDocument,
        target: Viewport,
        background: Color,
    ) -> Result<RasterBitmap, ConversionError>;
}

/// Cooperative cancellation flag shared between a render and its worker.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Encoded image payload ready to be stored on an element schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RasterPayload {
    pub data_url: String,
    pub viewport: Viewport,
    pub encoding: RasterEncoding,
}

impl RasterPayload {
    /// Builds a payload and re-checks both the MIME prefix and the decoded
    /// magic bytes.
    pub fn from_encoded(
        bytes: &[u8],
        viewport: Viewport,
        encoding: RasterEncoding,
    ) -> Result<Self, ConversionError> {
        let data_url = format!(
            "{}{}",
            encoding.data_url_prefix(),
            BASE64_STANDARD.encode(bytes)
        );
        Self::from_data_url(data_url, viewport, encoding)
    }

    pub fn from_data_url(
        data_url: String,
        viewport: Viewport,
        encoding: RasterEncoding,
    ) -> Result<Self, ConversionError> {
        let payload = Self {
            data_url,
            viewport,
            encoding,
        };
        payload.validate_signature()?;
        Ok(payload)
    }

    pub fn validate_signature(&self) -> Result<(), ConversionError> {
        let prefix = self.encoding.data_url_prefix();
        if !self.data_url.starts_with(&prefix) {
            return Err(ConversionError::EncodeFailure(format!(
                "payload does not start with `{prefix}`"
            )));
        }
        let bytes = self.decode_bytes()?;
        if !bytes.starts_with(self.encoding.magic()) {
            return Err(ConversionError::EncodeFailure(format!(
                "payload bytes do not carry a {} signature",
                self.encoding.mime()
            )));
        }
        Ok(())
    }

    /// Re-validates a stored data URL and reads the encoded pixel size.
    pub fn inspect(data_url: &str) -> Result<Self, ConversionError> {
        let encoding = [RasterEncoding::Png, RasterEncoding::jpeg()]
            .into_iter()
            .find(|encoding| data_url.starts_with(&encoding.data_url_prefix()))
            .ok_or_else(|| {
                ConversionError::EncodeFailure("payload is not a png or jpeg data url".to_owned())
            })?;
        let mut payload = Self {
            data_url: data_url.to_owned(),
            viewport: Viewport::new(0, 0),
            encoding,
        };
        payload.validate_signature()?;
        let (width, height) = ImageReader::new(Cursor::new(payload.decode_bytes()?))
            .with_guessed_format()
            .map_err(|err| ConversionError::DecodeFailure(err.to_string()))?
            .into_dimensions()
            .map_err(|err| ConversionError::DecodeFailure(err.to_string()))?;
        payload.viewport = Viewport::new(width, height);
        Ok(payload)
    }

    pub fn decode_bytes(&self) -> Result<Vec<u8>, ConversionError> {
        let encoded = self
            .data_url
            .split_once(',')
            .map(|(_, body)| body)
            .ok_or_else(|| ConversionError::EncodeFailure("data url has no body".to_owned()))?;
        BASE64_STANDARD
            .decode(encoded)
            .map_err(|err| ConversionError::EncodeFailure(format!("invalid base64 body: {err}")))
    }
}

/// Target bitmap size: `oversample` times the document size, scaled down so
/// neither side exceeds `max_dimension_px` while keeping the aspect ratio.
pub fn clamp_raster_size(
    width: f64,
    height: f64,
    oversample: f64,
    max_dimension_px: u32,
) -> Result<Viewport, ConversionError> {
    if !width.is_finite() || !height.is_finite() || width <= 0.0 || height <= 0.0 {
        return Err(ConversionError::DecodeFailure(format!(
            "document reports an unusable size {width}x{height}"
        )));
    }
    let oversample = if oversample.is_finite() && oversample > 0.0 {
        oversample
    } else {
        1.0
    };
    let max = f64::from(max_dimension_px.max(1));

    let mut target_width = width * oversample;
    let mut target_height = height * oversample;
    if target_width > max {
        target_height *= max / target_width;
        target_width = max;
    }
    if target_height > max {
        target_width *= max / target_height;
        target_height = max;
    }

    let to_px = |value: f64| (value.round() as u32).clamp(1, max_dimension_px.max(1));
    Ok(Viewport::new(to_px(target_width), to_px(target_height)))
}

/// Encodes an opaque bitmap.
pub fn encode_bitmap(
    bitmap: &RasterBitmap,
    encoding: RasterEncoding,
) -> Result<Vec<u8>, ConversionError> {
    if bitmap.pixels.len() != bitmap.expected_len() {
        return Err(ConversionError::EncodeFailure(format!(
            "bitmap holds {} bytes, expected {}",
            bitmap.pixels.len(),
            bitmap.expected_len()
        )));
    }

    let mut out = Vec::new();
    match encoding {
        RasterEncoding::Png => {
            PngEncoder::new_with_quality(&mut out, CompressionType::Default, FilterType::Adaptive)
                .write_image(
                    &bitmap.pixels,
                    bitmap.width,
                    bitmap.height,
                    ExtendedColorType::Rgba8,
                )
                .map_err(|err| ConversionError::EncodeFailure(err.to_string()))?;
        }
        RasterEncoding::Jpeg { quality } => {
            let rgb: Vec<u8> = bitmap
                .pixels
                .chunks_exact(4)
                .flat_map(|pixel| [pixel[0], pixel[1], pixel[2]])
                .collect();
            JpegEncoder::new_with_quality(&mut out, quality.clamp(1, 100))
                .write_image(&rgb, bitmap.width, bitmap.height, ExtendedColorType::Rgb8)
                .map_err(|err| ConversionError::EncodeFailure(err.to_string()))?;
        }
    }
    Ok(out)
}

/// Scene to data-URL conversion guarded by a timeout.
///
/// Conversion runs on a worker thread; the caller waits at most
/// `options.timeout()`. A worker that outlives its budget keeps running
/// detached and its result is dropped.
#[derive(Clone)]
pub struct RasterPipeline {
    rasterizer: Arc<dyn Rasterizer>,
    options: RasterOptions,
}

impl std::fmt::Debug for RasterPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RasterPipeline")
            .field("backend", &self.rasterizer.backend_name())
            .field("options", &self.options)
            .finish()
    }
}

impl RasterPipeline {
    #[must_use]
    pub fn new(rasterizer: Arc<dyn Rasterizer>, options: RasterOptions) -> Self {
        Self {
            rasterizer,
            options,
        }
    }

    #[must_use]
    pub fn with_resvg(options: RasterOptions) -> Self {
        Self::new(Arc::new(super::ResvgRasterizer::new()), options)
    }

    #[must_use]
    pub fn options(&self) -> RasterOptions {
        self.options
    }

    #[must_use]
    pub fn backend_name(&self) -> &'static str {
        self.rasterizer.backend_name()
    }

    pub fn scene_to_raster_payload(&self, scene: &Scene) -> Result<RasterPayload, ConversionError> {
        self.scene_to_raster_payload_with_cancel(scene, &CancellationToken::new())
    }

    pub fn scene_to_raster_payload_with_cancel(
        &self,
        scene: &Scene,
        token: &CancellationToken,
    ) -> Result<RasterPayload, ConversionError> {
        let document = scene
            .to_vector_document()
            .map_err(|err| ConversionError::DecodeFailure(err.to_string()))?;
        self.document_to_raster_payload(document, token)
    }

    pub fn document_to_raster_payload(
        &self,
        document: VectorDocument,
        token: &CancellationToken,
    ) -> Result<RasterPayload, ConversionError> {
        let target = clamp_raster_size(
            document.width,
            document.height,
            self.options.oversample,
            self.options.max_dimension_px,
        )?;
        let budget = self.options.timeout();
        let started = Instant::now();

        let (sender, receiver) = mpsc::sync_channel(1);
        let rasterizer = Arc::clone(&self.rasterizer);
        let worker_token = token.clone();
        let background = self.options.background;
        let encoding = self.options.encoding;
        thread::Builder::new()
            .name("chart-raster".to_owned())
            .spawn(move || {
                let result =
                    convert(rasterizer.as_ref(), &document, target, background, encoding, &worker_token);
                drop(document);
                // The receiver is gone when the caller already timed out.
                let _ = sender.send(result);
            })
            .map_err(|err| {
                warn!(error = %err, "failed to spawn raster worker");
                ConversionError::NoRasterContext {
                    width: target.width,
                    height: target.height,
                }
            })?;

        match receiver.recv_timeout(budget) {
            Ok(result) => {
                debug!(
                    backend = self.rasterizer.backend_name(),
                    width = target.width,
                    height = target.height,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    ok = result.is_ok(),
                    "raster conversion finished"
                );
                result
            }
            Err(RecvTimeoutError::Timeout) => {
                warn!(
                    backend = self.rasterizer.backend_name(),
                    budget_ms = self.options.timeout_ms,
                    "raster conversion timed out"
                );
                Err(ConversionError::Timeout { budget })
            }
            Err(RecvTimeoutError::Disconnected) => Err(ConversionError::DecodeFailure(
                "raster worker exited without a result".to_owned(),
            )),
        }
    }
}

fn convert(
    rasterizer: &dyn Rasterizer,
    document: &VectorDocument,
    target: Viewport,
    background: Color,
    encoding: RasterEncoding,
    token: &CancellationToken,
) -> Result<RasterPayload, ConversionError> {
    if token.is_cancelled() {
        return Err(ConversionError::Cancelled);
    }
    let bitmap = rasterizer.rasterize(document, target, background.with_alpha(1.0))?;
    if bitmap.viewport() != target {
        return Err(ConversionError::DecodeFailure(format!(
            "backend produced {}x{}, expected {}x{}",
            bitmap.width, bitmap.height, target.width, target.height
        )));
    }
    if token.is_cancelled() {
        return Err(ConversionError::Cancelled);
    }
    let bytes = encode_bitmap(&bitmap, encoding)?;
    trace!(bytes = bytes.len(), mime = encoding.mime(), "encoded raster payload");
    RasterPayload::from_encoded(&bytes, target, encoding)
}

#[cfg(test)]
mod tests {
    use super::{RasterEncoding, RasterPayload, clamp_raster_size};
    use crate::core::Viewport;
    use crate::error::ConversionError;

    #[test]
    fn small_documents_are_oversampled() {
        let size = clamp_raster_size(300.0, 200.0, 2.0, 1200).expect("size");
        assert_eq!(size, Viewport::new(600, 400));
    }

    #[test]
    fn tall_documents_clamp_on_height() {
        let size = clamp_raster_size(200.0, 1000.0, 2.0, 1200).expect("size");
        assert_eq!(size, Viewport::new(240, 1200));
    }

    #[test]
    fn wrong_mime_prefix_is_an_encode_failure() {
        let err = RasterPayload::from_data_url(
            "data:text/plain;base64,AAAA".to_owned(),
            Viewport::new(1, 1),
            RasterEncoding::Png,
        )
        .expect_err("signature must be checked");
        assert!(matches!(err, ConversionError::EncodeFailure(_)));
    }

    #[test]
    fn right_prefix_with_wrong_magic_is_rejected() {
        let err = RasterPayload::from_encoded(b"GIF89a", Viewport::new(1, 1), RasterEncoding::Png)
            .expect_err("magic must be checked");
        assert!(matches!(err, ConversionError::EncodeFailure(_)));
    }
}
