use serde::{Deserialize, Serialize};

use crate::core::SceneSize;
use crate::error::ChartResult;

use super::{
    CirclePrimitive, Color, LinePrimitive, PathPrimitive, RectPrimitive, SceneLayerKind,
    SceneLayerStack, TextPrimitive,
};

/// Primitives of one layer. Within a layer the paint order is rects, paths,
/// lines, circles, texts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerPrimitives {
    pub kind: SceneLayerKind,
    pub rects: Vec<RectPrimitive>,
    pub paths: Vec<PathPrimitive>,
    pub lines: Vec<LinePrimitive>,
    pub circles: Vec<CirclePrimitive>,
    pub texts: Vec<TextPrimitive>,
}

impl LayerPrimitives {
    #[must_use]
    pub fn empty(kind: SceneLayerKind) -> Self {
        Self {
            kind,
            rects: Vec::new(),
            paths: Vec::new(),
            lines: Vec::new(),
            circles: Vec::new(),
            texts: Vec::new(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
            && self.paths.is_empty()
            && self.lines.is_empty()
            && self.circles.is_empty()
            && self.texts.is_empty()
    }
}

/// Primitive counts across all layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SceneStats {
    pub rects: usize,
    pub paths: usize,
    pub lines: usize,
    pub circles: usize,
    pub texts: usize,
}

/// Backend-agnostic vector scene for one element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub size: SceneSize,
    pub background: Option<Color>,
    pub layers: Vec<LayerPrimitives>,
}

impl Scene {
    #[must_use]
    pub fn new(size: SceneSize) -> Self {
        Self::from_stack(size, SceneLayerStack::canonical())
    }

    #[must_use]
    pub fn from_stack(size: SceneSize, stack: SceneLayerStack) -> Self {
        Self {
            size,
            background: None,
            layers: stack.layers.into_iter().map(LayerPrimitives::empty).collect(),
        }
    }

    #[must_use]
    pub fn with_background(mut self, color: Color) -> Self {
        self.background = Some(color);
        self
    }

    pub fn push_line(&mut self, kind: SceneLayerKind, line: LinePrimitive) {
        if let Some(layer) = self.layer_mut(kind) {
            layer.lines.push(line);
        }
    }

    pub fn push_rect(&mut self, kind: SceneLayerKind, rect: RectPrimitive) {
        if let Some(layer) = self.layer_mut(kind) {
            layer.rects.push(rect);
        }
    }

    pub fn push_text(&mut self, kind: SceneLayerKind, text: TextPrimitive) {
        if let Some(layer) = self.layer_mut(kind) {
            layer.texts.push(text);
        }
    }

    pub fn push_path(&mut self, kind: SceneLayerKind, path: PathPrimitive) {
        if let Some(layer) = self.layer_mut(kind) {
            layer.paths.push(path);
        }
    }

    pub fn push_circle(&mut self, kind: SceneLayerKind, circle: CirclePrimitive) {
        if let Some(layer) = self.layer_mut(kind) {
            layer.circles.push(circle);
        }
    }

    #[must_use]
    pub fn layer(&self, kind: SceneLayerKind) -> Option<&LayerPrimitives> {
        self.layers.iter().find(|layer| layer.kind == kind)
    }

    fn layer_mut(&mut self, kind: SceneLayerKind) -> Option<&mut LayerPrimitives> {
        self.layers.iter_mut().find(|layer| layer.kind == kind)
    }

    #[must_use]
    pub fn stats(&self) -> SceneStats {
        self.layers
            .iter()
            .fold(SceneStats::default(), |stats, layer| SceneStats {
                rects: stats.rects + layer.rects.len(),
                paths: stats.paths + layer.paths.len(),
                lines: stats.lines + layer.lines.len(),
                circles: stats.circles + layer.circles.len(),
                texts: stats.texts + layer.texts.len(),
            })
    }

    /// Texts of every layer in paint order.
    pub fn texts(&self) -> impl Iterator<Item = &TextPrimitive> {
        self.layers.iter().flat_map(|layer| layer.texts.iter())
    }

    pub fn validate(&self) -> ChartResult<()> {
        self.size.validate()?;
        if let Some(background) = self.background {
            background.validate()?;
        }
        for layer in &self.layers {
            for rect in &layer.rects {
                rect.validate()?;
            }
            for path in &layer.paths {
                path.validate()?;
            }
            for line in &layer.lines {
                line.validate()?;
            }
            for circle in &layer.circles {
                circle.validate()?;
            }
            for text in &layer.texts {
                text.validate()?;
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.iter().all(LayerPrimitives::is_empty)
    }
}
