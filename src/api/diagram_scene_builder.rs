use tracing::{debug, warn};

use crate::core::{
    LayoutBounds, PathData, Point2, PositionedNode, SceneSize, TreeLayoutMetrics, TreeNode,
    layout_tree_with,
};
use crate::error::{ChartError, ChartResult};
use crate::render::{
    Color, LinePrimitive, PathPrimitive, RectPrimitive, Scene, SceneLayerKind, Stroke,
    TextHAlign, TextPrimitive,
};

use super::scene_style::truncate_to_width;
use super::{ConnectorStyle, DiagramConfig, SceneStyle};

/// Horizontal text inset inside a node box, before scaling.
const NODE_TEXT_INSET_PX: f64 = 8.0;

/// Uniform scale + translation that fits the layout into the scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitTransform {
    pub scale: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl FitTransform {
    /// Never scales up; the fitted layout is centered in the scene.
    pub fn fit(bounds: LayoutBounds, size: SceneSize, padding: f64) -> ChartResult<Self> {
        let available_width = size.width - 2.0 * padding;
        let available_height = size.height - 2.0 * padding;
        if available_width <= 0.0 || available_height <= 0.0 {
            return Err(ChartError::InvalidData(format!(
                "scene {}x{} leaves no room for the diagram",
                size.width, size.height
            )));
        }
        let scale = (available_width / bounds.width())
            .min(available_height / bounds.height())
            .min(1.0);
        Ok(Self {
            scale,
            offset_x: (size.width - bounds.width() * scale) * 0.5 - bounds.min_x * scale,
            offset_y: (size.height - bounds.height() * scale) * 0.5 - bounds.min_y * scale,
        })
    }

    #[must_use]
    pub fn apply(self, point: Point2) -> Point2 {
        Point2::new(
            point.x * self.scale + self.offset_x,
            point.y * self.scale + self.offset_y,
        )
    }
}

pub fn build_diagram_scene(
    config: &DiagramConfig,
    root: &TreeNode,
    size: SceneSize,
) -> ChartResult<Scene> {
    build_diagram_scene_with(
        config,
        root,
        size,
        &SceneStyle::default(),
        TreeLayoutMetrics::default(),
    )
}

/// Lays the tree out at the origin and draws connectors below node boxes.
pub fn build_diagram_scene_with(
    config: &DiagramConfig,
    root: &TreeNode,
    size: SceneSize,
    style: &SceneStyle,
    metrics: TreeLayoutMetrics,
) -> ChartResult<Scene> {
    size.validate()?;
    style.validate()?;
    root.validate()?;

    let layout = layout_tree_with(root, 0.0, 0.0, metrics);
    let transform = FitTransform::fit(layout.bounds(), size, style.diagram_padding_px)?;
    let mut scene = Scene::new(size).with_background(Color::WHITE);

    append_connectors(&mut scene, &layout, config.connector_style, transform, style);

    let default_fill = config.resolved_node_color();
    let text_color = config.resolved_text_color();
    layout.walk(&mut |positioned| {
        append_node(
            &mut scene,
            positioned,
            node_fill(positioned.node, default_fill),
            text_color,
            transform,
            style,
        );
    });
    scene.validate()?;

    debug!(
        nodes = root.node_count(),
        scale = transform.scale,
        stats = ?scene.stats(),
        "built diagram scene"
    );
    Ok(scene)
}

fn append_connectors(
    scene: &mut Scene,
    layout: &PositionedNode<'_>,
    connector_style: ConnectorStyle,
    transform: FitTransform,
    style: &SceneStyle,
) {
    let stroke_width = (style.connector_width * transform.scale).max(0.5);
    layout.walk(&mut |parent| {
        let from = transform.apply(Point2::new(parent.x + parent.width, parent.center_y()));
        for child in &parent.children {
            let to = transform.apply(Point2::new(child.x, child.center_y()));
            match connector_style {
                ConnectorStyle::Straight => scene.push_line(
                    SceneLayerKind::Connectors,
                    LinePrimitive::new(
                        from.x,
                        from.y,
                        to.x,
                        to.y,
                        stroke_width,
                        style.connector_color,
                    ),
                ),
                ConnectorStyle::Curve => {
                    let mid_x = (from.x + to.x) * 0.5;
                    let mut path = PathData::new();
                    path.move_to(from);
                    path.cubic_to(Point2::new(mid_x, from.y), Point2::new(mid_x, to.y), to);
                    scene.push_path(
                        SceneLayerKind::Connectors,
                        PathPrimitive::stroked(
                            path,
                            Stroke::solid(style.connector_color, stroke_width),
                        ),
                    );
                }
            }
        }
    });
}

fn append_node(
    scene: &mut Scene,
    positioned: &PositionedNode<'_>,
    fill: Color,
    text_color: Color,
    transform: FitTransform,
    style: &SceneStyle,
) {
    let origin = transform.apply(Point2::new(positioned.x, positioned.y));
    let width = positioned.width * transform.scale;
    let height = positioned.height * transform.scale;
    scene.push_rect(
        SceneLayerKind::Nodes,
        RectPrimitive::new(origin.x, origin.y, width, height, fill)
            .with_corner_radius(style.node_corner_radius_px * transform.scale),
    );

    if positioned.node.text.is_empty() {
        return;
    }
    let font_size = style.node_font_size_px * transform.scale;
    let label = truncate_to_width(
        &positioned.node.text,
        font_size,
        width - 2.0 * NODE_TEXT_INSET_PX * transform.scale,
    );
    let text = TextPrimitive::new(
        label,
        origin.x + width * 0.5,
        origin.y + height * 0.5 + font_size * 0.35,
        font_size,
        text_color,
        TextHAlign::Center,
    );
    scene.push_text(
        SceneLayerKind::Labels,
        if positioned.level == 0 { text.bold() } else { text },
    );
}

fn node_fill(node: &TreeNode, default_fill: Color) -> Color {
    let Some(color) = node.color.as_deref() else {
        return default_fill;
    };
    match Color::from_hex(color) {
        Ok(color) => color,
        Err(err) => {
            warn!(node = %node.id, error = %err, "invalid node color, using diagram color");
            default_fill
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::FitTransform;
    use crate::core::{LayoutBounds, Point2, SceneSize};

    #[test]
    fn small_layouts_are_centered_without_upscaling() {
        let bounds = LayoutBounds {
            min_x: 0.0,
            min_y: -20.0,
            max_x: 120.0,
            max_y: 20.0,
        };
        let fit = FitTransform::fit(bounds, SceneSize::new(400.0, 200.0), 16.0).expect("fit");
        assert_relative_eq!(fit.scale, 1.0);
        let center = fit.apply(Point2::new(60.0, 0.0));
        assert_relative_eq!(center.x, 200.0);
        assert_relative_eq!(center.y, 100.0);
    }

    #[test]
    fn wide_layouts_shrink_to_the_padded_width() {
        let bounds = LayoutBounds {
            min_x: 0.0,
            min_y: 0.0,
            max_x: 736.0,
            max_y: 40.0,
        };
        let fit = FitTransform::fit(bounds, SceneSize::new(400.0, 400.0), 16.0).expect("fit");
        assert_relative_eq!(fit.scale, 0.5);
        assert_relative_eq!(fit.apply(Point2::new(0.0, 0.0)).x, 16.0);
    }
}
